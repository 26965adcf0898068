/// Constellation graph helpers.
///
/// Edges are undirected: a line drawn from star 2 to star 5 is the same
/// line as one drawn from 5 to 2.

use std::collections::BTreeSet;

use crate::domain::StarIndex;

/// Undirected edge between two stars of the same constellation.
///
/// Equality ignores direction, so `Edge(1, 4) == Edge(4, 1)`.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Edge(pub StarIndex, pub StarIndex);

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.0 == other.0 && self.1 == other.1) || (self.0 == other.1 && self.1 == other.0)
    }
}

impl Edge {
    /// True if both endpoints are the same star.
    pub fn is_loop(&self) -> bool {
        self.0 == self.1
    }

    /// Endpoints with the smaller index first.
    pub fn normalized(&self) -> (StarIndex, StarIndex) {
        if self.0 <= self.1 {
            (self.0, self.1)
        } else {
            (self.1, self.0)
        }
    }

    /// Largest star index referenced by this edge.
    pub fn max_index(&self) -> StarIndex {
        self.0.max(self.1)
    }
}

/// Membership test under undirected equality.
pub fn contains_edge(edges: &[Edge], edge: Edge) -> bool {
    edges.iter().any(|e| *e == edge)
}

/// First edge that appears twice (in either direction), if any.
pub fn find_duplicate_edge(edges: &[Edge]) -> Option<Edge> {
    let mut seen: BTreeSet<(StarIndex, StarIndex)> = BTreeSet::new();
    edges
        .iter()
        .find(|e| !seen.insert(e.normalized()))
        .copied()
}

/// Every star touched by at least one edge.
pub fn endpoints(edges: &[Edge]) -> BTreeSet<StarIndex> {
    edges.iter().flat_map(|e| [e.0, e.1]).collect()
}
