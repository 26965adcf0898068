/// Constellation catalog: the twelve fixed star patterns.
///
/// Read in id order the glyphs spell the final phrase. Star positions live in
/// a normalized 0..100 square; a star's local index is its slot in `stars`.

use glam::Vec2;
use thiserror::Error;

use crate::domain::ConstellationId;
use crate::graph::{find_duplicate_edge, Edge};

pub const CONSTELLATION_COUNT: usize = 12;

/// The phrase spelled by the catalog, as shown on the finale screen.
pub const FINAL_PHRASE: &str = "Faith & Alvin ❤️";

/// One star-and-edge pattern.
#[derive(Debug)]
pub struct Constellation {
    pub id: ConstellationId,
    /// Glyph revealed when this constellation is solved.
    pub glyph: &'static str,
    pub stars: &'static [Vec2],
    /// Edges the player has to draw.
    pub connections: &'static [Edge],
}

impl Constellation {
    pub fn star_count(&self) -> usize {
        self.stars.len()
    }
}

const fn s(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

pub static CONSTELLATIONS: [Constellation; CONSTELLATION_COUNT] = [
    Constellation {
        id: 0,
        glyph: "F",
        stars: &[s(15., 20.), s(15., 35.), s(15., 50.), s(15., 65.), s(30., 20.), s(30., 35.)],
        connections: &[Edge(0, 1), Edge(1, 2), Edge(2, 3), Edge(0, 4), Edge(1, 5)],
    },
    Constellation {
        id: 1,
        glyph: "a",
        stars: &[s(40., 35.), s(40., 50.), s(40., 65.), s(55., 35.), s(55., 50.), s(55., 65.)],
        connections: &[Edge(0, 3), Edge(3, 4), Edge(4, 5), Edge(1, 4), Edge(1, 2)],
    },
    Constellation {
        id: 2,
        glyph: "i",
        // star 0 is the dot and stays unconnected
        stars: &[s(65., 30.), s(65., 40.), s(65., 50.), s(65., 60.), s(65., 70.)],
        connections: &[Edge(1, 2), Edge(2, 3), Edge(3, 4)],
    },
    Constellation {
        id: 3,
        glyph: "t",
        stars: &[s(75., 25.), s(75., 35.), s(75., 50.), s(75., 65.), s(68., 35.), s(82., 35.)],
        connections: &[Edge(0, 1), Edge(1, 2), Edge(2, 3), Edge(4, 5)],
    },
    Constellation {
        id: 4,
        glyph: "h",
        stars: &[
            s(15., 20.),
            s(15., 35.),
            s(15., 50.),
            s(15., 65.),
            s(30., 35.),
            s(30., 50.),
            s(30., 65.),
        ],
        connections: &[Edge(0, 1), Edge(1, 2), Edge(2, 3), Edge(1, 4), Edge(4, 5), Edge(5, 6)],
    },
    Constellation {
        id: 5,
        glyph: "&",
        stars: &[
            s(45., 30.),
            s(40., 40.),
            s(40., 55.),
            s(45., 65.),
            s(55., 65.),
            s(60., 55.),
            s(55., 45.),
            s(65., 65.),
        ],
        connections: &[
            Edge(0, 1),
            Edge(1, 2),
            Edge(2, 3),
            Edge(3, 4),
            Edge(4, 5),
            Edge(5, 6),
            Edge(6, 1),
            Edge(6, 7),
        ],
    },
    Constellation {
        id: 6,
        glyph: "A",
        stars: &[s(20., 20.), s(15., 40.), s(10., 65.), s(25., 40.), s(30., 65.)],
        connections: &[Edge(2, 1), Edge(1, 0), Edge(0, 3), Edge(3, 4), Edge(1, 3)],
    },
    Constellation {
        id: 7,
        glyph: "l",
        stars: &[s(40., 20.), s(40., 35.), s(40., 50.), s(40., 65.)],
        connections: &[Edge(0, 1), Edge(1, 2), Edge(2, 3)],
    },
    Constellation {
        id: 8,
        glyph: "v",
        stars: &[s(50., 35.), s(55., 50.), s(60., 65.), s(65., 50.), s(70., 35.)],
        connections: &[Edge(0, 1), Edge(1, 2), Edge(2, 3), Edge(3, 4)],
    },
    Constellation {
        id: 9,
        glyph: "i",
        stars: &[s(80., 30.), s(80., 40.), s(80., 50.), s(80., 60.), s(80., 70.)],
        connections: &[Edge(1, 2), Edge(2, 3), Edge(3, 4)],
    },
    Constellation {
        id: 10,
        glyph: "n",
        stars: &[
            s(15., 35.),
            s(15., 50.),
            s(15., 65.),
            s(25., 35.),
            s(30., 40.),
            s(30., 50.),
            s(30., 65.),
        ],
        connections: &[Edge(0, 1), Edge(1, 2), Edge(0, 3), Edge(3, 4), Edge(4, 5), Edge(5, 6)],
    },
    Constellation {
        id: 11,
        glyph: "❤️",
        stars: &[s(45., 30.), s(40., 35.), s(50., 45.), s(50., 60.), s(60., 35.), s(55., 30.)],
        connections: &[Edge(0, 1), Edge(1, 2), Edge(2, 3), Edge(5, 4), Edge(4, 2)],
    },
];

/// Look up a constellation by id.
pub fn constellation(id: ConstellationId) -> Option<&'static Constellation> {
    CONSTELLATIONS.get(id)
}

/// Glyph table in id order.
pub fn glyphs() -> impl Iterator<Item = &'static str> {
    CONSTELLATIONS.iter().map(|c| c.glyph)
}

// ---------------------------------------------------------------------------
// Catalog validation
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("[CATALOG:size] expected 12 constellations, found {0}")]
    WrongSize(usize),
    #[error("[CATALOG:id] constellation at slot {slot} carries id {id}")]
    IdMismatch { slot: usize, id: ConstellationId },
    #[error("[CATALOG:glyph] constellation {0} has an empty glyph")]
    EmptyGlyph(ConstellationId),
    #[error("[CATALOG:star_ref] constellation {id} edge {edge:?} references a missing star")]
    MissingStar { id: ConstellationId, edge: Edge },
    #[error("[CATALOG:self_edge] constellation {id} edge {edge:?} connects a star to itself")]
    SelfEdge { id: ConstellationId, edge: Edge },
    #[error("[CATALOG:duplicate_edge] constellation {id} lists edge {edge:?} twice")]
    DuplicateEdge { id: ConstellationId, edge: Edge },
    #[error("[CATALOG:no_edges] constellation {0} has nothing to draw")]
    NoEdges(ConstellationId),
}

/// Check the structural rules every catalog must satisfy.
pub fn validate_catalog(catalog: &[Constellation]) -> Result<(), CatalogError> {
    if catalog.len() != CONSTELLATION_COUNT {
        return Err(CatalogError::WrongSize(catalog.len()));
    }
    for (slot, c) in catalog.iter().enumerate() {
        if c.id != slot {
            return Err(CatalogError::IdMismatch { slot, id: c.id });
        }
        validate_constellation(c)?;
    }
    Ok(())
}

/// Per-pattern rules: a glyph, at least one edge, edges between two distinct
/// existing stars, no edge listed twice.
pub fn validate_constellation(c: &Constellation) -> Result<(), CatalogError> {
    if c.glyph.is_empty() {
        return Err(CatalogError::EmptyGlyph(c.id));
    }
    if c.connections.is_empty() {
        return Err(CatalogError::NoEdges(c.id));
    }
    for &edge in c.connections {
        if edge.max_index() >= c.stars.len() {
            return Err(CatalogError::MissingStar { id: c.id, edge });
        }
        if edge.is_loop() {
            return Err(CatalogError::SelfEdge { id: c.id, edge });
        }
    }
    if let Some(edge) = find_duplicate_edge(c.connections) {
        return Err(CatalogError::DuplicateEdge { id: c.id, edge });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        assert_eq!(validate_catalog(&CONSTELLATIONS), Ok(()));
    }

    #[test]
    fn glyphs_spell_the_phrase() {
        let spelled: String = glyphs().collect();
        assert_eq!(spelled, FINAL_PHRASE.replace(' ', ""));
    }

    #[test]
    fn stars_stay_inside_the_sky() {
        for c in &CONSTELLATIONS {
            for star in c.stars {
                assert!((0.0..=100.0).contains(&star.x), "{} x={}", c.id, star.x);
                assert!((0.0..=100.0).contains(&star.y), "{} y={}", c.id, star.y);
            }
        }
    }

    #[test]
    fn broken_patterns_are_reported() {
        static SELF_EDGE: Constellation = Constellation {
            id: 3,
            glyph: "x",
            stars: &[s(1., 1.), s(2., 2.)],
            connections: &[Edge(0, 1), Edge(1, 1)],
        };
        static MISSING_STAR: Constellation = Constellation {
            id: 4,
            glyph: "y",
            stars: &[s(1., 1.), s(2., 2.)],
            connections: &[Edge(0, 2)],
        };
        static REPEATED: Constellation = Constellation {
            id: 5,
            glyph: "z",
            stars: &[s(1., 1.), s(2., 2.)],
            connections: &[Edge(0, 1), Edge(1, 0)],
        };

        assert_eq!(
            validate_constellation(&SELF_EDGE),
            Err(CatalogError::SelfEdge { id: 3, edge: Edge(1, 1) })
        );
        assert_eq!(
            validate_constellation(&MISSING_STAR),
            Err(CatalogError::MissingStar { id: 4, edge: Edge(0, 2) })
        );
        assert_eq!(
            validate_constellation(&REPEATED),
            Err(CatalogError::DuplicateEdge { id: 5, edge: Edge(1, 0) })
        );
    }

    #[test]
    fn short_catalog_is_rejected() {
        assert_eq!(
            validate_catalog(&CONSTELLATIONS[..11]),
            Err(CatalogError::WrongSize(11))
        );
    }
}
