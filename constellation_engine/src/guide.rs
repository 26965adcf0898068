/// Guide portrait for the constellation on screen.
///
/// A decorative reference: the pattern mirrored around the vertical midline,
/// nudged by a little random jitter and kept away from the frame edges.
/// Carries no gameplay state.

use glam::Vec2;
use rand::Rng;

use crate::catalog::Constellation;
use crate::domain::{ConstellationId, EngineConstants};
use crate::graph::Edge;

const MIDLINE: f32 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Guide {
    pub constellation_id: ConstellationId,
    /// One point per star, same indices as the constellation.
    pub points: Vec<Vec2>,
    pub connections: &'static [Edge],
}

pub fn generate_guide<R: Rng + ?Sized>(
    constellation: &'static Constellation,
    constants: &EngineConstants,
    rng: &mut R,
) -> Guide {
    let points = constellation
        .stars
        .iter()
        .map(|star| {
            let x = 2.0 * MIDLINE - star.x + jitter(rng, constants.guide_jitter_x);
            let y = star.y + jitter(rng, constants.guide_jitter_y);
            Vec2::new(
                clamp(x, constants.guide_min, constants.guide_max),
                clamp(y, constants.guide_min, constants.guide_max),
            )
        })
        .collect();

    Guide {
        constellation_id: constellation.id,
        points,
        connections: constellation.connections,
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, amount: f32) -> f32 {
    if amount > 0.0 {
        rng.random_range(-amount..=amount)
    } else {
        0.0
    }
}

// unlike f32::clamp, does not panic when lo > hi
fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}
