//! Render-ready snapshot of the puzzle screen.

use serde::Serialize;

use constellation_engine::catalog::CONSTELLATION_COUNT;
use constellation_engine::domain::{ConstellationId, StarIndex};
use constellation_engine::engine::PuzzleEngine;
use constellation_engine::guide::Guide;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideView {
    pub points: Vec<[f32; 2]>,
    pub connections: Vec<[StarIndex; 2]>,
}

impl From<&Guide> for GuideView {
    fn from(guide: &Guide) -> Self {
        Self {
            points: guide.points.iter().map(|p| p.to_array()).collect(),
            connections: guide.connections.iter().map(|e| [e.0, e.1]).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleView {
    /// `None` once every constellation is solved.
    pub constellation_id: Option<ConstellationId>,
    pub stars: Vec<[f32; 2]>,
    pub drawn_connections: Vec<[StarIndex; 2]>,
    pub connected_stars: Vec<StarIndex>,
    pub completed_ids: Vec<ConstellationId>,
    pub reveal_phrase: Vec<&'static str>,
    pub completed_count: usize,
    pub total: usize,
    pub progress_percent: u32,
    pub note_visible: bool,
    pub note_text: Option<&'static str>,
    pub finale: bool,
    pub guide: Option<GuideView>,
    /// Star the current drag started from.
    pub drag_from: Option<StarIndex>,
}

impl PuzzleView {
    pub fn build(engine: &PuzzleEngine, note_visible: bool, drag_from: Option<StarIndex>) -> Self {
        let current = engine.current_constellation();
        let mut completed_ids = engine.completed_ids().to_vec();
        completed_ids.sort_unstable();
        let note_visible = note_visible && engine.is_note_shown();

        Self {
            constellation_id: current.map(|c| c.id),
            stars: current
                .map(|c| c.stars.iter().map(|s| s.to_array()).collect())
                .unwrap_or_default(),
            drawn_connections: engine
                .drawn_connections()
                .iter()
                .map(|e| [e.0, e.1])
                .collect(),
            connected_stars: engine.connected_stars().iter().copied().collect(),
            completed_ids,
            reveal_phrase: engine.reveal_phrase(),
            completed_count: engine.completed_count(),
            total: CONSTELLATION_COUNT,
            progress_percent: engine.progress_percent(),
            note_visible,
            note_text: if note_visible { engine.note_text() } else { None },
            finale: engine.is_finale(),
            guide: engine.guide().map(GuideView::from),
            drag_from,
        }
    }

    /// Progress counter, e.g. "3 of 12".
    pub fn counter_label(&self) -> String {
        format!("{} of {}", self.completed_count, self.total)
    }
}
