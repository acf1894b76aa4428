use model::{track::track::TrackHeader, types::types::SimulationTime};

use crate::phase::Phase;

/// Hooks for the scripting side of a session. All hooks are optional.
pub trait MetaSession: std::fmt::Debug + Send + Sync {
    fn on_phase_changed(&self, _phase: Phase) {}

    fn on_player_finished(&self, _slot: usize, _time: SimulationTime) {}
}

/// Track information as seen by scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPeer {
    pub name: String,
    pub description: String,
    pub laps: u32,
    pub max_players: usize,
}

impl TrackPeer {
    pub fn new(header: &TrackHeader, laps: u32) -> Self {
        Self {
            name: header.name.clone(),
            description: header.description.clone(),
            laps,
            max_players: header.max_players,
        }
    }
}
