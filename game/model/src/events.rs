pub mod events {
    use crate::{
        contact_effect::contact_effect::{CheckPointType, PowerUpKind},
        types::types::SimulationTime,
    };

    /// Things that happened during [`crate::game_session::game_session::GameSession::simulate`].
    ///
    /// `slot` is the player slot of the craft.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SimulationEvent {
        CheckPoint {
            slot: usize,
            check_point: CheckPointType,
            time: SimulationTime,
        },
        LapCompleted {
            slot: usize,
            lap: u32,
            lap_time: SimulationTime,
        },
        Finished {
            slot: usize,
            time: SimulationTime,
        },
        CraftHit {
            slot: usize,
            other: usize,
        },
        PickedUp {
            slot: usize,
            kind: PowerUpKind,
        },
        WallHit {
            slot: usize,
        },
    }
}
