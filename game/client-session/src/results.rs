use model::types::types::SimulationTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceResult {
    pub slot: usize,
    pub name: String,
    pub id: u32,
    pub connected: bool,
    pub laps: u32,
    pub finish_time: Option<SimulationTime>,
    pub best_lap: Option<SimulationTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitResult {
    pub slot: usize,
    pub name: String,
    pub id: u32,
    pub connected: bool,
    pub hits_given: u32,
    pub hits_received: u32,
}
