use std::time::Duration;

use base::duration_ext::DurationToRaceStr;
use model::types::types::SimulationTime;

/// Millisecond clock that moves when the session tells it to.
///
/// A countdown is a clock that starts below zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    time: SimulationTime,
}

impl Clock {
    pub fn new(time: SimulationTime) -> Self {
        Self { time }
    }

    pub fn time(&self) -> SimulationTime {
        self.time
    }

    pub fn set(&mut self, time: SimulationTime) {
        self.time = time;
    }

    pub fn advance(&mut self, delta: SimulationTime) -> SimulationTime {
        self.time = self.time.saturating_add(delta);
        self.time
    }

    /// Clock text as shown on the HUD, `-` for negative times.
    pub fn fmt_time(&self) -> String {
        fmt_sim_time(self.time)
    }
}

pub fn fmt_sim_time(time: SimulationTime) -> String {
    let text = Duration::from_millis(time.unsigned_abs() as u64).to_race_string();
    if time < 0 {
        format!("-{text}")
    } else {
        text
    }
}
