pub mod lap {
    use serde::{Deserialize, Serialize};

    use crate::{contact_effect::contact_effect::CheckPointType, types::types::SimulationTime};

    /// Outcome of a checkpoint crossing that changed the lap state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LapProgress {
        CheckPoint(CheckPointType),
        LapCompleted {
            lap: u32,
            lap_time: SimulationTime,
        },
        Finished {
            lap_time: SimulationTime,
            total_time: SimulationTime,
        },
    }

    /// Lap counting of one craft.
    ///
    /// The checkpoints of a lap must be crossed in the order checkpoint 1,
    /// checkpoint 2, finish line. Crossing anything else is ignored.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LapTracker {
        lap_count: u32,
        laps_done: u32,
        next: CheckPointType,
        race_start: SimulationTime,
        lap_start: SimulationTime,
        last_lap: Option<SimulationTime>,
        best_lap: Option<SimulationTime>,
        finish_time: Option<SimulationTime>,
    }

    impl LapTracker {
        pub fn new(lap_count: u32, race_start: SimulationTime) -> Self {
            Self {
                lap_count: lap_count.max(1),
                laps_done: 0,
                next: CheckPointType::CheckPoint1,
                race_start,
                lap_start: race_start,
                last_lap: None,
                best_lap: None,
                finish_time: None,
            }
        }

        pub fn on_check_point(
            &mut self,
            check_point: CheckPointType,
            time: SimulationTime,
        ) -> Option<LapProgress> {
            if self.is_finished() || check_point != self.next {
                return None;
            }
            match check_point {
                CheckPointType::CheckPoint1 => {
                    self.next = CheckPointType::CheckPoint2;
                    Some(LapProgress::CheckPoint(check_point))
                }
                CheckPointType::CheckPoint2 => {
                    self.next = CheckPointType::FinishLine;
                    Some(LapProgress::CheckPoint(check_point))
                }
                CheckPointType::FinishLine => {
                    let lap_time = time - self.lap_start;
                    self.laps_done += 1;
                    self.lap_start = time;
                    self.last_lap = Some(lap_time);
                    self.best_lap = Some(self.best_lap.map_or(lap_time, |best| best.min(lap_time)));
                    self.next = CheckPointType::CheckPoint1;

                    if self.laps_done >= self.lap_count {
                        let total_time = time - self.race_start;
                        self.finish_time = Some(total_time);
                        Some(LapProgress::Finished {
                            lap_time,
                            total_time,
                        })
                    } else {
                        Some(LapProgress::LapCompleted {
                            lap: self.laps_done,
                            lap_time,
                        })
                    }
                }
            }
        }

        pub fn lap_count(&self) -> u32 {
            self.lap_count
        }

        pub fn laps_done(&self) -> u32 {
            self.laps_done
        }

        pub fn next_check_point(&self) -> CheckPointType {
            self.next
        }

        pub fn lap_start(&self) -> SimulationTime {
            self.lap_start
        }

        pub fn last_lap(&self) -> Option<SimulationTime> {
            self.last_lap
        }

        pub fn best_lap(&self) -> Option<SimulationTime> {
            self.best_lap
        }

        /// Race time of the craft, once it finished.
        pub fn finish_time(&self) -> Option<SimulationTime> {
            self.finish_time
        }

        pub fn is_finished(&self) -> bool {
            self.finish_time.is_some()
        }
    }

}
