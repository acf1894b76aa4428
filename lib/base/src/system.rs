use std::{fmt::Debug, sync::Arc, time::Duration};

use parking_lot::Mutex;

/// Monotonic wall clock of the process.
///
/// The simulation never reads the OS clock directly, it always asks an
/// implementation of this trait, so tests can drive time by hand.
pub trait SystemTimeInterface: Debug + Send + Sync {
    fn time_get_nanoseconds(&self) -> Duration;
}

#[derive(Debug, Clone)]
pub struct SystemTime {
    sys_start_time: std::time::Instant,
}

impl SystemTime {
    pub fn new() -> Self {
        Self {
            sys_start_time: std::time::Instant::now(),
        }
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimeInterface for SystemTime {
    fn time_get_nanoseconds(&self) -> Duration {
        std::time::Instant::now().duration_since(self.sys_start_time)
    }
}

/// A time source that only moves when told to.
/// Used by tests and by the headless runner, which simulates faster than real time.
#[derive(Debug, Default)]
pub struct ManualTime {
    now: Mutex<Duration>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, now: Duration) {
        *self.now.lock() = now;
    }
}

impl SystemTimeInterface for ManualTime {
    fn time_get_nanoseconds(&self) -> Duration {
        *self.now.lock()
    }
}

#[derive(Debug, Clone)]
pub struct System {
    pub time: Arc<dyn SystemTimeInterface>,
}

impl System {
    pub fn new() -> System {
        System {
            time: Arc::new(SystemTime::new()),
        }
    }

    pub fn with_time(time: Arc<dyn SystemTimeInterface>) -> System {
        System { time }
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimeInterface for System {
    fn time_get_nanoseconds(&self) -> Duration {
        self.time.time_get_nanoseconds()
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{ManualTime, SystemTimeInterface};

    #[test]
    fn manual_time_only_moves_on_request() {
        let time = ManualTime::new();
        assert_eq!(time.time_get_nanoseconds(), Duration::ZERO);
        time.advance(Duration::from_millis(15));
        time.advance(Duration::from_millis(5));
        assert_eq!(time.time_get_nanoseconds(), Duration::from_millis(20));
        time.set(Duration::from_secs(3));
        assert_eq!(time.time_get_nanoseconds(), Duration::from_secs(3));
    }
}
