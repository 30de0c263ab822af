use std::fmt::Debug;
use std::time::Duration;

/// A pause taken between successive citations of an assignment run.
pub trait Throttle: Debug + Send + Sync {
    fn pause(&self);
}

/// Never pauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoThrottle;

impl Throttle for NoThrottle {
    fn pause(&self) {}
}

/// Sleeps the current thread for a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepThrottle {
    delay: Duration,
}

impl SleepThrottle {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Throttle for SleepThrottle {
    fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}
