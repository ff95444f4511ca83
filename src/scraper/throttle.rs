use crate::config::AppConfig;

use rand::Rng;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Politeness pause between catalog requests.
pub trait Throttle {
    fn pause(&self);
}

/// Blocks the current thread for a fixed delay plus optional random jitter.
pub struct FixedDelay {
    delay: Duration,
    jitter_ms: u64,
}

impl FixedDelay {
    pub fn new(delay: Duration, jitter_ms: u64) -> Self {
        Self { delay, jitter_ms }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Duration::from_millis(config.politeness_delay_ms),
            config.politeness_jitter_ms,
        )
    }

    fn next_delay(&self) -> Duration {
        if self.jitter_ms == 0 {
            return self.delay;
        }
        let extra = rand::rng().random_range(0..=self.jitter_ms);
        self.delay + Duration::from_millis(extra)
    }
}

impl Throttle for FixedDelay {
    fn pause(&self) {
        let delay = self.next_delay();
        debug!("Pausing {} ms before next request", delay.as_millis());
        thread::sleep(delay);
    }
}

/// Never waits.
pub struct NoDelay;

impl Throttle for NoDelay {
    fn pause(&self) {}
}
