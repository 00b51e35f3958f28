//! Bounded exponential backoff for network calls.

use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::error::ServiceError;

/// Retry schedule applied to every individual network request.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Runs `op` until it succeeds or the attempt budget is spent.
    ///
    /// The delay doubles after each failure, capped at `max_delay`. The last
    /// attempt's error is returned untouched.
    pub fn run<T, F>(&self, mut op: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Result<T, ServiceError>,
    {
        let mut delay = self.base_delay;
        for attempt in 1..self.attempts.max(1) {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    debug!(attempt, error = %err, "request failed, backing off");
                    thread::sleep(delay);
                    delay = (delay * 2).min(self.max_delay);
                }
            }
        }
        op()
    }
}
