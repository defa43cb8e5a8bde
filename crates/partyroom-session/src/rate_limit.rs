//! Fixed-window event throttle for a single connection.

use std::time::Duration;

use tokio::time::Instant;

use crate::SessionError;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Length of one counting window.
    pub window: Duration,
    /// Events accepted per window. The next one is rejected.
    pub max_events: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(10),
            max_events: 50,
        }
    }
}

/// Counts events per window and rejects everything past the ceiling until
/// the window rolls over.
///
/// The window opens at the first event, not on a global clock, so a fresh
/// connection always gets its full allowance.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    window_start: Option<Instant>,
    count: u32,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            window_start: None,
            count: 0,
        }
    }

    /// Records one event at `now`.
    ///
    /// # Errors
    /// [`SessionError::RateLimited`] if the window's allowance is spent.
    /// Rejected events do not count.
    pub fn check(&mut self, now: Instant) -> Result<(), SessionError> {
        let start = match self.window_start {
            Some(start) if now.duration_since(start) < self.config.window => {
                start
            }
            _ => {
                self.window_start = Some(now);
                self.count = 0;
                now
            }
        };

        if self.count >= self.config.max_events {
            let retry_after =
                self.config.window.saturating_sub(now.duration_since(start));
            return Err(SessionError::RateLimited { retry_after });
        }
        self.count += 1;
        Ok(())
    }

    /// Events accepted in the current window.
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
