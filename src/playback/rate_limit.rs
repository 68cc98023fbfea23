use std::time::{Duration, Instant};

/// Trailing-edge rate limiter.
///
/// The first call opens a window; later calls inside the window only replace
/// the pending value. Once the window has elapsed, `poll` hands out the most
/// recent value exactly once.
#[derive(Debug, Clone)]
pub struct RateLimiter<T> {
    period: Duration,
    window_start: Option<Instant>,
    pending: Option<T>,
}

impl<T> RateLimiter<T> {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            window_start: None,
            pending: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Record a call
    pub fn call(&mut self, now: Instant, value: T) {
        if self.window_start.is_none() {
            self.window_start = Some(now);
        }
        self.pending = Some(value);
    }

    /// Take the pending value if its window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let start = self.window_start?;
        if now.saturating_duration_since(start) < self.period {
            return None;
        }
        self.window_start = None;
        self.pending.take()
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.window_start.map(|start| start + self.period)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value without firing
    pub fn cancel(&mut self) {
        self.window_start = None;
        self.pending = None;
    }
}
