//! # Frame Clock
//!
//! Milliseconds since startup, the time base the sprite functions take as
//! `now_ms`.

use std::time::{Duration, Instant};

/// Frame period at 60 Hz.
pub const FRAME_PERIOD: Duration = Duration::from_micros(16_667);

/// Monotonic millisecond clock anchored at creation.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    /// Starts a clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Starts a clock whose zero is `start`.
    #[must_use]
    pub const fn starting_at(start: Instant) -> Self {
        Self { start }
    }

    /// Milliseconds since the clock's zero.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.ms_at(Instant::now())
    }

    /// Milliseconds from the clock's zero to `instant`; zero for instants
    /// before it.
    #[must_use]
    pub fn ms_at(&self, instant: Instant) -> u64 {
        let elapsed = instant.saturating_duration_since(self.start);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    /// Time since the clock's zero.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
