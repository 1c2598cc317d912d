//! Deterministic frame clock.
//!
//! Animations in iPark never read the wall clock themselves; every operation
//! takes an explicit `now` in milliseconds. The frame clock is the time
//! source used by headless runs and tests, and by platform shells that
//! forward their vsync timestamps.

/// Nominal frame interval at 60fps, in milliseconds.
pub const FRAME_MS: u64 = 16;

/// A monotonically advancing millisecond clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameClock {
    /// Current position in milliseconds.
    now: u64,
    /// Number of frames stepped so far.
    frames: u64,
}

impl FrameClock {
    /// Create a clock positioned at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock positioned at `now` milliseconds.
    pub fn starting_at(now: u64) -> Self {
        Self { now, frames: 0 }
    }

    /// Current time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of frames stepped since creation or the last reset.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance by an arbitrary number of milliseconds.
    pub fn advance(&mut self, ms: u64) -> u64 {
        self.now = self.now.saturating_add(ms);
        self.now
    }

    /// Advance by one 60fps frame.
    pub fn step_frame(&mut self) -> u64 {
        self.frames += 1;
        self.advance(FRAME_MS)
    }

    /// Move the clock forward to `now`. Going backwards is ignored.
    pub fn sync_to(&mut self, now: u64) -> u64 {
        self.now = self.now.max(now);
        self.now
    }

    /// Reset to zero.
    pub fn reset(&mut self) {
        self.now = 0;
        self.frames = 0;
    }
}
