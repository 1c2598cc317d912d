//! Timed interpolation between two values
//!
//! An [`Interpolator`] is plain data: it owns `(from, to, start, duration)`
//! and answers `value_at(now)` without mutating anything. Cancelling freezes
//! the value computed at the cancellation instant.

use crate::easing::Easing;

/// Interpolation of one value over a fixed duration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interpolator {
    from: f32,
    to: f32,
    /// Start time in milliseconds
    start_ms: u64,
    duration_ms: u32,
    easing: Easing,
    /// Value captured by `cancel`
    frozen: Option<f32>,
}

impl Interpolator {
    pub fn new(from: f32, to: f32, start_ms: u64, duration_ms: u32) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms,
            easing: Easing::default(),
            frozen: None,
        }
    }

    /// Builder: set the easing curve
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn to(&self) -> f32 {
        self.to
    }

    /// Linear time progress at `now`, in `[0, 1]`
    pub fn progress_at(&self, now: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start_ms);
        (elapsed as f64 / self.duration_ms as f64).min(1.0) as f32
    }

    /// Interpolated value at `now`
    ///
    /// Returns exactly `to` once the duration has elapsed, and the frozen
    /// value after [`cancel`](Self::cancel).
    pub fn value_at(&self, now: u64) -> f32 {
        if let Some(frozen) = self.frozen {
            return frozen;
        }

        let progress = self.progress_at(now);
        if progress >= 1.0 {
            return self.to;
        }

        self.from + (self.to - self.from) * self.easing.apply(progress)
    }

    /// Whether the interpolation has run its full course by `now`
    pub fn is_finished_at(&self, now: u64) -> bool {
        self.frozen.is_none() && self.progress_at(now) >= 1.0
    }

    /// Milliseconds left until completion
    pub fn remaining_ms(&self, now: u64) -> u32 {
        let end = self.start_ms + self.duration_ms as u64;
        end.saturating_sub(now.max(self.start_ms)) as u32
    }

    /// Freeze the value at `now` and return it
    pub fn cancel(&mut self, now: u64) -> f32 {
        let value = self.value_at(now);
        self.frozen = Some(value);
        value
    }

    pub fn is_cancelled(&self) -> bool {
        self.frozen.is_some()
    }
}
