//! Animation driver
//!
//! Drives one continuous value toward a target. Starting a new animation
//! while one is running restarts from the live value, so there is never a
//! visual jump. Each animation carries a completion token `C` that is handed
//! back exactly once, from the tick that finishes it; stopping or replacing
//! the animation drops the token instead.

use crate::easing::Easing;
use crate::interpolator::Interpolator;

/// A running animation and its completion token
#[derive(Debug)]
struct Run<C> {
    interpolator: Interpolator,
    on_complete: C,
}

/// Result of advancing the driver to a point in time
#[derive(Debug, PartialEq)]
pub struct Frame<C> {
    /// Value after the tick
    pub value: f32,
    /// Completion token, present only on the tick that finished the animation
    pub completed: Option<C>,
}

/// Single-value animation driver
#[derive(Debug)]
pub struct AnimationDriver<C = ()> {
    /// Last sampled value
    value: f32,
    easing: Easing,
    active: Option<Run<C>>,
}

impl<C> AnimationDriver<C> {
    pub fn new(initial: f32) -> Self {
        Self {
            value: initial,
            easing: Easing::default(),
            active: None,
        }
    }

    /// Builder: easing applied to every animation started by this driver
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Last sampled value. Never advances time.
    pub fn current_value(&self) -> f32 {
        self.value
    }

    /// Value the driver would report at `now`, without sampling
    pub fn value_at(&self, now: u64) -> f32 {
        match &self.active {
            Some(run) => run.interpolator.value_at(now),
            None => self.value,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Target of the running animation
    pub fn target(&self) -> Option<f32> {
        self.active.as_ref().map(|run| run.interpolator.to())
    }

    /// Completion token of the running animation
    pub fn pending(&self) -> Option<&C> {
        self.active.as_ref().map(|run| &run.on_complete)
    }

    /// Start animating toward `target`
    ///
    /// A running animation is cancelled first (its token is dropped) and the
    /// new one starts from the value at `now`.
    pub fn animate_to(&mut self, target: f32, duration_ms: u32, now: u64, on_complete: C) {
        let from = self.sample_and_cancel(now);
        tracing::trace!(from, target, duration_ms, "animate_to");

        self.active = Some(Run {
            interpolator: Interpolator::new(from, target, now, duration_ms)
                .with_easing(self.easing),
            on_complete,
        });
    }

    /// Move the running animation to a new target over its remaining time
    ///
    /// Keeps the completion token. Returns `false` when nothing is running.
    pub fn retarget(&mut self, target: f32, now: u64) -> bool {
        let Some(run) = self.active.as_mut() else {
            return false;
        };

        let from = run.interpolator.value_at(now);
        let remaining = run.interpolator.remaining_ms(now);
        run.interpolator = Interpolator::new(from, target, now, remaining).with_easing(self.easing);
        self.value = from;
        true
    }

    /// Halt the running animation and return the value at `now`
    ///
    /// The completion token is dropped.
    pub fn stop(&mut self, now: u64) -> f32 {
        self.sample_and_cancel(now)
    }

    /// Write the value directly, cancelling any running animation
    pub fn set_value(&mut self, value: f32) {
        if self.active.take().is_some() {
            tracing::trace!(value, "set_value cancelled a running animation");
        }
        self.value = value;
    }

    /// Advance to `now`
    pub fn tick(&mut self, now: u64) -> Frame<C> {
        let Some(run) = self.active.as_ref() else {
            return Frame {
                value: self.value,
                completed: None,
            };
        };

        self.value = run.interpolator.value_at(now);
        if !run.interpolator.is_finished_at(now) {
            return Frame {
                value: self.value,
                completed: None,
            };
        }

        let completed = self.active.take().map(|run| run.on_complete);
        Frame {
            value: self.value,
            completed,
        }
    }

    fn sample_and_cancel(&mut self, now: u64) -> f32 {
        if let Some(mut run) = self.active.take() {
            self.value = run.interpolator.cancel(now);
        }
        self.value
    }
}
