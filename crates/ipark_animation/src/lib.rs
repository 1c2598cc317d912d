//! iPark Animation System
//!
//! Timed interpolation of a single continuous value.
//!
//! # Features
//!
//! - **Interpolator**: Pure `value_at(now)` over `(from, to, start, duration)`
//! - **Easing**: CSS-style curves applied to interpolation progress
//! - **AnimationDriver**: One running interpolation at a time, restartable
//!   from the live value and cancellable at any tick boundary
//!
//! Time is always passed in explicitly as milliseconds, so the same code runs
//! under a vsync callback, a headless frame clock, or a test.

pub mod driver;
pub mod easing;
pub mod interpolator;

pub use driver::{AnimationDriver, Frame};
pub use easing::Easing;
pub use interpolator::Interpolator;
