//! iPark Core
//!
//! Foundational types shared by the iPark crates:
//!
//! - **Pointer Events**: Platform-neutral touch/pointer input with timestamps
//! - **Frame Clock**: Deterministic millisecond clock for ticking animations
//!
//! # Example
//!
//! ```rust
//! use ipark_core::{FrameClock, PointerEvent};
//!
//! let mut clock = FrameClock::new();
//! let down = PointerEvent::down(0.0, 600.0, clock.now());
//!
//! clock.advance(16);
//! let moved = PointerEvent::moved(0.0, 580.0, clock.now());
//!
//! assert_eq!(moved.timestamp - down.timestamp, 16);
//! ```

pub mod clock;
pub mod events;

pub use clock::FrameClock;
pub use events::{PointerEvent, PointerPhase};
