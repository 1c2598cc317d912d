//! Pointer events
//!
//! Unified touch/pointer input across platforms. Platform shells translate
//! their native touch events into [`PointerEvent`]s and feed them to the
//! gesture layer.

use serde::{Deserialize, Serialize};

/// Phase of a pointer interaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    /// Finger touched down / button pressed
    Down,
    /// Pointer moved while pressed
    Move,
    /// Finger lifted / button released
    Up,
    /// The platform took the pointer away (system gesture, lost focus)
    Cancel,
}

/// A pointer event in logical pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    #[serde(default)]
    pub x: f32,
    pub y: f32,
    /// Milliseconds on the frame clock
    pub timestamp: u64,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f32, y: f32, timestamp: u64) -> Self {
        Self {
            phase,
            x,
            y,
            timestamp,
        }
    }

    pub fn down(x: f32, y: f32, timestamp: u64) -> Self {
        Self::new(PointerPhase::Down, x, y, timestamp)
    }

    pub fn moved(x: f32, y: f32, timestamp: u64) -> Self {
        Self::new(PointerPhase::Move, x, y, timestamp)
    }

    pub fn up(x: f32, y: f32, timestamp: u64) -> Self {
        Self::new(PointerPhase::Up, x, y, timestamp)
    }

    pub fn cancel(x: f32, y: f32, timestamp: u64) -> Self {
        Self::new(PointerPhase::Cancel, x, y, timestamp)
    }

    /// Whether this event ends the pointer interaction
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, PointerPhase::Up | PointerPhase::Cancel)
    }
}
