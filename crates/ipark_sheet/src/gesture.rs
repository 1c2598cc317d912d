//! Drag handle gesture tracking
//!
//! Turns the raw pointer stream on the drag handle into press, drag
//! start/move/end events or a tap. Every touch starts with a press, so the
//! sheet can be held still the moment a finger lands on it. Deltas are
//! cumulative from the pointer-down position. A touch only becomes a drag
//! once it has travelled further than the slop, so a tap on the handle is
//! never misread as a tiny drag.
//!
//! Release velocity comes from the last sampled interval only, so a drag
//! that reverses late is judged by its final motion.

use ipark_core::{PointerEvent, PointerPhase};
use smallvec::{smallvec, SmallVec};

/// Gesture recognized on the drag handle
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    /// Pointer went down; the sheet should stop animating and hold still
    Press,
    /// Pointer crossed the slop and is now dragging
    DragStart,
    /// Cumulative vertical delta since pointer down
    DragMove { delta_y: f32 },
    /// Pointer released after dragging. `velocity` is in units/ms,
    /// positive downward.
    DragEnd { delta_y: f32, velocity: f32 },
    /// Pointer released without ever crossing the slop
    Tap,
    /// Touch cancelled before it crossed the slop
    Cancel,
}

/// Gesture events produced by a single pointer event
pub type GestureEvents = SmallVec<[GestureEvent; 2]>;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sample {
    y: f32,
    timestamp: u64,
}

#[derive(Clone, Debug)]
struct Track {
    origin: Sample,
    prev: Option<Sample>,
    last: Sample,
    dragging: bool,
    /// Consumer declined this gesture; swallow it until the pointer lifts
    ignored: bool,
}

impl Track {
    fn new(origin: Sample) -> Self {
        Self {
            origin,
            prev: None,
            last: origin,
            dragging: false,
            ignored: false,
        }
    }

    fn record(&mut self, sample: Sample) {
        if sample.timestamp > self.last.timestamp {
            self.prev = Some(self.last);
            self.last = sample;
        } else {
            // Same instant: coalesce
            self.last.y = sample.y;
        }
    }

    fn delta_y(&self) -> f32 {
        self.last.y - self.origin.y
    }

    fn velocity(&self) -> f32 {
        let Some(prev) = self.prev else {
            return 0.0;
        };
        let dt = self.last.timestamp.saturating_sub(prev.timestamp);
        if dt == 0 {
            return 0.0;
        }
        (self.last.y - prev.y) / dt as f32
    }
}

/// Tracks one pointer on the drag handle
#[derive(Clone, Debug)]
pub struct GestureTracker {
    slop: f32,
    track: Option<Track>,
}

impl GestureTracker {
    pub fn new(slop: f32) -> Self {
        Self { slop, track: None }
    }

    /// A pointer is down on the handle
    pub fn is_tracking(&self) -> bool {
        self.track.is_some()
    }

    /// The current touch has crossed the slop
    pub fn is_dragging(&self) -> bool {
        self.track.as_ref().is_some_and(|t| t.dragging && !t.ignored)
    }

    /// Swallow the rest of the current touch
    pub fn ignore_current(&mut self) {
        if let Some(track) = self.track.as_mut() {
            track.ignored = true;
        }
    }

    /// Forget the current touch without emitting anything
    pub fn reset(&mut self) {
        self.track = None;
    }

    /// Feed one pointer event
    pub fn handle(&mut self, event: &PointerEvent) -> GestureEvents {
        let sample = Sample {
            y: event.y,
            timestamp: event.timestamp,
        };

        match event.phase {
            PointerPhase::Down => self.on_down(sample),
            PointerPhase::Move => self.on_move(sample),
            PointerPhase::Up => self.on_up(sample),
            PointerPhase::Cancel => self.on_cancel(sample),
        }
    }

    fn on_down(&mut self, sample: Sample) -> GestureEvents {
        let mut events = GestureEvents::new();
        if let Some(old) = self.track.take() {
            tracing::warn!("pointer down while a touch is active; restarting gesture");
            if !old.ignored {
                events.push(Self::abandon(&old));
            }
        }
        self.track = Some(Track::new(sample));
        events.push(GestureEvent::Press);
        events
    }

    fn on_move(&mut self, sample: Sample) -> GestureEvents {
        let slop = self.slop;
        let Some(track) = self.track.as_mut() else {
            tracing::warn!(y = sample.y, "pointer move without pointer down; ignored");
            return GestureEvents::new();
        };

        track.record(sample);
        if track.ignored {
            return GestureEvents::new();
        }

        let delta_y = track.delta_y();
        if track.dragging {
            return smallvec![GestureEvent::DragMove { delta_y }];
        }
        if delta_y.abs() > slop {
            track.dragging = true;
            return smallvec![GestureEvent::DragStart, GestureEvent::DragMove { delta_y }];
        }

        GestureEvents::new()
    }

    fn on_up(&mut self, sample: Sample) -> GestureEvents {
        let Some(mut track) = self.track.take() else {
            tracing::warn!(y = sample.y, "pointer up without pointer down; ignored");
            return GestureEvents::new();
        };

        track.record(sample);
        if track.ignored {
            return GestureEvents::new();
        }

        let delta_y = track.delta_y();
        let end = GestureEvent::DragEnd {
            delta_y,
            velocity: track.velocity(),
        };

        if track.dragging {
            smallvec![end]
        } else if delta_y.abs() > self.slop {
            // Moved past the slop between samples with no move in between
            smallvec![GestureEvent::DragStart, end]
        } else {
            smallvec![GestureEvent::Tap]
        }
    }

    fn on_cancel(&mut self, sample: Sample) -> GestureEvents {
        let Some(mut track) = self.track.take() else {
            return GestureEvents::new();
        };

        track.record(sample);
        if track.ignored {
            GestureEvents::new()
        } else {
            smallvec![Self::abandon(&track)]
        }
    }

    /// End a touch that did not lift normally
    fn abandon(track: &Track) -> GestureEvent {
        if track.dragging {
            GestureEvent::DragEnd {
                delta_y: track.delta_y(),
                velocity: 0.0,
            }
        } else {
            GestureEvent::Cancel
        }
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(y: f32, t: u64) -> PointerEvent {
        PointerEvent::down(0.0, y, t)
    }

    fn moved(y: f32, t: u64) -> PointerEvent {
        PointerEvent::moved(0.0, y, t)
    }

    fn up(y: f32, t: u64) -> PointerEvent {
        PointerEvent::up(0.0, y, t)
    }

    #[test]
    fn test_tap_below_slop() {
        let mut tracker = GestureTracker::default();

        assert_eq!(
            tracker.handle(&down(600.0, 0)).as_slice(),
            &[GestureEvent::Press]
        );
        assert!(tracker.is_tracking());
        assert!(tracker.handle(&moved(603.0, 16)).is_empty());
        assert!(tracker.handle(&moved(597.0, 32)).is_empty());
        assert!(!tracker.is_dragging());

        let events = tracker.handle(&up(601.0, 48));
        assert_eq!(events.as_slice(), &[GestureEvent::Tap]);
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_slop_is_exclusive() {
        let mut tracker = GestureTracker::new(5.0);
        tracker.handle(&down(100.0, 0));

        assert!(tracker.handle(&moved(105.0, 16)).is_empty());

        let events = tracker.handle(&moved(105.5, 32));
        assert_eq!(
            events.as_slice(),
            &[
                GestureEvent::DragStart,
                GestureEvent::DragMove { delta_y: 5.5 }
            ]
        );
        assert!(tracker.is_dragging());
    }

    #[test]
    fn test_deltas_are_cumulative() {
        let mut tracker = GestureTracker::default();
        tracker.handle(&down(600.0, 0));
        tracker.handle(&moved(580.0, 16));

        let events = tracker.handle(&moved(450.0, 32));
        assert_eq!(events.as_slice(), &[GestureEvent::DragMove { delta_y: -150.0 }]);
    }

    #[test]
    fn test_velocity_uses_last_interval() {
        let mut tracker = GestureTracker::default();
        tracker.handle(&down(600.0, 0));
        // Fast upward motion first...
        tracker.handle(&moved(400.0, 20));
        // ...then reversing downward at 0.75 units/ms
        tracker.handle(&moved(412.0, 36));

        let events = tracker.handle(&up(424.0, 52));
        assert_eq!(
            events.as_slice(),
            &[GestureEvent::DragEnd {
                delta_y: -176.0,
                velocity: 0.75
            }]
        );
    }

    #[test]
    fn test_pause_before_release_kills_velocity() {
        let mut tracker = GestureTracker::default();
        tracker.handle(&down(600.0, 0));
        tracker.handle(&moved(450.0, 16));

        // Finger rests for 200ms at the same spot, then lifts
        let events = tracker.handle(&up(450.0, 216));
        assert_eq!(
            events.as_slice(),
            &[GestureEvent::DragEnd {
                delta_y: -150.0,
                velocity: 0.0
            }]
        );
    }

    #[test]
    fn test_release_at_same_timestamp_coalesces() {
        let mut tracker = GestureTracker::default();
        tracker.handle(&down(600.0, 0));
        tracker.handle(&moved(590.0, 10));
        tracker.handle(&moved(580.0, 20));

        // Up arrives in the same millisecond as the last move
        let events = tracker.handle(&up(570.0, 20));
        assert_eq!(
            events.as_slice(),
            &[GestureEvent::DragEnd {
                delta_y: -30.0,
                velocity: -2.0
            }]
        );
    }

    #[test]
    fn test_jump_past_slop_without_moves() {
        let mut tracker = GestureTracker::default();
        tracker.handle(&down(600.0, 0));

        let events = tracker.handle(&up(680.0, 40));
        assert_eq!(
            events.as_slice(),
            &[
                GestureEvent::DragStart,
                GestureEvent::DragEnd {
                    delta_y: 80.0,
                    velocity: 2.0
                }
            ]
        );
    }

    #[test]
    fn test_moves_and_ups_without_down_are_ignored() {
        let mut tracker = GestureTracker::default();

        assert!(tracker.handle(&moved(300.0, 16)).is_empty());
        assert!(tracker.handle(&up(300.0, 32)).is_empty());
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_cancel_ends_drag_without_velocity() {
        let mut tracker = GestureTracker::default();
        tracker.handle(&down(600.0, 0));
        tracker.handle(&moved(500.0, 16));

        let events = tracker.handle(&PointerEvent::cancel(0.0, 480.0, 32));
        assert_eq!(
            events.as_slice(),
            &[GestureEvent::DragEnd {
                delta_y: -120.0,
                velocity: 0.0
            }]
        );

        // Cancel on a touch that never crossed the slop
        tracker.handle(&down(600.0, 100));
        assert_eq!(
            tracker
                .handle(&PointerEvent::cancel(0.0, 602.0, 110))
                .as_slice(),
            &[GestureEvent::Cancel]
        );
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_ignored_touch_is_swallowed() {
        let mut tracker = GestureTracker::default();
        tracker.handle(&down(600.0, 0));
        tracker.handle(&moved(550.0, 16));
        tracker.ignore_current();

        assert!(!tracker.is_dragging());
        assert!(tracker.handle(&moved(500.0, 32)).is_empty());
        assert!(tracker.handle(&up(480.0, 48)).is_empty());
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_second_down_ends_previous_drag() {
        let mut tracker = GestureTracker::default();
        tracker.handle(&down(600.0, 0));
        tracker.handle(&moved(560.0, 16));

        let events = tracker.handle(&down(300.0, 32));
        assert_eq!(
            events.as_slice(),
            &[
                GestureEvent::DragEnd {
                    delta_y: -40.0,
                    velocity: 0.0
                },
                GestureEvent::Press
            ]
        );
        assert!(tracker.is_tracking());
        assert!(!tracker.is_dragging());

        // A held press that is interrupted is cancelled, not dragged
        let events = tracker.handle(&down(310.0, 48));
        assert_eq!(
            events.as_slice(),
            &[GestureEvent::Cancel, GestureEvent::Press]
        );
    }

    #[test]
    fn test_press_comes_before_any_motion() {
        let mut tracker = GestureTracker::default();

        // Finger held still for several frames: only the press is reported
        assert_eq!(
            tracker.handle(&down(560.0, 350)).as_slice(),
            &[GestureEvent::Press]
        );
        for t in [366, 382, 398] {
            assert!(tracker.handle(&moved(560.0, t)).is_empty());
        }

        let events = tracker.handle(&moved(570.0, 414));
        assert_eq!(
            events.as_slice(),
            &[
                GestureEvent::DragStart,
                GestureEvent::DragMove { delta_y: 10.0 }
            ]
        );
    }
}
