//! Bottom sheet state machine
//!
//! The controller is the single writer of the sheet offset. While dragging,
//! the offset follows the pointer directly; otherwise the animation driver
//! moves it. Pointer down on the handle stops the driver and reads its live
//! value before anything else, so the two never write the offset at the same
//! time and a held finger keeps the sheet still.
//!
//! ```text
//!            open                 tick (done)
//!  Closed ─────────▶ Opening ──────────────────▶ Open(snap)
//!    ▲                  │ press                      │ press
//!    │                  ▼                            ▼
//!    │   tick (hidden) Dragging ◀────── press ───── Settling
//!    │                  │ release / tap ────────────▶ │
//!    │                  │ close                       │ tick (done)
//!    └─────── Closing ◀─┘                             └──▶ Open(snap) / Closed
//! ```

use ipark_animation::AnimationDriver;
use ipark_core::PointerEvent;
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};

use crate::config::SheetConfig;
use crate::error::Result;
use crate::gesture::{GestureEvent, GestureTracker};
use crate::snap::{SnapLayout, SnapPoint, SnapResolver};

new_key_type! {
    /// Handle returned by [`SheetController::subscribe`]
    pub struct ListenerId;
}

/// Lifecycle phase of the sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetPhase {
    /// Off-screen with no entity
    Closed,
    /// Animating toward the resting open point after `open`
    Opening,
    /// At rest
    Open(SnapPoint),
    /// Following the pointer
    Dragging,
    /// Animating toward a resolved snap point after a release or tap
    Settling,
    /// Animating toward `Hidden` after `close`
    Closing,
}

/// Notification for the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SheetEvent {
    /// The sheet moved; apply as a vertical translation
    Offset { offset: f32 },
    /// The sheet came to rest at an open snap point
    SnapSettled { snap: SnapPoint },
    /// The hide animation finished and the entity was released
    Closed,
}

/// Read-only view of the live sheet record
#[derive(Debug, PartialEq)]
pub struct SheetState<'a, E> {
    pub offset: f32,
    /// Rest position, `None` while dragging or animating
    pub last_settled: Option<SnapPoint>,
    pub phase: SheetPhase,
    pub is_animating: bool,
    pub selected: Option<&'a E>,
}

type Listener = Box<dyn FnMut(&SheetEvent)>;

/// Draggable multi-snap bottom sheet
///
/// `E` is the detail content the sheet shows, typically a location record.
/// All time arguments are milliseconds on the caller's frame clock.
pub struct SheetController<E> {
    config: SheetConfig,
    layout: SnapLayout,
    resolver: SnapResolver,
    tracker: GestureTracker,
    /// Completion token is the snap point being animated to
    driver: AnimationDriver<SnapPoint>,
    phase: SheetPhase,
    last_settled: Option<SnapPoint>,
    selected: Option<E>,
    /// Offset captured when the current drag started
    drag_baseline: f32,
    listeners: SlotMap<ListenerId, Listener>,
}

impl<E> SheetController<E> {
    /// Create a closed sheet. Fails if `config` is invalid.
    pub fn new(config: SheetConfig) -> Result<Self> {
        let layout = SnapLayout::from_config(&config)?;
        let hidden = layout.hidden_offset();

        Ok(Self {
            resolver: SnapResolver::new(config.fling_velocity_threshold),
            tracker: GestureTracker::new(config.drag_slop),
            driver: AnimationDriver::new(hidden).with_easing(config.easing),
            phase: SheetPhase::Closed,
            last_settled: Some(SnapPoint::Hidden),
            selected: None,
            drag_baseline: hidden,
            listeners: SlotMap::with_key(),
            layout,
            config,
        })
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn layout(&self) -> &SnapLayout {
        &self.layout
    }

    pub fn phase(&self) -> SheetPhase {
        self.phase
    }

    /// Current offset from the top of the viewport
    pub fn offset(&self) -> f32 {
        self.layout.clamp(self.driver.current_value())
    }

    pub fn last_settled(&self) -> Option<SnapPoint> {
        self.last_settled
    }

    pub fn selected(&self) -> Option<&E> {
        self.selected.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.driver.is_animating()
    }

    /// Whether the sheet is on screen (anything but `Closed`)
    pub fn is_visible(&self) -> bool {
        self.phase != SheetPhase::Closed
    }

    /// Snapshot of the live record
    pub fn state(&self) -> SheetState<'_, E> {
        SheetState {
            offset: self.offset(),
            last_settled: self.last_settled,
            phase: self.phase,
            is_animating: self.is_animating(),
            selected: self.selected.as_ref(),
        }
    }

    /// Register a presentation listener
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&SheetEvent) + 'static,
    {
        self.listeners.insert(Box::new(listener))
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    /// Show `entity`, or switch the visible sheet to it
    ///
    /// The previous entity is replaced in one step, so there is never a
    /// moment with no content while the sheet is visible.
    pub fn open(&mut self, entity: E, now: u64) {
        let previous = self.selected.replace(entity);
        if self.phase == SheetPhase::Dragging {
            self.tracker.reset();
        }
        tracing::debug!(
            replaced = previous.is_some(),
            from = ?self.phase,
            "open"
        );

        let target = self.layout.resting_open();
        self.start_animation(target, self.config.open_duration_ms, now);
        self.set_phase(SheetPhase::Opening);
    }

    /// Dismiss the sheet. Idempotent while closed or already closing.
    pub fn close(&mut self, now: u64) {
        match self.phase {
            SheetPhase::Closed | SheetPhase::Closing => {
                tracing::trace!(phase = ?self.phase, "close ignored");
                return;
            }
            SheetPhase::Dragging => self.tracker.reset(),
            _ => {}
        }

        self.start_animation(SnapPoint::Hidden, self.config.close_duration_ms, now);
        self.set_phase(SheetPhase::Closing);
    }

    /// Tap on the drag handle: toggle between the most open point and the
    /// resting open point, bypassing velocity resolution
    ///
    /// A sheet held by a press toggles from the offset it was held at.
    pub fn toggle(&mut self, now: u64) {
        match self.phase {
            SheetPhase::Opening | SheetPhase::Open(_) | SheetPhase::Settling => {}
            SheetPhase::Dragging => self.tracker.reset(),
            phase => {
                tracing::debug!(?phase, "handle tap ignored");
                return;
            }
        }

        let (most_open, most_open_at) = self.layout.most_open();
        let resting = self.layout.resting_open();
        let held = self.phase == SheetPhase::Dragging;
        if most_open == resting && !held {
            tracing::debug!("single open snap point; nothing to toggle");
            return;
        }

        let current = self.layout.clamp(self.driver.stop(now));
        let target = if most_open != resting
            && current > most_open_at + self.config.toggle_tolerance
        {
            most_open
        } else {
            resting
        };

        self.start_animation(target, self.config.settle_duration_ms, now);
        self.set_phase(SheetPhase::Settling);
    }

    /// Grab the sheet and begin following the pointer
    ///
    /// Stops any running animation and captures its live value as the drag
    /// baseline, so the sheet holds still under the finger from this instant.
    /// Returns `false` if the sheet cannot be dragged right now.
    pub fn drag_start(&mut self, now: u64) -> bool {
        match self.phase {
            SheetPhase::Opening | SheetPhase::Open(_) | SheetPhase::Settling => {}
            SheetPhase::Dragging => {
                tracing::warn!("drag start while already dragging; ignored");
                return true;
            }
            phase => {
                tracing::debug!(?phase, "drag ignored");
                return false;
            }
        }

        let baseline = self.layout.clamp(self.driver.stop(now));
        self.driver.set_value(baseline);
        self.drag_baseline = baseline;
        self.last_settled = None;
        self.set_phase(SheetPhase::Dragging);
        true
    }

    /// Follow the pointer; `delta_y` is cumulative since the drag started
    pub fn drag_move(&mut self, delta_y: f32) {
        if self.phase != SheetPhase::Dragging {
            tracing::warn!(delta_y, "drag move without drag start; ignored");
            return;
        }
        debug_assert!(!self.driver.is_animating());

        let offset = self.layout.clamp(self.drag_baseline + delta_y);
        self.driver.set_value(offset);
        self.emit(SheetEvent::Offset { offset });
    }

    /// Release the sheet and let it settle at the resolved snap point
    pub fn drag_end(&mut self, delta_y: f32, velocity: f32, now: u64) {
        if self.phase != SheetPhase::Dragging {
            tracing::warn!(delta_y, velocity, "drag end without drag start; ignored");
            return;
        }

        let offset = self.layout.clamp(self.drag_baseline + delta_y);
        if offset != self.driver.current_value() {
            self.driver.set_value(offset);
            self.emit(SheetEvent::Offset { offset });
        }

        let target = self.resolver.resolve(&self.layout, offset, velocity);
        tracing::debug!(offset, velocity, ?target, "drag released");

        self.start_animation(target, self.config.settle_duration_ms, now);
        self.set_phase(SheetPhase::Settling);
    }

    /// Feed a pointer event from the drag handle
    ///
    /// Pointer down grabs the sheet at once. The slop only decides whether
    /// the touch ends as a drag or as a tap on the handle.
    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        let now = event.timestamp;
        for gesture in self.tracker.handle(event) {
            match gesture {
                GestureEvent::Press => {
                    if !self.drag_start(now) {
                        self.tracker.ignore_current();
                        break;
                    }
                }
                GestureEvent::DragStart => tracing::trace!("drag slop crossed"),
                GestureEvent::DragMove { delta_y } => self.drag_move(delta_y),
                GestureEvent::DragEnd { delta_y, velocity } => {
                    self.drag_end(delta_y, velocity, now)
                }
                GestureEvent::Tap => self.toggle(now),
                GestureEvent::Cancel => self.drag_end(0.0, 0.0, now),
            }
        }
    }

    /// Advance the running animation to `now`
    pub fn tick(&mut self, now: u64) {
        if !self.driver.is_animating() {
            return;
        }

        let frame = self.driver.tick(now);
        let offset = self.layout.clamp(frame.value);
        self.emit(SheetEvent::Offset { offset });

        if let Some(snap) = frame.completed {
            self.finish(snap);
        }
    }

    /// The viewport height changed (rotation, split screen)
    ///
    /// Snap offsets are recomputed. A sheet at rest moves to its named snap
    /// point; a running animation is retargeted to the same named point.
    /// On error nothing changes.
    pub fn set_viewport_height(&mut self, height: f32, now: u64) -> Result<()> {
        let mut config = self.config.clone();
        config.viewport_height = height;
        let layout = SnapLayout::from_config(&config)?;

        tracing::debug!(
            from = self.layout.viewport_height(),
            to = height,
            phase = ?self.phase,
            "viewport resized"
        );
        self.config = config;
        self.layout = layout;

        match self.phase {
            SheetPhase::Closed | SheetPhase::Open(_) => {
                let snap = self.last_settled.unwrap_or_else(|| self.layout.resting_open());
                self.driver.set_value(self.layout.offset_of(snap));
            }
            SheetPhase::Dragging => {
                let clamped = self.layout.clamp(self.driver.current_value());
                self.driver.set_value(clamped);
            }
            SheetPhase::Opening | SheetPhase::Settling | SheetPhase::Closing => {
                if let Some(&snap) = self.driver.pending() {
                    self.driver.retarget(self.layout.offset_of(snap), now);
                }
            }
        }

        let offset = self.offset();
        self.emit(SheetEvent::Offset { offset });
        Ok(())
    }

    fn start_animation(&mut self, target: SnapPoint, duration_ms: u32, now: u64) {
        self.last_settled = None;
        let to = self.layout.offset_of(target);
        self.driver.animate_to(to, duration_ms, now, target);
    }

    fn finish(&mut self, snap: SnapPoint) {
        self.last_settled = Some(snap);
        if snap.is_hidden() {
            let released = self.selected.take();
            self.set_phase(SheetPhase::Closed);
            tracing::debug!(released = released.is_some(), "sheet closed");
            self.emit(SheetEvent::Closed);
        } else {
            self.set_phase(SheetPhase::Open(snap));
            self.emit(SheetEvent::SnapSettled { snap });
        }
    }

    fn set_phase(&mut self, phase: SheetPhase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, "sheet phase");
        }
        self.phase = phase;
    }

    fn emit(&mut self, event: SheetEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for SheetController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetController")
            .field("phase", &self.phase)
            .field("offset", &self.offset())
            .field("last_settled", &self.last_settled)
            .field("selected", &self.selected)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
