//! iPark Bottom Sheet
//!
//! Headless controller for the draggable location sheet shown over the map.
//! The sheet rests at one of a few named snap points, follows the drag
//! handle while touched, and settles with a timed animation when released.
//!
//! # Features
//!
//! - **Snap layout**: `Full`, `Half` and `Hidden` offsets derived from the
//!   viewport height, with velocity-aware release resolution
//! - **Gesture tracking**: slop-gated drags, taps and release velocity from
//!   raw pointer events
//! - **Sheet controller**: the open/close/drag/settle state machine, the
//!   selected entity and presentation listeners
//!
//! Offsets are measured from the top of the viewport, so a smaller offset is
//! a more open sheet.
//!
//! # Example
//!
//! ```rust
//! use ipark_sheet::{SheetConfig, SheetController, SheetPhase, SnapPoint};
//!
//! let config = SheetConfig::new(1000.0).with_half_fraction(0.6);
//! let mut sheet = SheetController::new(config).unwrap();
//!
//! sheet.open("SM Megamall", 0);
//! sheet.tick(300);
//! assert_eq!(sheet.phase(), SheetPhase::Open(SnapPoint::Half));
//! assert!((sheet.offset() - 600.0).abs() < 1e-3);
//!
//! // Quick upward flick from the drag handle
//! sheet.drag_start(300);
//! sheet.drag_move(-150.0);
//! sheet.drag_end(-150.0, -0.8, 340);
//! sheet.tick(590);
//! assert_eq!(sheet.phase(), SheetPhase::Open(SnapPoint::Full));
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod snap;

pub use config::SheetConfig;
pub use controller::{ListenerId, SheetController, SheetEvent, SheetPhase, SheetState};
pub use error::{ConfigError, Result};
pub use gesture::{GestureEvent, GestureEvents, GestureTracker};
pub use snap::{SnapLayout, SnapPoint, SnapResolver};
