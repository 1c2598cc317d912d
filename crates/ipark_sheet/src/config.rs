//! Sheet configuration
//!
//! Every field except the viewport height has a default, so a partial
//! `[sheet]` table in a config file is enough:
//!
//! ```toml
//! viewport_height = 844.0
//! half_fraction = 0.5
//! fling_velocity_threshold = 0.8
//! ```

use ipark_animation::Easing;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::error::{ConfigError, Result};
use crate::snap::SnapPoint;

/// Configuration for a [`SheetController`](crate::SheetController)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Viewport height in logical pixels
    pub viewport_height: f32,
    /// `Half` rest offset as a fraction of the viewport height
    #[serde(default = "default_half_fraction")]
    pub half_fraction: f32,
    /// `Full` rest offset as a fraction of the viewport height
    #[serde(default = "default_full_fraction")]
    pub full_fraction: f32,
    /// Release speed (units/ms) above which a release counts as a fling
    #[serde(default = "default_fling_velocity_threshold")]
    pub fling_velocity_threshold: f32,
    /// Duration of the open transition
    #[serde(default = "default_open_duration_ms")]
    pub open_duration_ms: u32,
    /// Duration of the transition after a release or handle tap
    #[serde(default = "default_settle_duration_ms")]
    pub settle_duration_ms: u32,
    /// Duration of a programmatic dismissal
    #[serde(default = "default_close_duration_ms")]
    pub close_duration_ms: u32,
    /// Distance a pointer must travel before a touch becomes a drag
    #[serde(default = "default_drag_slop")]
    pub drag_slop: f32,
    /// A handle tap opens to `Full` when the sheet sits further than this
    /// below the `Full` offset, otherwise it returns to `Half`
    #[serde(default = "default_toggle_tolerance")]
    pub toggle_tolerance: f32,
    #[serde(default)]
    pub easing: Easing,
    /// Enabled rest positions. `hidden` is mandatory.
    #[serde(default = "default_snap_points")]
    pub snap_points: SmallVec<[SnapPoint; 3]>,
}

fn default_half_fraction() -> f32 {
    0.45
}

fn default_full_fraction() -> f32 {
    0.1
}

fn default_fling_velocity_threshold() -> f32 {
    0.5
}

fn default_open_duration_ms() -> u32 {
    300
}

fn default_settle_duration_ms() -> u32 {
    250
}

fn default_close_duration_ms() -> u32 {
    250
}

fn default_drag_slop() -> f32 {
    5.0
}

fn default_toggle_tolerance() -> f32 {
    10.0
}

fn default_snap_points() -> SmallVec<[SnapPoint; 3]> {
    smallvec![SnapPoint::Full, SnapPoint::Half, SnapPoint::Hidden]
}

impl SheetConfig {
    /// Default configuration for a viewport of the given height
    pub fn new(viewport_height: f32) -> Self {
        Self {
            viewport_height,
            half_fraction: default_half_fraction(),
            full_fraction: default_full_fraction(),
            fling_velocity_threshold: default_fling_velocity_threshold(),
            open_duration_ms: default_open_duration_ms(),
            settle_duration_ms: default_settle_duration_ms(),
            close_duration_ms: default_close_duration_ms(),
            drag_slop: default_drag_slop(),
            toggle_tolerance: default_toggle_tolerance(),
            easing: Easing::default(),
            snap_points: default_snap_points(),
        }
    }

    /// Builder: set the `Half` fraction
    pub fn with_half_fraction(mut self, fraction: f32) -> Self {
        self.half_fraction = fraction;
        self
    }

    /// Builder: set the `Full` fraction
    pub fn with_full_fraction(mut self, fraction: f32) -> Self {
        self.full_fraction = fraction;
        self
    }

    /// Builder: set the fling threshold in units/ms
    pub fn with_fling_threshold(mut self, threshold: f32) -> Self {
        self.fling_velocity_threshold = threshold;
        self
    }

    /// Builder: set open, settle and close durations
    pub fn with_durations(mut self, open_ms: u32, settle_ms: u32, close_ms: u32) -> Self {
        self.open_duration_ms = open_ms;
        self.settle_duration_ms = settle_ms;
        self.close_duration_ms = close_ms;
        self
    }

    /// Builder: set the drag slop
    pub fn with_drag_slop(mut self, slop: f32) -> Self {
        self.drag_slop = slop;
        self
    }

    /// Builder: set the easing curve
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Builder: restrict the enabled rest positions
    pub fn with_snap_points(mut self, points: impl IntoIterator<Item = SnapPoint>) -> Self {
        self.snap_points = points.into_iter().collect();
        self
    }

    /// Check every constraint; the controller refuses to start otherwise
    pub fn validate(&self) -> Result<()> {
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            return Err(ConfigError::InvalidViewportHeight(self.viewport_height));
        }

        check_fraction("half_fraction", self.half_fraction)?;
        check_fraction("full_fraction", self.full_fraction)?;
        if self.full_fraction >= self.half_fraction {
            return Err(ConfigError::FractionOrder {
                full: self.full_fraction,
                half: self.half_fraction,
            });
        }

        let threshold = self.fling_velocity_threshold;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(ConfigError::InvalidFlingThreshold(threshold));
        }

        check_distance("drag_slop", self.drag_slop)?;
        check_distance("toggle_tolerance", self.toggle_tolerance)?;

        let has_hidden = self.snap_points.contains(&SnapPoint::Hidden);
        let has_open = self.snap_points.iter().any(|snap| !snap.is_hidden());
        if !(has_hidden && has_open) {
            return Err(ConfigError::InvalidSnapSet(
                self.snap_points.iter().map(|s| s.name().to_string()).collect(),
            ));
        }

        Ok(())
    }
}

fn check_fraction(name: &'static str, value: f32) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { name, value })
    }
}

fn check_distance(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDistance { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SheetConfig::new(800.0);
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.half_fraction, 0.45);
        assert_eq!(config.full_fraction, 0.1);
        assert_eq!(config.fling_velocity_threshold, 0.5);
        assert_eq!(config.open_duration_ms, 300);
        assert_eq!(config.settle_duration_ms, 250);
        assert_eq!(config.drag_slop, 5.0);
    }

    #[test]
    fn test_rejects_bad_viewport() {
        for height in [0.0, -10.0, f32::NAN, f32::INFINITY] {
            let err = SheetConfig::new(height).validate().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidViewportHeight(_)));
        }
    }

    #[test]
    fn test_rejects_fractions_outside_unit_interval() {
        let err = SheetConfig::new(800.0)
            .with_half_fraction(1.0)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::FractionOutOfRange {
                name: "half_fraction",
                value: 1.0
            }
        );

        let err = SheetConfig::new(800.0)
            .with_full_fraction(0.0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::FractionOutOfRange {
                name: "full_fraction",
                ..
            }
        ));

        let err = SheetConfig::new(800.0)
            .with_half_fraction(f32::NAN)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FractionOutOfRange { .. }));
    }

    #[test]
    fn test_rejects_full_not_above_half() {
        let err = SheetConfig::new(800.0)
            .with_full_fraction(0.5)
            .with_half_fraction(0.5)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::FractionOrder {
                full: 0.5,
                half: 0.5
            }
        );
    }

    #[test]
    fn test_rejects_non_positive_fling_threshold() {
        let err = SheetConfig::new(800.0)
            .with_fling_threshold(0.0)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidFlingThreshold(0.0));
    }

    #[test]
    fn test_rejects_negative_slop() {
        let err = SheetConfig::new(800.0)
            .with_drag_slop(-1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDistance {
                name: "drag_slop",
                ..
            }
        ));
    }

    #[test]
    fn test_snap_set_needs_hidden_and_an_open_point() {
        let two_state = SheetConfig::new(800.0).with_snap_points([SnapPoint::Half, SnapPoint::Hidden]);
        assert_eq!(two_state.validate(), Ok(()));

        let no_hidden = SheetConfig::new(800.0).with_snap_points([SnapPoint::Full, SnapPoint::Half]);
        assert!(matches!(
            no_hidden.validate(),
            Err(ConfigError::InvalidSnapSet(_))
        ));

        let only_hidden = SheetConfig::new(800.0).with_snap_points([SnapPoint::Hidden]);
        assert!(matches!(
            only_hidden.validate(),
            Err(ConfigError::InvalidSnapSet(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SheetConfig = toml::from_str(
            r#"
            viewport_height = 844.0
            half_fraction = 0.5
            easing = "linear"
            snap_points = ["half", "hidden"]
            "#,
        )
        .unwrap();

        assert_eq!(config.viewport_height, 844.0);
        assert_eq!(config.half_fraction, 0.5);
        assert_eq!(config.full_fraction, 0.1);
        assert_eq!(config.easing, Easing::Linear);
        assert_eq!(config.snap_points.as_slice(), &[SnapPoint::Half, SnapPoint::Hidden]);
        assert_eq!(config.close_duration_ms, 250);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_viewport_height_is_required() {
        let result: std::result::Result<SheetConfig, _> = toml::from_str("half_fraction = 0.5");
        assert!(result.is_err());
    }
}
