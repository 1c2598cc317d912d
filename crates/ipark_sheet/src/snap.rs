//! Snap points and release resolution
//!
//! Offsets are measured from the top of the viewport, so a smaller offset
//! means a more open sheet. The layout keeps the enabled points sorted by
//! offset; nothing below assumes a particular naming order.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::SheetConfig;
use crate::error::Result;

/// Named rest position of the sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapPoint {
    /// Nearly the whole viewport
    Full,
    /// Map and details share the screen
    Half,
    /// Off-screen below the viewport
    Hidden,
}

impl SnapPoint {
    pub fn name(&self) -> &'static str {
        match self {
            SnapPoint::Full => "full",
            SnapPoint::Half => "half",
            SnapPoint::Hidden => "hidden",
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, SnapPoint::Hidden)
    }
}

/// Enabled snap points resolved against a viewport height
#[derive(Clone, Debug, PartialEq)]
pub struct SnapLayout {
    viewport_height: f32,
    half_fraction: f32,
    full_fraction: f32,
    /// Ascending by offset: most open first, `Hidden` last
    points: SmallVec<[(SnapPoint, f32); 3]>,
}

impl SnapLayout {
    /// Validate `config` and compute its snap offsets
    pub fn from_config(config: &SheetConfig) -> Result<Self> {
        config.validate()?;

        let mut layout = Self {
            viewport_height: config.viewport_height,
            half_fraction: config.half_fraction,
            full_fraction: config.full_fraction,
            points: SmallVec::new(),
        };

        for &snap in &config.snap_points {
            if layout.points.iter().any(|(s, _)| *s == snap) {
                continue;
            }
            let offset = layout.offset_of(snap);
            layout.points.push((snap, offset));
        }
        layout.points.sort_by(|a, b| a.1.total_cmp(&b.1));

        Ok(layout)
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Enabled points, most open first
    pub fn points(&self) -> &[(SnapPoint, f32)] {
        &self.points
    }

    pub fn contains(&self, snap: SnapPoint) -> bool {
        self.points.iter().any(|(s, _)| *s == snap)
    }

    /// Offset a snap point has at this viewport height, enabled or not
    pub fn offset_of(&self, snap: SnapPoint) -> f32 {
        match snap {
            SnapPoint::Full => self.viewport_height * self.full_fraction,
            SnapPoint::Half => self.viewport_height * self.half_fraction,
            SnapPoint::Hidden => self.viewport_height,
        }
    }

    /// The most open enabled point
    pub fn most_open(&self) -> (SnapPoint, f32) {
        self.points[0]
    }

    /// Offset of the fully hidden sheet, the largest valid offset
    pub fn hidden_offset(&self) -> f32 {
        self.points[self.points.len() - 1].1
    }

    /// Where `open()` brings the sheet: `Half` when enabled, otherwise the
    /// least open point that still shows the sheet
    pub fn resting_open(&self) -> SnapPoint {
        if self.contains(SnapPoint::Half) {
            return SnapPoint::Half;
        }
        self.points
            .iter()
            .rev()
            .map(|(snap, _)| *snap)
            .find(|snap| !snap.is_hidden())
            .unwrap_or(SnapPoint::Hidden)
    }

    /// Clamp to `[most open offset, hidden offset]`
    pub fn clamp(&self, offset: f32) -> f32 {
        offset.clamp(self.most_open().1, self.hidden_offset())
    }

    /// Closest point to `offset`; ties go to the more open point
    pub fn nearest(&self, offset: f32) -> SnapPoint {
        let mut best = self.points[0];
        for &(snap, at) in &self.points[1..] {
            // Strictly closer only: an equal distance keeps the earlier,
            // more open candidate.
            if (at - offset).abs() < (best.1 - offset).abs() {
                best = (snap, at);
            }
        }
        best.0
    }

    /// Next point above `offset`, or the most open point if none
    pub fn next_more_open(&self, offset: f32) -> SnapPoint {
        self.points
            .iter()
            .rev()
            .find(|(_, at)| *at < offset)
            .map(|(snap, _)| *snap)
            .unwrap_or(self.most_open().0)
    }

    /// Next point below `offset`, or `Hidden` if none
    pub fn next_less_open(&self, offset: f32) -> SnapPoint {
        self.points
            .iter()
            .find(|(_, at)| *at > offset)
            .map(|(snap, _)| *snap)
            .unwrap_or(SnapPoint::Hidden)
    }
}

/// Decides where a released sheet comes to rest
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapResolver {
    /// Speed in units/ms beyond which a release is a fling
    pub fling_threshold: f32,
}

impl SnapResolver {
    pub fn new(fling_threshold: f32) -> Self {
        Self { fling_threshold }
    }

    /// Resolve the rest position for a release at `offset` with `velocity`
    /// (units/ms, positive = downward)
    pub fn resolve(&self, layout: &SnapLayout, offset: f32, velocity: f32) -> SnapPoint {
        if velocity < -self.fling_threshold {
            layout.next_more_open(offset)
        } else if velocity > self.fling_threshold {
            layout.next_less_open(offset)
        } else {
            layout.nearest(offset)
        }
    }
}
