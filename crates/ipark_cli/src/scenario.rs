//! Scenario definition for headless sheet runs.

use anyhow::{Context, Result};
use ipark_core::PointerPhase;
use ipark_sheet::{SheetPhase, SnapPoint};
use serde::Deserialize;
use std::path::Path;

/// Sequence of steps run against one sheet controller.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Overrides the configured viewport height for this run
    #[serde(default)]
    pub viewport_height: Option<f32>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// One scenario step. Time only moves in `drag`, `wait` and `tick`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Show the sheet for a location
    Open { entity: String },
    /// Dismiss the sheet
    Close,
    /// Feed one raw pointer event at the current time
    Pointer {
        phase: PointerPhase,
        y: f32,
        #[serde(default)]
        x: f32,
    },
    /// Press at `from`, move linearly to `to` one frame at a time, release
    Drag {
        from: f32,
        to: f32,
        #[serde(default = "default_drag_ms")]
        duration_ms: u64,
    },
    /// Press and release the handle without moving
    Tap {
        #[serde(default)]
        y: Option<f32>,
    },
    /// Change the viewport height
    Resize { height: f32 },
    /// Tick frames until at least `ms` milliseconds have passed
    Wait { ms: u64 },
    /// Tick a fixed number of frames
    Tick { frames: u32 },
    AssertPhase {
        phase: PhaseName,
        #[serde(default)]
        snap: Option<SnapPoint>,
    },
    AssertOffset {
        offset: f32,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
    },
}

fn default_drag_ms() -> u64 {
    160
}

fn default_tolerance() -> f32 {
    0.5
}

/// Phase names accepted by `assert_phase`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Closed,
    Opening,
    Open,
    Dragging,
    Settling,
    Closing,
}

impl PhaseName {
    /// Whether `phase` matches; `snap` narrows `open` to one snap point
    pub fn matches(self, phase: SheetPhase, snap: Option<SnapPoint>) -> bool {
        match (self, phase) {
            (PhaseName::Open, SheetPhase::Open(at)) => snap.map_or(true, |s| s == at),
            (PhaseName::Closed, SheetPhase::Closed)
            | (PhaseName::Opening, SheetPhase::Opening)
            | (PhaseName::Dragging, SheetPhase::Dragging)
            | (PhaseName::Settling, SheetPhase::Settling)
            | (PhaseName::Closing, SheetPhase::Closing) => true,
            _ => false,
        }
    }
}
