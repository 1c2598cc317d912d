//! Scenario runner that drives a sheet controller on a frame clock.

use crate::scenario::{Scenario, ScenarioStep};
use anyhow::{Context, Result};
use ipark_core::clock::FRAME_MS;
use ipark_core::{FrameClock, PointerEvent, PointerPhase};
use ipark_sheet::{SheetConfig, SheetController, SheetEvent, SheetPhase};
use serde::Serialize;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Report status for a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// Machine-readable result of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub message: Option<String>,
    pub elapsed_frames: u64,
    pub elapsed_ms: u64,
    pub final_phase: SheetPhase,
    pub final_offset: f32,
}

impl RunReport {
    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Final outcome of a scenario run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Passed { report: RunReport },
    Failed { report: RunReport },
}

impl RunOutcome {
    pub fn report(&self) -> &RunReport {
        match self {
            RunOutcome::Passed { report } => report,
            RunOutcome::Failed { report } => report,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// One emitted sheet event, as written to the event log
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    at_ms: u64,
    step: usize,
    #[serde(flatten)]
    event: &'a SheetEvent,
}

struct Run<'w, W: Write> {
    sheet: SheetController<String>,
    clock: FrameClock,
    pending: Rc<RefCell<Vec<SheetEvent>>>,
    log: &'w mut W,
    step_index: usize,
}

impl<W: Write> Run<'_, W> {
    fn frame(&mut self) -> Result<()> {
        self.clock.step_frame();
        self.sheet.tick(self.clock.now());
        self.flush()
    }

    fn pointer(&mut self, phase: PointerPhase, x: f32, y: f32) -> Result<()> {
        let event = PointerEvent::new(phase, x, y, self.clock.now());
        self.sheet.handle_pointer(&event);
        self.flush()
    }

    /// Write events emitted since the last flush as JSON lines
    fn flush(&mut self) -> Result<()> {
        let drained: Vec<SheetEvent> = self.pending.borrow_mut().drain(..).collect();
        for event in &drained {
            let record = EventRecord {
                at_ms: self.clock.now(),
                step: self.step_index,
                event,
            };
            serde_json::to_writer(&mut *self.log, &record)?;
            self.log.write_all(b"\n")?;
        }
        Ok(())
    }

    fn report(&self, status: ReportStatus) -> RunReport {
        RunReport {
            status,
            failed_step_index: None,
            assertion: None,
            message: None,
            elapsed_frames: self.clock.frames(),
            elapsed_ms: self.clock.now(),
            final_phase: self.sheet.phase(),
            final_offset: self.sheet.offset(),
        }
    }

    fn failed(&self, assertion: &str, message: String) -> RunOutcome {
        let report = RunReport {
            failed_step_index: Some(self.step_index),
            assertion: Some(assertion.to_string()),
            message: Some(message),
            ..self.report(ReportStatus::Failed)
        };
        RunOutcome::Failed { report }
    }
}

/// Run `scenario` against a fresh controller, logging sheet events to `log`
///
/// Returns an error for scenarios that cannot run at all (invalid config,
/// rejected resize); a failed assertion is a [`RunOutcome::Failed`].
pub fn run_scenario<W: Write>(
    scenario: &Scenario,
    mut config: SheetConfig,
    log: &mut W,
) -> Result<RunOutcome> {
    if let Some(height) = scenario.viewport_height {
        config.viewport_height = height;
    }
    let mut sheet = SheetController::new(config).context("Invalid sheet configuration")?;

    let pending = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&pending);
    sheet.subscribe(move |event| sink.borrow_mut().push(*event));

    let mut run = Run {
        sheet,
        clock: FrameClock::new(),
        pending,
        log,
        step_index: 0,
    };

    for (step_index, step) in scenario.steps.iter().enumerate() {
        run.step_index = step_index;
        tracing::debug!(step_index, ?step, "scenario step");

        match step {
            ScenarioStep::Open { entity } => {
                run.sheet.open(entity.clone(), run.clock.now());
                run.flush()?;
            }
            ScenarioStep::Close => {
                run.sheet.close(run.clock.now());
                run.flush()?;
            }
            ScenarioStep::Pointer { phase, y, x } => run.pointer(*phase, *x, *y)?,
            ScenarioStep::Drag {
                from,
                to,
                duration_ms,
            } => {
                run.pointer(PointerPhase::Down, 0.0, *from)?;
                let frames = duration_ms.div_ceil(FRAME_MS).max(1);
                for i in 1..=frames {
                    run.clock.step_frame();
                    let y = from + (to - from) * (i as f32 / frames as f32);
                    run.pointer(PointerPhase::Move, 0.0, y)?;
                    run.sheet.tick(run.clock.now());
                    run.flush()?;
                }
                run.pointer(PointerPhase::Up, 0.0, *to)?;
            }
            ScenarioStep::Tap { y } => {
                let y = y.unwrap_or_else(|| run.sheet.offset());
                run.pointer(PointerPhase::Down, 0.0, y)?;
                run.pointer(PointerPhase::Up, 0.0, y)?;
            }
            ScenarioStep::Resize { height } => {
                run.sheet
                    .set_viewport_height(*height, run.clock.now())
                    .with_context(|| format!("Step {step_index}: resize to {height} rejected"))?;
                run.flush()?;
            }
            ScenarioStep::Wait { ms } => {
                for _ in 0..ms.div_ceil(FRAME_MS) {
                    run.frame()?;
                }
            }
            ScenarioStep::Tick { frames } => {
                for _ in 0..*frames {
                    run.frame()?;
                }
            }
            ScenarioStep::AssertPhase { phase, snap } => {
                let actual = run.sheet.phase();
                if !phase.matches(actual, *snap) {
                    let expected = match snap {
                        Some(snap) => format!("{phase:?}({snap:?})"),
                        None => format!("{phase:?}"),
                    };
                    let message = format!("expected phase {expected}, got {actual:?}");
                    return Ok(run.failed("assert_phase", message));
                }
            }
            ScenarioStep::AssertOffset { offset, tolerance } => {
                let actual = run.sheet.offset();
                if (actual - offset).abs() > *tolerance {
                    let message =
                        format!("expected offset {offset} (±{tolerance}), got {actual}");
                    return Ok(run.failed("assert_offset", message));
                }
            }
        }
    }

    Ok(RunOutcome::Passed {
        report: run.report(ReportStatus::Passed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipark_sheet::SnapPoint;

    fn config() -> SheetConfig {
        SheetConfig::new(1000.0).with_half_fraction(0.6)
    }

    fn run(json: &str) -> (RunOutcome, String) {
        let scenario = Scenario::from_json(json).unwrap();
        let mut log = Vec::new();
        let outcome = run_scenario(&scenario, config(), &mut log).unwrap();
        (outcome, String::from_utf8(log).unwrap())
    }

    #[test]
    fn test_location_sheet_walkthrough_passes() {
        let (outcome, log) = run(r#"{"steps": [
            {"type": "open", "entity": "Glorietta"},
            {"type": "wait", "ms": 300},
            {"type": "assert_phase", "phase": "open", "snap": "half"},
            {"type": "assert_offset", "offset": 600},
            {"type": "drag", "from": 600, "to": 450, "duration_ms": 750},
            {"type": "wait", "ms": 250},
            {"type": "assert_phase", "phase": "open", "snap": "half"},
            {"type": "drag", "from": 600, "to": 450},
            {"type": "wait", "ms": 250},
            {"type": "assert_phase", "phase": "open", "snap": "full"},
            {"type": "assert_offset", "offset": 100},
            {"type": "tap"},
            {"type": "wait", "ms": 250},
            {"type": "assert_offset", "offset": 600},
            {"type": "close"},
            {"type": "assert_phase", "phase": "closing"},
            {"type": "wait", "ms": 250},
            {"type": "assert_phase", "phase": "closed"}
        ]}"#);

        assert!(!outcome.is_failed(), "{:?}", outcome.report());
        let report = outcome.report();
        assert_eq!(report.status, ReportStatus::Passed);
        assert_eq!(report.final_phase, SheetPhase::Closed);
        assert_eq!(report.final_offset, 1000.0);
        assert!(report.elapsed_frames > 0);

        assert!(log.contains(r#""type":"snap_settled","snap":"full""#));
        assert_eq!(log.matches(r#""type":"closed""#).count(), 1);
        assert!(log.lines().all(|line| line.starts_with(r#"{"at_ms":"#)));
    }

    #[test]
    fn test_failed_assertion_reports_step() {
        let (outcome, _) = run(r#"{"steps": [
            {"type": "open", "entity": "Glorietta"},
            {"type": "wait", "ms": 300},
            {"type": "assert_phase", "phase": "open", "snap": "full"},
            {"type": "close"}
        ]}"#);

        assert!(outcome.is_failed());
        let report = outcome.report();
        assert_eq!(report.failed_step_index, Some(2));
        assert_eq!(report.assertion.as_deref(), Some("assert_phase"));
        assert_eq!(report.final_phase, SheetPhase::Open(SnapPoint::Half));
    }

    #[test]
    fn test_offset_tolerance() {
        let (outcome, _) = run(r#"{"steps": [
            {"type": "open", "entity": "Glorietta"},
            {"type": "wait", "ms": 300},
            {"type": "assert_offset", "offset": 603, "tolerance": 5},
            {"type": "assert_offset", "offset": 603}
        ]}"#);

        assert_eq!(outcome.report().failed_step_index, Some(3));
        assert_eq!(outcome.report().assertion.as_deref(), Some("assert_offset"));
    }

    #[test]
    fn test_scenario_viewport_and_resize() {
        let (outcome, _) = run(r#"{
            "viewport_height": 800,
            "steps": [
                {"type": "open", "entity": "Glorietta"},
                {"type": "wait", "ms": 300},
                {"type": "assert_offset", "offset": 480},
                {"type": "resize", "height": 1000},
                {"type": "assert_offset", "offset": 600},
                {"type": "assert_phase", "phase": "open", "snap": "half"}
            ]
        }"#);

        assert!(!outcome.is_failed(), "{:?}", outcome.report());
    }

    #[test]
    fn test_rejected_resize_is_an_error() {
        let scenario = Scenario::from_json(r#"{"steps": [{"type": "resize", "height": 0}]}"#).unwrap();
        let result = run_scenario(&scenario, config(), &mut std::io::sink());
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_pointer_steps() {
        let (outcome, _) = run(r#"{"steps": [
            {"type": "open", "entity": "Glorietta"},
            {"type": "wait", "ms": 300},
            {"type": "pointer", "phase": "down", "y": 600},
            {"type": "tick", "frames": 1},
            {"type": "pointer", "phase": "move", "y": 520},
            {"type": "assert_phase", "phase": "dragging"},
            {"type": "assert_offset", "offset": 520},
            {"type": "tick", "frames": 1},
            {"type": "pointer", "phase": "cancel", "y": 520},
            {"type": "assert_phase", "phase": "settling"},
            {"type": "wait", "ms": 250},
            {"type": "assert_phase", "phase": "open", "snap": "half"}
        ]}"#);

        assert!(!outcome.is_failed(), "{:?}", outcome.report());
    }
}
