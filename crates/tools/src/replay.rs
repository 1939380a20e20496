//! Scripted edit sessions run against the headless map.
//!
//! A script loads a track, then replays clicks, drags, deletes and direction
//! changes through the synchronizer exactly as a user would make them,
//! waiting for each edit's geometry before the next step.

use std::cell::Cell;
use std::rc::Rc;

use editor::headless::HeadlessHost;
use editor::{AppSettings, ContainerHandle, GeometryEditSynchronizer, SyncContext};
use foundation::Coordinate;
use geometry::{DEFAULT_MARKER_STEP_M, LocalGeometryService, measure};
use serde::{Deserialize, Serialize};
use tokio::task::LocalSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    #[serde(default)]
    pub waypoints: Vec<Coordinate>,
    #[serde(default)]
    pub marker_step_m: Option<u32>,
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayStep {
    Direction(String),
    Click(Coordinate),
    Drag { index: usize, to: Coordinate },
    Delete(usize),
    Enable,
    Disable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub length: u32,
    pub markers: usize,
    pub waypoints: Vec<Coordinate>,
    pub changes: usize,
    /// Steps that had no effect on the path (e.g. a click in drag mode).
    pub ignored_steps: usize,
    pub metrics: String,
}

pub fn parse_script(json: &str) -> Result<ReplayScript, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid replay script: {e}"))
}

pub async fn run_replay(
    script: &ReplayScript,
    settings: AppSettings,
) -> Result<ReplayReport, String> {
    let step_m = script.marker_step_m.unwrap_or(DEFAULT_MARKER_STEP_M);
    let host = Rc::new(HeadlessHost::new());
    let container = ContainerHandle::new("replay");
    let canvas = host.add_container(&container);
    let sync = GeometryEditSynchronizer::new(SyncContext {
        host,
        geometry: Rc::new(LocalGeometryService::new(step_m)),
        settings,
    });

    LocalSet::new()
        .run_until(async {
            sync.initialize(&container).map_err(|e| e.to_string())?;
            sync.set_waypoints(script.waypoints.clone())
                .map_err(|e| e.to_string())?;
            sync.set_geometry_summary(measure(&script.waypoints, step_m))
                .map_err(|e| e.to_string())?;

            let changes = Rc::new(Cell::new(0usize));
            let counter = changes.clone();
            sync.enable_editing(true, move |_| counter.set(counter.get() + 1))
                .map_err(|e| e.to_string())?;

            let mut ignored = 0;
            for (i, step) in script.steps.iter().enumerate() {
                let editor = canvas
                    .path_editor_handle()
                    .ok_or_else(|| format!("step {i}: no path on the map"))?;
                debug!("step {i}: {step:?}");

                let applied = match step {
                    ReplayStep::Direction(name) => {
                        sync.change_edit_direction_named(name)
                            .map_err(|e| format!("step {i}: {e}"))?;
                        true
                    }
                    ReplayStep::Click(at) => editor.click(*at),
                    ReplayStep::Drag { index, to } => editor.drag_vertex(*index, *to),
                    ReplayStep::Delete(index) => editor.delete_vertex(*index),
                    ReplayStep::Enable => {
                        sync.set_editing_enabled(true)
                            .map_err(|e| format!("step {i}: {e}"))?;
                        true
                    }
                    ReplayStep::Disable => {
                        sync.set_editing_enabled(false)
                            .map_err(|e| format!("step {i}: {e}"))?;
                        true
                    }
                };
                if !applied {
                    warn!("step {i}: {step:?} had no effect");
                    ignored += 1;
                }
                sync.settled().await;
            }

            let summary = sync.summary();
            Ok::<_, String>(ReplayReport {
                length: summary.length,
                markers: canvas.marker_groups().first().map_or(0, |g| g.len()),
                waypoints: sync.waypoints(),
                changes: changes.get(),
                ignored_steps: ignored,
                metrics: sync.metrics().to_string(),
            })
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = r#"{
        "waypoints": [{"latitude": 0.0, "longitude": 0.0}],
        "steps": [
            {"direction": "forward"},
            {"click": {"latitude": 0.01, "longitude": 0.0}},
            {"direction": "backward"},
            {"click": {"latitude": -0.01, "longitude": 0.0}},
            {"direction": "drag"},
            {"click": {"latitude": 5.0, "longitude": 5.0}}
        ]
    }"#;

    #[test]
    fn parses_externally_tagged_steps() {
        let script = parse_script(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 6);
        assert_eq!(script.steps[0], ReplayStep::Direction("forward".to_string()));
        assert_eq!(
            parse_script(r#"{"steps": ["disable", {"delete": 1}]}"#)
                .unwrap()
                .steps,
            vec![ReplayStep::Disable, ReplayStep::Delete(1)]
        );
    }

    #[tokio::test]
    async fn replays_forward_and_backward_clicks() {
        let script = parse_script(SCRIPT).unwrap();
        let report = run_replay(&script, AppSettings::default()).await.unwrap();

        assert_eq!(
            report.waypoints,
            vec![
                Coordinate::new(-0.01, 0.0),
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.01, 0.0),
            ]
        );
        assert_eq!(report.length, 2224);
        assert_eq!(report.markers, 2);
        assert_eq!(report.changes, 2);
        assert_eq!(report.ignored_steps, 1);
    }

    #[tokio::test]
    async fn drag_and_delete_recompute_geometry() {
        let script = parse_script(
            r#"{
                "waypoints": [
                    {"latitude": 0.0, "longitude": 0.0},
                    {"latitude": 0.01, "longitude": 0.0},
                    {"latitude": 0.02, "longitude": 0.0}
                ],
                "steps": [
                    {"drag": {"index": 2, "to": {"latitude": 0.03, "longitude": 0.0}}},
                    {"delete": 1},
                    {"delete": 7}
                ]
            }"#,
        )
        .unwrap();
        let report = run_replay(&script, AppSettings::default()).await.unwrap();

        assert_eq!(
            report.waypoints,
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.03, 0.0)]
        );
        assert_eq!(report.length, 3336);
        assert_eq!(report.markers, 3);
        assert_eq!(report.changes, 2);
        assert_eq!(report.ignored_steps, 1);
    }

    #[tokio::test]
    async fn invalid_direction_aborts_replay() {
        let script = parse_script(r#"{"steps": [{"direction": "sideways"}]}"#).unwrap();
        let err = run_replay(&script, AppSettings::default()).await.unwrap_err();
        assert!(err.starts_with("step 0:"), "{err}");
        assert!(err.contains("sideways"), "{err}");
    }

    #[tokio::test]
    async fn loaded_track_is_measured_without_edits() {
        let script = parse_script(
            r#"{"waypoints": [{"latitude": 0.0, "longitude": 0.0}, {"latitude": 0.1, "longitude": 0.0}], "steps": []}"#,
        )
        .unwrap();
        let report = run_replay(&script, AppSettings::default()).await.unwrap();
        assert_eq!(report.length, 11_120);
        assert_eq!(report.markers, 11);
        assert_eq!(report.changes, 0);
    }
}
