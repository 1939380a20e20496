//! Track utilities behind the `trackline` binary.

use std::fs;
use std::path::Path;

use foundation::Coordinate;
use serde::Deserialize;

pub mod replay;

/// A waypoint file: either a bare coordinate array or a `{ "waypoints": [...] }` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TrackFile {
    Bare(Vec<Coordinate>),
    Wrapped { waypoints: Vec<Coordinate> },
}

pub fn parse_waypoints(json: &str) -> Result<Vec<Coordinate>, String> {
    let track: TrackFile =
        serde_json::from_str(json).map_err(|e| format!("invalid track json: {e}"))?;
    Ok(match track {
        TrackFile::Bare(waypoints) | TrackFile::Wrapped { waypoints } => waypoints,
    })
}

pub fn read_waypoints(path: &Path) -> Result<Vec<Coordinate>, String> {
    let json = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    parse_waypoints(&json)
}
