use foundation::Coordinate;
use serde::{Deserialize, Serialize};

/// A point along a path at a cumulative distance milestone.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMarker {
    pub latitude: f64,
    pub longitude: f64,
    /// Cumulative distance from the start of the path (meters).
    pub distance: u32,
}

impl DistanceMarker {
    pub fn new(position: Coordinate, distance: u32) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            distance,
        }
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Derived geometry of a waypoint sequence.
///
/// Never edited in place: a new summary replaces the old one wholesale.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometrySummary {
    /// Total path length (meters, truncated).
    pub length: u32,
    #[serde(default)]
    pub distance_markers: Vec<DistanceMarker>,
}

impl GeometrySummary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0 && self.distance_markers.is_empty()
    }
}

/// Request body of `POST /polyline-meta`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineMetaRequest {
    pub waypoints: Vec<Coordinate>,
}
