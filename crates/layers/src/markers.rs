use foundation::Coordinate;
use geometry::DistanceMarker;
use serde::{Deserialize, Serialize};

pub const DISTANCE_MARKER_CLASS: &str = "distance-marker";
/// Icon anchor offset from the top-left corner of the marker icon (pixels).
pub const DISTANCE_MARKER_ANCHOR_PX: [u32; 2] = [18, 18];

/// Render-ready description of one distance marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSymbol {
    pub position: Coordinate,
    /// Text drawn inside the icon.
    pub label: String,
    /// Hover title.
    pub title: String,
    pub css_class: String,
    pub anchor_px: [u32; 2],
}

impl MarkerSymbol {
    /// Labels a marker with its milestone in whole kilometers.
    pub fn for_distance_marker(marker: &DistanceMarker) -> Self {
        let label = kilometer_label(marker.distance);
        Self {
            position: marker.position(),
            title: label.clone(),
            label,
            css_class: DISTANCE_MARKER_CLASS.to_string(),
            anchor_px: DISTANCE_MARKER_ANCHOR_PX,
        }
    }
}

pub fn symbolize_distance_markers(markers: &[DistanceMarker]) -> Vec<MarkerSymbol> {
    markers.iter().map(MarkerSymbol::for_distance_marker).collect()
}

fn kilometer_label(distance_m: u32) -> String {
    // Half a kilometer rounds up, matching the journal's display.
    let km = (f64::from(distance_m) / 1000.0).round() as u64;
    km.to_string()
}
