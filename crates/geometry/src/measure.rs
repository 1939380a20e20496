use foundation::Coordinate;
use foundation::math::haversine_m;

use crate::summary::{DistanceMarker, GeometrySummary};

/// Marker spacing used by the journal (one per kilometer).
pub const DEFAULT_MARKER_STEP_M: u32 = 1000;

/// Computes the length of `points` and a marker every `step_m` meters.
///
/// Markers are interpolated linearly in degree space within the segment the
/// milestone falls into. The first marker sits at `step_m`, never at the
/// start of the path. A `step_m` of 0 yields no markers.
pub fn measure(points: &[Coordinate], step_m: u32) -> GeometrySummary {
    let mut markers: Vec<DistanceMarker> = Vec::new();
    let mut total_m = 0.0;

    let step = f64::from(step_m);
    // Distance walked since the last milestone.
    let mut carried = 0.0;

    for w in points.windows(2) {
        let (from, to) = (w[0], w[1]);
        let segment = haversine_m(from, to);
        total_m += segment;
        if step_m == 0 {
            continue;
        }

        let mut remaining = segment;
        let mut progress = 0.0;
        while carried + remaining >= step {
            let needed = step - carried;
            let ratio = (progress + needed) / segment;
            let distance = step_m.saturating_mul(markers.len() as u32 + 1);
            markers.push(DistanceMarker::new(from.lerp(to, ratio), distance));

            remaining -= needed;
            progress += needed;
            carried = 0.0;
        }
        carried += remaining;
    }

    GeometrySummary {
        length: total_m as u32,
        distance_markers: markers,
    }
}
