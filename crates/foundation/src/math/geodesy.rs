use crate::coordinate::Coordinate;

/// Mean earth radius used for path measurement (kilometers).
///
/// Persisted track lengths were measured with this value.
pub const MEAN_EARTH_RADIUS_KM: f64 = 6371.8;

pub fn degrees_to_radians(deg: f64) -> f64 {
    deg * (std::f64::consts::PI / 180.0)
}

/// Great-circle distance between two points (haversine), in kilometers.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = degrees_to_radians(a.latitude);
    let lon1 = degrees_to_radians(a.longitude);
    let lat2 = degrees_to_radians(b.latitude);
    let lon2 = degrees_to_radians(b.longitude);

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    MEAN_EARTH_RADIUS_KM * c
}

/// Great-circle distance between two points, in meters.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    haversine_km(a, b) * 1000.0
}

/// Sum of segment lengths along `points`, in meters.
pub fn path_length_m(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}
