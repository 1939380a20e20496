use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
///
/// Order within a sequence is significant: it defines the direction of a path.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Linear interpolation in degree space; `ratio` 0 yields `self`, 1 yields `other`.
    pub fn lerp(self, other: Coordinate, ratio: f64) -> Coordinate {
        Coordinate::new(
            self.latitude + ratio * (other.latitude - self.latitude),
            self.longitude + ratio * (other.longitude - self.longitude),
        )
    }
}
