use async_trait::async_trait;
use foundation::Coordinate;

use crate::error::GeometryError;
use crate::measure::{DEFAULT_MARKER_STEP_M, measure};
use crate::summary::GeometrySummary;

/// Computes the derived geometry of an ordered coordinate list.
///
/// Implementations must be side-effect free: the same coordinates always
/// yield the same summary, and no call depends on an earlier one.
///
/// Futures are not required to be `Send`; callers drive them on a single
/// UI-style thread.
#[async_trait(?Send)]
pub trait GeometryService {
    async fn compute(&self, coordinates: &[Coordinate]) -> Result<GeometrySummary, GeometryError>;
}

/// Runs [`measure`] in-process.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LocalGeometryService {
    step_m: u32,
}

impl LocalGeometryService {
    pub fn new(step_m: u32) -> Self {
        Self { step_m }
    }

    pub fn step_m(&self) -> u32 {
        self.step_m
    }
}

impl Default for LocalGeometryService {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_STEP_M)
    }
}

#[async_trait(?Send)]
impl GeometryService for LocalGeometryService {
    async fn compute(&self, coordinates: &[Coordinate]) -> Result<GeometrySummary, GeometryError> {
        Ok(measure(coordinates, self.step_m))
    }
}
