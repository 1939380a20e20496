pub mod coordinate;
pub mod ids;
pub mod math;

// Foundation crate: small, well-tested primitives only.
pub use coordinate::*;
pub use ids::*;
