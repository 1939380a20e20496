pub mod metrics;
pub mod sequencer;

pub use metrics::*;
pub use sequencer::*;
