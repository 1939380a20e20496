pub mod layer;
pub mod markers;
pub mod symbology;

pub use layer::*;
pub use markers::*;
pub use symbology::*;
