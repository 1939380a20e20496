pub mod canvas;
pub mod error;
pub mod headless;
pub mod session;
pub mod settings;
pub mod synchronizer;

pub use canvas::*;
pub use error::*;
pub use session::*;
pub use settings::*;
pub use synchronizer::*;
