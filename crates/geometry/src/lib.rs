pub mod error;
pub mod http;
pub mod measure;
pub mod service;
pub mod summary;

pub use error::*;
pub use http::*;
pub use measure::*;
pub use service::*;
pub use summary::*;
