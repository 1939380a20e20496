#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The request never produced a response (connection, timeout, ...).
    Transport(String),
    /// The service answered with a non-success HTTP status.
    Status(u16),
    /// The response body was not a valid polyline summary.
    Decode(String),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::Transport(msg) => write!(f, "geometry service unreachable: {msg}"),
            GeometryError::Status(code) => write!(f, "geometry service returned status {code}"),
            GeometryError::Decode(msg) => write!(f, "invalid geometry response: {msg}"),
        }
    }
}

impl std::error::Error for GeometryError {}
