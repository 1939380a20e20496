use layers::LayerHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// No mount target with this id exists.
    ContainerNotFound(String),
    /// A path layer was created but exposes no editor.
    MissingEditor(LayerHandle),
}

impl std::fmt::Display for CanvasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanvasError::ContainerNotFound(id) => write!(f, "map container not found: {id}"),
            CanvasError::MissingEditor(handle) => {
                write!(f, "path layer {} has no polyline editor", handle.0)
            }
        }
    }
}

impl std::error::Error for CanvasError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError(pub String);

impl std::fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid edit direction {:?} (expected forward, backward or drag)",
            self.0
        )
    }
}

impl std::error::Error for ParseDirectionError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The map canvas is not mounted (`initialize` missing or `teardown` already ran).
    Uninitialized,
    InvalidDirection(String),
    Canvas(CanvasError),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Uninitialized => write!(f, "map is not initialized yet"),
            SyncError::InvalidDirection(value) => write!(f, "invalid edit direction: {value}"),
            SyncError::Canvas(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Canvas(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CanvasError> for SyncError {
    fn from(err: CanvasError) -> Self {
        SyncError::Canvas(err)
    }
}

impl From<ParseDirectionError> for SyncError {
    fn from(err: ParseDirectionError) -> Self {
        SyncError::InvalidDirection(err.0)
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(err) => write!(f, "settings file: {err}"),
            SettingsError::Json(err) => write!(f, "settings json: {err}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Json(err)
    }
}
