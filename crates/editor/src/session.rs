use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use foundation::Coordinate;
use serde::Serialize;

use crate::error::ParseDirectionError;

/// Where clicks on the map put new vertices.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum EditDirection {
    /// Append after the last vertex.
    Forward,
    /// Insert before the first vertex.
    Backward,
    /// No new vertices; existing ones can be dragged.
    #[default]
    Drag,
}

impl EditDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            EditDirection::Forward => "forward",
            EditDirection::Backward => "backward",
            EditDirection::Drag => "drag",
        }
    }
}

impl fmt::Display for EditDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(EditDirection::Forward),
            "backward" => Ok(EditDirection::Backward),
            "drag" => Ok(EditDirection::Drag),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// What the change handler receives after an accepted recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryChange {
    /// Meters.
    pub length: u32,
    pub waypoints: Vec<Coordinate>,
}

pub type ChangeHandler = Rc<dyn Fn(&GeometryChange)>;

/// Transient editing state. Only the most recently registered handler fires.
#[derive(Clone, Default)]
pub struct EditSession {
    pub enabled: bool,
    pub direction: EditDirection,
    pub on_change: Option<ChangeHandler>,
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("enabled", &self.enabled)
            .field("direction", &self.direction)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}
