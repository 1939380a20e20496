use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub visible: bool,
    /// Linear RGBA.
    pub color: [f32; 4],
    pub weight_px: f32,
}

impl PathStyle {
    pub const fn new(visible: bool, color: [f32; 4], weight_px: f32) -> Self {
        Self {
            visible,
            color,
            weight_px,
        }
    }

    /// Style of the track being edited (solid red).
    pub const fn track() -> Self {
        Self::new(true, [1.0, 0.0, 0.0, 1.0], 3.0)
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::track()
    }
}
