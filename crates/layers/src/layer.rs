/// Opaque handle to a layer added to a map canvas.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerHandle(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// An editable polyline.
    Path,
    /// A group of point markers added and removed as one unit.
    MarkerGroup,
}
