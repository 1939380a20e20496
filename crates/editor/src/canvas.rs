//! Collaborator interfaces consumed by the synchronizer.
//!
//! The synchronizer only ever talks to a map through these traits. Concrete
//! adapters (a browser map widget, the in-memory [`crate::headless`] canvas)
//! implement them. Methods take `&self`: implementations are handles onto
//! state owned by the UI thread, like DOM objects.

use std::fmt;
use std::rc::Rc;

use foundation::Coordinate;
use layers::{LayerHandle, MarkerSymbol, PathStyle};

use crate::error::CanvasError;

/// Identifies the element a map is mounted into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverHandle(pub u64);

/// Edit lifecycle events emitted by a [`PolylineEditor`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EditEventKind {
    VertexAdded,
    VertexDragEnd,
    VertexDeleted,
}

impl EditEventKind {
    pub const ALL: [EditEventKind; 3] = [
        EditEventKind::VertexAdded,
        EditEventKind::VertexDragEnd,
        EditEventKind::VertexDeleted,
    ];
}

/// Callback subscribed to editor events.
///
/// Identity is the allocation of the callback: clones of one listener are the
/// same listener, so it can be removed exactly with any of its clones.
#[derive(Clone)]
pub struct EditListener {
    callback: Rc<dyn Fn(EditEventKind)>,
}

impl EditListener {
    pub fn new(callback: impl Fn(EditEventKind) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    pub fn notify(&self, kind: EditEventKind) {
        (self.callback)(kind)
    }

    pub fn same_as(&self, other: &EditListener) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for EditListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditListener")
            .field("callback", &Rc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Interactive vertex editing of one path layer.
pub trait PolylineEditor {
    fn enable_edit(&self);
    fn disable_edit(&self);
    fn is_editing(&self) -> bool;

    /// The full, live coordinate list (never a delta).
    fn current_coordinates(&self) -> Vec<Coordinate>;

    /// Subscribes `listener` to `kind`. Adding a listener that is already
    /// subscribed to `kind` must not create a second subscription.
    fn add_listener(&self, kind: EditEventKind, listener: EditListener);
    fn remove_listener(&self, kind: EditEventKind, listener: &EditListener);

    /// New vertices are appended after the last one.
    fn continue_forward(&self);
    /// New vertices are inserted before the first one.
    fn continue_backward(&self);
    /// Clicks no longer add vertices; existing vertices can be dragged.
    fn reset_for_drag(&self);
}

/// A mounted map.
pub trait MapCanvas {
    fn add_path_layer(&self, coordinates: &[Coordinate], style: &PathStyle) -> LayerHandle;
    fn path_editor(&self, path: LayerHandle) -> Option<Rc<dyn PolylineEditor>>;
    fn add_marker_layer_group(&self, markers: Vec<MarkerSymbol>) -> LayerHandle;
    fn remove_layer(&self, handle: LayerHandle);

    fn set_view(&self, center: Coordinate);
    /// Recomputes the canvas size from its container.
    fn invalidate_size(&self);

    fn on_container_resize(&self, callback: Box<dyn Fn()>) -> ObserverHandle;
    fn remove_resize_observer(&self, observer: ObserverHandle);
}

/// Mounts maps into containers.
pub trait CanvasHost {
    fn mount(
        &self,
        container: &ContainerHandle,
        view: &MapView,
        tiles: &TileSource,
    ) -> Result<Rc<dyn MapCanvas>, CanvasError>;
}
