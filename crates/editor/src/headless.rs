//! In-memory map canvas and polyline editor.
//!
//! Behaves like an interactive map widget without drawing anything: layers
//! are recorded, and user interaction (clicks, vertex drags and deletes,
//! container resizes) is simulated through explicit calls. It is used by
//! `trackline replay` and throughout the tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::{Coordinate, IdAllocator};
use layers::{LayerHandle, LayerKind, MarkerSymbol, PathStyle};

use crate::canvas::{
    CanvasHost, ContainerHandle, EditEventKind, EditListener, MapCanvas, MapView,
    ObserverHandle, PolylineEditor, TileSource,
};
use crate::error::CanvasError;

/// Mounts [`HeadlessCanvas`]es into containers registered up front.
#[derive(Default)]
pub struct HeadlessHost {
    containers: RefCell<BTreeMap<ContainerHandle, HeadlessCanvas>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a container and returns the canvas that will be mounted into it.
    pub fn add_container(&self, container: &ContainerHandle) -> HeadlessCanvas {
        self.containers
            .borrow_mut()
            .entry(container.clone())
            .or_default()
            .clone()
    }
}

impl CanvasHost for HeadlessHost {
    fn mount(
        &self,
        container: &ContainerHandle,
        view: &MapView,
        tiles: &TileSource,
    ) -> Result<Rc<dyn MapCanvas>, CanvasError> {
        let canvas = self
            .containers
            .borrow()
            .get(container)
            .cloned()
            .ok_or_else(|| CanvasError::ContainerNotFound(container.as_str().to_string()))?;
        {
            let mut state = canvas.state.borrow_mut();
            state.view = Some(*view);
            state.tiles = Some(tiles.clone());
            state.mount_count += 1;
        }
        Ok(Rc::new(canvas))
    }
}

#[derive(Debug, Clone)]
pub enum HeadlessLayer {
    Path {
        editor: Rc<HeadlessEditor>,
        style: PathStyle,
    },
    MarkerGroup(Vec<MarkerSymbol>),
}

impl HeadlessLayer {
    pub fn kind(&self) -> LayerKind {
        match self {
            HeadlessLayer::Path { .. } => LayerKind::Path,
            HeadlessLayer::MarkerGroup(_) => LayerKind::MarkerGroup,
        }
    }
}

#[derive(Default)]
struct CanvasState {
    ids: IdAllocator,
    view: Option<MapView>,
    tiles: Option<TileSource>,
    mount_count: u32,
    layers: BTreeMap<LayerHandle, HeadlessLayer>,
    observers: BTreeMap<ObserverHandle, Rc<dyn Fn()>>,
    size_invalidations: u64,
}

/// Shared handle to one in-memory map. Clones observe the same map.
#[derive(Clone, Default)]
pub struct HeadlessCanvas {
    state: Rc<RefCell<CanvasState>>,
}

impl HeadlessCanvas {
    pub fn view(&self) -> Option<MapView> {
        self.state.borrow().view
    }

    pub fn tiles(&self) -> Option<TileSource> {
        self.state.borrow().tiles.clone()
    }

    pub fn mount_count(&self) -> u32 {
        self.state.borrow().mount_count
    }

    pub fn layer_count(&self) -> usize {
        self.state.borrow().layers.len()
    }

    pub fn layers_of_kind(&self, kind: LayerKind) -> Vec<HeadlessLayer> {
        self.state
            .borrow()
            .layers
            .values()
            .filter(|l| l.kind() == kind)
            .cloned()
            .collect()
    }

    /// Marker groups currently on the map, in insertion order.
    pub fn marker_groups(&self) -> Vec<Vec<MarkerSymbol>> {
        self.layers_of_kind(LayerKind::MarkerGroup)
            .into_iter()
            .filter_map(|l| match l {
                HeadlessLayer::MarkerGroup(markers) => Some(markers),
                HeadlessLayer::Path { .. } => None,
            })
            .collect()
    }

    /// The editor of the most recently added path layer still on the map.
    pub fn path_editor_handle(&self) -> Option<Rc<HeadlessEditor>> {
        self.state
            .borrow()
            .layers
            .values()
            .rev()
            .find_map(|l| match l {
                HeadlessLayer::Path { editor, .. } => Some(editor.clone()),
                HeadlessLayer::MarkerGroup(_) => None,
            })
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    pub fn size_invalidations(&self) -> u64 {
        self.state.borrow().size_invalidations
    }

    /// Simulates the container changing size.
    pub fn resize(&self) {
        let observers: Vec<Rc<dyn Fn()>> =
            self.state.borrow().observers.values().cloned().collect();
        for observer in observers {
            observer();
        }
    }
}

impl MapCanvas for HeadlessCanvas {
    fn add_path_layer(&self, coordinates: &[Coordinate], style: &PathStyle) -> LayerHandle {
        let mut state = self.state.borrow_mut();
        let handle = LayerHandle(state.ids.next_id());
        let editor = Rc::new(HeadlessEditor::new(coordinates.to_vec()));
        state.layers.insert(
            handle,
            HeadlessLayer::Path {
                editor,
                style: *style,
            },
        );
        handle
    }

    fn path_editor(&self, path: LayerHandle) -> Option<Rc<dyn PolylineEditor>> {
        match self.state.borrow().layers.get(&path)? {
            HeadlessLayer::Path { editor, .. } => Some(editor.clone() as Rc<dyn PolylineEditor>),
            HeadlessLayer::MarkerGroup(_) => None,
        }
    }

    fn add_marker_layer_group(&self, markers: Vec<MarkerSymbol>) -> LayerHandle {
        let mut state = self.state.borrow_mut();
        let handle = LayerHandle(state.ids.next_id());
        state
            .layers
            .insert(handle, HeadlessLayer::MarkerGroup(markers));
        handle
    }

    fn remove_layer(&self, handle: LayerHandle) {
        self.state.borrow_mut().layers.remove(&handle);
    }

    fn set_view(&self, center: Coordinate) {
        let mut state = self.state.borrow_mut();
        let zoom = state.view.map(|v| v.zoom).unwrap_or_default();
        state.view = Some(MapView { center, zoom });
    }

    fn invalidate_size(&self) {
        self.state.borrow_mut().size_invalidations += 1;
    }

    fn on_container_resize(&self, callback: Box<dyn Fn()>) -> ObserverHandle {
        let mut state = self.state.borrow_mut();
        let handle = ObserverHandle(state.ids.next_id());
        state.observers.insert(handle, Rc::from(callback));
        handle
    }

    fn remove_resize_observer(&self, observer: ObserverHandle) {
        self.state.borrow_mut().observers.remove(&observer);
    }
}

/// Drawing mode of a [`HeadlessEditor`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawMode {
    Idle,
    Forward,
    Backward,
}

#[derive(Debug)]
struct EditorState {
    coordinates: Vec<Coordinate>,
    editing: bool,
    mode: DrawMode,
    listeners: Vec<(EditEventKind, EditListener)>,
}

#[derive(Debug)]
pub struct HeadlessEditor {
    state: RefCell<EditorState>,
}

impl HeadlessEditor {
    fn new(coordinates: Vec<Coordinate>) -> Self {
        Self {
            state: RefCell::new(EditorState {
                coordinates,
                editing: false,
                mode: DrawMode::Idle,
                listeners: Vec::new(),
            }),
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.state.borrow().mode
    }

    pub fn listener_count(&self, kind: EditEventKind) -> usize {
        self.state
            .borrow()
            .listeners
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Simulates a map click. Adds a vertex while drawing forward or backward.
    ///
    /// Returns `false` if the click did not change the path.
    pub fn click(&self, at: Coordinate) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if !state.editing {
                return false;
            }
            match state.mode {
                DrawMode::Forward => state.coordinates.push(at),
                DrawMode::Backward => state.coordinates.insert(0, at),
                DrawMode::Idle => return false,
            }
        }
        self.fire(EditEventKind::VertexAdded);
        true
    }

    /// Simulates dragging vertex `index` to `to` and releasing it.
    pub fn drag_vertex(&self, index: usize, to: Coordinate) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if !state.editing {
                return false;
            }
            let Some(vertex) = state.coordinates.get_mut(index) else {
                return false;
            };
            *vertex = to;
        }
        self.fire(EditEventKind::VertexDragEnd);
        true
    }

    pub fn delete_vertex(&self, index: usize) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if !state.editing || index >= state.coordinates.len() {
                return false;
            }
            state.coordinates.remove(index);
        }
        self.fire(EditEventKind::VertexDeleted);
        true
    }

    fn fire(&self, kind: EditEventKind) {
        let listeners: Vec<EditListener> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener.notify(kind);
        }
    }
}

impl PolylineEditor for HeadlessEditor {
    fn enable_edit(&self) {
        self.state.borrow_mut().editing = true;
    }

    fn disable_edit(&self) {
        let mut state = self.state.borrow_mut();
        state.editing = false;
        state.mode = DrawMode::Idle;
    }

    fn is_editing(&self) -> bool {
        self.state.borrow().editing
    }

    fn current_coordinates(&self) -> Vec<Coordinate> {
        self.state.borrow().coordinates.clone()
    }

    fn add_listener(&self, kind: EditEventKind, listener: EditListener) {
        let mut state = self.state.borrow_mut();
        let present = state
            .listeners
            .iter()
            .any(|(k, l)| *k == kind && l.same_as(&listener));
        if !present {
            state.listeners.push((kind, listener));
        }
    }

    fn remove_listener(&self, kind: EditEventKind, listener: &EditListener) {
        self.state
            .borrow_mut()
            .listeners
            .retain(|(k, l)| !(*k == kind && l.same_as(listener)));
    }

    fn continue_forward(&self) {
        let mut state = self.state.borrow_mut();
        if state.editing {
            state.mode = DrawMode::Forward;
        }
    }

    fn continue_backward(&self) {
        let mut state = self.state.borrow_mut();
        if state.editing {
            state.mode = DrawMode::Backward;
        }
    }

    fn reset_for_drag(&self) {
        self.state.borrow_mut().mode = DrawMode::Idle;
    }
}
