//! Keeps a user-edited track and its computed geometry in sync with the map.
//!
//! Every edit reads the editor's live coordinates and asks the geometry
//! service for a fresh summary. Requests may overlap; each one is tagged by a
//! [`Sequencer`] at issuance and its result is applied only if nothing newer
//! has been applied meanwhile. Applying a result replaces the marker layer
//! and notifies the change handler in one synchronous step, so length and
//! markers shown together always come from the same computation.
//!
//! Threading: all methods must be called from one thread. Edit events are
//! processed on tasks spawned with [`tokio::task::spawn_local`], so edits
//! made through the editor must happen inside a [`tokio::task::LocalSet`].
//! Events fired with no runtime at all are logged and counted as dropped.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use foundation::Coordinate;
use geometry::{DistanceMarker, GeometryError, GeometryService, GeometrySummary};
use layers::{LayerHandle, PathStyle, symbolize_distance_markers};
use runtime::{Metrics, MetricsSnapshot, Sequencer};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::canvas::{
    CanvasHost, ContainerHandle, EditEventKind, EditListener, MapCanvas, ObserverHandle,
    PolylineEditor,
};
use crate::error::{CanvasError, SyncError};
use crate::session::{ChangeHandler, EditDirection, EditSession, GeometryChange};
use crate::settings::AppSettings;


pub const METRIC_REQUESTS: &str = "geometry.requests";
pub const METRIC_APPLIED: &str = "geometry.applied";
pub const METRIC_DISCARDED: &str = "geometry.discarded";
pub const METRIC_FAILED: &str = "geometry.failed";
pub const METRIC_RESIZES: &str = "canvas.resizes";
pub const METRIC_DROPPED: &str = "edit.dropped";
/// Gauge: edit events awaiting their geometry.
pub const METRIC_IN_FLIGHT: &str = "geometry.in_flight";

/// Collaborators and configuration handed to a synchronizer at construction.
pub struct SyncContext {
    pub host: Rc<dyn CanvasHost>,
    pub geometry: Rc<dyn GeometryService>,
    pub settings: AppSettings,
}

/// Result of processing one edit event.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Markers were replaced and the change handler (if any) was notified.
    Applied(GeometryChange),
    /// A newer result, a new track or a teardown got there first.
    Superseded,
    /// The geometry service failed; the previous markers stay visible.
    Failed(GeometryError),
}

/// The geometry edit synchronizer.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct GeometryEditSynchronizer {
    inner: Rc<Inner>,
}

struct Inner {
    host: Rc<dyn CanvasHost>,
    geometry: Rc<dyn GeometryService>,
    settings: AppSettings,
    // Created once; the same allocation is attached and detached every time.
    listener: EditListener,
    state: RefCell<State>,
    in_flight: Cell<usize>,
    idle: Notify,
}

#[derive(Default)]
struct State {
    mount: Option<Mount>,
    session: EditSession,
    waypoints: Vec<Coordinate>,
    summary: GeometrySummary,
    sequencer: Sequencer,
    metrics: Metrics,
}

struct Mount {
    canvas: Rc<dyn MapCanvas>,
    resize_observer: ObserverHandle,
    path: Option<PathLayer>,
    markers: Option<LayerHandle>,
}

struct PathLayer {
    handle: LayerHandle,
    editor: Rc<dyn PolylineEditor>,
}

impl GeometryEditSynchronizer {
    pub fn new(ctx: SyncContext) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let listener = EditListener::new(move |kind| {
                if let Some(inner) = weak.upgrade() {
                    GeometryEditSynchronizer { inner }.dispatch_edit_event(kind);
                }
            });
            Inner {
                host: ctx.host,
                geometry: ctx.geometry,
                settings: ctx.settings,
                listener,
                state: RefCell::new(State::default()),
                in_flight: Cell::new(0),
                idle: Notify::new(),
            }
        });
        Self { inner }
    }

    /// Mounts the map into `container` and starts following its size.
    ///
    /// Re-initializing an already mounted synchronizer tears the old mount down first.
    pub fn initialize(&self, container: &ContainerHandle) -> Result<(), SyncError> {
        if self.is_initialized() {
            self.teardown();
        }

        let view = self.inner.settings.map_settings.initial_view();
        let tiles = self.inner.settings.tile_source();
        let canvas = self.inner.host.mount(container, &view, &tiles)?;

        let weak = Rc::downgrade(&self.inner);
        let resize_observer = canvas.on_container_resize(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.handle_resize();
            }
        }));

        self.inner.state.borrow_mut().mount = Some(Mount {
            canvas,
            resize_observer,
            path: None,
            markers: None,
        });
        info!("map mounted into container {:?}", container.as_str());
        Ok(())
    }

    /// Releases the resize observer and every layer this synchronizer added.
    ///
    /// Results of computations still in flight are discarded when they arrive.
    pub fn teardown(&self) {
        let mut state = self.inner.state.borrow_mut();
        let Some(mount) = state.mount.take() else {
            return;
        };
        state.sequencer.supersede();
        drop(state);

        release_mount(mount, &self.inner.listener);
        info!("map torn down");
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.state.borrow().mount.is_some()
    }

    /// Replaces the drawn path, e.g. after loading another track.
    ///
    /// Does not compute geometry: the matching summary is expected through
    /// [`Self::set_geometry_summary`].
    pub fn set_waypoints(&self, waypoints: Vec<Coordinate>) -> Result<(), SyncError> {
        let mut guard = self.inner.state.borrow_mut();
        let state = &mut *guard;
        let mount = state.mount.as_mut().ok_or(SyncError::Uninitialized)?;

        if let Some(old) = mount.path.take() {
            detach(old.editor.as_ref(), &self.inner.listener);
            old.editor.disable_edit();
            mount.canvas.remove_layer(old.handle);
        }

        let path = add_path(mount.canvas.as_ref(), &waypoints)?;
        rearm(&path, &state.session, &self.inner.listener);
        mount.path = Some(path);

        if let Some(first) = waypoints.first() {
            mount.canvas.set_view(*first);
        }

        state.waypoints = waypoints;
        state.sequencer.supersede();
        Ok(())
    }

    /// Replaces the distance markers wholesale.
    pub fn set_geometry_summary(&self, summary: GeometrySummary) -> Result<(), SyncError> {
        let mut guard = self.inner.state.borrow_mut();
        let state = &mut *guard;
        let mount = state.mount.as_mut().ok_or(SyncError::Uninitialized)?;

        replace_markers(mount, &summary.distance_markers);
        state.summary = summary;
        state.sequencer.supersede();
        Ok(())
    }

    /// Turns interactive editing on or off and registers the change handler.
    ///
    /// Idempotent: the synchronizer's listener is attached at most once per
    /// event kind no matter how often this is called. The handler replaces
    /// any previous one. Disabling keeps the drawn path.
    pub fn enable_editing(
        &self,
        enabled: bool,
        on_change: impl Fn(&GeometryChange) + 'static,
    ) -> Result<(), SyncError> {
        self.configure_editing(enabled, Some(Rc::new(on_change)))
    }

    /// Like [`Self::enable_editing`] but keeps the current handler.
    pub fn set_editing_enabled(&self, enabled: bool) -> Result<(), SyncError> {
        self.configure_editing(enabled, None)
    }

    fn configure_editing(
        &self,
        enabled: bool,
        on_change: Option<ChangeHandler>,
    ) -> Result<(), SyncError> {
        let mut guard = self.inner.state.borrow_mut();
        let state = &mut *guard;
        let mount = state.mount.as_mut().ok_or(SyncError::Uninitialized)?;
        let path = ensure_path(mount)?;

        state.session.enabled = enabled;
        if let Some(handler) = on_change {
            state.session.on_change = Some(handler);
        }
        rearm(path, &state.session, &self.inner.listener);
        Ok(())
    }

    /// Forces where new vertices go, turning editing on if it was off.
    ///
    /// Any drawing in progress is restarted. The direction is remembered and
    /// re-applied whenever editing is re-armed.
    pub fn change_edit_direction(&self, direction: EditDirection) -> Result<(), SyncError> {
        let mut guard = self.inner.state.borrow_mut();
        let state = &mut *guard;
        let mount = state.mount.as_mut().ok_or(SyncError::Uninitialized)?;
        let path = ensure_path(mount)?;

        state.session.enabled = true;
        state.session.direction = direction;
        path.editor.disable_edit();
        rearm(path, &state.session, &self.inner.listener);
        debug!("edit direction set to {direction}");
        Ok(())
    }

    /// Parses `name` and calls [`Self::change_edit_direction`].
    ///
    /// An unknown name is a caller bug: it is logged and returned, and the
    /// editor is left untouched.
    pub fn change_edit_direction_named(&self, name: &str) -> Result<(), SyncError> {
        let direction = name.parse::<EditDirection>().map_err(|err| {
            error!("{err}");
            SyncError::from(err)
        })?;
        self.change_edit_direction(direction)
    }

    /// Recomputes geometry for the editor's current coordinates.
    ///
    /// Called for every vertex added, dragged or deleted. The edit itself is
    /// kept even if the computation fails or is superseded.
    pub async fn on_edit_event(&self) -> Result<EditOutcome, SyncError> {
        let (ticket, coordinates) = {
            let mut guard = self.inner.state.borrow_mut();
            let state = &mut *guard;
            let mount = state.mount.as_mut().ok_or(SyncError::Uninitialized)?;
            let coordinates = ensure_path(mount)?.editor.current_coordinates();

            state.waypoints = coordinates.clone();
            let ticket = state.sequencer.issue();
            state.metrics.inc_counter(METRIC_REQUESTS, 1);
            debug!(
                "geometry request {} for {} waypoints",
                ticket.0,
                coordinates.len()
            );
            (ticket, coordinates)
        };

        let result = self.inner.geometry.compute(&coordinates).await;

        let (summary, handler) = {
            let mut guard = self.inner.state.borrow_mut();
            let state = &mut *guard;
            let summary = match result {
                Ok(summary) => summary,
                Err(err) => {
                    warn!("geometry request {} failed: {err}", ticket.0);
                    // Older requests describe a sequence the user has already moved past.
                    state.sequencer.accept(ticket);
                    state.metrics.inc_counter(METRIC_FAILED, 1);
                    return Ok(EditOutcome::Failed(err));
                }
            };

            let Some(mount) = state.mount.as_mut() else {
                state.metrics.inc_counter(METRIC_DISCARDED, 1);
                return Ok(EditOutcome::Superseded);
            };
            if !state.sequencer.accept(ticket) {
                debug!("geometry request {} superseded, discarding result", ticket.0);
                state.metrics.inc_counter(METRIC_DISCARDED, 1);
                return Ok(EditOutcome::Superseded);
            }

            replace_markers(mount, &summary.distance_markers);
            state.summary = summary.clone();
            state.metrics.inc_counter(METRIC_APPLIED, 1);
            (summary, state.session.on_change.clone())
        };

        let change = GeometryChange {
            length: summary.length,
            waypoints: coordinates,
        };
        if let Some(handler) = handler {
            handler(&change);
        }
        Ok(EditOutcome::Applied(change))
    }

    /// Resolves once every edit event dispatched from the editor has been processed.
    pub async fn settled(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.inner.in_flight.get() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Number of dispatched edit events still awaiting their geometry.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.get()
    }

    pub fn waypoints(&self) -> Vec<Coordinate> {
        self.inner.state.borrow().waypoints.clone()
    }

    pub fn summary(&self) -> GeometrySummary {
        self.inner.state.borrow().summary.clone()
    }

    pub fn is_editing_enabled(&self) -> bool {
        self.inner.state.borrow().session.enabled
    }

    pub fn edit_direction(&self) -> EditDirection {
        self.inner.state.borrow().session.direction
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.state.borrow().metrics.snapshot()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.inner.state.borrow().metrics.counter(name)
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.inner.state.borrow().metrics.gauge(name)
    }

    fn dispatch_edit_event(&self, kind: EditEventKind) {
        debug!("edit event {kind:?}");
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("edit event {kind:?} outside of a runtime, geometry not recomputed");
            self.inner
                .state
                .borrow_mut()
                .metrics
                .inc_counter(METRIC_DROPPED, 1);
            return;
        }
        self.set_in_flight(self.inner.in_flight.get() + 1);

        let this = self.clone();
        tokio::task::spawn_local(async move {
            if let Err(err) = this.on_edit_event().await {
                warn!("edit event dropped: {err}");
            }
            let remaining = this.inner.in_flight.get() - 1;
            this.set_in_flight(remaining);
            if remaining == 0 {
                this.inner.idle.notify_waiters();
            }
        });
    }

    fn set_in_flight(&self, count: usize) {
        self.inner.in_flight.set(count);
        self.inner
            .state
            .borrow_mut()
            .metrics
            .set_gauge(METRIC_IN_FLIGHT, count as i64);
    }
}

impl Inner {
    fn handle_resize(&self) {
        let canvas = {
            let mut state = self.state.borrow_mut();
            let Some(canvas) = state.mount.as_ref().map(|m| m.canvas.clone()) else {
                return;
            };
            state.metrics.inc_counter(METRIC_RESIZES, 1);
            canvas
        };
        canvas.invalidate_size();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(mount) = self.state.get_mut().mount.take() {
            release_mount(mount, &self.listener);
        }
    }
}

fn add_path(canvas: &dyn MapCanvas, waypoints: &[Coordinate]) -> Result<PathLayer, SyncError> {
    let handle = canvas.add_path_layer(waypoints, &PathStyle::track());
    match canvas.path_editor(handle) {
        Some(editor) => Ok(PathLayer { handle, editor }),
        None => {
            canvas.remove_layer(handle);
            Err(CanvasError::MissingEditor(handle).into())
        }
    }
}

/// Returns the path layer, creating an empty one so editing can start from scratch.
fn ensure_path(mount: &mut Mount) -> Result<&PathLayer, SyncError> {
    let path = match mount.path.take() {
        Some(path) => path,
        None => add_path(mount.canvas.as_ref(), &[])?,
    };
    Ok(mount.path.insert(path))
}

// Remove and add run back to back with no suspension point in between.
fn replace_markers(mount: &mut Mount, markers: &[DistanceMarker]) {
    let symbols = symbolize_distance_markers(markers);
    if let Some(old) = mount.markers.take() {
        mount.canvas.remove_layer(old);
    }
    if !symbols.is_empty() {
        mount.markers = Some(mount.canvas.add_marker_layer_group(symbols));
    }
}

fn rearm(path: &PathLayer, session: &EditSession, listener: &EditListener) {
    detach(path.editor.as_ref(), listener);
    if session.enabled {
        path.editor.enable_edit();
        apply_direction(path.editor.as_ref(), session.direction);
        for kind in EditEventKind::ALL {
            path.editor.add_listener(kind, listener.clone());
        }
    } else {
        path.editor.disable_edit();
    }
}

fn detach(editor: &dyn PolylineEditor, listener: &EditListener) {
    for kind in EditEventKind::ALL {
        editor.remove_listener(kind, listener);
    }
}

fn apply_direction(editor: &dyn PolylineEditor, direction: EditDirection) {
    match direction {
        EditDirection::Forward => editor.continue_forward(),
        EditDirection::Backward => editor.continue_backward(),
        EditDirection::Drag => editor.reset_for_drag(),
    }
}

fn release_mount(mount: Mount, listener: &EditListener) {
    if let Some(path) = mount.path {
        detach(path.editor.as_ref(), listener);
        path.editor.disable_edit();
        mount.canvas.remove_layer(path.handle);
    }
    if let Some(markers) = mount.markers {
        mount.canvas.remove_layer(markers);
    }
    mount.canvas.remove_resize_observer(mount.resize_observer);
}
