// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interaction engine: one instance per surface.
//!
//! [`Engine`] owns every piece of interaction state (pointer positions,
//! captures, hover targets, drag attempts, click windows). It holds no
//! reference to the scene; each entry point borrows the scene for the
//! duration of one call.
//!
//! ## Usage
//!
//! 1) Build the engine with an [`InteractionConfig`].
//! 2) Feed every native event to [`Engine::register_pointer_input`].
//! 3) Ask for captures and drags either on the engine directly or from
//!    listeners through [`PointerEvent`](crate::event::PointerEvent) requests.
//! 4) Call [`Engine::node_detached`] before removing a node from the scene.

use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::Point;
use log::{debug, trace};

use crate::capture::{CaptureOutcome, CaptureTable};
use crate::click::ClickWindow;
use crate::config::InteractionConfig;
use crate::drag::{DragAttempt, DragBatch, DragController, DragStatus};
use crate::event::{EventDetail, EventKind};
use crate::hit::topmost_listening;
use crate::input::{InputSource, NativeInput, PointerId, PointerType};
use crate::pointer::{PointerState, SurfaceRect};
use crate::scene::Scene;

/// Pointer interaction engine for one surface.
#[derive(Clone, Debug)]
pub struct Engine<K> {
    pub(crate) config: InteractionConfig,
    pub(crate) pointers: PointerState,
    pub(crate) captures: CaptureTable<K>,
    pub(crate) hover: HashMap<PointerId, K>,
    pub(crate) drag: DragController<K>,
    /// Click windows of pointer-style input, one per device class.
    pub(crate) pointer_clicks: [ClickWindow<K>; 3],
    pub(crate) touch_taps: ClickWindow<K>,
    pub(crate) detail: EventDetail,
    pub(crate) now: u64,
}

impl<K: Copy + Eq + Hash + Debug> Default for Engine<K> {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl<K: Copy + Eq + Hash + Debug> Engine<K> {
    /// Create an engine with the given configuration.
    pub fn new(config: InteractionConfig) -> Self {
        let window = config.double_click_window;
        Self {
            config,
            pointers: PointerState::new(),
            captures: CaptureTable::new(),
            hover: HashMap::new(),
            drag: DragController::new(),
            pointer_clicks: core::array::from_fn(|_| ClickWindow::new(window)),
            touch_taps: ClickWindow::new(window),
            detail: EventDetail::default(),
            now: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Replace the configuration. A new window duration applies from the next release.
    pub fn set_config(&mut self, config: InteractionConfig) {
        for clicks in &mut self.pointer_clicks {
            clicks.set_duration(config.double_click_window);
        }
        self.touch_taps.set_duration(config.double_click_window);
        self.config = config;
    }

    /// Describe where the surface sits in client space.
    pub fn set_surface(&mut self, surface: SurfaceRect) {
        self.pointers.set_surface(surface);
    }

    /// Pointer positions as of the last native event.
    pub fn pointers(&self) -> &PointerState {
        &self.pointers
    }

    /// Surface position of a pointer, or `None` if it is unknown.
    pub fn pointer_position(&self, id: PointerId) -> Option<Point> {
        self.pointers.by_id(id)
    }

    /// The node currently hovered by `id`.
    pub fn hovered(&self, id: PointerId) -> Option<K> {
        self.hover.get(&id).copied()
    }

    /// Close click and tap windows whose deadline passed before `now`.
    pub fn advance_time(&mut self, now: u64) {
        self.now = now;
        for clicks in &mut self.pointer_clicks {
            clicks.advance(now);
        }
        self.touch_taps.advance(now);
    }

    /// Single entry point for native input.
    pub fn register_pointer_input<S>(&mut self, scene: &mut S, input: &NativeInput)
    where
        S: Scene<Node = K> + ?Sized,
    {
        self.advance_time(input.time());
        match input {
            NativeInput::Pointer(p) => {
                let was_known = self.pointers.pointer(p.pointer.id).is_some();
                self.pointers.update(input);
                self.route_pointer(scene, p, was_known);
            }
            NativeInput::Touch(t) => {
                self.pointers.update(input);
                self.route_touch(scene, t);
            }
        }
    }

    /// Target for a pointer: its capture owner, else the topmost listening node under it.
    ///
    /// A capture owner that is not listening yields `None`, so events go to
    /// the root. The capture itself is kept.
    pub fn resolve_target<S>(&mut self, scene: &S, id: PointerId) -> Option<K>
    where
        S: Scene<Node = K> + ?Sized,
    {
        if let Some(owner) = self.captures.owner_attached(scene, id) {
            if scene.is_listening(owner) {
                return Some(owner);
            }
            trace!("capture owner {owner:?} of {id:?} is not listening");
            return None;
        }
        let Some(point) = self.pointers.by_id(id) else {
            trace!("no position for pointer {id:?}");
            return None;
        };
        topmost_listening(scene, point, None)
    }

    /// Route every future event of `id` to `node` until released.
    ///
    /// Returns `false` if the node is not attached. A newly set capture fires
    /// `gotpointercapture` at `node`; a replaced owner first gets `lostpointercapture`.
    pub fn request_capture<S>(&mut self, scene: &mut S, id: PointerId, node: K) -> bool
    where
        S: Scene<Node = K> + ?Sized,
    {
        match self.captures.capture(&*scene, id, node) {
            CaptureOutcome::Rejected => {
                trace!("capture of {id:?} by detached {node:?} ignored");
                false
            }
            CaptureOutcome::Unchanged => true,
            CaptureOutcome::Replaced(previous) => {
                debug!("pointer {id:?} capture moved from {previous:?} to {node:?}");
                let detail = self.detail_for(Some(id));
                self.dispatch(scene, previous, EventKind::LostPointerCapture, None, detail, true);
                self.dispatch(scene, node, EventKind::GotPointerCapture, None, detail, true);
                true
            }
            CaptureOutcome::Captured => {
                debug!("pointer {id:?} captured by {node:?}");
                let detail = self.detail_for(Some(id));
                self.dispatch(scene, node, EventKind::GotPointerCapture, None, detail, true);
                true
            }
        }
    }

    /// Release the capture held for `id`, firing `lostpointercapture` at the former owner.
    pub fn release_capture<S>(&mut self, scene: &mut S, id: PointerId) -> Option<K>
    where
        S: Scene<Node = K> + ?Sized,
    {
        let owner = self.captures.release(id)?;
        debug!("pointer {id:?} released by {owner:?}");
        let detail = self.detail_for(Some(id));
        self.dispatch(scene, owner, EventKind::LostPointerCapture, None, detail, true);
        Some(owner)
    }

    /// Whether `node` captures `id`.
    pub fn has_capture(&self, id: PointerId, node: K) -> bool {
        self.captures.has_capture(id, node)
    }

    /// The node capturing `id`, if any.
    pub fn captured_node(&self, id: PointerId) -> Option<K> {
        self.captures.owner(id)
    }

    /// Whether any node is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Whether `node` is being dragged.
    pub fn is_node_dragging(&self, node: K) -> bool {
        self.drag.is_node_dragging(node)
    }

    /// The first node being dragged, if any.
    pub fn currently_dragged_node(&self) -> Option<K> {
        self.drag.dragged_node()
    }

    /// Status of the drag attempt registered for `node`.
    pub fn drag_status(&self, node: K) -> Option<DragStatus> {
        self.drag.status(node)
    }

    /// Start dragging `node` right away, bound to `pointer_id` or to the next
    /// moving pointer. Does nothing if the node is detached or already dragging.
    pub fn start_drag<S>(&mut self, scene: &mut S, node: K, pointer_id: Option<PointerId>)
    where
        S: Scene<Node = K> + ?Sized,
    {
        if !scene.is_attached(node) || self.drag.is_node_dragging(node) {
            trace!("start_drag on {node:?} ignored");
            return;
        }
        if self.drag.attempt(node).is_none() {
            let origin = scene.absolute_position(node);
            let start = pointer_id
                .and_then(|id| self.pointers.by_id(id))
                .or_else(|| self.pointers.first_changed().map(|p| p.position))
                .unwrap_or(origin);
            self.drag
                .arm(DragAttempt::new(node, pointer_id, start, start - origin));
        }
        self.begin_drag(scene, node);
    }

    /// Stop dragging `node`.
    ///
    /// Inside a `dragstart` listener for `node` this vetoes the drag. A ready
    /// attempt is dropped silently.
    pub fn stop_drag<S>(&mut self, scene: &mut S, node: K)
    where
        S: Scene<Node = K> + ?Sized,
    {
        if self.drag.starting() == Some(node) {
            debug!("drag of {node:?} vetoed");
            self.drag.stop(node);
            return;
        }
        match self.drag.status(node) {
            Some(DragStatus::Dragging) => {
                self.drag.stop(node);
                self.drag.set_just_dragged();
                self.suppress_clicks();
                scene.redraw(node);
                if let Some(attempt) = self.drag.remove(node) {
                    debug!("drag of {node:?} stopped");
                    self.fire_drag_event(scene, &attempt, EventKind::DragEnd);
                }
            }
            Some(DragStatus::Ready) => {
                self.drag.remove(node);
            }
            Some(DragStatus::Stopped) | None => {
                trace!("stop_drag on {node:?} ignored");
            }
        }
    }

    /// Forget everything tied to `node`. Call before removing it from the scene.
    ///
    /// A running drag ends with `dragend`, captures held by the node are
    /// released with `lostpointercapture`, and hover entries are dropped.
    pub fn node_detached<S>(&mut self, scene: &mut S, node: K)
    where
        S: Scene<Node = K> + ?Sized,
    {
        self.stop_drag(scene, node);
        for id in self.captures.release_node(node) {
            debug!("pointer {id:?} released by detached {node:?}");
            let detail = self.detail_for(Some(id));
            self.dispatch(scene, node, EventKind::LostPointerCapture, None, detail, true);
        }
        self.hover.retain(|_, hovered| *hovered != node);
    }

    /// Whether hover and move routing run; suspended while dragging unless configured otherwise.
    pub(crate) fn events_enabled(&self) -> bool {
        !self.drag.is_dragging() || self.config.hit_on_drag
    }

    /// Click window of one pointer device class.
    pub(crate) fn clicks(&mut self, pointer_type: PointerType) -> &mut ClickWindow<K> {
        let class = match pointer_type {
            PointerType::Mouse => 0,
            PointerType::Pen => 1,
            PointerType::Touch => 2,
        };
        &mut self.pointer_clicks[class]
    }

    fn suppress_clicks(&mut self) {
        for clicks in &mut self.pointer_clicks {
            clicks.suppress();
        }
        self.touch_taps.suppress();
    }

    /// Event detail for one pointer, stamped with the current time.
    pub(crate) fn detail_for(&self, id: Option<PointerId>) -> EventDetail {
        let pointer = id.and_then(|id| self.pointers.pointer(id));
        EventDetail {
            pointer_id: id,
            pointer_type: pointer.map(|p| p.pointer_type),
            position: pointer.map(|p| p.position),
            delta: None,
            button: None,
            time: self.now,
        }
    }

    fn fire_drag_event<S>(&mut self, scene: &mut S, attempt: &DragAttempt<K>, kind: EventKind)
    where
        S: Scene<Node = K> + ?Sized,
    {
        let detail = self.detail_for(attempt.pointer_id);
        self.dispatch(scene, attempt.node, kind, None, detail, true);
    }

    /// Move a ready attempt to dragging and fire `dragstart`; returns whether it survived.
    pub(crate) fn begin_drag<S>(&mut self, scene: &mut S, node: K) -> bool
    where
        S: Scene<Node = K> + ?Sized,
    {
        if !self.drag.begin(node) {
            return false;
        }
        let Some(attempt) = self.drag.attempt(node).copied() else {
            return false;
        };
        debug!("drag of {node:?} started");
        self.fire_drag_event(scene, &attempt, EventKind::DragStart);
        if self.drag.finish_begin(node) {
            return true;
        }
        if self.drag.status(node) == Some(DragStatus::Stopped) {
            self.drag.remove(node);
        }
        false
    }

    /// Arm an implicit drag on the nearest draggable node between `target` and `reached`.
    pub(crate) fn arm_drag<S>(
        &mut self,
        scene: &mut S,
        target: K,
        reached: Option<K>,
        id: PointerId,
        button: Option<u16>,
        source: InputSource,
    ) where
        S: Scene<Node = K> + ?Sized,
    {
        if !self.config.drives_drag(source) {
            trace!("{source:?} does not drive drags");
            return;
        }
        if !self.config.is_drag_button(button) {
            return;
        }
        let last = reached.unwrap_or(target);
        let mut current = Some(target);
        let mut draggable = None;
        while let Some(node) = current {
            if scene.is_draggable(node) {
                draggable = Some(node);
                break;
            }
            if node == last {
                break;
            }
            current = scene.parent(node);
        }
        let Some(node) = draggable else {
            return;
        };
        if self.drag.is_node_dragging(node) {
            return;
        }
        let child_attempt = self
            .drag
            .attempts()
            .iter()
            .any(|a| a.node != node && scene.is_ancestor_or_self(node, a.node));
        if child_attempt {
            return;
        }
        let Some(start) = self.pointers.by_id(id) else {
            return;
        };
        let offset = start - scene.absolute_position(node);
        if self.drag.arm(DragAttempt::new(node, Some(id), start, offset)) {
            debug!("drag armed on {node:?} for pointer {id:?}");
        }
    }

    /// Advance every attempt whose pointer the last event moved.
    pub(crate) fn drag_step<S>(&mut self, scene: &mut S, source: InputSource)
    where
        S: Scene<Node = K> + ?Sized,
    {
        if !self.config.drives_drag(source) {
            return;
        }
        for node in self.drag.nodes() {
            let Some(position) = self.drag.bind_changed(node, &self.pointers) else {
                continue;
            };
            let Some(attempt) = self.drag.attempt(node).copied() else {
                continue;
            };
            match attempt.status {
                DragStatus::Ready => {
                    let threshold = scene
                        .drag_distance(node)
                        .unwrap_or(self.config.drag_distance);
                    if !attempt.exceeds_threshold(position, threshold) {
                        continue;
                    }
                    if !self.begin_drag(scene, node) {
                        continue;
                    }
                }
                DragStatus::Dragging => {}
                DragStatus::Stopped => continue,
            }
            self.drag_move(scene, node, position);
        }
    }

    fn drag_move<S>(&mut self, scene: &mut S, node: K, pointer: Point)
    where
        S: Scene<Node = K> + ?Sized,
    {
        let Some(attempt) = self.drag.attempt_mut(node) else {
            return;
        };
        let proposed = pointer - attempt.offset;
        let bounded = scene.bound_drag_position(node, proposed);
        if attempt.last_position != Some(bounded) {
            attempt.last_position = Some(bounded);
            scene.set_absolute_position(node, bounded);
            scene.redraw(node);
        }
        let attempt = *attempt;
        self.fire_drag_event(scene, &attempt, EventKind::DragMove);
    }

    /// First pass of a drag stop; see [`DragController::stop_batch`].
    pub(crate) fn drag_before<S>(&mut self, scene: &mut S, source: InputSource) -> DragBatch<K>
    where
        S: Scene<Node = K> + ?Sized,
    {
        if !self.config.drives_drag(source) {
            return DragBatch::new();
        }
        let batch = self.drag.stop_batch(&self.pointers);
        if self.drag.just_dragged() {
            self.suppress_clicks();
        }
        for node in &batch {
            scene.redraw(*node);
        }
        batch
    }

    /// Second pass of a drag stop: drop finished attempts, firing `dragend` for stopped ones.
    pub(crate) fn drag_after<S>(&mut self, scene: &mut S, batch: DragBatch<K>)
    where
        S: Scene<Node = K> + ?Sized,
    {
        for node in batch {
            let Some(attempt) = self.drag.take_finished(node) else {
                continue;
            };
            if attempt.status == DragStatus::Stopped {
                debug!("drag of {node:?} ended");
                self.fire_drag_event(scene, &attempt, EventKind::DragEnd);
            }
        }
    }
}
