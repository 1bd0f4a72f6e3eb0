// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing of native input families to node-level events.
//!
//! The pointer family synthesizes hover transitions and click/dblclick, with
//! one click window per device class. A lifted touch or pen contact leaves
//! its hovered node.
//! The touch family synthesizes tap/dbltap. Both arm and advance drags
//! subject to the configured touch source.

use core::fmt::Debug;
use core::hash::Hash;

use log::trace;

use crate::engine::Engine;
use crate::event::{EventDetail, EventKind};
use crate::input::{
    InputSource, PointerAction, PointerId, PointerInput, PointerType, TouchAction, TouchInput,
};
use crate::pointer::{ChangedPointers, Pointer};
use crate::scene::Scene;

impl<K: Copy + Eq + Hash + Debug> Engine<K> {
    pub(crate) fn route_pointer<S>(
        &mut self,
        scene: &mut S,
        input: &PointerInput,
        was_known: bool,
    ) where
        S: Scene<Node = K> + ?Sized,
    {
        let id = input.pointer.id;
        let pointer_type = input.pointer.pointer_type;
        let source = InputSource::Pointer(pointer_type);
        self.detail = EventDetail {
            button: input.pointer.button,
            delta: match input.action {
                PointerAction::Wheel(delta) => Some(delta),
                _ => None,
            },
            ..self.detail_for(Some(id))
        };
        match input.action {
            PointerAction::Enter => {
                let root = scene.root();
                self.fire(scene, root, EventKind::PointerEnter, None, false);
            }
            PointerAction::Over => {
                let root = scene.root();
                self.fire(scene, root, EventKind::PointerOver, None, false);
            }
            PointerAction::Out => self.pointer_left(scene, id),
            PointerAction::Leave => {
                if was_known {
                    self.pointer_left(scene, id);
                } else {
                    self.pointers.forget(id);
                }
            }
            PointerAction::Move => {
                if self.events_enabled() {
                    let previous = self.hovered(id);
                    let target = self.resolve_target(&*scene, id);
                    self.fire_hover_transition(scene, id, previous, target);
                } else {
                    trace!("pointermove routing suspended while dragging");
                }
                self.drag_step(scene, source);
            }
            PointerAction::Down => self.pointer_down(scene, id, input.pointer.button, pointer_type),
            PointerAction::Up => self.pointer_up(scene, id, pointer_type),
            PointerAction::Cancel => {
                let batch = self.drag_before(scene, source);
                if let Some(target) = self.resolve_target(&*scene, id) {
                    self.fire(scene, target, EventKind::PointerCancel, None, true);
                }
                self.clicks(pointer_type).suppress();
                self.release_capture(scene, id);
                self.drag_after(scene, batch);
                self.contact_lifted(scene, id, pointer_type);
            }
            PointerAction::LostCapture => {
                if self.release_capture(scene, id).is_none() {
                    trace!("lostpointercapture for uncaptured {id:?} ignored");
                }
            }
            PointerAction::ContextMenu => self.fire_at_target(scene, id, EventKind::ContextMenu),
            PointerAction::Wheel(_) => self.fire_at_target(scene, id, EventKind::Wheel),
        }
    }

    fn fire_at_target<S>(&mut self, scene: &mut S, id: PointerId, kind: EventKind)
    where
        S: Scene<Node = K> + ?Sized,
    {
        match self.resolve_target(&*scene, id) {
            Some(target) => self.fire(scene, target, kind, None, true),
            None => {
                let root = scene.root();
                self.fire(scene, root, kind, None, false)
            }
        };
    }

    fn pointer_left<S>(&mut self, scene: &mut S, id: PointerId)
    where
        S: Scene<Node = K> + ?Sized,
    {
        let root = scene.root();
        if self.events_enabled() {
            match self.hovered(id).filter(|n| scene.is_attached(*n)) {
                Some(target) => {
                    self.fire(scene, target, EventKind::PointerOut, None, true);
                    self.fire(scene, target, EventKind::PointerLeave, None, true);
                    self.fire(scene, root, EventKind::PointerLeave, None, false);
                }
                None => {
                    self.fire(scene, root, EventKind::PointerLeave, None, false);
                    self.fire(scene, root, EventKind::PointerOut, None, false);
                }
            }
        }
        self.hover.remove(&id);
        self.pointers.forget(id);
    }

    /// A lifted touch or pen contact stops hovering its node.
    fn contact_lifted<S>(&mut self, scene: &mut S, id: PointerId, pointer_type: PointerType)
    where
        S: Scene<Node = K> + ?Sized,
    {
        if pointer_type != PointerType::Mouse && self.hover.contains_key(&id) {
            self.pointer_left(scene, id);
        }
    }

    fn pointer_down<S>(
        &mut self,
        scene: &mut S,
        id: PointerId,
        button: Option<u16>,
        pointer_type: PointerType,
    ) where
        S: Scene<Node = K> + ?Sized,
    {
        let source = InputSource::Pointer(pointer_type);
        self.drag.clear_just_dragged();
        let root = scene.root();
        match self.resolve_target(&*scene, id) {
            Some(target) => {
                self.clicks(pointer_type).on_press(target);
                let reached = self.fire(scene, target, EventKind::PointerDown, None, true);
                self.arm_drag(scene, target, reached, id, button, source);
            }
            None => {
                self.clicks(pointer_type).on_press(root);
                self.fire(scene, root, EventKind::PointerDown, None, false);
            }
        }
    }

    fn pointer_up<S>(&mut self, scene: &mut S, id: PointerId, pointer_type: PointerType)
    where
        S: Scene<Node = K> + ?Sized,
    {
        let batch = self.drag_before(scene, InputSource::Pointer(pointer_type));
        let root = scene.root();
        let target = self.resolve_target(&*scene, id);
        let node = target.unwrap_or(root);
        let bubble = target.is_some();
        let (now, just_dragged) = (self.now, self.drag.just_dragged());
        let result = self.clicks(pointer_type).on_release(node, now, just_dragged);
        self.fire(scene, node, EventKind::PointerUp, None, bubble);
        if result.click {
            self.fire(scene, node, EventKind::Click, None, bubble);
        }
        if result.double {
            self.fire(scene, node, EventKind::DblClick, None, bubble);
        }
        if pointer_type != PointerType::Mouse {
            self.release_capture(scene, id);
        }
        self.drag_after(scene, batch);
        self.contact_lifted(scene, id, pointer_type);
    }

    pub(crate) fn route_touch<S>(&mut self, scene: &mut S, input: &TouchInput)
    where
        S: Scene<Node = K> + ?Sized,
    {
        let changed: ChangedPointers = self.pointers.changed().iter().copied().collect();
        match input.action {
            TouchAction::Start => self.touch_start(scene, &changed),
            TouchAction::Move => {
                if self.events_enabled() {
                    self.fire_per_touch(scene, &changed, EventKind::TouchMove);
                } else {
                    trace!("touchmove routing suspended while dragging");
                }
                self.drag_step(scene, InputSource::Touch);
            }
            TouchAction::End => self.touch_end(scene, &changed),
            TouchAction::Cancel => {
                let batch = self.drag_before(scene, InputSource::Touch);
                self.fire_per_touch(scene, &changed, EventKind::TouchCancel);
                self.touch_taps.suppress();
                for p in &changed {
                    self.release_capture(scene, p.id);
                }
                self.drag_after(scene, batch);
            }
        }
    }

    /// Fire `kind` at each changed touch's target, or once at the root if none has one.
    fn fire_per_touch<S>(&mut self, scene: &mut S, changed: &[Pointer], kind: EventKind)
    where
        S: Scene<Node = K> + ?Sized,
    {
        let mut triggered = false;
        for p in changed {
            self.detail = self.detail_for(Some(p.id));
            let Some(target) = self.resolve_target(&*scene, p.id) else {
                continue;
            };
            triggered = true;
            self.fire(scene, target, kind, None, true);
        }
        if !triggered {
            let root = scene.root();
            self.fire(scene, root, kind, None, false);
        }
    }

    fn touch_start<S>(&mut self, scene: &mut S, changed: &[Pointer])
    where
        S: Scene<Node = K> + ?Sized,
    {
        self.drag.clear_just_dragged();
        let mut triggered = false;
        for p in changed {
            self.detail = self.detail_for(Some(p.id));
            let Some(target) = self.resolve_target(&*scene, p.id) else {
                continue;
            };
            triggered = true;
            if self.config.capture_touch_events {
                self.request_capture(scene, p.id, target);
            }
            self.touch_taps.on_press(target);
            let reached = self.fire(scene, target, EventKind::TouchStart, None, true);
            self.arm_drag(scene, target, reached, p.id, None, InputSource::Touch);
        }
        if !triggered {
            let root = scene.root();
            self.touch_taps.on_press(root);
            self.fire(scene, root, EventKind::TouchStart, None, false);
        }
    }

    fn touch_end<S>(&mut self, scene: &mut S, changed: &[Pointer])
    where
        S: Scene<Node = K> + ?Sized,
    {
        let batch = self.drag_before(scene, InputSource::Touch);
        let double_armed = self.touch_taps.release(self.now, self.drag.just_dragged());
        let mut triggered = false;
        for p in changed {
            self.detail = self.detail_for(Some(p.id));
            let Some(target) = self.resolve_target(&*scene, p.id) else {
                continue;
            };
            triggered = true;
            self.fire(scene, target, EventKind::TouchEnd, None, true);
            let result = self.touch_taps.classify(target, double_armed);
            if result.click {
                self.fire(scene, target, EventKind::Tap, None, true);
            }
            if result.double {
                self.fire(scene, target, EventKind::DblTap, None, true);
            }
        }
        if !triggered {
            let root = scene.root();
            self.fire(scene, root, EventKind::TouchEnd, None, false);
            let result = self.touch_taps.classify(root, double_armed);
            if result.click {
                self.fire(scene, root, EventKind::Tap, None, false);
            }
            if result.double {
                self.fire(scene, root, EventKind::DblTap, None, false);
            }
        }
        self.touch_taps.finish();
        for p in changed {
            self.release_capture(scene, p.id);
        }
        self.drag_after(scene, batch);
    }
}
