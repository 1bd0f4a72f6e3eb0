// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event delivery: firing, bubbling, hover transitions and listener requests.

use core::fmt::Debug;
use core::hash::Hash;

use log::trace;

use crate::engine::Engine;
use crate::event::{EventDetail, EventKind, PointerEvent, Request};
use crate::input::PointerId;
use crate::scene::Scene;

impl<K: Copy + Eq + Hash + Debug> Engine<K> {
    /// Fire `kind` at `node`, bubbling to its ancestors if `bubble` is set.
    ///
    /// The event carries the details of the native event being processed.
    /// Returns the last node whose listeners ran.
    pub fn fire_at<S>(&mut self, scene: &mut S, node: K, kind: EventKind, bubble: bool) -> Option<K>
    where
        S: Scene<Node = K> + ?Sized,
    {
        self.fire(scene, node, kind, None, bubble)
    }

    pub(crate) fn fire<S>(
        &mut self,
        scene: &mut S,
        node: K,
        kind: EventKind,
        related: Option<K>,
        bubble: bool,
    ) -> Option<K>
    where
        S: Scene<Node = K> + ?Sized,
    {
        let detail = self.detail;
        self.dispatch(scene, node, kind, related, detail, bubble)
    }

    /// Deliver one event along the ancestor chain of `target`.
    ///
    /// Attachment and listening are re-checked at every step since listeners
    /// may mutate the scene. Boundary events stop before any ancestor shared
    /// with the related node and never reach the root.
    pub(crate) fn dispatch<S>(
        &mut self,
        scene: &mut S,
        target: K,
        kind: EventKind,
        related: Option<K>,
        detail: EventDetail,
        bubble: bool,
    ) -> Option<K>
    where
        S: Scene<Node = K> + ?Sized,
    {
        let root = scene.root();
        let mut event = PointerEvent::new(kind, target, related, detail, bubble);
        let mut reached = None;
        let mut current = Some(target);
        while let Some(node) = current {
            if !scene.is_attached(node) {
                trace!("{kind} stopped at detached {node:?}");
                break;
            }
            if node != target && !scene.is_listening(node) {
                break;
            }
            if bubble && kind.is_boundary() {
                let shared = related.is_some_and(|r| scene.is_ancestor_or_self(node, r));
                if node == root || shared {
                    break;
                }
            }
            event.current_target = node;
            scene.fire(node, &mut event);
            reached = Some(node);
            self.apply_requests(scene, &mut event);
            if !bubble || event.is_bubble_cancelled() || node == root {
                break;
            }
            current = scene.parent(node);
        }
        reached
    }

    fn apply_requests<S>(&mut self, scene: &mut S, event: &mut PointerEvent<K>)
    where
        S: Scene<Node = K> + ?Sized,
    {
        for request in event.take_requests() {
            match request {
                Request::Capture(id, node) => {
                    self.request_capture(scene, id, node);
                }
                Request::Release(id) => {
                    self.release_capture(scene, id);
                }
                Request::StartDrag(node, id) => self.start_drag(scene, node, id),
                Request::StopDrag(node) => self.stop_drag(scene, node),
            }
        }
    }

    /// Fire the hover transition for `id` moving from `previous` to `next`, then `pointermove`.
    ///
    /// Order: `pointerout`, `pointerleave` on the previous target, then
    /// `pointerover`, `pointerenter` on the new one, then `pointermove`.
    /// With no new target, `pointerover` and `pointermove` go to the root.
    pub(crate) fn fire_hover_transition<S>(
        &mut self,
        scene: &mut S,
        id: PointerId,
        previous: Option<K>,
        next: Option<K>,
    ) where
        S: Scene<Node = K> + ?Sized,
    {
        let root = scene.root();
        let previous = previous.filter(|p| scene.is_attached(*p));
        if previous == next {
            match next {
                Some(node) => self.fire(scene, node, EventKind::PointerMove, None, true),
                None => self.fire(scene, root, EventKind::PointerMove, None, false),
            };
            return;
        }
        if let Some(prev) = previous {
            self.fire(scene, prev, EventKind::PointerOut, next, true);
            self.fire(scene, prev, EventKind::PointerLeave, next, true);
        }
        self.hover.remove(&id);
        match next {
            Some(node) => {
                self.hover.insert(id, node);
                self.fire(scene, node, EventKind::PointerOver, previous, true);
                self.fire(scene, node, EventKind::PointerEnter, previous, true);
                self.fire(scene, node, EventKind::PointerMove, None, true);
            }
            None => {
                self.fire(scene, root, EventKind::PointerOver, previous, false);
                self.fire(scene, root, EventKind::PointerMove, None, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::{Point, Rect};

    use super::*;
    use crate::hit::tests::Flat;

    /// Flat scene that records deliveries and can run scripted reactions.
    #[derive(Debug, Default)]
    struct Recording {
        flat: Flat,
        log: Vec<(EventKind, u32)>,
        cancel_at: Option<(EventKind, u32)>,
        detach_on: Option<(EventKind, u32, u32)>,
        capture_on: Option<(EventKind, u32)>,
    }

    impl Recording {
        fn new() -> Self {
            Self {
                flat: Flat::new(),
                ..Self::default()
            }
        }

        fn push(&mut self, parent: u32, bounds: Option<Rect>) -> u32 {
            let kind = if bounds.is_some() { "Shape" } else { "Group" };
            self.flat.push(Some(parent), bounds, kind)
        }
    }

    impl Scene for Recording {
        type Node = u32;

        fn root(&self) -> u32 {
            self.flat.root()
        }

        fn children(&self, node: u32) -> &[u32] {
            self.flat.children(node)
        }

        fn parent(&self, node: u32) -> Option<u32> {
            self.flat.parent(node)
        }

        fn contains(&self, node: u32, point: Point) -> bool {
            self.flat.contains(node, point)
        }

        fn is_listening(&self, node: u32) -> bool {
            self.flat.is_listening(node)
        }

        fn is_attached(&self, node: u32) -> bool {
            self.flat.is_attached(node)
        }

        fn kind(&self, node: u32) -> &str {
            self.flat.kind(node)
        }

        fn fire(&mut self, node: u32, event: &mut PointerEvent<u32>) {
            self.log.push((event.kind, node));
            if self.cancel_at == Some((event.kind, node)) {
                event.cancel_bubble();
            }
            if let Some((kind, at, victim)) = self.detach_on {
                if kind == event.kind && at == node {
                    self.flat.attached[victim as usize] = false;
                }
            }
            if self.capture_on == Some((event.kind, node)) {
                event.set_pointer_capture(PointerId(1), node);
            }
        }
    }

    fn chain() -> (Recording, u32, u32, u32) {
        let mut scene = Recording::new();
        let layer = scene.push(0, None);
        let group = scene.push(layer, None);
        let shape = scene.push(group, Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        (scene, layer, group, shape)
    }

    #[test]
    fn bubbles_to_root() {
        let (mut scene, layer, group, shape) = chain();
        let mut engine = Engine::default();
        let reached = engine.fire_at(&mut scene, shape, EventKind::Click, true);
        assert_eq!(reached, Some(0));
        assert_eq!(
            scene.log,
            [
                (EventKind::Click, shape),
                (EventKind::Click, group),
                (EventKind::Click, layer),
                (EventKind::Click, 0)
            ]
        );
    }

    #[test]
    fn non_bubbling_stays_on_target() {
        let (mut scene, _, _, shape) = chain();
        let mut engine = Engine::default();
        assert_eq!(
            engine.fire_at(&mut scene, shape, EventKind::Click, false),
            Some(shape)
        );
        assert_eq!(scene.log, [(EventKind::Click, shape)]);
    }

    #[test]
    fn cancel_bubble_stops_at_current_node() {
        let (mut scene, _, group, shape) = chain();
        scene.cancel_at = Some((EventKind::Click, group));
        let mut engine = Engine::default();
        assert_eq!(
            engine.fire_at(&mut scene, shape, EventKind::Click, true),
            Some(group)
        );
        assert_eq!(scene.log.len(), 2);
    }

    #[test]
    fn non_listening_ancestor_stops_bubbling() {
        let (mut scene, layer, group, shape) = chain();
        scene.flat.listening[layer as usize] = false;
        let mut engine = Engine::default();
        engine.fire_at(&mut scene, shape, EventKind::Click, true);
        assert_eq!(
            scene.log,
            [(EventKind::Click, shape), (EventKind::Click, group)]
        );
    }

    #[test]
    fn detaching_mid_bubble_stops_propagation() {
        let (mut scene, _, group, shape) = chain();
        scene.detach_on = Some((EventKind::Click, shape, group));
        let mut engine = Engine::default();
        engine.fire_at(&mut scene, shape, EventKind::Click, true);
        assert_eq!(scene.log, [(EventKind::Click, shape)]);
    }

    #[test]
    fn leave_skips_shared_ancestors_and_root() {
        let (mut scene, layer, group, shape) = chain();
        let sibling = scene.push(group, Some(Rect::new(20.0, 0.0, 30.0, 10.0)));
        let mut engine = Engine::default();

        engine.fire(&mut scene, shape, EventKind::PointerLeave, Some(sibling), true);
        assert_eq!(scene.log, [(EventKind::PointerLeave, shape)]);

        scene.log.clear();
        engine.fire(&mut scene, shape, EventKind::PointerLeave, None, true);
        assert_eq!(
            scene.log,
            [
                (EventKind::PointerLeave, shape),
                (EventKind::PointerLeave, group),
                (EventKind::PointerLeave, layer)
            ]
        );
    }

    #[test]
    fn hover_transition_orders_out_before_over() {
        let (mut scene, _, group, shape) = chain();
        let other = scene.push(group, Some(Rect::new(20.0, 0.0, 30.0, 10.0)));
        let mut engine = Engine::default();
        let id = PointerId(1);

        engine.fire_hover_transition(&mut scene, id, None, Some(shape));
        assert_eq!(engine.hovered(id), Some(shape));
        scene.log.clear();

        engine.fire_hover_transition(&mut scene, id, Some(shape), Some(other));
        let kinds: Vec<_> = scene
            .log
            .iter()
            .filter(|(_, n)| *n == shape || *n == other)
            .copied()
            .collect();
        assert_eq!(
            kinds,
            [
                (EventKind::PointerOut, shape),
                (EventKind::PointerLeave, shape),
                (EventKind::PointerOver, other),
                (EventKind::PointerEnter, other),
                (EventKind::PointerMove, other)
            ]
        );
        assert_eq!(engine.hovered(id), Some(other));
    }

    #[test]
    fn unchanged_hover_only_moves() {
        let (mut scene, _, _, shape) = chain();
        let mut engine = Engine::default();
        engine.fire_hover_transition(&mut scene, PointerId(1), Some(shape), Some(shape));
        assert!(
            scene.log.iter().all(|(k, _)| *k == EventKind::PointerMove),
            "unexpected events: {:?}",
            scene.log
        );
    }

    #[test]
    fn leaving_to_nothing_reports_over_and_move_on_root() {
        let (mut scene, _, _, shape) = chain();
        let mut engine = Engine::default();
        engine.hover.insert(PointerId(1), shape);
        engine.fire_hover_transition(&mut scene, PointerId(1), Some(shape), None);
        let at_root: Vec<_> = scene.log.iter().filter(|(_, n)| *n == 0).copied().collect();
        assert_eq!(
            at_root,
            [
                (EventKind::PointerOut, 0),
                (EventKind::PointerOver, 0),
                (EventKind::PointerMove, 0)
            ]
        );
        assert_eq!(engine.hovered(PointerId(1)), None);
    }

    #[test]
    fn listener_capture_request_is_applied() {
        let (mut scene, _, _, shape) = chain();
        scene.capture_on = Some((EventKind::PointerDown, shape));
        let mut engine = Engine::default();
        engine.fire_at(&mut scene, shape, EventKind::PointerDown, false);
        assert!(engine.has_capture(PointerId(1), shape));
        assert!(scene.log.contains(&(EventKind::GotPointerCapture, shape)));
    }
}
