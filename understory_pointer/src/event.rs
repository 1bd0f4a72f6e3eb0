// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node-level events emitted by the engine.
//!
//! Each [`PointerEvent`] is delivered to one node at a time through
//! [`Scene::fire`](crate::scene::Scene::fire). Listeners can stop bubbling with
//! [`PointerEvent::cancel_bubble`] and can queue engine requests (capture,
//! release, start or stop a drag). The engine applies queued requests right
//! after the listeners of the current node return.
//!
//! ```
//! use understory_pointer::event::EventKind;
//!
//! assert_eq!(EventKind::DblClick.as_str(), "dblclick");
//! assert_eq!(EventKind::from_name("dragmove"), Some(EventKind::DragMove));
//! assert_eq!(EventKind::from_name("mousedown"), None);
//! ```

use core::fmt;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::input::{PointerId, PointerType};

/// Kind of a node-level event. Names match the DOM-style strings listeners subscribe to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `pointerenter`
    PointerEnter,
    /// `pointerover`
    PointerOver,
    /// `pointermove`
    PointerMove,
    /// `pointerout`
    PointerOut,
    /// `pointerleave`
    PointerLeave,
    /// `pointerdown`
    PointerDown,
    /// `pointerup`
    PointerUp,
    /// `pointercancel`
    PointerCancel,
    /// `gotpointercapture`
    GotPointerCapture,
    /// `lostpointercapture`
    LostPointerCapture,
    /// `contextmenu`
    ContextMenu,
    /// `wheel`
    Wheel,
    /// `click`
    Click,
    /// `dblclick`
    DblClick,
    /// `dragstart`
    DragStart,
    /// `dragmove`
    DragMove,
    /// `dragend`
    DragEnd,
    /// `touchstart`
    TouchStart,
    /// `touchmove`
    TouchMove,
    /// `touchend`
    TouchEnd,
    /// `touchcancel`
    TouchCancel,
    /// `tap`
    Tap,
    /// `dbltap`
    DblTap,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 23] = [
        Self::PointerEnter,
        Self::PointerOver,
        Self::PointerMove,
        Self::PointerOut,
        Self::PointerLeave,
        Self::PointerDown,
        Self::PointerUp,
        Self::PointerCancel,
        Self::GotPointerCapture,
        Self::LostPointerCapture,
        Self::ContextMenu,
        Self::Wheel,
        Self::Click,
        Self::DblClick,
        Self::DragStart,
        Self::DragMove,
        Self::DragEnd,
        Self::TouchStart,
        Self::TouchMove,
        Self::TouchEnd,
        Self::TouchCancel,
        Self::Tap,
        Self::DblTap,
    ];

    /// The event name listeners subscribe to.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointerEnter => "pointerenter",
            Self::PointerOver => "pointerover",
            Self::PointerMove => "pointermove",
            Self::PointerOut => "pointerout",
            Self::PointerLeave => "pointerleave",
            Self::PointerDown => "pointerdown",
            Self::PointerUp => "pointerup",
            Self::PointerCancel => "pointercancel",
            Self::GotPointerCapture => "gotpointercapture",
            Self::LostPointerCapture => "lostpointercapture",
            Self::ContextMenu => "contextmenu",
            Self::Wheel => "wheel",
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::DragStart => "dragstart",
            Self::DragMove => "dragmove",
            Self::DragEnd => "dragend",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::TouchCancel => "touchcancel",
            Self::Tap => "tap",
            Self::DblTap => "dbltap",
        }
    }

    /// Look up a kind by its event name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Enter/leave events skip the part of the ancestor chain shared with the
    /// other side of the transition.
    pub const fn is_boundary(self) -> bool {
        matches!(self, Self::PointerEnter | Self::PointerLeave)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native details copied into every event produced for one native input.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EventDetail {
    /// The contact the event is about, if any.
    pub pointer_id: Option<PointerId>,
    /// Device class of that contact.
    pub pointer_type: Option<PointerType>,
    /// Surface-space position, if known.
    pub position: Option<Point>,
    /// Wheel delta for `wheel` events.
    pub delta: Option<Vec2>,
    /// Button that changed state, if any.
    pub button: Option<u16>,
    /// Host timestamp in milliseconds.
    pub time: u64,
}

/// Something a listener asked the engine to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Request<K> {
    Capture(PointerId, K),
    Release(PointerId),
    StartDrag(K, Option<PointerId>),
    StopDrag(K),
}

/// Requests are rare; two inline slots cover the common cases.
pub(crate) type Requests<K> = SmallVec<[Request<K>; 2]>;

/// An event being delivered to a node.
#[derive(Clone, Debug)]
pub struct PointerEvent<K> {
    /// What happened.
    pub kind: EventKind,
    /// The node the event was originally fired at.
    pub target: K,
    /// The node whose listeners are currently running.
    pub current_target: K,
    /// The other node of a hover transition (the node being left for
    /// `over`/`enter`, the node being entered for `out`/`leave`).
    pub related_target: Option<K>,
    /// Native details.
    pub detail: EventDetail,
    bubbles: bool,
    bubble_cancelled: bool,
    requests: Requests<K>,
}

impl<K: Copy> PointerEvent<K> {
    pub(crate) fn new(
        kind: EventKind,
        target: K,
        related_target: Option<K>,
        detail: EventDetail,
        bubbles: bool,
    ) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            related_target,
            detail,
            bubbles,
            bubble_cancelled: false,
            requests: SmallVec::new(),
        }
    }

    /// Whether the event travels up the ancestor chain.
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Stop the event from reaching any further ancestor.
    ///
    /// Remaining listeners on the current node still run.
    pub fn cancel_bubble(&mut self) {
        self.bubble_cancelled = true;
    }

    /// Whether a listener cancelled bubbling.
    pub fn is_bubble_cancelled(&self) -> bool {
        self.bubble_cancelled
    }

    /// Surface-space pointer position, if known.
    pub fn position(&self) -> Option<Point> {
        self.detail.position
    }

    /// The contact this event is about, if any.
    pub fn pointer_id(&self) -> Option<PointerId> {
        self.detail.pointer_id
    }

    /// Route all future events of `pointer_id` to `node` until released.
    pub fn set_pointer_capture(&mut self, pointer_id: PointerId, node: K) {
        self.requests.push(Request::Capture(pointer_id, node));
    }

    /// Release the capture held for `pointer_id`, if any.
    pub fn release_pointer_capture(&mut self, pointer_id: PointerId) {
        self.requests.push(Request::Release(pointer_id));
    }

    /// Start dragging `node`, bound to `pointer_id` or to the next moving pointer.
    pub fn start_drag(&mut self, node: K, pointer_id: Option<PointerId>) {
        self.requests.push(Request::StartDrag(node, pointer_id));
    }

    /// Stop dragging `node`. Inside a `dragstart` listener this vetoes the drag.
    pub fn stop_drag(&mut self, node: K) {
        self.requests.push(Request::StopDrag(node));
    }

    pub(crate) fn take_requests(&mut self) -> Requests<K> {
        core::mem::take(&mut self.requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_every_kind() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn only_enter_and_leave_are_boundary_events() {
        let boundary: SmallVec<[EventKind; 2]> = EventKind::ALL
            .into_iter()
            .filter(|k| k.is_boundary())
            .collect();
        assert_eq!(
            boundary.as_slice(),
            &[EventKind::PointerEnter, EventKind::PointerLeave]
        );
    }

    #[test]
    fn requests_are_drained_once() {
        let mut ev = PointerEvent::new(EventKind::Click, 1_u32, None, EventDetail::default(), true);
        ev.set_pointer_capture(PointerId(3), 1);
        ev.stop_drag(1);
        let taken = ev.take_requests();
        assert_eq!(
            taken.as_slice(),
            &[Request::Capture(PointerId(3), 1), Request::StopDrag(1)]
        );
        assert!(ev.take_requests().is_empty());
    }

    #[test]
    fn cancel_bubble_is_sticky() {
        let mut ev = PointerEvent::new(EventKind::Click, 1_u32, None, EventDetail::default(), true);
        assert!(ev.bubbles());
        ev.cancel_bubble();
        assert!(ev.is_bubble_cancelled());
    }
}
