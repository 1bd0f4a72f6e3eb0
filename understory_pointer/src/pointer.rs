// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer state: current and changed-this-event pointer positions in surface space.
//!
//! ## Usage
//!
//! 1) Describe where the surface sits in client space with [`PointerState::set_surface`].
//! 2) Call [`PointerState::update`] once per native event.
//! 3) Query [`PointerState::by_id`] for a pointer's surface position, or walk
//!    [`PointerState::changed`] for the contacts the last event was about.
//!
//! ```
//! use kurbo::{Point, Rect, Size};
//! use understory_pointer::input::{NativeInput, NativePointer, PointerAction, PointerId};
//! use understory_pointer::pointer::{PointerState, SurfaceRect};
//!
//! let mut pointers = PointerState::new();
//! // Surface drawn at (100, 50), rendered at twice its intrinsic size.
//! pointers.set_surface(SurfaceRect::new(
//!     Rect::new(100.0, 50.0, 500.0, 450.0),
//!     Size::new(200.0, 200.0),
//! ));
//! pointers.update(&NativeInput::pointer(
//!     PointerAction::Move,
//!     NativePointer::mouse(PointerId(1), Point::new(120.0, 70.0)),
//!     0,
//! ));
//! assert_eq!(pointers.by_id(PointerId(1)), Some(Point::new(10.0, 10.0)));
//! assert_eq!(pointers.by_id(PointerId(2)), None);
//! ```

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;

use crate::input::{
    NativeInput, PointerAction, PointerId, PointerInput, PointerType, Touch, TouchInput,
};

/// One active contact in surface space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pointer {
    /// Contact identifier.
    pub id: PointerId,
    /// Position in surface space.
    pub position: Point,
    /// Device class.
    pub pointer_type: PointerType,
    /// Whether this is the primary pointer of its device class.
    pub is_primary: bool,
}

/// Placement of the surface in client space.
///
/// `rendered` is the surface's on-screen rectangle in client coordinates and
/// `intrinsic` its own coordinate size. The default maps client space 1:1.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SurfaceRect {
    /// On-screen rectangle of the surface, in client coordinates.
    pub rendered: Rect,
    /// Intrinsic size of the surface.
    pub intrinsic: Size,
}

impl SurfaceRect {
    /// Create a surface placement.
    pub fn new(rendered: Rect, intrinsic: Size) -> Self {
        Self {
            rendered,
            intrinsic,
        }
    }

    /// Map a client-space point into surface space.
    pub fn to_surface(&self, client: Point) -> Point {
        let sx = scale(self.rendered.width(), self.intrinsic.width);
        let sy = scale(self.rendered.height(), self.intrinsic.height);
        Point::new(
            (client.x - self.rendered.x0) / sx,
            (client.y - self.rendered.y0) / sy,
        )
    }
}

// A degenerate ratio (hidden or unsized surface) falls back to 1.
fn scale(rendered: f64, intrinsic: f64) -> f64 {
    let s = rendered / intrinsic;
    if s.is_finite() && s != 0.0 { s } else { 1.0 }
}

/// Changed pointers are few and their order matters for lazy drag binding.
pub type ChangedPointers = SmallVec<[Pointer; 4]>;

/// Canonical record of pointer positions, keyed by pointer id.
///
/// The current set persists across events; the changed set is cleared and
/// repopulated by every call to [`update`](Self::update).
#[derive(Clone, Debug, Default)]
pub struct PointerState {
    current: HashMap<PointerId, Pointer>,
    changed: ChangedPointers,
    surface: SurfaceRect,
}

impl PointerState {
    /// Create an empty pointer state with an identity surface mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client→surface mapping used by subsequent updates.
    pub fn set_surface(&mut self, surface: SurfaceRect) {
        self.surface = surface;
    }

    /// The current client→surface mapping.
    pub fn surface(&self) -> SurfaceRect {
        self.surface
    }

    /// Ingest one native event.
    pub fn update(&mut self, input: &NativeInput) {
        match input {
            NativeInput::Pointer(p) => self.update_pointer(p),
            NativeInput::Touch(t) => self.update_touches(t),
        }
    }

    fn update_pointer(&mut self, input: &PointerInput) {
        // Capture loss carries no meaningful position.
        if input.action == PointerAction::LostCapture {
            return;
        }
        let native = input.pointer;
        let pointer = Pointer {
            id: native.id,
            position: self.surface.to_surface(native.client),
            pointer_type: native.pointer_type,
            is_primary: native.is_primary,
        };
        let lifted = matches!(input.action, PointerAction::Up | PointerAction::Cancel);
        if lifted && native.pointer_type != PointerType::Mouse {
            self.current.remove(&native.id);
        } else {
            self.current.insert(native.id, pointer);
        }
        self.changed.clear();
        self.changed.push(pointer);
    }

    fn update_touches(&mut self, input: &TouchInput) {
        let surface = self.surface;
        let to_pointer = |index: usize, touch: &Touch| Pointer {
            id: touch.id,
            position: surface.to_surface(touch.client),
            pointer_type: PointerType::Touch,
            is_primary: index == 0,
        };

        self.current.clear();
        for (index, touch) in input.touches.iter().enumerate() {
            self.current.insert(touch.id, to_pointer(index, touch));
        }

        let changed = if input.changed.is_empty() {
            &input.touches
        } else {
            &input.changed
        };
        self.changed.clear();
        self.changed
            .extend(changed.iter().enumerate().map(|(i, t)| to_pointer(i, t)));
    }

    /// Surface position of a pointer, or `None` if the id is unknown.
    ///
    /// The current set is consulted first, then the changed set, so a contact
    /// that was just lifted still resolves while its own `up` is processed.
    pub fn by_id(&self, id: PointerId) -> Option<Point> {
        self.pointer(id).map(|p| p.position)
    }

    /// Full record of a pointer, current set first.
    pub fn pointer(&self, id: PointerId) -> Option<&Pointer> {
        self.current
            .get(&id)
            .or_else(|| self.changed.iter().find(|p| p.id == id))
    }

    /// Position of a pointer if the last event changed it.
    pub fn changed_position(&self, id: PointerId) -> Option<Point> {
        self.changed
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.position)
    }

    /// Whether the last event changed the given pointer.
    pub fn is_changed(&self, id: PointerId) -> bool {
        self.changed.iter().any(|p| p.id == id)
    }

    /// The first pointer of the changed set, if any.
    pub fn first_changed(&self) -> Option<&Pointer> {
        self.changed.first()
    }

    /// The pointers the last event was about, in native order.
    pub fn changed(&self) -> &[Pointer] {
        &self.changed
    }

    /// All active pointers, in no particular order.
    pub fn current(&self) -> impl Iterator<Item = &Pointer> + '_ {
        self.current.values()
    }

    /// Drop a pointer entirely (for example when a mouse leaves the surface).
    pub fn forget(&mut self, id: PointerId) {
        self.current.remove(&id);
        self.changed.retain(|p| p.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{NativePointer, TouchAction};

    fn mouse(action: PointerAction, id: u32, x: f64, y: f64) -> NativeInput {
        NativeInput::pointer(
            action,
            NativePointer::mouse(PointerId(id), Point::new(x, y)),
            0,
        )
    }

    #[test]
    fn pointer_event_replaces_changed_set() {
        let mut state = PointerState::new();
        state.update(&mouse(PointerAction::Move, 1, 1.0, 2.0));
        state.update(&mouse(PointerAction::Move, 2, 3.0, 4.0));

        assert_eq!(state.changed().len(), 1);
        assert_eq!(state.changed()[0].id, PointerId(2));
        assert_eq!(state.current().count(), 2);
    }

    #[test]
    fn unknown_pointer_is_none_not_origin() {
        let state = PointerState::new();
        assert_eq!(state.by_id(PointerId(7)), None);
    }

    #[test]
    fn mouse_survives_up_but_touch_pointer_does_not() {
        let mut state = PointerState::new();
        state.update(&mouse(PointerAction::Down, 1, 5.0, 5.0));
        state.update(&mouse(PointerAction::Up, 1, 5.0, 5.0));
        assert!(state.current().any(|p| p.id == PointerId(1)));

        let touch = |action| {
            NativeInput::pointer(
                action,
                NativePointer::touch(PointerId(9), Point::new(1.0, 1.0)),
                0,
            )
        };
        state.update(&touch(PointerAction::Down));
        state.update(&touch(PointerAction::Up));
        assert!(!state.current().any(|p| p.id == PointerId(9)));
        // Still resolvable through the changed set during its own up.
        assert_eq!(state.by_id(PointerId(9)), Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn lost_capture_leaves_positions_untouched() {
        let mut state = PointerState::new();
        state.update(&mouse(PointerAction::Move, 1, 5.0, 5.0));
        state.update(&mouse(PointerAction::LostCapture, 1, 50.0, 50.0));
        assert_eq!(state.by_id(PointerId(1)), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn touch_list_rebuilds_current_and_changed() {
        let mut state = PointerState::new();
        let a = Touch::new(PointerId(1), Point::new(1.0, 1.0));
        let b = Touch::new(PointerId(2), Point::new(2.0, 2.0));

        state.update(&NativeInput::touch(TouchAction::Start, [a, b], [b], 0));
        assert_eq!(state.current().count(), 2);
        assert_eq!(state.changed().len(), 1);
        assert_eq!(state.first_changed().map(|p| p.id), Some(PointerId(2)));

        // No distinguished changed list: everything counts as changed.
        state.update(&NativeInput::touch(TouchAction::Move, [a], [], 0));
        assert_eq!(state.current().count(), 1);
        assert_eq!(state.changed().len(), 1);
        assert!(state.is_changed(PointerId(1)));
        assert!(!state.is_changed(PointerId(2)));
    }

    #[test]
    fn surface_scale_and_offset_apply() {
        let mut state = PointerState::new();
        state.set_surface(SurfaceRect::new(
            Rect::new(10.0, 20.0, 210.0, 120.0),
            Size::new(400.0, 200.0),
        ));
        state.update(&mouse(PointerAction::Move, 1, 60.0, 45.0));
        assert_eq!(state.by_id(PointerId(1)), Some(Point::new(100.0, 50.0)));
    }

    #[test]
    fn degenerate_surface_falls_back_to_unit_scale() {
        let surface = SurfaceRect::new(Rect::new(5.0, 5.0, 5.0, 5.0), Size::ZERO);
        assert_eq!(
            surface.to_surface(Point::new(15.0, 25.0)),
            Point::new(10.0, 20.0)
        );
    }

    #[test]
    fn forgotten_pointer_no_longer_resolves() {
        let mut state = PointerState::new();
        state.update(&mouse(PointerAction::Move, 1, 5.0, 5.0));
        state.forget(PointerId(1));
        assert_eq!(state.current().count(), 0);
        assert!(!state.is_changed(PointerId(1)));
        assert_eq!(state.by_id(PointerId(1)), None);
    }
}
