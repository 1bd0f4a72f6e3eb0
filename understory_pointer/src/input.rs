// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native input model: the raw pointer-style and touch-list events fed to the engine.
//!
//! Hosts translate whatever their windowing layer delivers into [`NativeInput`]
//! values. Coordinates are in client (window) space; the engine maps them into
//! surface space through [`SurfaceRect`](crate::pointer::SurfaceRect).
//!
//! ```
//! use kurbo::Point;
//! use understory_pointer::input::{NativeInput, NativePointer, PointerAction, PointerId};
//!
//! let down = NativeInput::pointer(
//!     PointerAction::Down,
//!     NativePointer::mouse(PointerId(1), Point::new(10.0, 10.0)).with_button(0),
//!     1_000,
//! );
//! assert_eq!(down.time(), 1_000);
//! ```

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

/// Identifier of one input contact (a mouse, a pen, or one finger).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u32);

/// Device class of a contact.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointerType {
    /// A mouse or trackpad cursor.
    #[default]
    Mouse,
    /// A stylus.
    Pen,
    /// A finger on a touch screen.
    Touch,
}

/// The pointer-style action a native event reports.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerAction {
    /// The pointer entered the surface.
    Enter,
    /// The pointer moved over the surface element.
    Over,
    /// The pointer left the surface element.
    Out,
    /// The pointer left the surface.
    Leave,
    /// A button was pressed or a contact started.
    Down,
    /// The pointer moved.
    Move,
    /// A button was released or a contact ended.
    Up,
    /// The platform cancelled the contact.
    Cancel,
    /// The platform revoked pointer capture.
    LostCapture,
    /// A context menu was requested.
    ContextMenu,
    /// A wheel or trackpad scroll, with its delta.
    Wheel(Vec2),
}

/// One pointer as reported by a pointer-style native event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NativePointer {
    /// Contact identifier.
    pub id: PointerId,
    /// Device class.
    pub pointer_type: PointerType,
    /// Whether this is the primary pointer of its device class.
    pub is_primary: bool,
    /// Position in client space.
    pub client: Point,
    /// The button that changed state, if any (`0` is the primary button).
    pub button: Option<u16>,
}

impl NativePointer {
    /// A primary pointer of the given type at `client`.
    pub fn new(id: PointerId, pointer_type: PointerType, client: Point) -> Self {
        Self {
            id,
            pointer_type,
            is_primary: true,
            client,
            button: None,
        }
    }

    /// A mouse pointer at `client`.
    pub fn mouse(id: PointerId, client: Point) -> Self {
        Self::new(id, PointerType::Mouse, client)
    }

    /// A touch-originated pointer at `client`.
    pub fn touch(id: PointerId, client: Point) -> Self {
        Self::new(id, PointerType::Touch, client)
    }

    /// A pen pointer at `client`.
    pub fn pen(id: PointerId, client: Point) -> Self {
        Self::new(id, PointerType::Pen, client)
    }

    /// Set the button that changed state.
    pub fn with_button(mut self, button: u16) -> Self {
        self.button = Some(button);
        self
    }

    /// Set the primary flag.
    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }
}

/// A pointer-style native event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerInput {
    /// What happened.
    pub action: PointerAction,
    /// The pointer it happened to.
    pub pointer: NativePointer,
    /// Host timestamp in milliseconds.
    pub time: u64,
}

/// The touch-list action a native event reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TouchAction {
    /// One or more contacts started.
    Start,
    /// One or more contacts moved.
    Move,
    /// One or more contacts ended.
    End,
    /// The platform cancelled one or more contacts.
    Cancel,
}

/// One contact of a touch-list event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Touch {
    /// Contact identifier.
    pub id: PointerId,
    /// Position in client space.
    pub client: Point,
}

impl Touch {
    /// A contact at `client`.
    pub fn new(id: PointerId, client: Point) -> Self {
        Self { id, client }
    }
}

/// Small ordered list of touches; most events carry one or two.
pub type TouchList = SmallVec<[Touch; 4]>;

/// A touch-list native event.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchInput {
    /// What happened.
    pub action: TouchAction,
    /// Every contact still on the surface after this event.
    pub touches: TouchList,
    /// The contacts this event is about. Empty means "all of `touches`".
    pub changed: TouchList,
    /// Host timestamp in milliseconds.
    pub time: u64,
}

/// Which native family an event belongs to, with the device class for pointer-style input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// Pointer-style input of the given device class.
    Pointer(PointerType),
    /// Touch-list input.
    Touch,
}

/// Any native input event.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeInput {
    /// Pointer-style event.
    Pointer(PointerInput),
    /// Touch-list event.
    Touch(TouchInput),
}

impl NativeInput {
    /// Build a pointer-style event.
    pub fn pointer(action: PointerAction, pointer: NativePointer, time: u64) -> Self {
        Self::Pointer(PointerInput {
            action,
            pointer,
            time,
        })
    }

    /// Build a touch-list event.
    ///
    /// `changed` may be empty, in which case every touch counts as changed.
    pub fn touch(
        action: TouchAction,
        touches: impl IntoIterator<Item = Touch>,
        changed: impl IntoIterator<Item = Touch>,
        time: u64,
    ) -> Self {
        Self::Touch(TouchInput {
            action,
            touches: touches.into_iter().collect(),
            changed: changed.into_iter().collect(),
            time,
        })
    }

    /// Host timestamp in milliseconds.
    pub fn time(&self) -> u64 {
        match self {
            Self::Pointer(p) => p.time,
            Self::Touch(t) => t.time,
        }
    }

    /// The native family (and device class) of this event.
    pub fn source(&self) -> InputSource {
        match self {
            Self::Pointer(p) => InputSource::Pointer(p.pointer.pointer_type),
            Self::Touch(_) => InputSource::Touch,
        }
    }
}
