// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Stage: a small retained 2D stage driven by `understory_pointer`.
//!
//! The stage is a strict hierarchy: the stage root holds layers, layers hold
//! groups and shapes, groups hold groups and shapes. Later children are drawn
//! on top of earlier ones. It implements the
//! [`Scene`](understory_pointer::Scene) contract so an
//! [`Engine`](understory_pointer::Engine) can hit test it, deliver events to
//! listeners registered by name, and move draggable nodes.
//!
//! - [`Stage`]: node storage, listeners, positions, drag settings and redraw bookkeeping.
//! - [`NodeId`]: generational handle of a node.
//! - [`NodeFlags`]: visibility, listening and draggable controls.
//! - [`NodeKind`]: stage, layer, group or shape.
//! - [`StageError`]: misuse of the tree API.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::{Point, Rect};
//! use understory_pointer::{Engine, NativeInput, NativePointer, PointerAction, PointerId};
//! use understory_stage::Stage;
//!
//! let mut stage = Stage::new();
//! let layer = stage.add_layer();
//! let shape = stage.add_shape(layer, Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
//! stage.set_draggable(shape, true).unwrap();
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&log);
//! stage
//!     .on(shape, "dragstart dragmove dragend click", move |_, event| {
//!         sink.borrow_mut().push(event.kind.as_str());
//!     })
//!     .unwrap();
//!
//! let mut engine = Engine::default();
//! let at = |x, y| NativePointer::mouse(PointerId(1), Point::new(x, y)).with_button(0);
//! for (action, x, y) in [
//!     (PointerAction::Down, 10.0, 10.0),
//!     (PointerAction::Move, 20.0, 10.0),
//!     (PointerAction::Up, 20.0, 10.0),
//! ] {
//!     engine.register_pointer_input(&mut stage, &NativeInput::pointer(action, at(x, y), 0));
//! }
//!
//! assert_eq!(*log.borrow(), ["dragstart", "dragmove", "dragend"]);
//! assert_eq!(stage.position(shape), Some(Point::new(10.0, 0.0)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod redraw;
mod stage;
mod types;

pub use redraw::Redraws;
pub use stage::Stage;
pub use types::{NodeFlags, NodeId, NodeKind, StageError};
