// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Pointer: pointer and touch interaction for retained 2D scenes.
//!
//! This crate turns raw pointer-style and touch-list input into node-level
//! events: hover transitions, presses and releases, click and double click,
//! tap and double tap, and a thresholded drag lifecycle. It supports explicit
//! pointer capture and many simultaneous pointers.
//!
//! The crate does not store nodes. A scene implements the [`Scene`] contract
//! (structure, hit regions, interaction flags, listener invocation) and the
//! [`Engine`] drives it:
//!
//! - [`pointer`]: current and changed pointer positions in surface space
//! - [`hit`]: topmost listening node under a point
//! - [`capture`]: pointer-to-node overrides of hit testing
//! - [`click`]: single vs. double click/tap windows
//! - [`drag`]: per-node drag attempts and their status
//! - [`engine`]: routing, bubbling, hover synthesis and drag phases
//!
//! ## Event ordering
//!
//! - `pointerout`/`pointerleave` on the old target always precede
//!   `pointerover`/`pointerenter` on the new one.
//! - A release that ends drags first marks every affected drag stopped, then
//!   delivers `pointerup`, then fires `dragend` for each of them. No click is
//!   produced by that release.
//! - Every release re-arms the click window, so at most one is ever pending.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_pointer::{
//!     Engine, EventKind, NativeInput, NativePointer, PointerAction, PointerEvent, PointerId,
//!     Scene,
//! };
//!
//! /// Root 0 holds layer 1, which holds one square shape 2.
//! struct Square {
//!     children: [Vec<u32>; 3],
//!     fired: Vec<(EventKind, u32)>,
//! }
//!
//! impl Scene for Square {
//!     type Node = u32;
//!     fn root(&self) -> u32 { 0 }
//!     fn children(&self, node: u32) -> &[u32] { &self.children[node as usize] }
//!     fn parent(&self, node: u32) -> Option<u32> { node.checked_sub(1) }
//!     fn contains(&self, node: u32, p: Point) -> bool {
//!         node == 2 && Rect::new(0.0, 0.0, 20.0, 20.0).contains(p)
//!     }
//!     fn is_listening(&self, _: u32) -> bool { true }
//!     fn is_attached(&self, _: u32) -> bool { true }
//!     fn kind(&self, node: u32) -> &str { ["Stage", "Layer", "Shape"][node as usize] }
//!     fn fire(&mut self, node: u32, event: &mut PointerEvent<u32>) {
//!         if node == event.target {
//!             self.fired.push((event.kind, node));
//!         }
//!     }
//! }
//!
//! let mut scene = Square { children: [vec![1], vec![2], vec![]], fired: vec![] };
//! let mut engine = Engine::default();
//! let mouse = NativePointer::mouse(PointerId(1), Point::new(10.0, 10.0)).with_button(0);
//!
//! engine.register_pointer_input(&mut scene, &NativeInput::pointer(PointerAction::Down, mouse, 0));
//! engine.register_pointer_input(&mut scene, &NativeInput::pointer(PointerAction::Up, mouse, 50));
//!
//! assert_eq!(
//!     scene.fired,
//!     [(EventKind::PointerDown, 2), (EventKind::PointerUp, 2), (EventKind::Click, 2)]
//! );
//! ```
//!
//! ## Features
//!
//! - `std` (default): build Kurbo with the standard library.
//! - `libm`: build Kurbo's floating point support on `libm` for `no_std` targets.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod capture;
pub mod click;
pub mod config;
mod dispatch;
pub mod drag;
pub mod engine;
pub mod event;
pub mod hit;
pub mod input;
pub mod pointer;
mod route;
pub mod scene;

pub use config::{InteractionConfig, TouchSource};
pub use engine::Engine;
pub use event::{EventDetail, EventKind, PointerEvent};
pub use input::{
    InputSource, NativeInput, NativePointer, PointerAction, PointerId, PointerType, Touch,
    TouchAction,
};
pub use pointer::SurfaceRect;
pub use scene::Scene;
