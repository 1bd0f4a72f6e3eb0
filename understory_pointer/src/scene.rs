// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene contract consumed by the engine.
//!
//! The engine does not store nodes. It reads structure (root, children, parents),
//! per-node interaction flags and geometry through [`Scene`], and delivers events
//! by calling [`Scene::fire`] once per node visited during dispatch.
//!
//! Node handles are expected to be small, copyable, and to stay distinguishable
//! after removal (for example generational ids), so stale capture or drag entries
//! never alias a different live node.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Point;

use crate::event::PointerEvent;

/// A retained 2D scene the engine can hit test, walk, and deliver events into.
///
/// The root is the surface itself. Its children are the top-level containers
/// (layers), in drawing order. Nodes whose own render region is empty
/// (containers) simply report `false` from [`contains`](Self::contains).
pub trait Scene {
    /// Node handle.
    type Node: Copy + Eq + Hash + Debug;

    /// The surface node; every attached node has it as its outermost ancestor.
    fn root(&self) -> Self::Node;

    /// Children of a node, bottom-most first (the last child is drawn on top).
    fn children(&self, node: Self::Node) -> &[Self::Node];

    /// Parent of a node, or `None` for the root and for detached nodes.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Whether the node's own render region contains `point` (surface space).
    ///
    /// Invisible nodes should report `false`.
    fn contains(&self, node: Self::Node, point: Point) -> bool;

    /// Whether the node accepts input, taking its ancestors into account.
    fn is_listening(&self, node: Self::Node) -> bool;

    /// Whether the node is alive and reachable from the root.
    fn is_attached(&self, node: Self::Node) -> bool;

    /// Type name used by kind-filtered hit tests (for example `"Shape"` or `"Group"`).
    fn kind(&self, node: Self::Node) -> &str;

    /// Invoke the listeners registered on `node` for `event.kind`.
    ///
    /// Listeners may cancel bubbling or queue engine requests on the event.
    /// They run before the engine moves on to the next node.
    fn fire(&mut self, node: Self::Node, event: &mut PointerEvent<Self::Node>);

    /// Whether pressing on the node (or a descendant) should arm a drag.
    fn is_draggable(&self, _node: Self::Node) -> bool {
        false
    }

    /// Per-node drag threshold override, in surface pixels.
    fn drag_distance(&self, _node: Self::Node) -> Option<f64> {
        None
    }

    /// Absolute (surface space) position of the node's origin.
    fn absolute_position(&self, _node: Self::Node) -> Point {
        Point::ZERO
    }

    /// Move the node so that its origin lands on `position` (surface space).
    fn set_absolute_position(&mut self, _node: Self::Node, _position: Point) {}

    /// Constrain a proposed drag position; the default accepts it unchanged.
    fn bound_drag_position(&self, _node: Self::Node, position: Point) -> Point {
        position
    }

    /// Schedule a redraw of whatever layer owns the node.
    fn redraw(&mut self, _node: Self::Node) {}

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}
