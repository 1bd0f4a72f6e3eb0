// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag registry: per-node drag attempts and their forward-only status.
//!
//! ## Lifecycle
//!
//! 1) An attempt is armed in [`DragStatus::Ready`] with a start position and the
//!    offset between the pointer and the node's origin.
//! 2) Once its pointer moves far enough, [`DragController::begin`] moves it to
//!    [`DragStatus::Dragging`].
//! 3) A terminating event stops it in two passes: [`DragController::stop_batch`]
//!    marks every affected attempt [`DragStatus::Stopped`], then
//!    [`DragController::take_finished`] removes them one by one.
//!
//! The registry only holds state. Firing `dragstart`/`dragmove`/`dragend` and
//! moving nodes is done by the [`Engine`](crate::engine::Engine).
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_pointer::drag::{DragAttempt, DragController, DragStatus};
//! use understory_pointer::input::PointerId;
//!
//! let mut drags = DragController::new();
//! drags.arm(DragAttempt::new(7_u32, Some(PointerId(1)), Point::ZERO, Vec2::ZERO));
//!
//! // Below the threshold nothing happens.
//! let attempt = drags.attempt(7).unwrap();
//! assert!(!attempt.exceeds_threshold(Point::new(1.0, 2.0), 3.0));
//! assert!(attempt.exceeds_threshold(Point::new(1.0, 3.0), 3.0));
//!
//! drags.begin(7);
//! assert!(drags.is_dragging());
//! assert_eq!(drags.status(7), Some(DragStatus::Dragging));
//! ```

use alloc::vec::Vec;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::input::PointerId;
use crate::pointer::PointerState;

/// Status of one attempt. Transitions only move forward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DragStatus {
    /// Armed, waiting for the pointer to pass the threshold.
    Ready,
    /// The node follows the pointer.
    Dragging,
    /// Terminal; the attempt is removed once the terminating event is processed.
    Stopped,
}

/// One node's drag gesture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragAttempt<K> {
    /// The dragged node.
    pub node: K,
    /// The pointer driving the drag; bound lazily when `None`.
    pub pointer_id: Option<PointerId>,
    /// Pointer position when the attempt was armed.
    pub start: Point,
    /// Pointer position minus the node's absolute origin at arm time.
    pub offset: Vec2,
    /// Current status.
    pub status: DragStatus,
    /// Last node position applied while dragging.
    pub last_position: Option<Point>,
}

impl<K> DragAttempt<K> {
    /// A fresh attempt in [`DragStatus::Ready`].
    pub fn new(node: K, pointer_id: Option<PointerId>, start: Point, offset: Vec2) -> Self {
        Self {
            node,
            pointer_id,
            start,
            offset,
            status: DragStatus::Ready,
            last_position: None,
        }
    }

    /// Whether `position` is at least `threshold` away from the start along either axis.
    pub fn exceeds_threshold(&self, position: Point, threshold: f64) -> bool {
        let d = position - self.start;
        d.x.abs().max(d.y.abs()) >= threshold
    }
}

/// Nodes affected by one terminating event.
pub type DragBatch<K> = SmallVec<[K; 4]>;

/// Registry of drag attempts, at most one per node, kept in creation order.
#[derive(Clone, Debug)]
pub struct DragController<K> {
    attempts: Vec<DragAttempt<K>>,
    just_dragged: bool,
    starting: Option<K>,
}

impl<K> Default for DragController<K> {
    fn default() -> Self {
        Self {
            attempts: Vec::new(),
            just_dragged: false,
            starting: None,
        }
    }
}

impl<K: Copy + PartialEq> DragController<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// All attempts, in creation order.
    pub fn attempts(&self) -> &[DragAttempt<K>] {
        &self.attempts
    }

    /// The attempt for `node`.
    pub fn attempt(&self, node: K) -> Option<&DragAttempt<K>> {
        self.attempts.iter().find(|a| a.node == node)
    }

    /// The attempt for `node`, mutably.
    pub fn attempt_mut(&mut self, node: K) -> Option<&mut DragAttempt<K>> {
        self.attempts.iter_mut().find(|a| a.node == node)
    }

    /// Status of the attempt for `node`.
    pub fn status(&self, node: K) -> Option<DragStatus> {
        self.attempt(node).map(|a| a.status)
    }

    /// Snapshot of the nodes with an attempt, in creation order.
    pub fn nodes(&self) -> DragBatch<K> {
        self.attempts.iter().map(|a| a.node).collect()
    }

    /// Whether any attempt is dragging.
    pub fn is_dragging(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| a.status == DragStatus::Dragging)
    }

    /// Whether `node` is dragging.
    pub fn is_node_dragging(&self, node: K) -> bool {
        self.status(node) == Some(DragStatus::Dragging)
    }

    /// The first dragging node, in creation order.
    pub fn dragged_node(&self) -> Option<K> {
        self.attempts
            .iter()
            .find(|a| a.status == DragStatus::Dragging)
            .map(|a| a.node)
    }

    /// Whether the current gesture ended a drag.
    pub fn just_dragged(&self) -> bool {
        self.just_dragged
    }

    /// Mark the current gesture as having ended a drag.
    pub fn set_just_dragged(&mut self) {
        self.just_dragged = true;
    }

    /// Forget that a drag ended; called when a new press starts.
    pub fn clear_just_dragged(&mut self) {
        self.just_dragged = false;
    }

    /// The node whose `dragstart` is being delivered, if any.
    pub fn starting(&self) -> Option<K> {
        self.starting
    }

    /// Register an attempt, replacing a ready one for the same node.
    ///
    /// Returns `false` (and changes nothing) if the node is already dragging or stopping.
    pub fn arm(&mut self, attempt: DragAttempt<K>) -> bool {
        match self.attempts.iter().position(|a| a.node == attempt.node) {
            Some(i) if self.attempts[i].status == DragStatus::Ready => {
                self.attempts[i] = attempt;
                true
            }
            Some(_) => false,
            None => {
                self.attempts.push(attempt);
                true
            }
        }
    }

    /// Bind an unbound attempt to the first changed pointer and return the
    /// changed position of its pointer, if the last event moved it.
    pub fn bind_changed(&mut self, node: K, pointers: &PointerState) -> Option<Point> {
        let attempt = self.attempt_mut(node)?;
        if attempt.pointer_id.is_none() {
            attempt.pointer_id = pointers.first_changed().map(|p| p.id);
        }
        pointers.changed_position(attempt.pointer_id?)
    }

    /// Move a ready attempt to dragging and remember it as the one starting.
    ///
    /// Returns `false` if there is no ready attempt for `node`.
    pub fn begin(&mut self, node: K) -> bool {
        let Some(attempt) = self.attempt_mut(node) else {
            return false;
        };
        if attempt.status != DragStatus::Ready {
            return false;
        }
        attempt.status = DragStatus::Dragging;
        self.starting = Some(node);
        true
    }

    /// Finish delivering `dragstart`; returns whether the attempt is still dragging.
    pub fn finish_begin(&mut self, node: K) -> bool {
        if self.starting == Some(node) {
            self.starting = None;
        }
        self.is_node_dragging(node)
    }

    /// Move the attempt for `node` to stopped. Returns its previous status.
    pub fn stop(&mut self, node: K) -> Option<DragStatus> {
        let attempt = self.attempt_mut(node)?;
        let previous = attempt.status;
        attempt.status = DragStatus::Stopped;
        Some(previous)
    }

    /// Remove the attempt for `node`.
    pub fn remove(&mut self, node: K) -> Option<DragAttempt<K>> {
        let i = self.attempts.iter().position(|a| a.node == node)?;
        Some(self.attempts.remove(i))
    }

    /// First pass of a drag stop for the pointers changed by a terminating event.
    ///
    /// Every attempt bound to a changed pointer joins the batch (unbound
    /// attempts bind first). Dragging or stopped attempts become stopped and
    /// set the just-dragged flag.
    pub fn stop_batch(&mut self, pointers: &PointerState) -> DragBatch<K> {
        let first = pointers.first_changed().map(|p| p.id);
        let mut batch = DragBatch::new();
        for attempt in &mut self.attempts {
            if attempt.pointer_id.is_none() {
                attempt.pointer_id = first;
            }
            let Some(id) = attempt.pointer_id else {
                continue;
            };
            if !pointers.is_changed(id) {
                continue;
            }
            if attempt.status != DragStatus::Ready {
                attempt.status = DragStatus::Stopped;
                self.just_dragged = true;
            }
            batch.push(attempt.node);
        }
        batch
    }

    /// Second pass of a drag stop: remove the attempt for `node` unless it is
    /// (again) dragging, returning what was removed.
    pub fn take_finished(&mut self, node: K) -> Option<DragAttempt<K>> {
        if self.is_node_dragging(node) {
            return None;
        }
        self.remove(node)
    }
}
