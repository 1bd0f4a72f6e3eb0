// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the stage: node identifiers, flags, kinds and errors.

use alloc::string::String;
use core::fmt;

/// Identifier for a node on the stage.
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Stale ids never alias a different live node, so capture and drag entries
/// held by the pointer engine cannot leak onto a node created later.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags controlling rendering, input and dragging.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is drawn and can be hit.
        const VISIBLE   = 0b0000_0001;
        /// Node accepts input; clearing it prunes the whole subtree from hit testing.
        const LISTENING = 0b0000_0010;
        /// Pressing on the node (or a descendant) arms a drag.
        const DRAGGABLE = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::LISTENING
    }
}

/// Kind of a stage node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The stage itself (the root).
    Stage,
    /// Top-level container with its own redraw cycle.
    Layer,
    /// Container inside a layer.
    Group,
    /// Leaf with a hit region.
    Shape,
}

impl NodeKind {
    /// Type name used by kind-filtered hit tests.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stage => "Stage",
            Self::Layer => "Layer",
            Self::Group => "Group",
            Self::Shape => "Shape",
        }
    }

    /// Whether a node of this kind may hold `child`.
    pub const fn accepts(self, child: Self) -> bool {
        matches!(
            (self, child),
            (Self::Stage, Self::Layer)
                | (Self::Layer | Self::Group, Self::Group | Self::Shape)
        )
    }
}

/// Misuse of the stage API.
#[derive(Clone, PartialEq, Eq)]
pub enum StageError {
    /// The id refers to a removed node.
    StaleNode(NodeId),
    /// A node of kind `child` cannot be placed under a node of kind `parent`.
    InvalidParent {
        /// Kind of the requested parent.
        parent: NodeKind,
        /// Kind of the node being added.
        child: NodeKind,
    },
    /// The event name is not one the engine emits.
    UnknownEvent(String),
    /// The stage root cannot be removed.
    RootRemoval,
}

impl fmt::Debug for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "StaleNode({id:?})"),
            Self::InvalidParent { parent, child } => {
                write!(f, "InvalidParent {{ parent: {parent:?}, child: {child:?} }}")
            }
            Self::UnknownEvent(name) => write!(f, "UnknownEvent({name:?})"),
            Self::RootRemoval => f.write_str("RootRemoval"),
        }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "node {id:?} has been removed"),
            Self::InvalidParent { parent, child } => write!(
                f,
                "a {} cannot be added to a {}",
                child.as_str(),
                parent.as_str()
            ),
            Self::UnknownEvent(name) => write!(f, "unknown event name {name:?}"),
            Self::RootRemoval => f.write_str("the stage root cannot be removed"),
        }
    }
}

impl core::error::Error for StageError {}
