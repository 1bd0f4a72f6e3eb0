// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stage tree and its [`Scene`] implementation.

use alloc::rc::Rc;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect};
use log::debug;
use smallvec::SmallVec;
use understory_pointer::event::{EventKind, PointerEvent};
use understory_pointer::hit::topmost_listening;
use understory_pointer::scene::Scene;

use crate::redraw::Redraws;
use crate::types::{NodeFlags, NodeId, NodeKind, StageError};

type Listener = Rc<dyn Fn(&mut Stage, &mut PointerEvent<NodeId>)>;
type DragBound = Rc<dyn Fn(Point) -> Point>;

struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    position: Point,
    bounds: Rect,
    flags: NodeFlags,
    drag_distance: Option<f64>,
    drag_bound: Option<DragBound>,
    listeners: Vec<(EventKind, Listener)>,
}

impl NodeData {
    fn new(kind: NodeKind, parent: Option<NodeId>, bounds: Rect) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            position: Point::ZERO,
            bounds,
            flags: NodeFlags::default(),
            drag_distance: None,
            drag_bound: None,
            listeners: Vec::new(),
        }
    }
}

struct Slot {
    generation: u32,
    node: Option<NodeData>,
}

/// A retained stage: one root, layers under it, groups and shapes under layers.
///
/// Shapes carry a local hit rectangle; every node carries a position relative
/// to its parent. Listeners are registered per node and event name and are
/// invoked by the pointer engine through [`Scene::fire`].
pub struct Stage {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    redraws: Redraws,
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("root", &self.root)
            .field("nodes", &self.len())
            .field("redraws", &self.redraws)
            .finish_non_exhaustive()
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    /// Create an empty stage.
    pub fn new() -> Self {
        let root = NodeId::new(0, 1);
        Self {
            slots: alloc::vec![Slot {
                generation: 1,
                node: Some(NodeData::new(NodeKind::Stage, None, Rect::ZERO)),
            }],
            free: Vec::new(),
            root,
            redraws: Redraws::default(),
        }
    }

    /// The stage node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, the stage included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// Whether only the stage node exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Whether `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, StageError> {
        self.slots
            .get_mut(id.idx())
            .filter(|slot| slot.generation == id.1)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(StageError::StaleNode(id))
    }

    fn insert(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        bounds: Rect,
    ) -> Result<NodeId, StageError> {
        let parent_kind = self.node(parent).ok_or(StageError::StaleNode(parent))?.kind;
        if !parent_kind.accepts(kind) {
            return Err(StageError::InvalidParent {
                parent: parent_kind,
                child: kind,
            });
        }
        Ok(self.push_node(parent, kind, bounds))
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot counts beyond u32::MAX are not supported"
    )]
    fn push_node(&mut self, parent: NodeId, kind: NodeKind, bounds: Rect) -> NodeId {
        let data = NodeData::new(kind, Some(parent), bounds);
        let id = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation += 1;
            slot.node = Some(data);
            NodeId::new(idx, slot.generation)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 1,
                node: Some(data),
            });
            NodeId::new(idx, 1)
        };
        if let Some(parent) = self.slots[parent.idx()].node.as_mut() {
            parent.children.push(id);
        }
        id
    }

    /// Add a layer on top of the existing ones.
    pub fn add_layer(&mut self) -> NodeId {
        let id = self.push_node(self.root, NodeKind::Layer, Rect::ZERO);
        self.redraws.request(id);
        id
    }

    /// Add a group on top of `parent`'s children.
    pub fn add_group(&mut self, parent: NodeId) -> Result<NodeId, StageError> {
        self.insert(parent, NodeKind::Group, Rect::ZERO)
    }

    /// Add a shape with a local hit rectangle on top of `parent`'s children.
    pub fn add_shape(&mut self, parent: NodeId, bounds: Rect) -> Result<NodeId, StageError> {
        let id = self.insert(parent, NodeKind::Shape, bounds)?;
        self.request_redraw(id);
        Ok(id)
    }

    /// Remove `id` and its whole subtree. Removed ids become stale.
    ///
    /// Tell the pointer engine first (`Engine::node_detached`) so a running
    /// drag can end and captures are released while the node is still attached.
    pub fn remove(&mut self, id: NodeId) -> Result<(), StageError> {
        if id == self.root {
            return Err(StageError::RootRemoval);
        }
        let parent = self.node(id).ok_or(StageError::StaleNode(id))?.parent;
        self.request_redraw(id);
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
        }
        let mut stack = alloc::vec![id];
        while let Some(n) = stack.pop() {
            let Some(data) = self.slots[n.idx()].node.take() else {
                continue;
            };
            if data.kind == NodeKind::Layer {
                self.redraws.forget(n);
            }
            stack.extend(data.children);
            self.free.push(n.0);
        }
        debug!("removed {id:?}");
        Ok(())
    }

    /// Kind of a live node.
    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|n| n.kind)
    }

    /// Parent of a live node.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of a live node, bottom-most first.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// The layer that owns `id` (a layer owns itself).
    pub fn layer_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(n) = current {
            let data = self.node(n)?;
            if data.kind == NodeKind::Layer {
                return Some(n);
            }
            current = data.parent;
        }
        None
    }

    /// Flags of a live node.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node(id).map(|n| n.flags)
    }

    fn set_flag(&mut self, id: NodeId, flag: NodeFlags, value: bool) -> Result<(), StageError> {
        self.node_mut(id)?.flags.set(flag, value);
        Ok(())
    }

    /// Let `id` (and its subtree) receive input or not.
    pub fn set_listening(&mut self, id: NodeId, listening: bool) -> Result<(), StageError> {
        self.set_flag(id, NodeFlags::LISTENING, listening)
    }

    /// Show or hide `id` and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), StageError> {
        self.set_flag(id, NodeFlags::VISIBLE, visible)?;
        self.request_redraw(id);
        Ok(())
    }

    /// Make `id` draggable by pressing on it or on a descendant.
    pub fn set_draggable(&mut self, id: NodeId, draggable: bool) -> Result<(), StageError> {
        self.set_flag(id, NodeFlags::DRAGGABLE, draggable)
    }

    /// Override the drag threshold for `id`; `None` uses the engine's default.
    pub fn set_drag_distance(
        &mut self,
        id: NodeId,
        distance: Option<f64>,
    ) -> Result<(), StageError> {
        self.node_mut(id)?.drag_distance = distance;
        Ok(())
    }

    /// Constrain the absolute position `id` may be dragged to.
    pub fn set_drag_bound(
        &mut self,
        id: NodeId,
        bound: impl Fn(Point) -> Point + 'static,
    ) -> Result<(), StageError> {
        self.node_mut(id)?.drag_bound = Some(Rc::new(bound));
        Ok(())
    }

    /// Remove the drag constraint of `id`.
    pub fn clear_drag_bound(&mut self, id: NodeId) -> Result<(), StageError> {
        self.node_mut(id)?.drag_bound = None;
        Ok(())
    }

    /// Position of `id` relative to its parent.
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.node(id).map(|n| n.position)
    }

    /// Move `id` relative to its parent.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), StageError> {
        self.node_mut(id)?.position = position;
        self.request_redraw(id);
        Ok(())
    }

    /// Position of `id`'s origin on the stage.
    pub fn absolute_position_of(&self, id: NodeId) -> Option<Point> {
        let mut data = self.node(id)?;
        let mut absolute = data.position;
        while let Some(parent) = data.parent {
            data = self.node(parent)?;
            absolute += data.position.to_vec2();
        }
        Some(absolute)
    }

    /// Local hit rectangle of a shape.
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.node(id).map(|n| n.bounds)
    }

    /// Hit rectangle of a shape on the stage.
    pub fn absolute_bounds(&self, id: NodeId) -> Option<Rect> {
        let origin = self.absolute_position_of(id)?;
        Some(self.node(id)?.bounds + origin.to_vec2())
    }

    /// Whether `id` and all of its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.all_ancestors(id, NodeFlags::VISIBLE)
    }

    fn all_ancestors(&self, id: NodeId, flag: NodeFlags) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            let Some(data) = self.node(n) else {
                return false;
            };
            if !data.flags.contains(flag) {
                return false;
            }
            current = data.parent;
        }
        true
    }

    /// Register `listener` on `id` for each whitespace-separated event name in `names`.
    ///
    /// Unknown names are rejected before anything is registered.
    pub fn on(
        &mut self,
        id: NodeId,
        names: &str,
        listener: impl Fn(&mut Self, &mut PointerEvent<NodeId>) + 'static,
    ) -> Result<(), StageError> {
        let kinds = parse_names(names)?;
        let listener: Listener = Rc::new(listener);
        let data = self.node_mut(id)?;
        for kind in kinds {
            data.listeners.push((kind, Rc::clone(&listener)));
        }
        Ok(())
    }

    /// Remove every listener on `id` for the whitespace-separated event names in `names`.
    pub fn off(&mut self, id: NodeId, names: &str) -> Result<(), StageError> {
        let kinds = parse_names(names)?;
        let data = self.node_mut(id)?;
        data.listeners.retain(|(k, _)| !kinds.contains(k));
        Ok(())
    }

    /// Number of listeners on `id` for `kind`.
    pub fn listener_count(&self, id: NodeId, kind: EventKind) -> usize {
        self.node(id)
            .map_or(0, |n| n.listeners.iter().filter(|(k, _)| *k == kind).count())
    }

    /// Ask for the layer owning `id` to be redrawn.
    pub fn request_redraw(&mut self, id: NodeId) {
        if let Some(layer) = self.layer_of(id) {
            self.redraws.request(layer);
        }
    }

    /// Redraw bookkeeping.
    pub fn redraws(&self) -> &Redraws {
        &self.redraws
    }

    /// Drain the layers pending a redraw.
    pub fn take_redraws(&mut self) -> Vec<NodeId> {
        self.redraws.take()
    }

    /// Topmost listening node under `point`.
    pub fn hit(&self, point: Point) -> Option<NodeId> {
        topmost_listening(self, point, None)
    }

    /// Nearest node of `kind` at or above the topmost listening node under `point`.
    pub fn hit_kind(&self, point: Point, kind: NodeKind) -> Option<NodeId> {
        topmost_listening(self, point, Some(kind.as_str()))
    }
}

fn parse_names(names: &str) -> Result<SmallVec<[EventKind; 4]>, StageError> {
    names
        .split_whitespace()
        .map(|name| {
            EventKind::from_name(name).ok_or_else(|| StageError::UnknownEvent(name.to_string()))
        })
        .collect()
}

impl Scene for Stage {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.children_of(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_of(node)
    }

    fn contains(&self, node: NodeId, point: Point) -> bool {
        self.kind_of(node) == Some(NodeKind::Shape)
            && self.is_visible(node)
            && self.absolute_bounds(node).is_some_and(|r| r.contains(point))
    }

    fn is_listening(&self, node: NodeId) -> bool {
        self.all_ancestors(node, NodeFlags::LISTENING)
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.is_alive(node)
    }

    fn kind(&self, node: NodeId) -> &str {
        self.kind_of(node).map_or("", NodeKind::as_str)
    }

    fn fire(&mut self, node: NodeId, event: &mut PointerEvent<NodeId>) {
        let Some(data) = self.node(node) else {
            return;
        };
        let listeners: SmallVec<[Listener; 4]> = data
            .listeners
            .iter()
            .filter(|(k, _)| *k == event.kind)
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            (*listener)(self, event);
        }
    }

    fn is_draggable(&self, node: NodeId) -> bool {
        self.flags(node)
            .is_some_and(|f| f.contains(NodeFlags::DRAGGABLE))
    }

    fn drag_distance(&self, node: NodeId) -> Option<f64> {
        self.node(node).and_then(|n| n.drag_distance)
    }

    fn absolute_position(&self, node: NodeId) -> Point {
        self.absolute_position_of(node).unwrap_or(Point::ZERO)
    }

    fn set_absolute_position(&mut self, node: NodeId, position: Point) {
        let parent_origin = self
            .parent_of(node)
            .and_then(|p| self.absolute_position_of(p))
            .unwrap_or(Point::ZERO);
        if let Ok(data) = self.node_mut(node) {
            data.position = position - parent_origin.to_vec2();
        }
    }

    fn bound_drag_position(&self, node: NodeId, position: Point) -> Point {
        match self.node(node).and_then(|n| n.drag_bound.clone()) {
            Some(bound) => bound(position),
            None => position,
        }
    }

    fn redraw(&mut self, node: NodeId) {
        self.request_redraw(node);
    }
}
