// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capture table: explicit pointer-to-node overrides of hit testing.
//!
//! An entry only records the relation; the captured node is never owned by
//! the table. Entries whose node has been detached are pruned on the next
//! lookup through [`CaptureTable::owner_attached`], or eagerly with
//! [`CaptureTable::release_node`].

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::input::PointerId;
use crate::scene::Scene;

/// Map from pointer id to the node that captured it.
#[derive(Clone, Debug)]
pub struct CaptureTable<K> {
    entries: HashMap<PointerId, K>,
}

impl<K> Default for CaptureTable<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq> CaptureTable<K> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `id` for `node`, replacing any previous owner.
    ///
    /// Detached nodes are rejected without touching the table.
    pub fn capture<S: Scene<Node = K> + ?Sized>(
        &mut self,
        scene: &S,
        id: PointerId,
        node: K,
    ) -> CaptureOutcome<K> {
        if !scene.is_attached(node) {
            return CaptureOutcome::Rejected;
        }
        match self.entries.insert(id, node) {
            Some(previous) if previous == node => CaptureOutcome::Unchanged,
            Some(previous) => CaptureOutcome::Replaced(previous),
            None => CaptureOutcome::Captured,
        }
    }

    /// Release the capture for `id`, returning the former owner.
    pub fn release(&mut self, id: PointerId) -> Option<K> {
        self.entries.remove(&id)
    }

    /// The node capturing `id`, attached or not.
    pub fn owner(&self, id: PointerId) -> Option<K> {
        self.entries.get(&id).copied()
    }

    /// The node capturing `id`, dropping the entry if that node is no longer attached.
    pub fn owner_attached<S: Scene<Node = K> + ?Sized>(
        &mut self,
        scene: &S,
        id: PointerId,
    ) -> Option<K> {
        let owner = self.owner(id)?;
        if scene.is_attached(owner) {
            Some(owner)
        } else {
            self.entries.remove(&id);
            None
        }
    }

    /// Whether `node` currently captures `id`.
    pub fn has_capture(&self, id: PointerId, node: K) -> bool {
        self.owner(id) == Some(node)
    }

    /// Drop every entry owned by `node`, returning the released pointer ids.
    pub fn release_node(&mut self, node: K) -> SmallVec<[PointerId; 2]> {
        let released: SmallVec<[PointerId; 2]> = self
            .entries
            .iter()
            .filter(|(_, owner)| **owner == node)
            .map(|(id, _)| *id)
            .collect();
        for id in &released {
            self.entries.remove(id);
        }
        released
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pointer is captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of [`CaptureTable::capture`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CaptureOutcome<K> {
    /// A new entry was created.
    Captured,
    /// The same node already held the capture.
    Unchanged,
    /// The entry moved from the given node.
    Replaced(K),
    /// The node is not attached; nothing changed.
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::tests::Flat;

    #[test]
    fn capture_then_release() {
        let mut scene = Flat::new();
        let a = scene.push(Some(0), None, "Shape");
        let mut table = CaptureTable::new();

        assert_eq!(table.capture(&scene, PointerId(1), a), CaptureOutcome::Captured);
        assert!(table.has_capture(PointerId(1), a));
        assert_eq!(table.release(PointerId(1)), Some(a));
        assert_eq!(table.release(PointerId(1)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn one_entry_per_pointer() {
        let mut scene = Flat::new();
        let a = scene.push(Some(0), None, "Shape");
        let b = scene.push(Some(0), None, "Shape");
        let mut table = CaptureTable::new();

        table.capture(&scene, PointerId(1), a);
        assert_eq!(table.capture(&scene, PointerId(1), a), CaptureOutcome::Unchanged);
        assert_eq!(
            table.capture(&scene, PointerId(1), b),
            CaptureOutcome::Replaced(a)
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.owner(PointerId(1)), Some(b));
    }

    #[test]
    fn detached_node_is_rejected_and_pruned() {
        let mut scene = Flat::new();
        let a = scene.push(Some(0), None, "Shape");
        let b = scene.push(Some(0), None, "Shape");
        let mut table = CaptureTable::new();

        scene.attached[b as usize] = false;
        assert_eq!(table.capture(&scene, PointerId(1), b), CaptureOutcome::Rejected);
        assert!(table.is_empty());

        table.capture(&scene, PointerId(2), a);
        scene.attached[a as usize] = false;
        assert_eq!(table.owner(PointerId(2)), Some(a));
        assert_eq!(table.owner_attached(&scene, PointerId(2)), None);
        assert_eq!(table.owner(PointerId(2)), None);
    }

    #[test]
    fn release_node_drops_all_its_pointers() {
        let mut scene = Flat::new();
        let a = scene.push(Some(0), None, "Shape");
        let b = scene.push(Some(0), None, "Shape");
        let mut table = CaptureTable::new();
        table.capture(&scene, PointerId(1), a);
        table.capture(&scene, PointerId(2), a);
        table.capture(&scene, PointerId(3), b);

        let mut released = table.release_node(a);
        released.sort();
        assert_eq!(released.as_slice(), &[PointerId(1), PointerId(2)]);
        assert_eq!(table.len(), 1);
    }
}
