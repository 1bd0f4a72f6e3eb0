// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing over the [`Scene`] contract.
//!
//! [`topmost_listening`] walks top-level containers from the top-most down and,
//! within each, descends into children in reverse drawing order, so the first
//! match is the deepest node drawn on top. Non-listening subtrees are pruned.
//! The query is pure and may be called at any frequency.

use kurbo::Point;

use crate::scene::Scene;

/// Topmost listening node whose render region contains `point`.
///
/// With `kind`, the result is the nearest ancestor-or-self of the hit whose
/// [`Scene::kind`] matches; containers without such a node are skipped and the
/// search continues below them.
pub fn topmost_listening<S: Scene + ?Sized>(
    scene: &S,
    point: Point,
    kind: Option<&str>,
) -> Option<S::Node> {
    let root = scene.root();
    for &container in scene.children(root).iter().rev() {
        let Some(hit) = deepest_hit(scene, container, point) else {
            continue;
        };
        match kind {
            None => return Some(hit),
            Some(kind) => {
                if let Some(found) = nearest_of_kind(scene, hit, kind) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn deepest_hit<S: Scene + ?Sized>(scene: &S, node: S::Node, point: Point) -> Option<S::Node> {
    if !scene.is_listening(node) {
        return None;
    }
    for &child in scene.children(node).iter().rev() {
        if let Some(hit) = deepest_hit(scene, child, point) {
            return Some(hit);
        }
    }
    scene.contains(node, point).then_some(node)
}

fn nearest_of_kind<S: Scene + ?Sized>(scene: &S, node: S::Node, kind: &str) -> Option<S::Node> {
    let root = scene.root();
    let mut current = Some(node);
    while let Some(n) = current {
        if n == root {
            break;
        }
        if scene.kind(n) == kind {
            return Some(n);
        }
        current = scene.parent(n);
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::event::PointerEvent;
    use alloc::vec::Vec;
    use kurbo::Rect;

    /// Flat test scene: node 0 is the root, everything else is described by slots.
    #[derive(Debug, Default)]
    pub(crate) struct Flat {
        pub(crate) parents: Vec<Option<u32>>,
        pub(crate) children: Vec<Vec<u32>>,
        pub(crate) bounds: Vec<Option<Rect>>,
        pub(crate) listening: Vec<bool>,
        pub(crate) attached: Vec<bool>,
        pub(crate) kinds: Vec<&'static str>,
    }

    impl Flat {
        pub(crate) fn new() -> Self {
            let mut flat = Self::default();
            flat.push(None, None, "Stage");
            flat
        }

        pub(crate) fn push(
            &mut self,
            parent: Option<u32>,
            bounds: Option<Rect>,
            kind: &'static str,
        ) -> u32 {
            let id = u32::try_from(self.parents.len()).unwrap();
            self.parents.push(parent);
            self.children.push(Vec::new());
            self.bounds.push(bounds);
            self.listening.push(true);
            self.attached.push(true);
            self.kinds.push(kind);
            if let Some(p) = parent {
                self.children[p as usize].push(id);
            }
            id
        }
    }

    impl Scene for Flat {
        type Node = u32;

        fn root(&self) -> u32 {
            0
        }

        fn children(&self, node: u32) -> &[u32] {
            &self.children[node as usize]
        }

        fn parent(&self, node: u32) -> Option<u32> {
            self.parents[node as usize]
        }

        fn contains(&self, node: u32, point: Point) -> bool {
            self.bounds[node as usize].is_some_and(|r| r.contains(point))
        }

        fn is_listening(&self, node: u32) -> bool {
            self.listening[node as usize]
        }

        fn is_attached(&self, node: u32) -> bool {
            self.attached[node as usize]
        }

        fn kind(&self, node: u32) -> &str {
            self.kinds[node as usize]
        }

        fn fire(&mut self, _node: u32, _event: &mut PointerEvent<u32>) {}
    }

    fn square(x: f64, y: f64, size: f64) -> Option<Rect> {
        Some(Rect::new(x, y, x + size, y + size))
    }

    #[test]
    fn later_layer_wins() {
        let mut s = Flat::new();
        let bottom = s.push(Some(0), None, "Layer");
        let top = s.push(Some(0), None, "Layer");
        let a = s.push(Some(bottom), square(0.0, 0.0, 10.0), "Shape");
        let b = s.push(Some(top), square(0.0, 0.0, 10.0), "Shape");

        assert_eq!(topmost_listening(&s, Point::new(5.0, 5.0), None), Some(b));
        s.listening[b as usize] = false;
        assert_eq!(topmost_listening(&s, Point::new(5.0, 5.0), None), Some(a));
    }

    #[test]
    fn later_sibling_wins_and_deepest_is_returned() {
        let mut s = Flat::new();
        let layer = s.push(Some(0), None, "Layer");
        let group = s.push(Some(layer), None, "Group");
        let under = s.push(Some(layer), square(0.0, 0.0, 10.0), "Shape");
        let inner = s.push(Some(group), square(0.0, 0.0, 10.0), "Shape");
        // `under` is drawn after the group, so it is on top.
        assert_eq!(topmost_listening(&s, Point::new(1.0, 1.0), None), Some(under));
        s.listening[under as usize] = false;
        assert_eq!(topmost_listening(&s, Point::new(1.0, 1.0), None), Some(inner));
    }

    #[test]
    fn non_listening_container_prunes_subtree() {
        let mut s = Flat::new();
        let layer = s.push(Some(0), None, "Layer");
        let group = s.push(Some(layer), None, "Group");
        let _ = s.push(Some(group), square(0.0, 0.0, 10.0), "Shape");
        s.listening[group as usize] = false;
        assert_eq!(topmost_listening(&s, Point::new(1.0, 1.0), None), None);
    }

    #[test]
    fn miss_returns_none() {
        let mut s = Flat::new();
        let layer = s.push(Some(0), None, "Layer");
        let _ = s.push(Some(layer), square(0.0, 0.0, 10.0), "Shape");
        assert_eq!(topmost_listening(&s, Point::new(50.0, 50.0), None), None);
    }

    #[test]
    fn kind_filter_returns_matching_ancestor_or_falls_through() {
        let mut s = Flat::new();
        let low = s.push(Some(0), None, "Layer");
        let group = s.push(Some(low), None, "Group");
        let _ = s.push(Some(group), square(0.0, 0.0, 10.0), "Shape");
        let high = s.push(Some(0), None, "Layer");
        let top_shape = s.push(Some(high), square(0.0, 0.0, 10.0), "Shape");

        let pt = Point::new(1.0, 1.0);
        assert_eq!(topmost_listening(&s, pt, Some("Shape")), Some(top_shape));
        // The top layer has no group, so the search continues below it.
        assert_eq!(topmost_listening(&s, pt, Some("Group")), Some(group));
        assert_eq!(topmost_listening(&s, pt, Some("Stage")), None);
    }
}
