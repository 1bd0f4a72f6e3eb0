// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Redraw requests collected between frames.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::types::NodeId;

/// Layers that asked to be redrawn since the last [`take`](Self::take).
///
/// Requests for the same layer are coalesced; the total number of requests
/// per layer is kept for diagnostics.
#[derive(Clone, Debug, Default)]
pub struct Redraws {
    pending: Vec<NodeId>,
    counts: HashMap<NodeId, u32>,
}

impl Redraws {
    /// Record a redraw request for `layer`.
    pub fn request(&mut self, layer: NodeId) {
        if !self.pending.contains(&layer) {
            self.pending.push(layer);
        }
        *self.counts.entry(layer).or_insert(0) += 1;
    }

    /// Layers pending a redraw, in request order.
    pub fn pending(&self) -> &[NodeId] {
        &self.pending
    }

    /// Drain the pending layers.
    pub fn take(&mut self) -> Vec<NodeId> {
        core::mem::take(&mut self.pending)
    }

    /// Total requests ever made for `layer`.
    pub fn count(&self, layer: NodeId) -> u32 {
        self.counts.get(&layer).copied().unwrap_or(0)
    }

    /// Forget a removed layer.
    pub(crate) fn forget(&mut self, layer: NodeId) {
        self.pending.retain(|l| *l != layer);
        self.counts.remove(&layer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_coalesce_but_count() {
        let a = NodeId::new(1, 1);
        let b = NodeId::new(2, 1);
        let mut redraws = Redraws::default();
        redraws.request(a);
        redraws.request(b);
        redraws.request(a);

        assert_eq!(redraws.pending(), &[a, b]);
        assert_eq!(redraws.count(a), 2);
        assert_eq!(redraws.take(), [a, b]);
        assert!(redraws.pending().is_empty());
        assert_eq!(redraws.count(a), 2);

        redraws.forget(a);
        assert_eq!(redraws.count(a), 0);
    }
}
