//! Spanning tree representation.

use crate::topology::Link;
use l2ctl_types::SwitchId;
use std::collections::{BTreeMap, BTreeSet};

/// A rooted spanning tree over a topology snapshot.
///
/// Invariant for a connected graph of N switches: N nodes, N - 1 edges,
/// connected, acyclic. The builder enforces this; a tree missing nodes is
/// never constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanningTree {
    root: SwitchId,
    nodes: BTreeSet<SwitchId>,
    edges: BTreeSet<Link>,
    adjacency: BTreeMap<SwitchId, BTreeSet<SwitchId>>,
}

impl SpanningTree {
    pub(crate) fn new(root: SwitchId, nodes: BTreeSet<SwitchId>, edges: BTreeSet<Link>) -> Self {
        let mut adjacency: BTreeMap<SwitchId, BTreeSet<SwitchId>> =
            nodes.iter().map(|id| (*id, BTreeSet::new())).collect();
        for edge in &edges {
            if let Some(set) = adjacency.get_mut(&edge.a()) {
                set.insert(edge.b());
            }
            if let Some(set) = adjacency.get_mut(&edge.b()) {
                set.insert(edge.a());
            }
        }
        SpanningTree {
            root,
            nodes,
            edges,
            adjacency,
        }
    }

    /// Returns the deterministically chosen root switch.
    pub fn root(&self) -> SwitchId {
        self.root
    }

    /// Returns the switches covered by the tree.
    pub fn nodes(&self) -> &BTreeSet<SwitchId> {
        &self.nodes
    }

    /// Returns the tree edges in deterministic order.
    pub fn edges(&self) -> &BTreeSet<Link> {
        &self.edges
    }

    /// Returns the number of tree edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the number of switches in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the switch is a tree node.
    pub fn contains_node(&self, id: SwitchId) -> bool {
        self.nodes.contains(&id)
    }

    /// Returns true if the undirected edge is part of the tree.
    pub fn contains_edge(&self, x: SwitchId, y: SwitchId) -> bool {
        self.edges.contains(&Link::new(x, y))
    }

    /// Returns the tree neighbors of a switch (empty for unknown ids).
    pub fn neighbors(&self, id: SwitchId) -> impl Iterator<Item = SwitchId> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Returns true if any tree edge touches the switch.
    pub fn touches(&self, id: SwitchId) -> bool {
        self.adjacency
            .get(&id)
            .map(|set| !set.is_empty())
            .unwrap_or(false)
    }
}
