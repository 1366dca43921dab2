//! Spanning tree construction.

use super::tree::SpanningTree;
use crate::error::TopologyError;
use crate::topology::{Link, TopologyGraph};
use l2ctl_types::SwitchId;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const INFINITE: u64 = u64::MAX;

/// Builds a spanning tree from a topology snapshot by uniform-cost
/// growth.
///
/// The root is the lowest switch id and cost ties are broken toward the
/// lowest id, so the same topology always yields the same tree. With all
/// link costs at 1 this is a breadth-first traversal.
pub struct SpanningTreeBuilder;

impl SpanningTreeBuilder {
    /// Computes the tree, failing if the graph is empty or disconnected.
    ///
    /// A disconnected graph is a hard error: the builder never returns a
    /// tree that silently omits unreachable switches.
    pub fn build(graph: &TopologyGraph) -> Result<SpanningTree, TopologyError> {
        let root = graph
            .switch_ids()
            .next()
            .ok_or(TopologyError::EmptyTopology)?;

        let mut cost: BTreeMap<SwitchId, u64> =
            graph.switch_ids().map(|id| (id, INFINITE)).collect();
        cost.insert(root, 0);

        let mut parent_edge: BTreeMap<SwitchId, Link> = BTreeMap::new();

        // Ordered by (cost, id): the minimum element is always the
        // cheapest unvisited node, lowest id first on ties.
        let mut unvisited: BTreeSet<(u64, SwitchId)> =
            cost.iter().map(|(id, c)| (*c, *id)).collect();

        let mut unreachable = Vec::new();
        while let Some(&(current_cost, current)) = unvisited.iter().next() {
            unvisited.remove(&(current_cost, current));

            if current_cost == INFINITE {
                unreachable.push(current);
                continue;
            }

            for neighbor in graph.neighbors_of(current)? {
                let neighbor_cost = cost[&neighbor];
                if !unvisited.contains(&(neighbor_cost, neighbor)) {
                    continue;
                }
                let new_cost = current_cost + 1;
                if new_cost < neighbor_cost {
                    unvisited.remove(&(neighbor_cost, neighbor));
                    unvisited.insert((new_cost, neighbor));
                    cost.insert(neighbor, new_cost);
                    parent_edge.insert(neighbor, Link::new(current, neighbor));
                }
            }
        }

        if !unreachable.is_empty() {
            return Err(TopologyError::Disconnected { root, unreachable });
        }

        let nodes: BTreeSet<SwitchId> = graph.switch_ids().collect();
        let edges: BTreeSet<Link> = parent_edge.into_values().collect();
        debug!(
            root = %root,
            nodes = nodes.len(),
            edges = edges.len(),
            "spanning tree computed"
        );
        Ok(SpanningTree::new(root, nodes, edges))
    }
}
