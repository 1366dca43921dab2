//! Shared controller state.

use crate::error::TopologyError;
use crate::forwarding::AddressTable;
use crate::stp::{SpanningTree, SpanningTreeBuilder};
use crate::topology::TopologyGraph;
use dashmap::DashMap;
use l2ctl_types::{MacAddress, PortNo, PortState, SwitchId};
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct TreeCache {
    tree: Option<SpanningTree>,
    epoch: u64,
}

/// The controller's mutable state: topology graph, per-switch learned
/// tables, and the cached spanning tree.
///
/// Synchronization is split by access pattern: the graph sits behind one
/// `RwLock` (structure changes are rare), learned tables live in a
/// sharded map so learning on distinct switches never contends, and the
/// cached tree has its own lock held only to read or swap it. Two
/// concurrent learns for the same switch serialize on the shard; last
/// write wins.
#[derive(Debug)]
pub struct TopologyState {
    graph: RwLock<TopologyGraph>,
    tables: DashMap<SwitchId, AddressTable>,
    tree: RwLock<TreeCache>,
}

impl TopologyState {
    /// Wraps a loaded topology graph. The tree cache starts empty;
    /// call [`rebuild_tree`](Self::rebuild_tree) before serving frames.
    pub fn new(graph: TopologyGraph) -> Self {
        TopologyState {
            graph: RwLock::new(graph),
            tables: DashMap::new(),
            tree: RwLock::new(TreeCache::default()),
        }
    }

    /// Runs `f` against the current graph.
    pub fn with_graph<R>(&self, f: impl FnOnce(&TopologyGraph) -> R) -> R {
        let graph = self.graph.read().expect("graph lock poisoned");
        f(&graph)
    }

    /// Returns true if the switch is part of the topology.
    pub fn contains_switch(&self, id: SwitchId) -> bool {
        self.with_graph(|g| g.contains(id))
    }

    /// Records that `addr` was seen on `port` of `switch`.
    ///
    /// Returns false (and learns nothing) when the switch is unknown,
    /// which covers frames racing a switch removal.
    pub fn learn(&self, switch: SwitchId, addr: MacAddress, port: PortNo) -> bool {
        if !self.contains_switch(switch) {
            return false;
        }
        self.tables.entry(switch).or_default().learn(addr, port);
        true
    }

    /// Returns the egress port last learned for `addr` on `switch`.
    pub fn lookup(&self, switch: SwitchId, addr: MacAddress) -> Option<PortNo> {
        self.tables.get(&switch)?.lookup(addr)
    }

    /// Forgets one learned address on a switch.
    pub fn forget(&self, switch: SwitchId, addr: MacAddress) -> Option<PortNo> {
        self.tables.get_mut(&switch)?.forget(addr)
    }

    /// Returns a sorted snapshot of one switch's learned table.
    pub fn learned_entries(&self, switch: SwitchId) -> BTreeMap<MacAddress, PortNo> {
        self.tables
            .get(&switch)
            .map(|t| t.sorted_entries())
            .unwrap_or_default()
    }

    /// Returns true when the port is present in the switch's mapping but
    /// not forwarding. Ports absent from the mapping (host-facing ports)
    /// are treated as forwarding.
    pub fn port_blocked(&self, switch: SwitchId, port: PortNo) -> bool {
        self.with_graph(|g| match g.port_state(switch, port) {
            Ok(state) => !state.is_forwarding(),
            Err(_) => false,
        })
    }

    /// Records a port's operational state.
    pub fn set_port_state(
        &self,
        switch: SwitchId,
        port: PortNo,
        state: PortState,
    ) -> Result<(), TopologyError> {
        let mut graph = self.graph.write().expect("graph lock poisoned");
        graph.set_port_state(switch, port, state)
    }

    /// Removes a switch: drops its node, incident links, learned table,
    /// and every neighbor-side learned entry whose port pointed at it.
    ///
    /// Returns the invalidated neighbor-side `(switch, port)` pairs.
    pub fn remove_switch(
        &self,
        id: SwitchId,
    ) -> Result<Vec<(SwitchId, PortNo)>, TopologyError> {
        let invalidated = {
            let mut graph = self.graph.write().expect("graph lock poisoned");
            graph.remove_switch(id)?
        };

        self.tables.remove(&id);
        for (neighbor, port) in &invalidated {
            if let Some(mut table) = self.tables.get_mut(neighbor) {
                let purged = table.purge_port(*port);
                if !purged.is_empty() {
                    debug!(
                        switch = %neighbor,
                        port = %port,
                        purged = purged.len(),
                        "pruned learned entries behind removed switch"
                    );
                }
            }
        }
        Ok(invalidated)
    }

    /// Removes a port from a switch and prunes the learned entries that
    /// referenced it.
    ///
    /// Returns the neighbor the port pointed at.
    pub fn remove_port(
        &self,
        switch: SwitchId,
        port: PortNo,
    ) -> Result<SwitchId, TopologyError> {
        let neighbor = {
            let mut graph = self.graph.write().expect("graph lock poisoned");
            graph.remove_port(switch, port)?
        };

        if let Some(mut table) = self.tables.get_mut(&switch) {
            table.purge_port(port);
        }
        Ok(neighbor)
    }

    /// Recomputes the spanning tree from the current graph and swaps the
    /// cache on success.
    ///
    /// On failure the previous tree stays in place and keeps serving.
    /// Returns the new cache epoch.
    pub fn rebuild_tree(&self) -> Result<u64, TopologyError> {
        let tree = {
            let graph = self.graph.read().expect("graph lock poisoned");
            SpanningTreeBuilder::build(&graph)?
        };

        let mut cache = self.tree.write().expect("tree lock poisoned");
        cache.tree = Some(tree);
        cache.epoch += 1;
        Ok(cache.epoch)
    }

    /// Returns the tree cache epoch (0 until the first successful
    /// build).
    pub fn tree_epoch(&self) -> u64 {
        self.tree.read().expect("tree lock poisoned").epoch
    }

    /// Runs `f` against the cached tree, if any.
    pub fn with_tree<R>(&self, f: impl FnOnce(Option<&SpanningTree>) -> R) -> R {
        let cache = self.tree.read().expect("tree lock poisoned");
        f(cache.tree.as_ref())
    }

    /// Returns true if the cached tree has an edge touching the switch.
    pub fn tree_touches(&self, id: SwitchId) -> bool {
        self.with_tree(|tree| tree.map(|t| t.touches(id)).unwrap_or(false))
    }

    /// Returns true if the cached tree uses the undirected edge.
    pub fn tree_uses_edge(&self, x: SwitchId, y: SwitchId) -> bool {
        self.with_tree(|tree| tree.map(|t| t.contains_edge(x, y)).unwrap_or(false))
    }

    /// Resolves the ports a flood on `switch` may use: spanning-tree
    /// neighbors only, minus the arrival port, minus blocked ports.
    ///
    /// A tree neighbor that is no longer adjacent in the graph (the tree
    /// is pending recomputation) contributes nothing; its port counts as
    /// closed.
    pub fn flood_ports(&self, switch: SwitchId, in_port: PortNo) -> Vec<PortNo> {
        let graph = self.graph.read().expect("graph lock poisoned");
        self.with_tree(|tree| {
            let Some(tree) = tree else {
                return Vec::new();
            };
            tree.neighbors(switch)
                .filter_map(|neighbor| graph.port_to(switch, neighbor).ok())
                .filter(|port| *port != in_port)
                .filter(|port| {
                    graph
                        .port_state(switch, *port)
                        .map(|s| s.is_forwarding())
                        .unwrap_or(false)
                })
                .collect()
        })
    }
}
