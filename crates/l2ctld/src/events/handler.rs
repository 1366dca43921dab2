//! Topology lifecycle event handling.

use crate::error::TopologyError;
use crate::flow::{ControllerCallbacks, RulePattern};
use crate::state::TopologyState;
use l2ctl_types::{PortNo, PortState, SwitchId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Whether a tree recomputation is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Stable,
    Recomputing,
}

#[derive(Debug)]
struct RecomputeFlags {
    status: HandlerState,
    /// A request arrived while a recomputation was running; run exactly
    /// one follow-up instead of queueing.
    pending: bool,
}

/// Topology change handler counters.
#[derive(Debug, Default)]
pub struct HandlerStats {
    switch_enters: AtomicU64,
    switch_leaves: AtomicU64,
    port_state_changes: AtomicU64,
    ports_removed: AtomicU64,
    recomputes: AtomicU64,
    recompute_failures: AtomicU64,
    rule_deletes: AtomicU64,
}

impl HandlerStats {
    pub fn switch_enters(&self) -> u64 {
        self.switch_enters.load(Ordering::Relaxed)
    }

    pub fn switch_leaves(&self) -> u64 {
        self.switch_leaves.load(Ordering::Relaxed)
    }

    pub fn port_state_changes(&self) -> u64 {
        self.port_state_changes.load(Ordering::Relaxed)
    }

    pub fn ports_removed(&self) -> u64 {
        self.ports_removed.load(Ordering::Relaxed)
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes.load(Ordering::Relaxed)
    }

    pub fn recompute_failures(&self) -> u64 {
        self.recompute_failures.load(Ordering::Relaxed)
    }

    pub fn rule_deletes(&self) -> u64 {
        self.rule_deletes.load(Ordering::Relaxed)
    }
}

/// Reacts to switch and port lifecycle events: prunes learned state,
/// requests rule deletion, and keeps the cached spanning tree current.
///
/// While a recomputation runs, forwarding keeps using the last known
/// tree; edges that lost their underlying adjacency resolve to no ports
/// (see [`TopologyState::flood_ports`]). A structural failure leaves the
/// previous tree serving and waits for the next topology event.
pub struct TopologyChangeHandler {
    state: Arc<TopologyState>,
    callbacks: Arc<dyn ControllerCallbacks>,
    flags: Mutex<RecomputeFlags>,
    stats: HandlerStats,
}

impl TopologyChangeHandler {
    /// Creates a handler over shared state and the switch-facing
    /// callbacks.
    pub fn new(state: Arc<TopologyState>, callbacks: Arc<dyn ControllerCallbacks>) -> Self {
        TopologyChangeHandler {
            state,
            callbacks,
            flags: Mutex::new(RecomputeFlags {
                status: HandlerState::Stable,
                pending: false,
            }),
            stats: HandlerStats::default(),
        }
    }

    /// Returns the current state-machine position.
    pub fn handler_state(&self) -> HandlerState {
        self.flags.lock().expect("flags lock poisoned").status
    }

    /// Returns the handler counters.
    pub fn stats(&self) -> &HandlerStats {
        &self.stats
    }

    /// A switch connected. The central topology description is
    /// authoritative, so this only logs.
    pub fn on_switch_enter(&self, id: SwitchId) {
        self.stats.switch_enters.fetch_add(1, Ordering::Relaxed);
        if self.state.contains_switch(id) {
            info!(switch = %id, dpid = %id.to_dpid_string(), "switch connected");
        } else {
            warn!(switch = %id, "unknown switch connected, not in topology");
        }
    }

    /// A switch disconnected: purge its node, links, and learned
    /// entries, request deletion of every rule that referenced it, and
    /// recompute the tree if it was a tree node.
    pub fn on_switch_leave(&self, id: SwitchId) {
        self.stats.switch_leaves.fetch_add(1, Ordering::Relaxed);

        let was_tree_node = self.state.tree_touches(id);
        match self.state.remove_switch(id) {
            Ok(invalidated) => {
                info!(
                    switch = %id,
                    neighbor_ports = invalidated.len(),
                    "switch left, learned state purged"
                );
                self.callbacks.delete_rules(id, &RulePattern::all());
                self.stats.rule_deletes.fetch_add(1, Ordering::Relaxed);
                if was_tree_node {
                    self.request_recompute();
                }
            }
            Err(TopologyError::SwitchNotFound(_)) => {
                warn!(switch = %id, "leave event for unknown switch ignored");
            }
            Err(e) => {
                warn!(switch = %id, error = %e, "switch leave not applied");
            }
        }
    }

    /// A port changed operational state. Leaving `FORWARD` on a port
    /// that carries a tree edge invalidates the tree.
    pub fn on_port_state_change(&self, switch: SwitchId, port: PortNo, state: PortState) {
        self.stats.port_state_changes.fetch_add(1, Ordering::Relaxed);

        let neighbor =
            self.state
                .with_graph(|g| g.node(switch).and_then(|n| n.ports().get(&port).copied()));

        if let Err(e) = self.state.set_port_state(switch, port, state) {
            warn!(switch = %switch, port = %port, error = %e, "port state change ignored");
            return;
        }
        info!(switch = %switch, port = %port, state = state.as_str(), "port state changed");

        if state.is_forwarding() {
            return;
        }
        if let Some(neighbor) = neighbor {
            if self.state.tree_uses_edge(switch, neighbor) {
                self.request_recompute();
            }
        }
    }

    /// A port disappeared: prune learned entries behind it, drop the
    /// incident link, and recompute if the link carried a tree edge.
    pub fn on_port_removed(&self, switch: SwitchId, port: PortNo) {
        self.stats.ports_removed.fetch_add(1, Ordering::Relaxed);

        let on_tree = self.state.with_graph(|g| {
            g.node(switch)
                .and_then(|n| n.ports().get(&port).copied())
                .map(|neighbor| self.state.tree_uses_edge(switch, neighbor))
                .unwrap_or(false)
        });

        match self.state.remove_port(switch, port) {
            Ok(neighbor) => {
                info!(
                    switch = %switch,
                    port = %port,
                    neighbor = %neighbor,
                    "port removed"
                );
                if on_tree {
                    self.request_recompute();
                }
            }
            Err(e) => {
                warn!(switch = %switch, port = %port, error = %e, "port removal ignored");
            }
        }
    }

    /// Requests a tree recomputation.
    ///
    /// Requests while one is in flight coalesce into a single follow-up
    /// run. A disconnected graph is reported and left alone; the
    /// previous tree keeps serving until a later event changes
    /// connectivity.
    pub fn request_recompute(&self) {
        {
            let mut flags = self.flags.lock().expect("flags lock poisoned");
            if flags.status == HandlerState::Recomputing {
                flags.pending = true;
                return;
            }
            flags.status = HandlerState::Recomputing;
        }

        loop {
            match self.state.rebuild_tree() {
                Ok(epoch) => {
                    self.stats.recomputes.fetch_add(1, Ordering::Relaxed);
                    info!(epoch, "spanning tree recomputed");
                }
                Err(e) => {
                    self.stats.recompute_failures.fetch_add(1, Ordering::Relaxed);
                    error!(error = %e, "spanning tree recomputation failed, previous tree kept");
                }
            }

            let mut flags = self.flags.lock().expect("flags lock poisoned");
            if flags.pending {
                flags.pending = false;
                continue;
            }
            flags.status = HandlerState::Stable;
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PayloadRef;
    use crate::flow::FlowRule;
    use crate::topology::TopologyGraph;
    use l2ctl_types::MacAddress;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn sw(id: u64) -> SwitchId {
        SwitchId::new(id)
    }

    fn port(p: u32) -> PortNo {
        PortNo::new(p)
    }

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, last])
    }

    #[derive(Default)]
    struct RecordingCallbacks {
        deletes: Mutex<Vec<(SwitchId, RulePattern)>>,
    }

    impl ControllerCallbacks for RecordingCallbacks {
        fn install_rule(&self, _rule: &FlowRule) {}

        fn delete_rules(&self, switch: SwitchId, pattern: &RulePattern) {
            self.deletes.lock().unwrap().push((switch, *pattern));
        }

        fn replay(
            &self,
            _switch: SwitchId,
            _payload: PayloadRef,
            _in_port: PortNo,
            _out_ports: &[PortNo],
        ) {
        }
    }

    /// Ring 1-2-3-4-1 with the tree {(1,2),(1,4),(2,3)} built.
    fn fixture() -> (
        Arc<TopologyState>,
        Arc<RecordingCallbacks>,
        TopologyChangeHandler,
    ) {
        let mut g = TopologyGraph::new();
        g.add_switch(sw(1), BTreeMap::from([(port(1), sw(2)), (port(2), sw(4))]));
        g.add_switch(sw(2), BTreeMap::from([(port(1), sw(1)), (port(2), sw(3))]));
        g.add_switch(sw(3), BTreeMap::from([(port(1), sw(2)), (port(2), sw(4))]));
        g.add_switch(sw(4), BTreeMap::from([(port(1), sw(3)), (port(2), sw(1))]));
        g.add_link(sw(1), sw(2)).unwrap();
        g.add_link(sw(2), sw(3)).unwrap();
        g.add_link(sw(3), sw(4)).unwrap();
        g.add_link(sw(4), sw(1)).unwrap();

        let state = Arc::new(TopologyState::new(g));
        state.rebuild_tree().unwrap();
        let callbacks = Arc::new(RecordingCallbacks::default());
        let handler = TopologyChangeHandler::new(Arc::clone(&state), callbacks.clone());
        (state, callbacks, handler)
    }

    #[test]
    fn test_switch_leave_purges_and_deletes_rules_once() {
        let (state, callbacks, handler) = fixture();
        state.learn(sw(3), mac(0xaa), port(10));

        handler.on_switch_leave(sw(3));

        assert_eq!(state.lookup(sw(3), mac(0xaa)), None);
        assert_eq!(
            callbacks.deletes.lock().unwrap().as_slice(),
            &[(sw(3), RulePattern::all())]
        );
        // Tree was rebuilt without switch 3.
        assert_eq!(state.tree_epoch(), 2);
        assert!(state.tree_uses_edge(sw(1), sw(2)));
        assert!(state.tree_uses_edge(sw(1), sw(4)));
        assert!(!state.tree_uses_edge(sw(2), sw(3)));

        // A duplicate leave is ignored: no second delete request.
        handler.on_switch_leave(sw(3));
        assert_eq!(callbacks.deletes.lock().unwrap().len(), 1);
        assert_eq!(handler.stats().rule_deletes(), 1);
    }

    #[test]
    fn test_port_block_on_tree_edge_recomputes() {
        let (state, _callbacks, handler) = fixture();

        handler.on_port_state_change(sw(1), port(1), PortState::Block);

        assert_eq!(state.tree_epoch(), 2);
        assert_eq!(handler.stats().recomputes(), 1);
        assert_eq!(handler.handler_state(), HandlerState::Stable);
    }

    #[test]
    fn test_port_block_on_chord_does_not_recompute() {
        let (state, _callbacks, handler) = fixture();

        // 3 <-> 4 is the redundant ring chord, not a tree edge.
        handler.on_port_state_change(sw(3), port(2), PortState::Block);

        assert_eq!(state.tree_epoch(), 1);
        assert_eq!(handler.stats().recomputes(), 0);
    }

    #[test]
    fn test_port_back_to_forward_does_not_recompute() {
        let (state, _callbacks, handler) = fixture();

        handler.on_port_state_change(sw(1), port(1), PortState::Block);
        handler.on_port_state_change(sw(1), port(1), PortState::Forward);

        assert_eq!(state.tree_epoch(), 2);
        assert_eq!(handler.stats().port_state_changes(), 2);
    }

    #[test]
    fn test_port_state_change_unknown_port_ignored() {
        let (state, _callbacks, handler) = fixture();
        handler.on_port_state_change(sw(1), port(99), PortState::Block);
        handler.on_port_state_change(sw(9), port(1), PortState::Block);
        assert_eq!(state.tree_epoch(), 1);
    }

    #[test]
    fn test_port_removed_on_tree_edge_recomputes() {
        let (state, _callbacks, handler) = fixture();
        state.learn(sw(1), mac(0xaa), port(1));

        handler.on_port_removed(sw(1), port(1));

        assert_eq!(state.lookup(sw(1), mac(0xaa)), None);
        assert_eq!(state.tree_epoch(), 2);
        // The ring still connects through 4, so the new tree holds.
        assert!(state.tree_uses_edge(sw(1), sw(4)));
        assert!(state.tree_uses_edge(sw(3), sw(4)));
    }

    #[test]
    fn test_failed_recompute_keeps_tree_and_returns_stable() {
        let (state, _callbacks, handler) = fixture();

        // Cut both of switch 3's links, then force a recompute.
        handler.on_port_removed(sw(3), port(1));
        handler.on_port_removed(sw(3), port(2));

        assert!(handler.stats().recompute_failures() >= 1);
        assert_eq!(handler.handler_state(), HandlerState::Stable);
        // Last successful tree still serves.
        assert!(state.tree_epoch() >= 1);
    }

    #[test]
    fn test_switch_enter_is_log_only() {
        let (state, callbacks, handler) = fixture();
        handler.on_switch_enter(sw(1));
        handler.on_switch_enter(sw(9));
        assert_eq!(handler.stats().switch_enters(), 2);
        assert_eq!(state.tree_epoch(), 1);
        assert!(callbacks.deletes.lock().unwrap().is_empty());
    }
}
