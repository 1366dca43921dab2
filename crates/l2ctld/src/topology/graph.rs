//! Switch topology graph.

use crate::error::TopologyError;
use l2ctl_types::{PortNo, PortState, SwitchId};
use std::collections::{BTreeMap, BTreeSet};

/// An undirected link between two switches, unit cost.
///
/// Endpoints are normalized so the lower id comes first; the derived
/// ordering makes link iteration deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Link {
    a: SwitchId,
    b: SwitchId,
}

impl Link {
    /// Creates a normalized link between two switches.
    pub fn new(x: SwitchId, y: SwitchId) -> Self {
        if x <= y {
            Link { a: x, b: y }
        } else {
            Link { a: y, b: x }
        }
    }

    /// Returns the lower endpoint.
    pub fn a(&self) -> SwitchId {
        self.a
    }

    /// Returns the higher endpoint.
    pub fn b(&self) -> SwitchId {
        self.b
    }

    /// Returns true if the link touches the given switch.
    pub fn touches(&self, id: SwitchId) -> bool {
        self.a == id || self.b == id
    }

    /// Returns the endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other(&self, id: SwitchId) -> Option<SwitchId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// A switch node: ordered port mappings plus per-port operational state.
#[derive(Debug, Clone, Default)]
pub struct SwitchNode {
    /// Port number to neighbor switch.
    ports: BTreeMap<PortNo, SwitchId>,
    /// Neighbor switch to local port, maintained alongside `ports` so
    /// port resolution never scans values.
    neighbor_ports: BTreeMap<SwitchId, PortNo>,
    /// Operational state per port. Ports start out forwarding.
    port_states: BTreeMap<PortNo, PortState>,
}

impl SwitchNode {
    fn new(ports: BTreeMap<PortNo, SwitchId>) -> Self {
        let neighbor_ports = ports.iter().map(|(p, n)| (*n, *p)).collect();
        let port_states = ports.keys().map(|p| (*p, PortState::Forward)).collect();
        SwitchNode {
            ports,
            neighbor_ports,
            port_states,
        }
    }

    /// Returns the ordered port to neighbor mapping.
    pub fn ports(&self) -> &BTreeMap<PortNo, SwitchId> {
        &self.ports
    }

    /// Returns the local port toward a neighbor, if adjacent.
    pub fn port_to(&self, neighbor: SwitchId) -> Option<PortNo> {
        self.neighbor_ports.get(&neighbor).copied()
    }

    /// Returns the operational state of a port, if present.
    pub fn port_state(&self, port: PortNo) -> Option<PortState> {
        self.port_states.get(&port).copied()
    }
}

/// The physical topology: switch nodes plus an undirected link set.
///
/// The graph may contain cycles; loop freedom comes from the spanning
/// tree computed over it, not from the graph itself. All maps are ordered
/// so dumps and traversals are reproducible.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    switches: BTreeMap<SwitchId, SwitchNode>,
    links: BTreeSet<Link>,
}

impl TopologyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a switch with its port to neighbor mapping.
    ///
    /// Replaces any previous node with the same id.
    pub fn add_switch(&mut self, id: SwitchId, ports: BTreeMap<PortNo, SwitchId>) {
        self.switches.insert(id, SwitchNode::new(ports));
    }

    /// Registers the undirected link between two switches.
    ///
    /// Both endpoints must already be present and each must map a port
    /// toward the other.
    pub fn add_link(&mut self, x: SwitchId, y: SwitchId) -> Result<(), TopologyError> {
        let xn = self
            .switches
            .get(&x)
            .ok_or(TopologyError::SwitchNotFound(x))?;
        let yn = self
            .switches
            .get(&y)
            .ok_or(TopologyError::SwitchNotFound(y))?;

        if xn.port_to(y).is_none() || yn.port_to(x).is_none() {
            return Err(TopologyError::InconsistentLink { a: x, b: y });
        }

        self.links.insert(Link::new(x, y));
        Ok(())
    }

    /// Returns true if the switch is present.
    pub fn contains(&self, id: SwitchId) -> bool {
        self.switches.contains_key(&id)
    }

    /// Returns the number of switches.
    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    /// Returns all switch ids in ascending order.
    pub fn switch_ids(&self) -> impl Iterator<Item = SwitchId> + '_ {
        self.switches.keys().copied()
    }

    /// Returns the switch node, if present.
    pub fn node(&self, id: SwitchId) -> Option<&SwitchNode> {
        self.switches.get(&id)
    }

    /// Iterates switch nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SwitchId, &SwitchNode)> {
        self.switches.iter().map(|(id, node)| (*id, node))
    }

    /// Returns the links in deterministic order.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.links.iter().copied()
    }

    /// Returns the switches adjacent to `id` through live links.
    ///
    /// Adjacency is derived from the link set, so a link removed on
    /// either side stops contributing immediately.
    pub fn neighbors_of(&self, id: SwitchId) -> Result<BTreeSet<SwitchId>, TopologyError> {
        if !self.contains(id) {
            return Err(TopologyError::SwitchNotFound(id));
        }
        Ok(self
            .links
            .iter()
            .filter_map(|l| l.other(id))
            .collect())
    }

    /// Returns the local port on `id` toward `neighbor`.
    pub fn port_to(&self, id: SwitchId, neighbor: SwitchId) -> Result<PortNo, TopologyError> {
        let node = self
            .switches
            .get(&id)
            .ok_or(TopologyError::SwitchNotFound(id))?;
        node.port_to(neighbor).ok_or(TopologyError::InvalidPort {
            switch: id,
            neighbor,
        })
    }

    /// Records the operational state of a port.
    pub fn set_port_state(
        &mut self,
        id: SwitchId,
        port: PortNo,
        state: PortState,
    ) -> Result<(), TopologyError> {
        let node = self
            .switches
            .get_mut(&id)
            .ok_or(TopologyError::SwitchNotFound(id))?;
        match node.port_states.get_mut(&port) {
            Some(slot) => {
                *slot = state;
                Ok(())
            }
            None => Err(TopologyError::PortNotFound { switch: id, port }),
        }
    }

    /// Returns the operational state of a port.
    pub fn port_state(&self, id: SwitchId, port: PortNo) -> Result<PortState, TopologyError> {
        let node = self
            .switches
            .get(&id)
            .ok_or(TopologyError::SwitchNotFound(id))?;
        node.port_state(port)
            .ok_or(TopologyError::PortNotFound { switch: id, port })
    }

    /// Removes a switch, its incident links, and the neighbor-side port
    /// mappings that pointed at it.
    ///
    /// Returns the neighbor-side `(switch, port)` pairs that were
    /// invalidated, so the caller can purge learned entries referencing
    /// them.
    pub fn remove_switch(
        &mut self,
        id: SwitchId,
    ) -> Result<Vec<(SwitchId, PortNo)>, TopologyError> {
        if self.switches.remove(&id).is_none() {
            return Err(TopologyError::SwitchNotFound(id));
        }

        self.links.retain(|l| !l.touches(id));

        let mut invalidated = Vec::new();
        for (nid, node) in self.switches.iter_mut() {
            if let Some(port) = node.neighbor_ports.remove(&id) {
                node.ports.remove(&port);
                node.port_states.remove(&port);
                invalidated.push((*nid, port));
            }
        }
        Ok(invalidated)
    }

    /// Removes a single port from a switch along with the incident link.
    ///
    /// Returns the neighbor the port pointed at. The neighbor's own
    /// mapping is left alone; the shared link is gone, so adjacency
    /// stops on both sides.
    pub fn remove_port(&mut self, id: SwitchId, port: PortNo) -> Result<SwitchId, TopologyError> {
        let node = self
            .switches
            .get_mut(&id)
            .ok_or(TopologyError::SwitchNotFound(id))?;

        let neighbor = match node.ports.remove(&port) {
            Some(n) => n,
            None => return Err(TopologyError::PortNotFound { switch: id, port }),
        };
        node.neighbor_ports.remove(&neighbor);
        node.port_states.remove(&port);

        self.links.remove(&Link::new(id, neighbor));
        Ok(neighbor)
    }
}
