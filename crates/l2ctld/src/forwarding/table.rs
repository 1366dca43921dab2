//! Per-switch learned address table.

use l2ctl_types::{MacAddress, PortNo};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Learned host locations for one switch: source address to the port it
/// was last seen on.
///
/// A reverse port-to-addresses index is maintained alongside the forward
/// map, so invalidating a port never scans values or depends on map
/// iteration order.
#[derive(Debug, Clone, Default)]
pub struct AddressTable {
    forward: HashMap<MacAddress, PortNo>,
    by_port: HashMap<PortNo, HashSet<MacAddress>>,
}

impl AddressTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `addr` was seen arriving on `port`.
    ///
    /// Idempotent for a repeated (addr, port) pair; a different port
    /// moves the entry and updates the reverse index.
    pub fn learn(&mut self, addr: MacAddress, port: PortNo) {
        if let Some(previous) = self.forward.insert(addr, port) {
            if previous == port {
                return;
            }
            if let Some(set) = self.by_port.get_mut(&previous) {
                set.remove(&addr);
                if set.is_empty() {
                    self.by_port.remove(&previous);
                }
            }
        }
        self.by_port.entry(port).or_default().insert(addr);
    }

    /// Returns the egress port last learned for `addr`.
    pub fn lookup(&self, addr: MacAddress) -> Option<PortNo> {
        self.forward.get(&addr).copied()
    }

    /// Forgets a single address.
    pub fn forget(&mut self, addr: MacAddress) -> Option<PortNo> {
        let port = self.forward.remove(&addr)?;
        if let Some(set) = self.by_port.get_mut(&port) {
            set.remove(&addr);
            if set.is_empty() {
                self.by_port.remove(&port);
            }
        }
        Some(port)
    }

    /// Drops every entry whose egress port is `port`.
    ///
    /// Returns the purged addresses.
    pub fn purge_port(&mut self, port: PortNo) -> Vec<MacAddress> {
        let addrs: Vec<MacAddress> = match self.by_port.remove(&port) {
            Some(set) => set.into_iter().collect(),
            None => return Vec::new(),
        };
        for addr in &addrs {
            self.forward.remove(addr);
        }
        addrs
    }

    /// Returns the number of learned addresses.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns true if nothing has been learned.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Returns the entries sorted by address, for diagnostics.
    pub fn sorted_entries(&self) -> BTreeMap<MacAddress, PortNo> {
        self.forward.iter().map(|(a, p)| (*a, *p)).collect()
    }

    /// Returns the set of ports currently referenced by entries.
    pub fn referenced_ports(&self) -> BTreeSet<PortNo> {
        self.by_port.keys().copied().collect()
    }
}
