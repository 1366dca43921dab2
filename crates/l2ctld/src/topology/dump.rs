//! Deterministic textual topology renderings, for diagnostics only.

use super::graph::TopologyGraph;
use crate::stp::SpanningTree;
use l2ctl_types::{MacAddress, PortNo, SwitchId};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Renders a graph's nodes (with port maps) and edges.
///
/// Output is stable for a given topology: nodes, ports, and edges all
/// print in ascending order.
pub fn render_topology(graph: &TopologyGraph) -> String {
    let mut out = String::from("nodes:\n");
    for (id, node) in graph.iter() {
        let ports = node
            .ports()
            .iter()
            .map(|(port, neighbor)| format!("{port}->{neighbor}"))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "  {id}\tports: {ports}");
    }
    out.push_str("edges:\n");
    for link in graph.links() {
        let _ = writeln!(out, "  {} <-> {}", link.a(), link.b());
    }
    out
}

/// Renders a spanning tree's root and edges.
pub fn render_tree(tree: &SpanningTree) -> String {
    let mut out = format!("spanning tree (root {}):\n", tree.root());
    for edge in tree.edges() {
        let _ = writeln!(out, "  {} <-> {}", edge.a(), edge.b());
    }
    out
}

/// Renders one switch's learned address table, sorted by address.
pub fn render_address_table(switch: SwitchId, entries: &BTreeMap<MacAddress, PortNo>) -> String {
    let mut out = format!("address table of switch {switch}:\n");
    for (addr, port) in entries {
        let _ = writeln!(out, "  {addr} -> {port}");
    }
    out
}
