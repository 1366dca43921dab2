//! Physical topology model.
//!
//! [`TopologyGraph`] holds the switches, links, and per-switch port
//! mappings the controller was given at startup. It is the only source of
//! truth for port mappings; everything else (spanning tree, learned
//! tables) is derived from it or pruned against it.

mod dump;
mod graph;

pub use dump::{render_address_table, render_topology, render_tree};
pub use graph::{Link, SwitchNode, TopologyGraph};
