//! l2ctld - Centralized L2 forwarding controller.
//!
//! Given a possibly cyclic physical topology of packet switches, the
//! controller computes a loop-free spanning tree, learns host locations
//! per switch, and turns each observed frame into a unicast or
//! tree-bounded flood decision, installing persistent forwarding rules
//! so repeated decisions are avoided.
//!
//! # Architecture
//!
//! ```text
//! [topology file] ──> [TopologyGraph] ──> [SpanningTreeBuilder] ──> [SpanningTree]
//!                            │                                           │
//! [events] ──> [ControllerDaemon] ──> [ForwardingEngine] ───────────────┘
//!                       │                      │
//!                       └──> [TopologyChangeHandler]     requests ──> [ControllerCallbacks]
//! ```
//!
//! The wire protocol, the transport delivering events, and the actual
//! rule installation are external collaborators: events arrive on an
//! mpsc channel, outputs leave through the [`flow::ControllerCallbacks`]
//! trait.

pub mod config;
pub mod daemon;
pub mod error;
pub mod events;
pub mod flow;
pub mod forwarding;
pub mod state;
pub mod stp;
pub mod topology;

pub use config::{ConfigError, SwitchConfig, TopologyConfig};
pub use daemon::ControllerDaemon;
pub use error::TopologyError;
pub use events::{Event, FrameEvent, HandlerState, HandlerStats, PayloadRef, TopologyChangeHandler};
pub use flow::{
    ControllerCallbacks, FlowAction, FlowMatch, FlowRule, RulePattern, TracingCallbacks,
};
pub use forwarding::{AddressTable, Decision, ForwardingConfig, ForwardingEngine, ForwardingStats};
pub use state::TopologyState;
pub use stp::{SpanningTree, SpanningTreeBuilder};
pub use topology::{render_address_table, render_topology, render_tree, Link, TopologyGraph};

pub use l2ctl_types::{MacAddress, PortNo, PortState, SwitchId};
