//! Address learning and forwarding decisions.
//!
//! [`AddressTable`] holds one switch's learned host locations;
//! [`ForwardingEngine`] turns observed frames into unicast, flood, or
//! drop decisions and emits the matching rule-install and packet-replay
//! requests.

mod engine;
mod table;

pub use engine::{Decision, ForwardingConfig, ForwardingEngine, ForwardingStats};
pub use table::AddressTable;
