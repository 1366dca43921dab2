//! Controller error types.

use l2ctl_types::{PortNo, SwitchId};

/// Errors raised by topology structure operations and spanning-tree
/// construction.
///
/// A lookup miss on a learned table is not an error (it drives the flood
/// path) and is represented as `Option::None` at the call sites instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// The graph has no switches at all; there is nothing to root a tree
    /// at.
    #[error("topology has no switches")]
    EmptyTopology,

    /// The graph is not connected: the listed switches are unreachable
    /// from the chosen root. A tree missing nodes is never returned.
    #[error("topology is disconnected: {unreachable:?} unreachable from root {root}")]
    Disconnected {
        root: SwitchId,
        unreachable: Vec<SwitchId>,
    },

    #[error("switch {0} is not in the topology")]
    SwitchNotFound(SwitchId),

    /// The switch has no port toward the named neighbor.
    #[error("switch {switch} has no port toward {neighbor}")]
    InvalidPort {
        switch: SwitchId,
        neighbor: SwitchId,
    },

    /// The referenced port is absent from the switch's port mapping.
    #[error("port {port} is not present on switch {switch}")]
    PortNotFound { switch: SwitchId, port: PortNo },

    /// Both endpoints of a link must already be present and carry a port
    /// toward each other.
    #[error("link {a} <-> {b} is not backed by ports on both switches")]
    InconsistentLink { a: SwitchId, b: SwitchId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TopologyError::Disconnected {
            root: SwitchId::new(1),
            unreachable: vec![SwitchId::new(5)],
        };
        let msg = err.to_string();
        assert!(msg.contains("disconnected"));
        assert!(msg.contains("root 1"));

        let err = TopologyError::PortNotFound {
            switch: SwitchId::new(2),
            port: PortNo::new(9),
        };
        assert_eq!(err.to_string(), "port 9 is not present on switch 2");
    }
}
