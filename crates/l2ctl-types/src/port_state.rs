//! Operational port state.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Operational state of a switch port as reported by port lifecycle
/// events.
///
/// Only [`PortState::Forward`] ports participate in learning and
/// flooding; every other state excludes the port from flood candidate
/// sets until it transitions back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortState {
    Disable,
    Block,
    Listen,
    Learn,
    Forward,
}

impl PortState {
    /// Parses a port state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DISABLE" | "disable" => Some(Self::Disable),
            "BLOCK" | "block" => Some(Self::Block),
            "LISTEN" | "listen" => Some(Self::Listen),
            "LEARN" | "learn" => Some(Self::Learn),
            "FORWARD" | "forward" => Some(Self::Forward),
            _ => None,
        }
    }

    /// Converts to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disable => "DISABLE",
            Self::Block => "BLOCK",
            Self::Listen => "LISTEN",
            Self::Learn => "LEARN",
            Self::Forward => "FORWARD",
        }
    }

    /// Returns true if the port may carry forwarded or flooded traffic.
    pub fn is_forwarding(&self) -> bool {
        matches!(self, Self::Forward)
    }
}

impl FromStr for PortState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseError::InvalidPortState(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_state_parse() {
        assert_eq!(PortState::parse("FORWARD"), Some(PortState::Forward));
        assert_eq!(PortState::parse("forward"), Some(PortState::Forward));
        assert_eq!(PortState::parse("BLOCK"), Some(PortState::Block));
        assert_eq!(PortState::parse("DISABLE"), Some(PortState::Disable));
        assert_eq!(PortState::parse("LISTEN"), Some(PortState::Listen));
        assert_eq!(PortState::parse("LEARN"), Some(PortState::Learn));
        assert_eq!(PortState::parse("invalid"), None);
    }

    #[test]
    fn test_port_state_round_trip() {
        for state in [
            PortState::Disable,
            PortState::Block,
            PortState::Listen,
            PortState::Learn,
            PortState::Forward,
        ] {
            assert_eq!(PortState::parse(state.as_str()), Some(state));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("FORWARD".parse::<PortState>(), Ok(PortState::Forward));
        assert!("bogus".parse::<PortState>().is_err());
    }

    #[test]
    fn test_only_forward_is_forwarding() {
        assert!(PortState::Forward.is_forwarding());
        assert!(!PortState::Disable.is_forwarding());
        assert!(!PortState::Block.is_forwarding());
        assert!(!PortState::Listen.is_forwarding());
        assert!(!PortState::Learn.is_forwarding());
    }
}
