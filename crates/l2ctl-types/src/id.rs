//! Switch and port identifier newtypes.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque 64-bit datapath identifier for a switch.
///
/// Ordering follows the numeric value; the controller relies on this when
/// it needs a reproducible pick among switches (e.g. the spanning-tree
/// root).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SwitchId(pub u64);

impl SwitchId {
    /// Creates a switch id from its raw datapath value.
    pub const fn new(id: u64) -> Self {
        SwitchId(id)
    }

    /// Returns the raw datapath value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Renders the 16-hex-digit datapath form used in switch-facing logs
    /// (e.g. `0000000000000001`).
    pub fn to_dpid_string(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SwitchId {
    fn from(id: u64) -> Self {
        SwitchId(id)
    }
}

impl FromStr for SwitchId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(SwitchId)
            .map_err(|_| ParseError::InvalidSwitchId(s.to_string()))
    }
}

/// A switch-local port number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PortNo(pub u32);

impl PortNo {
    /// Creates a port number from its raw value.
    pub const fn new(port: u32) -> Self {
        PortNo(port)
    }

    /// Returns the raw port number.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PortNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PortNo {
    fn from(port: u32) -> Self {
        PortNo(port)
    }
}

impl FromStr for PortNo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(PortNo)
            .map_err(|_| ParseError::InvalidPortNo(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_switch_id_ordering() {
        let mut ids = vec![SwitchId::new(4), SwitchId::new(1), SwitchId::new(3)];
        ids.sort();
        assert_eq!(ids, vec![SwitchId::new(1), SwitchId::new(3), SwitchId::new(4)]);
    }

    #[test]
    fn test_switch_id_dpid_string() {
        assert_eq!(SwitchId::new(1).to_dpid_string(), "0000000000000001");
        assert_eq!(SwitchId::new(0xabcd).to_dpid_string(), "000000000000abcd");
    }

    #[test]
    fn test_switch_id_display() {
        assert_eq!(SwitchId::new(42).to_string(), "42");
    }

    #[test]
    fn test_switch_id_parse() {
        assert_eq!("7".parse::<SwitchId>().unwrap(), SwitchId::new(7));
        assert!("seven".parse::<SwitchId>().is_err());
    }

    #[test]
    fn test_port_no_parse() {
        assert_eq!("10".parse::<PortNo>().unwrap(), PortNo::new(10));
        assert!("-1".parse::<PortNo>().is_err());
    }
}
