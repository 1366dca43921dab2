//! Common l2ctl types for the switch control plane.
//!
//! This crate provides type-safe representations of the primitives shared
//! across the controller:
//!
//! - [`SwitchId`]: opaque datapath identifiers
//! - [`PortNo`]: switch-local port numbers
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`PortState`]: operational port states relevant to loop prevention

mod id;
mod mac;
mod port_state;

pub use id::{PortNo, SwitchId};
pub use mac::MacAddress;
pub use port_state::PortState;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid switch id: {0}")]
    InvalidSwitchId(String),

    #[error("invalid port number: {0}")]
    InvalidPortNo(String),

    #[error("invalid port state: {0}")]
    InvalidPortState(String),
}
