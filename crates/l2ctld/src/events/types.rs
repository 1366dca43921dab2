//! Event types delivered by the transport collaborator.

use l2ctl_types::{MacAddress, PortNo, PortState, SwitchId};

/// Opaque handle to a frame buffered at a switch, echoed back in replay
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadRef(pub u64);

impl PayloadRef {
    /// Creates a payload reference from a raw buffer id.
    pub const fn new(id: u64) -> Self {
        PayloadRef(id)
    }

    /// Returns the raw buffer id.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

/// A frame delivered to the controller for a forwarding decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEvent {
    pub switch: SwitchId,
    pub in_port: PortNo,
    pub src: MacAddress,
    pub dst: MacAddress,
    pub payload: PayloadRef,
}

/// Events the controller consumes from its transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A switch connected.
    SwitchEnter(SwitchId),
    /// A switch disconnected; its state must be purged.
    SwitchLeave(SwitchId),
    /// A port changed operational state.
    PortStateChange {
        switch: SwitchId,
        port: PortNo,
        state: PortState,
    },
    /// A port disappeared from a switch (its link is gone for good).
    PortRemoved { switch: SwitchId, port: PortNo },
    /// A frame arrived and awaits a forwarding decision.
    FrameArrived(FrameEvent),
}

impl Event {
    /// Short event-kind label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SwitchEnter(_) => "switch-enter",
            Event::SwitchLeave(_) => "switch-leave",
            Event::PortStateChange { .. } => "port-state-change",
            Event::PortRemoved { .. } => "port-removed",
            Event::FrameArrived(_) => "frame-arrived",
        }
    }
}
