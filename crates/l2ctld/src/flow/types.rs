//! Flow rule types.

use crate::events::PayloadRef;
use l2ctl_types::{MacAddress, PortNo, SwitchId};

/// Default priority for installed forwarding rules.
pub const DEFAULT_RULE_PRIORITY: u16 = 0x8000;

/// Exact-match key for an installed rule: arrival port plus both
/// addresses, so a relearned source invalidates cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowMatch {
    pub in_port: PortNo,
    pub dst: MacAddress,
    pub src: MacAddress,
}

/// Forwarding action carried by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    /// Emit the frame on the given port.
    Output(PortNo),
}

/// A persistent forwarding rule to install on a switch.
///
/// Rules are installed once and never age out: no idle or hard timeout.
/// The switch is asked to notify on removal so external deletions are
/// observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRule {
    pub switch: SwitchId,
    pub matching: FlowMatch,
    pub action: FlowAction,
    pub priority: u16,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub notify_removal: bool,
}

impl FlowRule {
    /// Builds the unicast rule installed after a successful lookup.
    pub fn unicast(
        switch: SwitchId,
        in_port: PortNo,
        src: MacAddress,
        dst: MacAddress,
        out_port: PortNo,
    ) -> Self {
        FlowRule {
            switch,
            matching: FlowMatch { in_port, dst, src },
            action: FlowAction::Output(out_port),
            priority: DEFAULT_RULE_PRIORITY,
            idle_timeout: 0,
            hard_timeout: 0,
            notify_removal: true,
        }
    }
}

/// Selector for rule deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RulePattern {
    /// Restrict to rules whose match destination equals this address;
    /// `None` selects every rule on the switch.
    pub dst: Option<MacAddress>,
}

impl RulePattern {
    /// Selects all rules on a switch.
    pub fn all() -> Self {
        RulePattern { dst: None }
    }

    /// Selects rules toward one destination.
    pub fn for_dst(dst: MacAddress) -> Self {
        RulePattern { dst: Some(dst) }
    }
}

/// Requests the controller sends to the switch-facing collaborator.
///
/// Implementations must be cheap and non-blocking; they are invoked from
/// the forwarding path.
pub trait ControllerCallbacks: Send + Sync {
    /// Install a persistent forwarding rule.
    fn install_rule(&self, rule: &FlowRule);

    /// Delete the rules selected by `pattern` on one switch.
    fn delete_rules(&self, switch: SwitchId, pattern: &RulePattern);

    /// Re-emit the frame buffered at the switch out the resolved ports.
    fn replay(
        &self,
        switch: SwitchId,
        payload: PayloadRef,
        in_port: PortNo,
        out_ports: &[PortNo],
    );
}
