//! Logging-only callbacks implementation.

use super::types::{ControllerCallbacks, FlowAction, FlowRule, RulePattern};
use crate::events::PayloadRef;
use l2ctl_types::{PortNo, SwitchId};
use tracing::info;

/// Callbacks implementation that renders every request to the log.
///
/// The binary wires this in when no switch transport is attached, so the
/// control plane can be exercised and observed on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCallbacks;

impl ControllerCallbacks for TracingCallbacks {
    fn install_rule(&self, rule: &FlowRule) {
        let FlowAction::Output(out) = rule.action;
        info!(
            switch = %rule.switch,
            in_port = %rule.matching.in_port,
            src = %rule.matching.src,
            dst = %rule.matching.dst,
            out_port = %out,
            priority = rule.priority,
            "install rule"
        );
    }

    fn delete_rules(&self, switch: SwitchId, pattern: &RulePattern) {
        match pattern.dst {
            Some(dst) => info!(%switch, %dst, "delete rules for destination"),
            None => info!(%switch, "delete all rules"),
        }
    }

    fn replay(
        &self,
        switch: SwitchId,
        payload: PayloadRef,
        in_port: PortNo,
        out_ports: &[PortNo],
    ) {
        info!(
            %switch,
            buffer = payload.as_u64(),
            %in_port,
            ?out_ports,
            "replay buffered frame"
        );
    }
}
