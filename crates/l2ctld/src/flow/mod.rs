//! Flow rule outputs and the collaborator seam.
//!
//! The controller never talks a wire protocol itself; it emits rule
//! install, rule delete, and packet replay requests through
//! [`ControllerCallbacks`], implemented by whatever owns the switch
//! connection.

mod log;
mod types;

pub use log::TracingCallbacks;
pub use types::{
    ControllerCallbacks, FlowAction, FlowMatch, FlowRule, RulePattern, DEFAULT_RULE_PRIORITY,
};
