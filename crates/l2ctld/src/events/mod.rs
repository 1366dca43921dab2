//! Controller events and topology-change handling.
//!
//! Collaborators feed [`Event`]s into the daemon's channel; the
//! [`TopologyChangeHandler`] reacts to lifecycle events by pruning
//! learned state and keeping the cached spanning tree current.

mod handler;
mod types;

pub use handler::{HandlerState, HandlerStats, TopologyChangeHandler};
pub use types::{Event, FrameEvent, PayloadRef};
