//! Controller event loop.

use crate::events::{Event, TopologyChangeHandler};
use crate::forwarding::ForwardingEngine;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// The event loop: drains the transport's channel and dispatches each
/// event by kind.
///
/// Frame arrivals are spawned onto the runtime so frames for distinct
/// switches process concurrently (per-switch serialization comes from
/// the state layer). Topology events run on the loop in arrival order,
/// which keeps pruning and recomputation sequenced the way the
/// transport observed them.
pub struct ControllerDaemon {
    engine: Arc<ForwardingEngine>,
    handler: Arc<TopologyChangeHandler>,
    rx: mpsc::Receiver<Event>,
}

impl ControllerDaemon {
    /// Creates a daemon over the shared engine and handler; the sending
    /// half of `rx` stays with the transport collaborator.
    pub fn new(
        engine: Arc<ForwardingEngine>,
        handler: Arc<TopologyChangeHandler>,
        rx: mpsc::Receiver<Event>,
    ) -> Self {
        ControllerDaemon {
            engine,
            handler,
            rx,
        }
    }

    /// Runs until the event channel closes, then drains in-flight frame
    /// tasks.
    pub async fn run(mut self) {
        let mut frames = JoinSet::new();

        while let Some(event) = self.rx.recv().await {
            self.dispatch(event, &mut frames);
        }

        while frames.join_next().await.is_some() {}
        info!("event channel closed, daemon exiting");
    }

    fn dispatch(&self, event: Event, frames: &mut JoinSet<()>) {
        debug!(kind = event.kind(), "dispatching event");
        match event {
            Event::FrameArrived(frame) => {
                let engine = Arc::clone(&self.engine);
                frames.spawn(async move {
                    engine.handle_frame(&frame);
                });
            }
            Event::SwitchEnter(id) => self.handler.on_switch_enter(id),
            Event::SwitchLeave(id) => self.handler.on_switch_leave(id),
            Event::PortStateChange {
                switch,
                port,
                state,
            } => self.handler.on_port_state_change(switch, port, state),
            Event::PortRemoved { switch, port } => self.handler.on_port_removed(switch, port),
        }
    }
}
