//! Frame forwarding decisions.

use crate::events::FrameEvent;
use crate::flow::{ControllerCallbacks, FlowRule};
use crate::state::TopologyState;
use l2ctl_types::PortNo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Forwarding engine configuration.
#[derive(Debug, Clone)]
pub struct ForwardingConfig {
    /// Install a persistent rule after each successful unicast lookup.
    /// Disabled, every frame keeps coming to the controller; useful for
    /// diagnostics. Flood decisions never install rules either way.
    pub install_rules: bool,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        ForwardingConfig {
            install_rules: true,
        }
    }
}

/// Forwarding engine counters.
#[derive(Debug, Default)]
pub struct ForwardingStats {
    frames: AtomicU64,
    unicasts: AtomicU64,
    floods: AtomicU64,
    drops: AtomicU64,
    rules_installed: AtomicU64,
}

impl ForwardingStats {
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn unicasts(&self) -> u64 {
        self.unicasts.load(Ordering::Relaxed)
    }

    pub fn floods(&self) -> u64 {
        self.floods.load(Ordering::Relaxed)
    }

    pub fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    pub fn rules_installed(&self) -> u64 {
        self.rules_installed.load(Ordering::Relaxed)
    }
}

/// How an observed frame is to be forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Ignore the frame entirely.
    Drop,
    /// The destination is known; emit on one port.
    Unicast { port: PortNo },
    /// Destination unknown; emit on every usable spanning-tree port.
    Flood { ports: Vec<PortNo> },
}

impl Decision {
    /// The output port set implied by the decision.
    pub fn output_ports(&self) -> Vec<PortNo> {
        match self {
            Decision::Drop => Vec::new(),
            Decision::Unicast { port } => vec![*port],
            Decision::Flood { ports } => ports.clone(),
        }
    }
}

/// Decides how each observed frame is forwarded.
///
/// Takes `&self` throughout: counters are atomic and all mutable state
/// lives behind [`TopologyState`]'s own synchronization, so frames for
/// distinct switches are safe to process concurrently.
pub struct ForwardingEngine {
    config: ForwardingConfig,
    stats: ForwardingStats,
    state: Arc<TopologyState>,
    callbacks: Arc<dyn ControllerCallbacks>,
}

impl ForwardingEngine {
    /// Creates an engine over shared state and the switch-facing
    /// callbacks.
    pub fn new(state: Arc<TopologyState>, callbacks: Arc<dyn ControllerCallbacks>) -> Self {
        ForwardingEngine {
            config: ForwardingConfig::default(),
            stats: ForwardingStats::default(),
            state,
            callbacks,
        }
    }

    /// Overrides the default configuration.
    pub fn with_config(mut self, config: ForwardingConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the engine counters.
    pub fn stats(&self) -> &ForwardingStats {
        &self.stats
    }

    /// Handles one frame: learn the source location, then unicast toward
    /// a known destination or flood along the spanning tree.
    ///
    /// Every emitted frame goes through a replay request; unicast
    /// decisions additionally install a persistent rule so the switch
    /// stops consulting the controller for that match.
    pub fn handle_frame(&self, frame: &FrameEvent) -> Decision {
        self.stats.frames.fetch_add(1, Ordering::Relaxed);

        // Link-management traffic (discovery) is never learned or
        // forwarded.
        if frame.dst.is_link_management() {
            trace!(switch = %frame.switch, dst = %frame.dst, "ignoring link-management frame");
            return self.drop_frame();
        }

        // A port outside FORWARD cannot carry learning traffic.
        if self.state.port_blocked(frame.switch, frame.in_port) {
            debug!(
                switch = %frame.switch,
                in_port = %frame.in_port,
                "frame from non-forwarding port dropped"
            );
            return self.drop_frame();
        }

        // A frame racing a switch removal degrades to a no-op.
        if !self.state.learn(frame.switch, frame.src, frame.in_port) {
            debug!(switch = %frame.switch, "frame from unknown switch dropped");
            return self.drop_frame();
        }

        match self.state.lookup(frame.switch, frame.dst) {
            Some(out_port) if out_port == frame.in_port => {
                // The destination sits behind the arrival port. Sending
                // the frame back out that port is never useful, and a
                // rule would pin the hairpin.
                debug!(
                    switch = %frame.switch,
                    port = %out_port,
                    dst = %frame.dst,
                    "destination learned on arrival port"
                );
                self.drop_frame()
            }
            Some(out_port) => {
                if self.config.install_rules {
                    let rule = FlowRule::unicast(
                        frame.switch,
                        frame.in_port,
                        frame.src,
                        frame.dst,
                        out_port,
                    );
                    self.callbacks.install_rule(&rule);
                    self.stats.rules_installed.fetch_add(1, Ordering::Relaxed);
                }
                self.callbacks
                    .replay(frame.switch, frame.payload, frame.in_port, &[out_port]);
                self.stats.unicasts.fetch_add(1, Ordering::Relaxed);
                Decision::Unicast { port: out_port }
            }
            None => {
                let ports = self.state.flood_ports(frame.switch, frame.in_port);
                if !ports.is_empty() {
                    self.callbacks
                        .replay(frame.switch, frame.payload, frame.in_port, &ports);
                }
                self.stats.floods.fetch_add(1, Ordering::Relaxed);
                Decision::Flood { ports }
            }
        }
    }

    fn drop_frame(&self) -> Decision {
        self.stats.drops.fetch_add(1, Ordering::Relaxed);
        Decision::Drop
    }
}
