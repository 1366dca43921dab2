//! l2ctld entry point.
//!
//! Loads the topology description, builds the initial spanning tree,
//! and runs the event loop until the transport closes the channel or
//! the process receives ctrl-c.

use anyhow::Context;
use clap::Parser;
use l2ctld::{
    render_topology, render_tree, ControllerDaemon, ForwardingConfig, ForwardingEngine,
    TopologyChangeHandler, TopologyConfig, TopologyState, TracingCallbacks,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Centralized L2 forwarding controller
#[derive(Parser, Debug)]
#[command(name = "l2ctld")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topology description file
    #[arg(short = 't', long, default_value = "topology.yaml")]
    topology: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Event channel capacity
    #[arg(long, default_value = "1024")]
    channel_capacity: usize,

    /// Do not install unicast flow rules (every frame keeps reaching
    /// the controller)
    #[arg(long)]
    no_install: bool,
}

/// Initializes the tracing subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config =
        TopologyConfig::load(&args.topology).context("failed to load topology description")?;
    let graph = config
        .build_graph()
        .context("invalid topology description")?;

    info!("topology:\n{}", render_topology(&graph));

    let state = Arc::new(TopologyState::new(graph));
    state
        .rebuild_tree()
        .context("initial spanning tree construction failed")?;
    state.with_tree(|tree| {
        if let Some(tree) = tree {
            info!("{}", render_tree(tree));
        }
    });

    let callbacks = Arc::new(TracingCallbacks);
    let engine = Arc::new(
        ForwardingEngine::new(Arc::clone(&state), callbacks.clone()).with_config(
            ForwardingConfig {
                install_rules: !args.no_install,
            },
        ),
    );
    let handler = Arc::new(TopologyChangeHandler::new(Arc::clone(&state), callbacks));

    // The transport collaborator owns the sender; without one attached,
    // the daemon idles until ctrl-c.
    let (tx, rx) = mpsc::channel(args.channel_capacity);
    let daemon = ControllerDaemon::new(engine, handler, rx);
    let daemon_task = tokio::spawn(daemon.run());

    match tokio::signal::ctrl_c().await {
        Ok(()) => warn!("received SIGINT, shutting down"),
        Err(e) => error!(error = %e, "failed to listen for ctrl-c"),
    }
    drop(tx);

    daemon_task.await.context("daemon task failed")?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("--- Starting l2ctld ---");

    if let Err(e) = run(args).await {
        error!("l2ctld failed: {e:#}");
        return ExitCode::FAILURE;
    }

    info!("l2ctld shutdown complete");
    ExitCode::SUCCESS
}
