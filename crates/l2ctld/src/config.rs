//! Topology description loading.

use crate::error::TopologyError;
use crate::topology::TopologyGraph;
use l2ctl_types::{PortNo, SwitchId};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::info;

/// Errors raised while loading or validating a topology description.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read topology file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse topology description: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("duplicate switch id {0}")]
    DuplicateSwitch(SwitchId),

    #[error("switch {switch} maps port {port} back to itself")]
    SelfLink { switch: SwitchId, port: PortNo },

    #[error("switch {switch} references unknown neighbor {neighbor}")]
    UnknownNeighbor { switch: SwitchId, neighbor: SwitchId },

    #[error("switch {a} maps a port toward {b}, but {b} has no port back toward {a}")]
    AsymmetricLink { a: SwitchId, b: SwitchId },

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// One switch in the topology description.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchConfig {
    pub id: SwitchId,
    /// Ordered port to neighbor-switch mapping. Host-facing ports are
    /// not listed; the controller only needs the inter-switch wiring.
    #[serde(default)]
    pub ports: BTreeMap<PortNo, SwitchId>,
}

/// The topology description handed to the controller at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct TopologyConfig {
    pub switches: Vec<SwitchConfig>,
}

impl TopologyConfig {
    /// Loads a YAML topology description from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        info!(
            path = %path.display(),
            switches = config.switches.len(),
            "topology description loaded"
        );
        Ok(config)
    }

    /// Parses a YAML topology description.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Validates the description and builds the topology graph.
    ///
    /// Requires every neighbor reference to resolve and every link to be
    /// described from both ends; these are startup-fatal.
    pub fn build_graph(&self) -> Result<TopologyGraph, ConfigError> {
        let mut described: BTreeMap<SwitchId, &SwitchConfig> = BTreeMap::new();
        for switch in &self.switches {
            if described.insert(switch.id, switch).is_some() {
                return Err(ConfigError::DuplicateSwitch(switch.id));
            }
        }

        for switch in &self.switches {
            for (port, neighbor) in &switch.ports {
                if *neighbor == switch.id {
                    return Err(ConfigError::SelfLink {
                        switch: switch.id,
                        port: *port,
                    });
                }
                let other = described.get(neighbor).ok_or(ConfigError::UnknownNeighbor {
                    switch: switch.id,
                    neighbor: *neighbor,
                })?;
                if !other.ports.values().any(|n| *n == switch.id) {
                    return Err(ConfigError::AsymmetricLink {
                        a: switch.id,
                        b: *neighbor,
                    });
                }
            }
        }

        let mut graph = TopologyGraph::new();
        for switch in &self.switches {
            graph.add_switch(switch.id, switch.ports.clone());
        }

        let mut seen: BTreeSet<(SwitchId, SwitchId)> = BTreeSet::new();
        for switch in &self.switches {
            for neighbor in switch.ports.values() {
                let key = if switch.id <= *neighbor {
                    (switch.id, *neighbor)
                } else {
                    (*neighbor, switch.id)
                };
                if seen.insert(key) {
                    graph.add_link(key.0, key.1)?;
                }
            }
        }
        Ok(graph)
    }
}
