use std::io;
use std::path::{Path, PathBuf};

use plasticity_viz::dashboard::{default_selection, DEFAULT_SIMULATE_INTENSITY};
use plasticity_viz::regions::{CatalogError, RegionCatalog};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("region table {path:?}: {source}")]
    Regions {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
}

/// Daemon settings read from `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Fixed seed for point-cloud jitter; unset means clock-seeded.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_selection")]
    pub default_selection: Vec<String>,
    #[serde(default = "default_simulate_intensity")]
    pub simulate_intensity: f64,
    /// Optional JSON region table replacing the built-in one.
    #[serde(default)]
    pub regions_file: Option<PathBuf>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8050".to_string()
}

fn default_simulate_intensity() -> f64 {
    DEFAULT_SIMULATE_INTENSITY
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            seed: None,
            default_selection: default_selection(),
            simulate_intensity: default_simulate_intensity(),
            regions_file: None,
        }
    }
}

impl DaemonConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Missing file means defaults; an unreadable or malformed file is logged
    /// and also falls back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No config at {:?}; using defaults", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => {
                info!("Loaded config from {:?}", path);
                cfg
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn catalog(&self) -> Result<RegionCatalog, ConfigError> {
        let Some(path) = &self.regions_file else {
            return Ok(RegionCatalog::new());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        RegionCatalog::from_json_str(&text).map_err(|source| ConfigError::Regions {
            path: path.clone(),
            source,
        })
    }
}
