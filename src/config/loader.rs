//! Configuration file discovery and loading.
//!
//! Layers, later overriding earlier:
//! 1. Built-in defaults
//! 2. Project config (`<source>/.forgeline/config.yml`)
//! 3. Local overrides (`<source>/.forgeline/config.local.yml`)
//!
//! An explicit `--config` path replaces layers 2 and 3.

use crate::config::merger::merge_layers;
use crate::config::schema::ForgelineConfig;
use crate::error::{ForgelineError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding project configuration.
pub const CONFIG_DIR: &str = ".forgeline";

/// Paths to the project configuration layers.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project config: .forgeline/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .forgeline/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files under the given source tree.
    pub fn discover(source_root: &Path) -> Self {
        let dir = source_root.join(CONFIG_DIR);
        Self {
            project: existing(dir.join("config.yml")),
            project_local: existing(dir.join("config.local.yml")),
        }
    }

    /// Existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Read a config file as a raw YAML value.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ForgelineError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ForgelineError::Io(e)
        }
    })?;

    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| ForgelineError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    // An empty file parses as null; treat it as an empty mapping.
    if value.is_null() {
        Ok(serde_yaml::Value::Mapping(Default::default()))
    } else {
        Ok(value)
    }
}

/// Parse YAML content into a config, filling defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<ForgelineConfig> {
    serde_yaml::from_str(content).map_err(|e| ForgelineError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load configuration for a source tree.
///
/// Without any config file the built-in defaults are returned.
pub fn load_config(source_root: &Path, config_override: Option<&Path>) -> Result<ForgelineConfig> {
    let paths = match config_override {
        Some(path) => vec![path.to_path_buf()],
        None => ConfigPaths::discover(source_root)
            .all_existing()
            .into_iter()
            .cloned()
            .collect(),
    };

    let mut layers = Vec::with_capacity(paths.len());
    for path in paths {
        let value = load_config_value(&path)?;
        layers.push((path, value));
    }

    let Some((last_path, _)) = layers.last() else {
        tracing::debug!("no config file found, using defaults");
        return Ok(ForgelineConfig::default());
    };
    let report_path = last_path.clone();

    let values: Vec<serde_yaml::Value> = layers.into_iter().map(|(_, v)| v).collect();
    let merged = merge_layers(&values);

    serde_yaml::from_value(merged).map_err(|e| ForgelineError::ConfigParseError {
        path: report_path,
        message: e.to_string(),
    })
}
