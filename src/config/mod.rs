//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions and built-in defaults in [`schema`]
//! - File discovery and layering in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use forgeline::config::{load_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".forgeline");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "packages: [make, autoconf]").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.packages, vec!["make", "autoconf"]);
//! ```

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use loader::{load_config, load_config_value, parse_config, ConfigPaths, CONFIG_DIR};
pub use merger::{deep_merge, merge_layers};
pub use schema::{
    BuildConfig, FeatureConfig, ForgelineConfig, MetadataConfig, ProvisionConfig,
    ProvisionPolicy, RegistryLocation, SubsystemConfig, DEFAULT_PACKAGES,
};
pub use validator::{validate, validate_config};
