//! Environment probing.
//!
//! - [`tools`] - executable lookup on the search path
//! - [`registry`] - host registry reads
//! - [`features`] - optional feature library discovery
//! - [`prober`] - assembling the [`EnvironmentProfile`]
//!
//! # Example
//!
//! ```no_run
//! use forgeline::config::ForgelineConfig;
//! use forgeline::environment::probe;
//!
//! let config = ForgelineConfig::default();
//! let profile = probe(&config, None).unwrap();
//! println!("building with {} jobs", profile.cpu_count());
//! if let Some(fuse) = profile.feature("fuse") {
//!     println!("fuse headers in {}", fuse.include_dir.display());
//! }
//! ```

pub mod features;
pub mod prober;
pub mod registry;
pub mod tools;

use std::path::{Path, PathBuf};

use serde::Serialize;

pub use features::{
    accept_root, locate_feature, ConventionalRoots, FeatureLocation, LocationProvider,
    LocationSource, RegistryProvider, RootOverride,
};
pub use prober::{default_context, probe, ProbeContext, Prober};
pub use registry::{parse_reg_output, RegQuery, RegistryStore};
pub use tools::{is_executable, parse_system_path, resolve_tool_path, search_path};

/// Detection outcome for one optional feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureStatus {
    pub name: String,
    /// `None` when the feature was not found.
    pub location: Option<FeatureLocation>,
}

/// Snapshot of the host, taken once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentProfile {
    subsystem_root: PathBuf,
    shell: PathBuf,
    compiler: PathBuf,
    cpu_count: usize,
    features: Vec<FeatureStatus>,
}

impl EnvironmentProfile {
    pub fn new(
        subsystem_root: PathBuf,
        shell: PathBuf,
        compiler: PathBuf,
        cpu_count: usize,
        features: Vec<FeatureStatus>,
    ) -> Self {
        Self {
            subsystem_root,
            shell,
            compiler,
            cpu_count: cpu_count.max(1),
            features,
        }
    }

    pub fn subsystem_root(&self) -> &Path {
        &self.subsystem_root
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }

    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    /// Logical CPU count, never less than 1.
    pub fn cpu_count(&self) -> usize {
        self.cpu_count
    }

    pub fn features(&self) -> &[FeatureStatus] {
        &self.features
    }

    /// Location of a detected feature, `None` if absent or unknown.
    pub fn feature(&self, name: &str) -> Option<&FeatureLocation> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.location.as_ref())
    }
}
