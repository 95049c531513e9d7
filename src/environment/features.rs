//! Optional feature library discovery.
//!
//! Each [`LocationProvider`] proposes install roots for a feature; a root is
//! only accepted when it holds one of the feature's include subdirectories
//! and one of its library subdirectories. Providers are tried in order and
//! the first accepted root wins.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::registry::RegistryStore;
use crate::config::FeatureConfig;

/// Where a feature location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Override,
    Registry,
    Conventional,
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LocationSource::Override => "override",
            LocationSource::Registry => "registry",
            LocationSource::Conventional => "conventional directory",
        };
        write!(f, "{}", s)
    }
}

/// A detected feature library install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureLocation {
    /// Install root.
    pub root: PathBuf,
    /// Include directory (`root` joined with `include_subdir`).
    pub include_dir: PathBuf,
    /// Library directory (`root` joined with `lib_subdir`).
    pub lib_dir: PathBuf,
    /// Include subdirectory name relative to `root`.
    pub include_subdir: String,
    /// Library subdirectory name relative to `root`.
    pub lib_subdir: String,
    pub source: LocationSource,
}

/// Accept `root` if it holds an include and a library subdirectory.
///
/// Every library subdirectory name is tried against the root before giving
/// up on it.
pub fn accept_root(
    root: &Path,
    feature: &FeatureConfig,
    source: LocationSource,
) -> Option<FeatureLocation> {
    for lib_subdir in &feature.lib_dirs {
        let lib_dir = root.join(lib_subdir);
        if !lib_dir.is_dir() {
            continue;
        }
        for include_subdir in &feature.include_dirs {
            let include_dir = root.join(include_subdir);
            if include_dir.is_dir() {
                return Some(FeatureLocation {
                    root: root.to_path_buf(),
                    include_dir,
                    lib_dir,
                    include_subdir: include_subdir.clone(),
                    lib_subdir: lib_subdir.clone(),
                    source,
                });
            }
        }
    }
    None
}

/// One strategy for finding a feature.
pub trait LocationProvider {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Attempt to locate `feature`.
    fn locate(&self, feature: &FeatureConfig) -> Option<FeatureLocation>;
}

/// An operator-supplied root, tried before anything else.
pub struct RootOverride(pub PathBuf);

impl LocationProvider for RootOverride {
    fn name(&self) -> &'static str {
        "override"
    }

    fn locate(&self, feature: &FeatureConfig) -> Option<FeatureLocation> {
        let found = accept_root(&self.0, feature, LocationSource::Override);
        if found.is_none() {
            warn!(
                "feature root override {} has no usable layout for '{}'",
                self.0.display(),
                feature.name
            );
        }
        found
    }
}

/// The install directory recorded in the host registry.
pub struct RegistryProvider<'a> {
    store: &'a dyn RegistryStore,
}

impl<'a> RegistryProvider<'a> {
    pub fn new(store: &'a dyn RegistryStore) -> Self {
        Self { store }
    }
}

impl LocationProvider for RegistryProvider<'_> {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn locate(&self, feature: &FeatureConfig) -> Option<FeatureLocation> {
        let location = feature.registry.as_ref()?;
        let recorded = self.store.query(location)?;
        let root = PathBuf::from(recorded.trim_end_matches(['\\', '/']));
        if !root.exists() {
            debug!(
                "registry points '{}' at {}, which does not exist",
                feature.name,
                root.display()
            );
            return None;
        }
        accept_root(&root, feature, LocationSource::Registry)
    }
}

/// The feature's conventional install roots, in order.
pub struct ConventionalRoots;

impl LocationProvider for ConventionalRoots {
    fn name(&self) -> &'static str {
        "conventional"
    }

    fn locate(&self, feature: &FeatureConfig) -> Option<FeatureLocation> {
        feature
            .roots
            .iter()
            .find_map(|root| accept_root(root, feature, LocationSource::Conventional))
    }
}

/// Run the provider chain for one feature, first match wins.
pub fn locate_feature(
    feature: &FeatureConfig,
    providers: &[&dyn LocationProvider],
) -> Option<FeatureLocation> {
    for provider in providers {
        debug!("locating '{}' via {}", feature.name, provider.name());
        if let Some(location) = provider.locate(feature) {
            debug!(
                "found '{}' at {} ({})",
                feature.name,
                location.root.display(),
                location.source
            );
            return Some(location);
        }
    }
    debug!("feature '{}' not found", feature.name);
    None
}
