//! Synthesized package-metadata descriptors.
//!
//! The external build system finds optional libraries only through
//! `pkg-config`. A feature that is installed natively on the host (outside the
//! subsystem's package database) gets a generated `<name>.pc` that points the
//! lookup at the native install and its native link library.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{ForgelineConfig, MetadataConfig};
use crate::environment::{EnvironmentProfile, FeatureLocation};
use crate::error::Result;
use crate::shell::translate_path;

/// Contents of a `.pc` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgConfigDescriptor {
    /// Library name; also the file stem.
    pub name: String,
    pub description: String,
    pub version: String,
    /// Install root in subsystem syntax.
    pub prefix: String,
    /// Library directory relative to the prefix.
    pub lib_subdir: String,
    /// Include directory relative to the prefix.
    pub include_subdir: String,
    /// Link directive for the platform-native library, e.g. `-lwinfsp-x64`.
    pub link_flag: String,
}

impl PkgConfigDescriptor {
    /// Describe a detected feature with the configured metadata.
    pub fn for_feature(metadata: &MetadataConfig, location: &FeatureLocation) -> Result<Self> {
        Ok(Self {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            version: metadata.version.clone(),
            prefix: translate_path(&location.root)?,
            lib_subdir: location.lib_subdir.replace('\\', "/"),
            include_subdir: location.include_subdir.replace('\\', "/"),
            link_flag: metadata.link_flag.clone(),
        })
    }

    /// File name of the descriptor.
    pub fn file_name(&self) -> String {
        format!("{}.pc", self.name)
    }

    /// Render the descriptor in pkg-config syntax.
    pub fn render(&self) -> String {
        format!(
            "prefix={prefix}\n\
             libdir=${{prefix}}/{lib}\n\
             includedir=${{prefix}}/{include}\n\
             \n\
             Name: {name}\n\
             Description: {description}\n\
             Version: {version}\n\
             Libs: -L${{libdir}} {link}\n\
             Cflags: -I${{includedir}}\n",
            prefix = self.prefix,
            lib = self.lib_subdir,
            include = self.include_subdir,
            name = self.name,
            description = self.description,
            version = self.version,
            link = self.link_flag,
        )
    }
}

/// Descriptors for every present feature that declares metadata.
pub fn descriptors_for(
    config: &ForgelineConfig,
    profile: &EnvironmentProfile,
) -> Result<Vec<PkgConfigDescriptor>> {
    let mut descriptors = Vec::new();
    for feature in &config.features {
        let (Some(metadata), Some(location)) =
            (feature.metadata.as_ref(), profile.feature(&feature.name))
        else {
            continue;
        };
        descriptors.push(PkgConfigDescriptor::for_feature(metadata, location)?);
    }
    Ok(descriptors)
}

/// Write `descriptor` into `target_dir`, replacing any existing file.
///
/// Creates `target_dir` if needed and returns the written path.
pub fn synthesize(target_dir: &Path, descriptor: &PkgConfigDescriptor) -> Result<PathBuf> {
    fs::create_dir_all(target_dir)?;
    let path = target_dir.join(descriptor.file_name());
    fs::write(&path, descriptor.render())?;
    debug!("wrote {}", path.display());
    Ok(path)
}
