//! Configuration schema definitions for forgeline.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file. Every field has a default, so a partial file only
//! overrides what it names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Packages the subsystem must provide before a build can start.
pub const DEFAULT_PACKAGES: &[&str] = &[
    "base-devel",
    "autoconf",
    "automake",
    "libtool",
    "make",
    "mingw-w64-x86_64-gcc",
    "mingw-w64-x86_64-pkgconf",
    "mingw-w64-x86_64-gettext",
    "mingw-w64-x86_64-libiconv",
];

/// Root configuration structure for `.forgeline/config.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgelineConfig {
    /// Location and layout of the POSIX subsystem.
    pub subsystem: SubsystemConfig,

    /// Packages the subsystem package manager must provide.
    pub packages: Vec<String>,

    /// Optional feature libraries to detect.
    pub features: Vec<FeatureConfig>,

    /// External build settings.
    pub build: BuildConfig,
}

impl Default for ForgelineConfig {
    fn default() -> Self {
        Self {
            subsystem: SubsystemConfig::default(),
            packages: DEFAULT_PACKAGES.iter().map(|p| p.to_string()).collect(),
            features: vec![FeatureConfig::winfsp()],
            build: BuildConfig::default(),
        }
    }
}

/// Subsystem installation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemConfig {
    /// Host directory the subsystem is installed in.
    pub root: PathBuf,

    /// Shell entry point. Defaults to `<root>\usr\bin\bash.exe`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<PathBuf>,

    /// Toolchain environment selected through `MSYSTEM`.
    pub msystem: String,

    /// Compiler executable that must be on the search path.
    pub compiler: String,

    /// Profile script sourced before every subsystem command.
    pub profile_script: String,
}

impl Default for SubsystemConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(r"C:\msys64"),
            shell: None,
            msystem: "MINGW64".to_string(),
            compiler: "gcc".to_string(),
            profile_script: "/etc/profile".to_string(),
        }
    }
}

impl SubsystemConfig {
    /// The shell entry point, explicit or derived from the root.
    pub fn shell_path(&self) -> PathBuf {
        self.shell
            .clone()
            .unwrap_or_else(|| self.root.join("usr").join("bin").join("bash.exe"))
    }

    /// Subsystem directories searched for tools ahead of the host `PATH`.
    pub fn bin_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.root.join("usr").join("bin"),
            self.root.join(self.msystem.to_lowercase()).join("bin"),
        ]
    }

    /// Conventional package-metadata directory of the selected toolchain.
    pub fn pkgconfig_dir(&self) -> PathBuf {
        self.root
            .join(self.msystem.to_lowercase())
            .join("lib")
            .join("pkgconfig")
    }
}

/// An optional feature library and how to find it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Feature name, used in messages and reports.
    pub name: String,

    /// Registry value recording the install directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryLocation>,

    /// Conventional install roots, tried in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<PathBuf>,

    /// Include subdirectory names accepted under a root.
    pub include_dirs: Vec<String>,

    /// Library subdirectory names accepted under a root.
    pub lib_dirs: Vec<String>,

    /// Configure flag passed when the feature is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure_flag: Option<String>,

    /// Extra subsystem packages needed when the feature is present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,

    /// Package-metadata descriptor to synthesize for the feature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataConfig>,

    /// Host command that installs the feature when it is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provision: Option<ProvisionConfig>,
}

impl FeatureConfig {
    /// WinFsp, which provides a FUSE compatible API on Windows.
    pub fn winfsp() -> Self {
        Self {
            name: "fuse".to_string(),
            registry: Some(RegistryLocation {
                key: r"HKLM\SOFTWARE\WOW6432Node\WinFsp".to_string(),
                value: "InstallDir".to_string(),
            }),
            roots: vec![
                PathBuf::from(r"C:\Program Files (x86)\WinFsp"),
                PathBuf::from(r"C:\Program Files\WinFsp"),
            ],
            include_dirs: vec!["inc/fuse".to_string()],
            lib_dirs: vec!["lib".to_string(), "x64".to_string()],
            configure_flag: Some("--enable-fuse".to_string()),
            packages: Vec::new(),
            metadata: Some(MetadataConfig {
                name: "fuse".to_string(),
                description: "WinFsp FUSE compatibility layer".to_string(),
                version: "2.8".to_string(),
                link_flag: "-lwinfsp-x64".to_string(),
            }),
            provision: None,
        }
    }
}

/// A registry key and value name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryLocation {
    pub key: String,
    pub value: String,
}

/// Contents of a synthesized `.pc` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Library name the build system looks up.
    pub name: String,
    pub description: String,
    pub version: String,
    /// Link directive naming the platform-native library.
    pub link_flag: String,
}

/// How to install a missing feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Host command line, e.g. `winget install --exact --id WinFsp.WinFsp`.
    pub command: String,

    /// What to do when the command fails or the feature is still absent.
    #[serde(default)]
    pub policy: ProvisionPolicy,
}

/// Response to a failed feature provisioning attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionPolicy {
    /// Warn and build with the feature disabled.
    #[default]
    Degrade,
    /// Abort the run.
    Require,
}

/// External build settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Source tree. Defaults to the current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    /// Working directory for configure and make. Defaults to the source tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<PathBuf>,

    /// Install prefix passed to configure.
    pub prefix: PathBuf,

    /// Configure script, relative to the source tree.
    pub configure_script: String,

    /// Extra arguments appended to the configure command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configure_args: Vec<String>,

    /// Extra variables exported for every phase (message-catalog flags and
    /// similar).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Directory receiving synthesized `.pc` files. Defaults to the
    /// toolchain's pkgconfig directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_dir: Option<PathBuf>,

    /// Upper bound on make parallelism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: None,
            build_dir: None,
            prefix: PathBuf::from(r"C:\forgeline"),
            configure_script: "configure".to_string(),
            configure_args: Vec::new(),
            env: BTreeMap::new(),
            metadata_dir: None,
            jobs: None,
        }
    }
}
