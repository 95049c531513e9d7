//! Environment probing.
//!
//! Produces the [`EnvironmentProfile`] a run is based on. Mandatory tools are
//! checked first so a missing one aborts before anything touches the host;
//! optional features are then located and, when configured, provisioned.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::features::{
    locate_feature, ConventionalRoots, LocationProvider, RegistryProvider, RootOverride,
};
use super::registry::{RegQuery, RegistryStore};
use super::tools::{parse_system_path, resolve_tool_path, search_path};
use super::{EnvironmentProfile, FeatureStatus};
use crate::config::{FeatureConfig, ForgelineConfig, ProvisionPolicy};
use crate::error::{ForgelineError, Result};

/// Mockable host access for the prober.
pub struct ProbeContext<'a> {
    /// Registry lookups.
    pub registry: &'a dyn RegistryStore,
    /// Run a host command line, returning true on success.
    pub run_command: &'a dyn Fn(&str) -> bool,
    /// Host search path.
    pub system_path: Vec<PathBuf>,
    /// Logical CPUs available to the build.
    pub cpu_count: usize,
}

fn run_host_command(command: &str) -> bool {
    crate::shell::execute(command, &crate::shell::CommandOptions::default())
        .is_ok_and(|r| r.success)
}

/// Build the default `ProbeContext` for production use.
pub fn default_context() -> ProbeContext<'static> {
    ProbeContext {
        registry: &RegQuery,
        run_command: &run_host_command,
        system_path: parse_system_path(),
        cpu_count: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
    }
}

/// Probes the host for the subsystem, the compiler and optional features.
pub struct Prober<'a> {
    config: &'a ForgelineConfig,
    feature_root: Option<PathBuf>,
    provision: bool,
    ctx: ProbeContext<'a>,
}

impl<'a> Prober<'a> {
    pub fn new(config: &'a ForgelineConfig, ctx: ProbeContext<'a>) -> Self {
        Self {
            config,
            feature_root: None,
            provision: true,
            ctx,
        }
    }

    /// Try `root` before any other location for every feature.
    pub fn with_feature_root(mut self, root: Option<PathBuf>) -> Self {
        self.feature_root = root;
        self
    }

    /// Enable or disable running feature provisioning commands.
    pub fn with_provisioning(mut self, provision: bool) -> Self {
        self.provision = provision;
        self
    }

    /// Produce the environment profile for this run.
    pub fn probe(&self) -> Result<EnvironmentProfile> {
        let subsystem = &self.config.subsystem;
        let search = search_path(&subsystem.bin_dirs(), &self.ctx.system_path);

        let shell = self.locate_shell(&search)?;
        debug!("subsystem shell: {}", shell.display());

        let compiler = resolve_tool_path(&subsystem.compiler, &search).ok_or_else(|| {
            ForgelineError::MissingPrerequisite {
                tool: subsystem.compiler.clone(),
                message: format!(
                    "not found in {} or on PATH",
                    subsystem
                        .bin_dirs()
                        .iter()
                        .map(|d| d.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }
        })?;
        debug!("compiler: {}", compiler.display());

        let mut features = Vec::with_capacity(self.config.features.len());
        for feature in &self.config.features {
            let location = self.detect_feature(feature)?;
            match &location {
                Some(found) => info!(
                    "feature '{}' found at {}",
                    feature.name,
                    found.root.display()
                ),
                None => info!("feature '{}' not found, building without it", feature.name),
            }
            features.push(FeatureStatus {
                name: feature.name.clone(),
                location,
            });
        }

        Ok(EnvironmentProfile::new(
            subsystem.root.clone(),
            shell,
            compiler,
            self.ctx.cpu_count.max(1),
            features,
        ))
    }

    fn locate_shell(&self, search: &[PathBuf]) -> Result<PathBuf> {
        let shell = self.config.subsystem.shell_path();
        if shell.is_file() {
            return Ok(shell);
        }

        // A bare program name is looked up like any other tool.
        if shell.components().count() == 1 {
            if let Some(found) = resolve_tool_path(&shell.to_string_lossy(), search) {
                return Ok(found);
            }
        }

        Err(ForgelineError::MissingPrerequisite {
            tool: "subsystem shell".to_string(),
            message: format!("{} does not exist", shell.display()),
        })
    }

    fn locate(&self, feature: &FeatureConfig) -> Option<super::FeatureLocation> {
        let root_override = self.feature_root.clone().map(RootOverride);
        let registry = RegistryProvider::new(self.ctx.registry);

        let mut providers: Vec<&dyn LocationProvider> = Vec::with_capacity(3);
        if let Some(root_override) = &root_override {
            providers.push(root_override);
        }
        providers.push(&registry);
        providers.push(&ConventionalRoots);

        locate_feature(feature, &providers)
    }

    fn detect_feature(&self, feature: &FeatureConfig) -> Result<Option<super::FeatureLocation>> {
        if let Some(found) = self.locate(feature) {
            return Ok(Some(found));
        }

        let Some(provision) = feature.provision.as_ref().filter(|_| self.provision) else {
            return Ok(None);
        };

        info!("provisioning feature '{}'", feature.name);
        let ran = (self.ctx.run_command)(&provision.command);
        let found = if ran { self.locate(feature) } else { None };
        if found.is_some() {
            return Ok(found);
        }

        let message = if ran {
            "provisioning succeeded but the feature is still not detectable".to_string()
        } else {
            format!("'{}' failed", provision.command)
        };

        match provision.policy {
            ProvisionPolicy::Degrade => {
                warn!("feature '{}' disabled: {}", feature.name, message);
                Ok(None)
            }
            ProvisionPolicy::Require => Err(ForgelineError::FeatureProvisionFailed {
                feature: feature.name.clone(),
                message,
            }),
        }
    }
}

/// Probe with production host access.
pub fn probe(config: &ForgelineConfig, feature_root: Option<&Path>) -> Result<EnvironmentProfile> {
    Prober::new(config, default_context())
        .with_feature_root(feature_root.map(Path::to_path_buf))
        .probe()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProvisionConfig, RegistryLocation, SubsystemConfig};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    struct NoRegistry;

    impl RegistryStore for NoRegistry {
        fn query(&self, _location: &RegistryLocation) -> Option<String> {
            None
        }
    }

    fn create_fake_binary(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    /// A subsystem root with a shell and a compiler in its toolchain bin.
    fn fake_subsystem(temp: &TempDir) -> SubsystemConfig {
        let root = temp.path().join("msys64");
        create_fake_binary(&root.join("usr/bin/bash.exe"));
        let compiler = if cfg!(windows) { "gcc.exe" } else { "gcc" };
        create_fake_binary(&root.join("mingw64/bin").join(compiler));
        SubsystemConfig {
            root,
            ..Default::default()
        }
    }

    fn feature_with_roots(roots: Vec<PathBuf>) -> FeatureConfig {
        FeatureConfig {
            roots,
            ..FeatureConfig::winfsp()
        }
    }

    fn context<'a>(run_command: &'a dyn Fn(&str) -> bool) -> ProbeContext<'a> {
        ProbeContext {
            registry: &NoRegistry,
            run_command,
            system_path: Vec::new(),
            cpu_count: 6,
        }
    }

    fn never_run(_cmd: &str) -> bool {
        panic!("no command expected");
    }

    #[test]
    fn probe_builds_profile() {
        let temp = TempDir::new().unwrap();
        let winfsp = temp.path().join("WinFsp");
        fs::create_dir_all(winfsp.join("inc/fuse")).unwrap();
        fs::create_dir_all(winfsp.join("lib")).unwrap();

        let config = ForgelineConfig {
            subsystem: fake_subsystem(&temp),
            features: vec![feature_with_roots(vec![winfsp.clone()])],
            ..Default::default()
        };

        let profile = Prober::new(&config, context(&never_run)).probe().unwrap();
        assert_eq!(profile.cpu_count(), 6);
        assert!(profile.shell().ends_with("bash.exe"));
        let location = profile.feature("fuse").unwrap();
        assert_eq!(location.include_dir, winfsp.join("inc/fuse"));
        assert_eq!(location.lib_dir, winfsp.join("lib"));
    }

    #[test]
    fn missing_feature_is_absent_not_an_error() {
        let temp = TempDir::new().unwrap();
        let config = ForgelineConfig {
            subsystem: fake_subsystem(&temp),
            features: vec![feature_with_roots(vec![temp.path().join("none")])],
            ..Default::default()
        };

        let profile = Prober::new(&config, context(&never_run)).probe().unwrap();
        assert!(profile.feature("fuse").is_none());
        assert_eq!(profile.features().len(), 1);
    }

    #[test]
    fn missing_shell_is_a_missing_prerequisite() {
        let temp = TempDir::new().unwrap();
        let mut subsystem = fake_subsystem(&temp);
        subsystem.shell = Some(temp.path().join("nowhere/bash.exe"));
        let config = ForgelineConfig {
            subsystem,
            ..Default::default()
        };

        let err = Prober::new(&config, context(&never_run)).probe().unwrap_err();
        match err {
            ForgelineError::MissingPrerequisite { tool, .. } => {
                assert_eq!(tool, "subsystem shell")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_compiler_names_the_tool() {
        let temp = TempDir::new().unwrap();
        let mut subsystem = fake_subsystem(&temp);
        subsystem.compiler = "clang-not-installed".to_string();
        let config = ForgelineConfig {
            subsystem,
            ..Default::default()
        };

        let err = Prober::new(&config, context(&never_run)).probe().unwrap_err();
        assert!(matches!(
            err,
            ForgelineError::MissingPrerequisite { ref tool, .. } if tool == "clang-not-installed"
        ));
    }

    #[test]
    fn missing_prerequisite_skips_provisioning() {
        let temp = TempDir::new().unwrap();
        let mut subsystem = fake_subsystem(&temp);
        subsystem.compiler = "absent-cc".to_string();
        let mut feature = feature_with_roots(vec![]);
        feature.provision = Some(ProvisionConfig {
            command: "install-winfsp".into(),
            policy: ProvisionPolicy::Degrade,
        });
        let config = ForgelineConfig {
            subsystem,
            features: vec![feature],
            ..Default::default()
        };

        let result = Prober::new(&config, context(&never_run)).probe();
        assert!(result.is_err());
    }

    #[test]
    fn cpu_count_is_at_least_one() {
        let temp = TempDir::new().unwrap();
        let config = ForgelineConfig {
            subsystem: fake_subsystem(&temp),
            features: vec![],
            ..Default::default()
        };
        let run = never_run;
        let mut ctx = context(&run);
        ctx.cpu_count = 0;

        let profile = Prober::new(&config, ctx).probe().unwrap();
        assert_eq!(profile.cpu_count(), 1);
    }

    #[test]
    fn feature_root_override_is_used() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("custom");
        fs::create_dir_all(custom.join("inc/fuse")).unwrap();
        fs::create_dir_all(custom.join("x64")).unwrap();
        let config = ForgelineConfig {
            subsystem: fake_subsystem(&temp),
            features: vec![feature_with_roots(vec![])],
            ..Default::default()
        };

        let profile = Prober::new(&config, context(&never_run))
            .with_feature_root(Some(custom.clone()))
            .probe()
            .unwrap();
        assert_eq!(profile.feature("fuse").unwrap().root, custom);
    }

    #[test]
    fn failed_provisioning_degrades_by_default() {
        let temp = TempDir::new().unwrap();
        let mut feature = feature_with_roots(vec![temp.path().join("WinFsp")]);
        feature.provision = Some(ProvisionConfig {
            command: "install-winfsp".into(),
            policy: ProvisionPolicy::Degrade,
        });
        let config = ForgelineConfig {
            subsystem: fake_subsystem(&temp),
            features: vec![feature],
            ..Default::default()
        };
        let commands = RefCell::new(Vec::new());
        let run = |cmd: &str| {
            commands.borrow_mut().push(cmd.to_string());
            false
        };

        let profile = Prober::new(&config, context(&run)).probe().unwrap();
        assert!(profile.feature("fuse").is_none());
        assert_eq!(*commands.borrow(), vec!["install-winfsp".to_string()]);
    }

    #[test]
    fn failed_provisioning_aborts_under_require() {
        let temp = TempDir::new().unwrap();
        let mut feature = feature_with_roots(vec![]);
        feature.provision = Some(ProvisionConfig {
            command: "install-winfsp".into(),
            policy: ProvisionPolicy::Require,
        });
        let config = ForgelineConfig {
            subsystem: fake_subsystem(&temp),
            features: vec![feature],
            ..Default::default()
        };
        let run = |_cmd: &str| false;

        let err = Prober::new(&config, context(&run)).probe().unwrap_err();
        assert!(matches!(err, ForgelineError::FeatureProvisionFailed { .. }));
    }

    #[test]
    fn successful_provisioning_is_re_probed() {
        let temp = TempDir::new().unwrap();
        let winfsp = temp.path().join("WinFsp");
        let mut feature = feature_with_roots(vec![winfsp.clone()]);
        feature.provision = Some(ProvisionConfig {
            command: "install-winfsp".into(),
            policy: ProvisionPolicy::Require,
        });
        let config = ForgelineConfig {
            subsystem: fake_subsystem(&temp),
            features: vec![feature],
            ..Default::default()
        };
        let run = |_cmd: &str| {
            fs::create_dir_all(winfsp.join("inc/fuse")).unwrap();
            fs::create_dir_all(winfsp.join("lib")).unwrap();
            true
        };

        let profile = Prober::new(&config, context(&run)).probe().unwrap();
        assert_eq!(profile.feature("fuse").unwrap().root, winfsp);
    }

    #[test]
    fn provisioning_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        let mut feature = feature_with_roots(vec![]);
        feature.provision = Some(ProvisionConfig {
            command: "install-winfsp".into(),
            policy: ProvisionPolicy::Require,
        });
        let config = ForgelineConfig {
            subsystem: fake_subsystem(&temp),
            features: vec![feature],
            ..Default::default()
        };

        let profile = Prober::new(&config, context(&never_run))
            .with_provisioning(false)
            .probe()
            .unwrap();
        assert!(profile.feature("fuse").is_none());
    }
}
