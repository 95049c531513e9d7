//! Configuration and environment shared by the build-related commands.

use std::path::{Path, PathBuf};

use crate::cli::args::{EnvironmentArgs, PhaseArgs};
use crate::config::{load_config, validate, ForgelineConfig};
use crate::environment::{default_context, EnvironmentProfile, Prober};
use crate::error::Result;
use crate::shell::{has_drive, SubsystemShell};
use crate::ui::UserInterface;

/// Effective configuration after command-line overrides.
#[derive(Debug)]
pub struct BuildTarget {
    pub config: ForgelineConfig,
    /// Host path of the source tree.
    pub source: PathBuf,
    pub feature_root: Option<PathBuf>,
}

impl BuildTarget {
    /// Load the configuration and apply command-line overrides.
    ///
    /// The config file is looked up in the `--source` tree (or `working_dir`).
    /// A `build.source` from the file is only used without `--source`.
    pub fn resolve(
        working_dir: &Path,
        config_path: Option<&Path>,
        environment: &EnvironmentArgs,
        phases: Option<&PhaseArgs>,
    ) -> Result<Self> {
        let root = match &environment.source {
            Some(source) => absolutize(working_dir, source),
            None => working_dir.to_path_buf(),
        };

        let mut config = load_config(&root, config_path)?;
        if let Some(shell) = &environment.shell {
            config.subsystem.shell = Some(shell.clone());
        }
        if let Some(phases) = phases {
            if let Some(prefix) = &phases.prefix {
                config.build.prefix = prefix.clone();
            }
            if phases.jobs.is_some() {
                config.build.jobs = phases.jobs;
            }
        }
        validate(&config)?;

        let source = match (&environment.source, &config.build.source) {
            (None, Some(configured)) => absolutize(&root, configured),
            _ => root,
        };

        Ok(Self {
            config,
            source,
            feature_root: environment.feature_root.clone(),
        })
    }

    /// Probe the host. Provisioning commands only run when `provision` is set.
    pub fn probe(&self, provision: bool) -> Result<EnvironmentProfile> {
        Prober::new(&self.config, default_context())
            .with_feature_root(self.feature_root.clone())
            .with_provisioning(provision)
            .probe()
    }

    /// Probe behind a spinner.
    pub fn probe_with_progress(
        &self,
        ui: &mut dyn UserInterface,
        provision: bool,
    ) -> Result<EnvironmentProfile> {
        let mut spinner = ui.start_spinner("Probing environment...");
        match self.probe(provision) {
            Ok(profile) => {
                spinner.finish_success(&format!(
                    "Subsystem at {} ({} CPUs)",
                    profile.subsystem_root().display(),
                    profile.cpu_count()
                ));
                Ok(profile)
            }
            Err(e) => {
                spinner.finish_error("Environment incomplete");
                Err(e)
            }
        }
    }

    /// Shell handle for the probed subsystem.
    pub fn shell(&self, profile: &EnvironmentProfile) -> SubsystemShell {
        SubsystemShell::new(
            profile.shell(),
            &self.config.subsystem.msystem,
            &self.config.subsystem.profile_script,
        )
    }
}

/// Report each configured feature as found or absent.
pub fn report_features(ui: &mut dyn UserInterface, profile: &EnvironmentProfile) {
    for status in profile.features() {
        match &status.location {
            Some(location) => ui.success(&format!(
                "{} found at {} ({})",
                status.name,
                location.root.display(),
                location.source
            )),
            None => ui.warning(&format!(
                "{} not found, building without it",
                status.name
            )),
        }
    }
}

/// Drive-letter paths are absolute whatever the host platform says.
fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || has_drive(path) {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
