//! Composing the phase commands.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::context::{quote, BuildContext};
use super::Phase;
use crate::config::ForgelineConfig;
use crate::environment::EnvironmentProfile;
use crate::error::Result;
use crate::shell::translate_path;

/// One phase and the script that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPhase {
    pub phase: Phase,
    /// The phase command alone, e.g. `make -j8`.
    pub command: String,
    /// The command preceded by the shared context.
    pub script: String,
}

/// Ordered phases of one build.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    workdir: PathBuf,
    metadata_dir: PathBuf,
    context: BuildContext,
    phases: Vec<PlannedPhase>,
    jobs: usize,
    enabled_features: Vec<String>,
}

impl BuildPlan {
    /// Compose the plan for building `source`.
    ///
    /// A feature contributes its configure flag and compiler/linker exports
    /// only when the profile holds a location for it.
    pub fn new(
        profile: &EnvironmentProfile,
        config: &ForgelineConfig,
        source: &Path,
        install: bool,
    ) -> Result<Self> {
        let build = &config.build;
        let workdir = build
            .build_dir
            .clone()
            .unwrap_or_else(|| source.to_path_buf());
        let metadata_dir = build
            .metadata_dir
            .clone()
            .unwrap_or_else(|| config.subsystem.pkgconfig_dir());

        let mut context = BuildContext::new(
            &config.subsystem.profile_script,
            translate_path(&metadata_dir)?,
            translate_path(&workdir)?,
        );

        let mut configure = format!(
            "{}/{} --prefix={}",
            translate_path(source)?.trim_end_matches('/'),
            build.configure_script.replace('\\', "/"),
            translate_path(&build.prefix)?
        );

        let mut enabled_features = Vec::new();
        for feature in &config.features {
            let Some(location) = profile.feature(&feature.name) else {
                debug!("{} absent, building without it", feature.name);
                continue;
            };
            context.add_feature(
                &translate_path(&location.include_dir)?,
                &translate_path(&location.lib_dir)?,
            );
            if let Some(flag) = &feature.configure_flag {
                configure.push(' ');
                configure.push_str(flag);
            }
            enabled_features.push(feature.name.clone());
        }

        for (key, value) in &build.env {
            context.export(key, value);
        }
        for arg in &build.configure_args {
            configure.push(' ');
            configure.push_str(&quote(arg));
        }

        let cpus = profile.cpu_count();
        let jobs = build.jobs.map_or(cpus, |cap| cap.min(cpus)).max(1);

        let mut commands = vec![
            (Phase::Configure, configure),
            (Phase::Build, format!("make -j{}", jobs)),
        ];
        if install {
            commands.push((Phase::Install, "make install".to_string()));
        }

        let phases = commands
            .into_iter()
            .map(|(phase, command)| {
                let script = context.wrap(&command);
                debug!("{} script: {}", phase, script);
                PlannedPhase {
                    phase,
                    command,
                    script,
                }
            })
            .collect();

        Ok(Self {
            workdir,
            metadata_dir,
            context,
            phases,
            jobs,
            enabled_features,
        })
    }

    pub fn phases(&self) -> &[PlannedPhase] {
        &self.phases
    }

    /// The planned phase of kind `phase`, if it is part of the plan.
    pub fn phase(&self, phase: Phase) -> Option<&PlannedPhase> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    pub fn installs(&self) -> bool {
        self.phase(Phase::Install).is_some()
    }

    /// Host path of the working directory.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Host path of the directory receiving synthesized `.pc` files.
    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Parallel jobs passed to make.
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Features whose flags are part of the plan.
    pub fn enabled_features(&self) -> &[String] {
        &self.enabled_features
    }
}
