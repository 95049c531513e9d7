//! The `forgeline build` command.

use std::path::{Path, PathBuf};

use crate::build::{BuildPlan, Orchestrator, SubsystemRunner};
use crate::cli::args::BuildArgs;
use crate::config::ForgelineConfig;
use crate::environment::EnvironmentProfile;
use crate::error::Result;
use crate::metadata::{descriptors_for, synthesize};
use crate::packages::{declared_packages, reconcile, Pacman};
use crate::shell::SubsystemShell;
use crate::ui::{format_duration, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::display::render_plan;
use super::target::{report_features, BuildTarget};

/// Probe, provision packages, synthesize metadata, then configure and build.
pub struct BuildCommand {
    working_dir: PathBuf,
    config_path: Option<PathBuf>,
    args: BuildArgs,
}

impl BuildCommand {
    pub fn new(working_dir: &Path, config_path: Option<PathBuf>, args: BuildArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config_path,
            args,
        }
    }
}

impl Command for BuildCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let target = BuildTarget::resolve(
            &self.working_dir,
            self.config_path.as_deref(),
            &self.args.environment,
            Some(&self.args.phases),
        )?;

        ui.show_header(&format!("forgeline · {}", target.source.display()));

        let profile = target.probe_with_progress(ui, !self.args.dry_run)?;
        report_features(ui, &profile);

        let plan = BuildPlan::new(
            &profile,
            &target.config,
            &target.source,
            self.args.phases.install,
        )?;

        if self.args.dry_run {
            for descriptor in descriptors_for(&target.config, &profile)? {
                ui.message(&format!(
                    "Would write {}",
                    plan.metadata_dir().join(descriptor.file_name()).display()
                ));
            }
            print!("{}", render_plan(&plan));
            return Ok(CommandResult::success());
        }

        let shell = target.shell(&profile);
        install_packages(&target.config, &profile, &shell, ui)?;

        for descriptor in descriptors_for(&target.config, &profile)? {
            let path = synthesize(plan.metadata_dir(), &descriptor)?;
            ui.success(&format!("Wrote {}", path.display()));
        }

        let report = {
            let mut runner = SubsystemRunner::new(&shell, ui);
            Orchestrator::new(&plan).execute(&mut runner)?
        };

        ui.success(&format!(
            "Build complete in {}",
            format_duration(report.duration)
        ));
        if plan.installs() {
            ui.message(&format!(
                "Installed under {}",
                target.config.build.prefix.display()
            ));
        }

        Ok(CommandResult::success())
    }
}

/// Reconcile the declared packages against the subsystem.
fn install_packages(
    config: &ForgelineConfig,
    profile: &EnvironmentProfile,
    shell: &SubsystemShell,
    ui: &mut dyn UserInterface,
) -> Result<()> {
    let declared = declared_packages(config, profile);
    let mut spinner = ui.start_spinner("Checking packages...");
    if declared.is_empty() {
        spinner.finish_skipped("No packages declared");
        return Ok(());
    }

    let mut pacman = Pacman::new(shell.clone());
    let report = reconcile(&declared, &mut pacman);

    if report.is_success() {
        spinner.finish_success(&format!(
            "Packages ready ({} present, {} installed)",
            report.already_present.len(),
            report.installed.len()
        ));
    } else {
        spinner.finish_error(&format!(
            "{} of {} packages failed",
            report.faults.len(),
            declared.len()
        ));
        for fault in &report.faults {
            ui.error(&format!("{}: {}", fault.package, fault.error));
        }
    }

    report.into_result().map(|_| ())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::cli::args::PhaseArgs;
    use crate::error::ForgelineError;
    use crate::ui::MockUI;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// A subsystem root whose compiler is a stub and whose shell is `/bin/sh`.
    fn fake_subsystem(temp: &TempDir, extra_config: &str) -> PathBuf {
        let root = temp.path().join("msys64");
        let bin = root.join("mingw64").join("bin");
        fs::create_dir_all(&bin).unwrap();
        let gcc = bin.join("gcc");
        fs::write(&gcc, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&gcc, fs::Permissions::from_mode(0o755)).unwrap();

        let project = temp.path().join("project");
        let dir = project.join(".forgeline");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.yml"),
            format!(
                "subsystem:\n  root: {}\n  shell: /bin/sh\nfeatures: []\n{}",
                root.display(),
                extra_config
            ),
        )
        .unwrap();
        project
    }

    #[test]
    fn dry_run_needs_drive_letter_paths() {
        let temp = TempDir::new().unwrap();
        let project = fake_subsystem(&temp, "");
        let command = BuildCommand::new(
            &project,
            None,
            BuildArgs {
                dry_run: true,
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();

        let err = command.execute(&mut ui).unwrap_err();
        assert!(matches!(err, ForgelineError::InvalidPath { .. }));
    }

    #[test]
    fn dry_run_prints_plan_without_side_effects() {
        let temp = TempDir::new().unwrap();
        let project = fake_subsystem(
            &temp,
            "build:\n  source: 'C:\\src\\app'\n  metadata_dir: 'C:\\msys64\\mingw64\\lib\\pkgconfig'\n",
        );
        let command = BuildCommand::new(
            &project,
            None,
            BuildArgs {
                phases: PhaseArgs {
                    install: true,
                    ..Default::default()
                },
                dry_run: true,
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();

        command.execute(&mut ui).unwrap();
        assert_eq!(ui.spinners(), ["Probing environment..."]);
        assert!(ui.warnings().is_empty());
    }

    #[test]
    fn failing_package_query_aborts_before_configure() {
        let temp = TempDir::new().unwrap();
        let project = fake_subsystem(
            &temp,
            "packages: [forgeline-test-package]\nbuild:\n  source: 'C:\\src\\app'\n  metadata_dir: 'C:\\pc'\n",
        );
        let profile_script = temp.path().join("profile");
        fs::write(&profile_script, "pacman() { return 1; }\n").unwrap();
        let config = format!(
            "subsystem:\n  profile_script: {}\n",
            profile_script.display()
        );
        fs::write(project.join(".forgeline").join("config.local.yml"), config).unwrap();

        let command = BuildCommand::new(&project, None, BuildArgs::default());
        let mut ui = MockUI::new();

        let err = command.execute(&mut ui).unwrap_err();
        match err {
            ForgelineError::DependencyInstallFailed { packages } => {
                assert_eq!(packages, vec!["forgeline-test-package".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(ui.has_error("forgeline-test-package"));
        assert!(!ui.spinners().iter().any(|s| s.starts_with("Configuring")));
    }
}
