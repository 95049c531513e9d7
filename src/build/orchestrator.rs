//! Running a [`BuildPlan`].

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{BuildPlan, BuildState, Phase};
use crate::error::Result;
use crate::shell::{CommandResult, OutputCallback, SubsystemShell};
use crate::ui::{format_duration, live_output_callback, UserInterface};

/// Runs one phase script to completion.
pub trait PhaseRunner {
    /// Run `script` for `phase` and wait for it to exit.
    ///
    /// A non-zero exit is reported through the returned result, not as an
    /// error; errors mean the script could not be run at all.
    fn run(&mut self, phase: Phase, script: &str) -> Result<CommandResult>;
}

/// Progress events emitted while the plan runs.
#[derive(Debug)]
pub enum BuildProgress<'a> {
    PhaseStarting { phase: Phase, command: &'a str },
    PhaseFinished {
        phase: Phase,
        result: &'a CommandResult,
    },
}

/// A phase that exited zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub phase: Phase,
    pub duration: Duration,
}

/// Result of a completed build.
#[derive(Debug)]
pub struct BuildReport {
    pub phases: Vec<PhaseOutcome>,
    pub state: BuildState,
    pub duration: Duration,
}

/// Drives the phases of a plan in order.
pub struct Orchestrator<'a> {
    plan: &'a BuildPlan,
}

impl<'a> Orchestrator<'a> {
    pub fn new(plan: &'a BuildPlan) -> Self {
        Self { plan }
    }

    /// Run every phase; the first non-zero exit aborts with that phase's error.
    pub fn execute(&self, runner: &mut dyn PhaseRunner) -> Result<BuildReport> {
        self.execute_with_progress(runner, |_| {})
    }

    pub fn execute_with_progress(
        &self,
        runner: &mut dyn PhaseRunner,
        mut on_progress: impl FnMut(BuildProgress<'_>),
    ) -> Result<BuildReport> {
        let start = Instant::now();
        let install = self.plan.installs();
        let mut state = BuildState::Configuring;
        let mut phases = Vec::new();

        while let Some(phase) = state.phase() {
            let Some(planned) = self.plan.phase(phase) else {
                break;
            };

            info!("{} phase starting", phase);
            on_progress(BuildProgress::PhaseStarting {
                phase,
                command: &planned.command,
            });

            let result = runner.run(phase, &planned.script)?;
            on_progress(BuildProgress::PhaseFinished {
                phase,
                result: &result,
            });

            if !result.success {
                warn!("{} phase exited with {:?}", phase, result.exit_code);
                debug!("build state: {:?}", state.fail());
                return Err(phase.failure(result.exit_code));
            }

            phases.push(PhaseOutcome {
                phase,
                duration: result.duration,
            });
            state = state.succeed(install);
        }

        Ok(BuildReport {
            phases,
            state,
            duration: start.elapsed(),
        })
    }
}

/// Runs phases through the subsystem shell with terminal feedback.
///
/// In verbose mode the external output goes straight to the terminal.
/// Otherwise it streams into a spinner, and a failed phase shows the tail of
/// its output.
pub struct SubsystemRunner<'a> {
    shell: &'a SubsystemShell,
    ui: &'a mut dyn UserInterface,
}

impl<'a> SubsystemRunner<'a> {
    pub fn new(shell: &'a SubsystemShell, ui: &'a mut dyn UserInterface) -> Self {
        Self { shell, ui }
    }
}

impl PhaseRunner for SubsystemRunner<'_> {
    fn run(&mut self, phase: Phase, script: &str) -> Result<CommandResult> {
        let label = format!("{}...", phase.progress_label());

        if self.ui.output_mode().shows_command_output() {
            self.ui.message(&label);
            return self.shell.run_inherited(script);
        }

        let mut spinner = self.ui.start_spinner(&label);
        let callback: OutputCallback = match spinner.progress_bar() {
            Some(bar) => live_output_callback(bar, label.clone(), 2, 3),
            None => Box::new(|_| {}),
        };

        let result = match self.shell.run_streaming(script, callback) {
            Ok(result) => result,
            Err(e) => {
                spinner.finish_error(&format!("{} could not start", phase));
                return Err(e);
            }
        };

        if result.success {
            spinner.finish_success(&format!(
                "{} ({})",
                phase.done_label(),
                format_duration(result.duration)
            ));
        } else {
            spinner.finish_error(&format!("{} failed", phase.progress_label()));
            let output = format!("{}{}", result.stdout, result.stderr);
            self.ui.show_error_block(script, &output);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForgelineConfig;
    use crate::environment::EnvironmentProfile;
    use crate::error::ForgelineError;
    use crate::ui::{Marker, MockUI};
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Records every phase run and answers with a fixed exit code per phase.
    #[derive(Default)]
    struct MockRunner {
        exits: HashMap<Phase, i32>,
        runs: Vec<(Phase, String)>,
    }

    impl MockRunner {
        fn failing(phase: Phase, code: i32) -> Self {
            Self {
                exits: HashMap::from([(phase, code)]),
                ..Default::default()
            }
        }

        fn phases(&self) -> Vec<Phase> {
            self.runs.iter().map(|(p, _)| *p).collect()
        }
    }

    impl PhaseRunner for MockRunner {
        fn run(&mut self, phase: Phase, script: &str) -> Result<CommandResult> {
            self.runs.push((phase, script.to_string()));
            let code = self.exits.get(&phase).copied().unwrap_or(0);
            if code == 0 {
                Ok(CommandResult::success(String::new(), String::new(), Duration::ZERO))
            } else {
                Ok(CommandResult::failure(
                    Some(code),
                    String::new(),
                    String::new(),
                    Duration::ZERO,
                ))
            }
        }
    }

    fn plan(install: bool) -> BuildPlan {
        let profile = EnvironmentProfile::new(
            PathBuf::from(r"C:\msys64"),
            PathBuf::from(r"C:\msys64\usr\bin\bash.exe"),
            PathBuf::from(r"C:\msys64\mingw64\bin\gcc.exe"),
            4,
            vec![],
        );
        BuildPlan::new(
            &profile,
            &ForgelineConfig::default(),
            &PathBuf::from(r"C:\src\project"),
            install,
        )
        .unwrap()
    }

    #[test]
    fn runs_configure_then_build() {
        let plan = plan(false);
        let mut runner = MockRunner::default();
        let report = Orchestrator::new(&plan).execute(&mut runner).unwrap();

        assert_eq!(runner.phases(), vec![Phase::Configure, Phase::Build]);
        assert_eq!(report.state, BuildState::Done);
        assert_eq!(report.phases.len(), 2);
    }

    #[test]
    fn never_installs_unless_requested() {
        let plan = plan(false);
        let mut runner = MockRunner::default();
        Orchestrator::new(&plan).execute(&mut runner).unwrap();

        assert!(!runner.phases().contains(&Phase::Install));
    }

    #[test]
    fn installs_last_when_requested() {
        let plan = plan(true);
        let mut runner = MockRunner::default();
        Orchestrator::new(&plan).execute(&mut runner).unwrap();

        assert_eq!(
            runner.phases(),
            vec![Phase::Configure, Phase::Build, Phase::Install]
        );
    }

    #[test]
    fn failed_configure_never_builds() {
        let plan = plan(true);
        let mut runner = MockRunner::failing(Phase::Configure, 1);
        let err = Orchestrator::new(&plan).execute(&mut runner).unwrap_err();

        assert!(matches!(err, ForgelineError::ConfigureFailed { code: Some(1) }));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(runner.phases(), vec![Phase::Configure]);
    }

    #[test]
    fn failed_build_never_installs() {
        let plan = plan(true);
        let mut runner = MockRunner::failing(Phase::Build, 2);
        let err = Orchestrator::new(&plan).execute(&mut runner).unwrap_err();

        assert!(matches!(err, ForgelineError::BuildFailed { code: Some(2) }));
        assert_eq!(runner.phases(), vec![Phase::Configure, Phase::Build]);
    }

    #[test]
    fn failed_install_is_reported() {
        let plan = plan(true);
        let mut runner = MockRunner::failing(Phase::Install, 1);
        let err = Orchestrator::new(&plan).execute(&mut runner).unwrap_err();

        assert!(matches!(err, ForgelineError::InstallFailed { code: Some(1) }));
    }

    #[test]
    fn runner_receives_full_scripts() {
        let plan = plan(false);
        let mut runner = MockRunner::default();
        Orchestrator::new(&plan).execute(&mut runner).unwrap();

        for (phase, script) in &runner.runs {
            assert_eq!(script, &plan.phase(*phase).unwrap().script);
            assert!(script.starts_with(". /etc/profile && "));
        }
    }

    #[test]
    fn progress_events_bracket_each_phase() {
        let plan = plan(false);
        let mut runner = MockRunner::default();
        let mut events = Vec::new();
        Orchestrator::new(&plan)
            .execute_with_progress(&mut runner, |event| {
                events.push(match event {
                    BuildProgress::PhaseStarting { phase, .. } => format!("start {}", phase),
                    BuildProgress::PhaseFinished { phase, .. } => format!("end {}", phase),
                })
            })
            .unwrap();

        assert_eq!(
            events,
            vec!["start configure", "end configure", "start build", "end build"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn subsystem_runner_reports_success_on_spinner() {
        let shell = SubsystemShell::new("/bin/sh", "MINGW64", "/dev/null");
        let mut ui = MockUI::new();
        let result = SubsystemRunner::new(&shell, &mut ui)
            .run(Phase::Build, "echo compiling")
            .unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("compiling"));
        assert_eq!(ui.spinners(), ["Building..."]);
        assert_eq!(ui.spinner_outcomes()[0].0, Marker::Success);
    }

    #[cfg(unix)]
    #[test]
    fn subsystem_runner_shows_output_of_failed_phase() {
        let shell = SubsystemShell::new("/bin/sh", "MINGW64", "/dev/null");
        let mut ui = MockUI::new();
        let result = SubsystemRunner::new(&shell, &mut ui)
            .run(Phase::Configure, "echo 'no C compiler found' >&2; exit 77")
            .unwrap();

        assert_eq!(result.exit_code, Some(77));
        assert_eq!(ui.spinner_outcomes()[0].0, Marker::Error);
        assert!(ui.error_blocks()[0].1.contains("no C compiler found"));
    }
}
