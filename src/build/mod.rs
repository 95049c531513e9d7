//! Configure, build and install orchestration.
//!
//! A [`BuildPlan`] is composed once from the environment profile and the
//! configuration. Every phase runs as one subsystem script sharing the same
//! [`BuildContext`] preamble. The [`Orchestrator`] runs the phases strictly in
//! order and stops at the first non-zero exit.

pub mod context;
pub mod orchestrator;
pub mod plan;

use std::fmt;

use serde::Serialize;

use crate::error::ForgelineError;

pub use context::{quote, BuildContext};
pub use orchestrator::{
    BuildProgress, BuildReport, Orchestrator, PhaseOutcome, PhaseRunner, SubsystemRunner,
};
pub use plan::{BuildPlan, PlannedPhase};

/// One external step of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Configure,
    Build,
    Install,
}

impl Phase {
    /// Present participle used while the phase runs.
    pub fn progress_label(self) -> &'static str {
        match self {
            Phase::Configure => "Configuring",
            Phase::Build => "Building",
            Phase::Install => "Installing",
        }
    }

    pub fn done_label(self) -> &'static str {
        match self {
            Phase::Configure => "Configured",
            Phase::Build => "Built",
            Phase::Install => "Installed",
        }
    }

    /// The error raised when this phase exits non-zero.
    pub fn failure(self, code: Option<i32>) -> ForgelineError {
        match self {
            Phase::Configure => ForgelineError::ConfigureFailed { code },
            Phase::Build => ForgelineError::BuildFailed { code },
            Phase::Install => ForgelineError::InstallFailed { code },
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Configure => "configure",
            Phase::Build => "build",
            Phase::Install => "install",
        };
        f.write_str(s)
    }
}

/// Progress of a build through its phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Configuring,
    Building,
    Installing,
    Done,
    /// Terminal; holds the phase that exited non-zero.
    Failed(Phase),
}

impl BuildState {
    /// The phase running in this state.
    pub fn phase(self) -> Option<Phase> {
        match self {
            BuildState::Configuring => Some(Phase::Configure),
            BuildState::Building => Some(Phase::Build),
            BuildState::Installing => Some(Phase::Install),
            BuildState::Done | BuildState::Failed(_) => None,
        }
    }

    /// State after the current phase exits zero.
    pub fn succeed(self, install: bool) -> Self {
        match self {
            BuildState::Configuring => BuildState::Building,
            BuildState::Building if install => BuildState::Installing,
            BuildState::Building | BuildState::Installing => BuildState::Done,
            terminal => terminal,
        }
    }

    /// State after the current phase exits non-zero.
    pub fn fail(self) -> Self {
        match self.phase() {
            Some(phase) => BuildState::Failed(phase),
            None => self,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BuildState::Done | BuildState::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_without_install_skips_installing() {
        let state = BuildState::Configuring.succeed(false).succeed(false);
        assert_eq!(state, BuildState::Done);
    }

    #[test]
    fn happy_path_with_install() {
        let mut state = BuildState::Configuring;
        let mut phases = Vec::new();
        while let Some(phase) = state.phase() {
            phases.push(phase);
            state = state.succeed(true);
        }
        assert_eq!(phases, vec![Phase::Configure, Phase::Build, Phase::Install]);
        assert_eq!(state, BuildState::Done);
    }

    #[test]
    fn failure_records_phase_and_is_terminal() {
        let state = BuildState::Configuring.succeed(true).fail();
        assert_eq!(state, BuildState::Failed(Phase::Build));
        assert!(state.is_terminal());
        assert_eq!(state.succeed(true), state);
        assert_eq!(state.fail(), state);
    }

    #[test]
    fn phase_failures_map_to_errors() {
        assert!(matches!(
            Phase::Configure.failure(Some(1)),
            ForgelineError::ConfigureFailed { code: Some(1) }
        ));
        assert!(matches!(
            Phase::Build.failure(Some(2)),
            ForgelineError::BuildFailed { code: Some(2) }
        ));
        assert!(matches!(
            Phase::Install.failure(None),
            ForgelineError::InstallFailed { code: None }
        ));
    }
}
