//! Routing parsed arguments to a command.

use std::path::{Path, PathBuf};

use crate::cli::args::{BuildArgs, Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

use super::build::BuildCommand;
use super::completions::CompletionsCommand;
use super::plan::PlanCommand;
use super::probe::ProbeCommand;

/// A runnable subcommand.
///
/// Fatal conditions are returned as errors; `main` turns them into exit
/// code 1.
pub trait Command {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Exit status of a command that ran to completion.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: u8,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }
}

/// Resolves relative paths against the directory forgeline was started in.
pub struct CommandDispatcher {
    working_dir: PathBuf,
}

impl CommandDispatcher {
    pub fn new(working_dir: PathBuf) -> Self {
        Self { working_dir }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run the selected subcommand; no subcommand means `build` with defaults.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let wd = &self.working_dir;
        let config = cli.config.clone();
        let command: Box<dyn Command> = match &cli.command {
            Some(Commands::Build(args)) => Box::new(BuildCommand::new(wd, config, args.clone())),
            Some(Commands::Probe(args)) => Box::new(ProbeCommand::new(wd, config, args.clone())),
            Some(Commands::Plan(args)) => Box::new(PlanCommand::new(wd, config, args.clone())),
            Some(Commands::Completions(args)) => Box::new(CompletionsCommand::new(args.clone())),
            None => Box::new(BuildCommand::new(wd, config, BuildArgs::default())),
        };
        command.execute(ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use tempfile::TempDir;

    fn dispatch(args: &[&str], working_dir: &Path) -> (Result<CommandResult>, MockUI) {
        let cli = Cli::parse_from(args);
        let mut ui = MockUI::new();
        let result = CommandDispatcher::new(working_dir.to_path_buf()).dispatch(&cli, &mut ui);
        (result, ui)
    }

    #[test]
    fn missing_shell_fails_before_anything_else() {
        let temp = TempDir::new().unwrap();
        let (result, ui) = dispatch(
            &["forgeline", "build", "--shell", "/nonexistent/forgeline/bash.exe"],
            temp.path(),
        );

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Missing prerequisite"));
        assert!(ui.successes().is_empty());
    }

    #[test]
    fn no_subcommand_builds() {
        let temp = TempDir::new().unwrap();
        let (result, ui) = dispatch(
            &["forgeline", "--config", "absent.yml"],
            temp.path(),
        );

        assert!(result.unwrap_err().to_string().contains("absent.yml"));
        assert!(ui.spinners().is_empty());
    }

    #[test]
    fn completions_need_no_environment() {
        let temp = TempDir::new().unwrap();
        let (result, _) = dispatch(&["forgeline", "completions", "zsh"], temp.path());
        assert_eq!(result.unwrap(), CommandResult::success());
    }
}
