//! The `forgeline probe` command.

use std::path::{Path, PathBuf};

use crate::cli::args::ProbeArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::render_profile;
use super::target::BuildTarget;

/// Report the environment profile without changing anything.
pub struct ProbeCommand {
    working_dir: PathBuf,
    config_path: Option<PathBuf>,
    args: ProbeArgs,
}

impl ProbeCommand {
    pub fn new(working_dir: &Path, config_path: Option<PathBuf>, args: ProbeArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config_path,
            args,
        }
    }
}

impl Command for ProbeCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let target = BuildTarget::resolve(
            &self.working_dir,
            self.config_path.as_deref(),
            &self.args.environment,
            None,
        )?;
        let profile = target.probe(false)?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&profile).map_err(anyhow::Error::from)?;
            println!("{}", json);
        } else {
            print!("{}", render_profile(&profile));
        }

        Ok(CommandResult::success())
    }
}
