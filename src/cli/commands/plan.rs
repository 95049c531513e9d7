//! The `forgeline plan` command.

use std::path::{Path, PathBuf};

use crate::build::BuildPlan;
use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::render_plan;
use super::target::BuildTarget;

/// Print the phase scripts a build would run.
pub struct PlanCommand {
    working_dir: PathBuf,
    config_path: Option<PathBuf>,
    args: PlanArgs,
}

impl PlanCommand {
    pub fn new(working_dir: &Path, config_path: Option<PathBuf>, args: PlanArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config_path,
            args,
        }
    }
}

impl Command for PlanCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let target = BuildTarget::resolve(
            &self.working_dir,
            self.config_path.as_deref(),
            &self.args.environment,
            Some(&self.args.phases),
        )?;
        let profile = target.probe(false)?;
        let plan = BuildPlan::new(
            &profile,
            &target.config,
            &target.source,
            self.args.phases.install,
        )?;

        print!("{}", render_plan(&plan));
        Ok(CommandResult::success())
    }
}
