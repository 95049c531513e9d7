//! `pacman` inside the subsystem.

use super::{DependencySpec, PackageManager};
use crate::build::quote;
use crate::error::{ForgelineError, Result};
use crate::shell::SubsystemShell;

/// The subsystem's pacman, driven through its shell.
///
/// `pacman -Q <name>` exits 0 when the package is installed.
pub struct Pacman {
    shell: SubsystemShell,
}

impl Pacman {
    pub fn new(shell: SubsystemShell) -> Self {
        Self { shell }
    }

    /// Script querying whether `package` is installed.
    pub fn query_script(&self, package: &DependencySpec) -> String {
        self.shell
            .with_profile(&format!("pacman -Q {} >/dev/null 2>&1", quote(package.name())))
    }

    /// Script installing `package` without prompting.
    pub fn install_script(&self, package: &DependencySpec) -> String {
        self.shell
            .with_profile(&format!(
                "pacman -S --noconfirm --needed {}",
                quote(package.name())
            ))
    }
}

impl PackageManager for Pacman {
    fn is_installed(&mut self, package: &DependencySpec) -> Result<bool> {
        let result = self.shell.run_captured(&self.query_script(package))?;
        Ok(result.success)
    }

    fn install(&mut self, package: &DependencySpec) -> Result<()> {
        let script = self.install_script(package);
        let result = self.shell.run_captured(&script)?;
        if result.success {
            Ok(())
        } else {
            tracing::debug!("pacman output for {}:\n{}{}", package, result.stdout, result.stderr);
            Err(ForgelineError::CommandFailed {
                command: format!("pacman -S {}", package),
                code: result.exit_code,
            })
        }
    }
}
