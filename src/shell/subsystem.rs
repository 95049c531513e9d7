//! Running scripts inside the POSIX subsystem.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::command::{execute_program, execute_streaming, CommandOptions, CommandResult};
use super::OutputCallback;
use crate::error::Result;

/// Handle to the subsystem's shell entry point.
///
/// Scripts run as `<shell> -c <script>` with `MSYSTEM` selecting the
/// toolchain environment and `CHERE_INVOKING` keeping the profile from
/// changing directory.
#[derive(Debug, Clone)]
pub struct SubsystemShell {
    shell: PathBuf,
    msystem: String,
    profile_script: String,
}

impl SubsystemShell {
    pub fn new(shell: impl Into<PathBuf>, msystem: &str, profile_script: &str) -> Self {
        Self {
            shell: shell.into(),
            msystem: msystem.to_string(),
            profile_script: profile_script.to_string(),
        }
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }

    /// Prefix `body` with sourcing of the subsystem profile.
    pub fn with_profile(&self, body: &str) -> String {
        format!(". {} && {}", self.profile_script, body)
    }

    /// Environment passed to every subsystem process.
    pub fn env(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("MSYSTEM".to_string(), self.msystem.clone()),
            ("CHERE_INVOKING".to_string(), "1".to_string()),
        ])
    }

    /// Run a script and capture its output.
    pub fn run_captured(&self, script: &str) -> Result<CommandResult> {
        debug!("subsystem script: {}", script);
        let options = CommandOptions {
            env: self.env(),
            ..CommandOptions::captured()
        };
        execute_program(self.shell.as_os_str(), &["-c", script], &options)
    }

    /// Run a script with its output inherited by this process.
    pub fn run_inherited(&self, script: &str) -> Result<CommandResult> {
        debug!("subsystem script: {}", script);
        let options = CommandOptions {
            env: self.env(),
            ..Default::default()
        };
        execute_program(self.shell.as_os_str(), &["-c", script], &options)
    }

    /// Run a script, streaming output lines to `callback`.
    pub fn run_streaming(&self, script: &str, callback: OutputCallback) -> Result<CommandResult> {
        debug!("subsystem script: {}", script);
        let options = CommandOptions {
            env: self.env(),
            ..Default::default()
        };
        execute_streaming(self.shell.as_os_str(), &["-c", script], &options, callback)
    }
}
