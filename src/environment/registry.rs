//! Host registry lookups.
//!
//! The registry is read through the `reg query` tool rather than linked
//! against, so the lookup is a subprocess like every other collaborator.

use regex::Regex;
use tracing::debug;

use crate::config::RegistryLocation;
use crate::shell::{execute_program, CommandOptions};

/// A store of string values addressed by key and value name.
pub trait RegistryStore {
    /// Read a string value, `None` when the key or value is absent.
    fn query(&self, location: &RegistryLocation) -> Option<String>;
}

/// Reads the Windows registry with `reg query <key> /v <value>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegQuery;

impl RegistryStore for RegQuery {
    fn query(&self, location: &RegistryLocation) -> Option<String> {
        let args = ["query", location.key.as_str(), "/v", location.value.as_str()];
        let result =
            match execute_program("reg".as_ref(), &args, &CommandOptions::captured()) {
                Ok(result) => result,
                Err(e) => {
                    debug!("registry query unavailable: {}", e);
                    return None;
                }
            };
        if !result.success {
            debug!(
                "no registry value {}\\{} (exit {:?})",
                location.key, location.value, result.exit_code
            );
            return None;
        }
        parse_reg_output(&result.stdout, &location.value)
    }
}

/// Extract a string value from `reg query` output.
///
/// The interesting line has the form `    <name>    REG_SZ    <data>`.
pub fn parse_reg_output(output: &str, value_name: &str) -> Option<String> {
    let pattern = format!(
        r"(?im)^\s*{}\s+REG_(?:EXPAND_)?SZ\s+(.+?)\s*$",
        regex::escape(value_name)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|data| !data.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\r\nHKEY_LOCAL_MACHINE\\SOFTWARE\\WOW6432Node\\WinFsp\r\n    InstallDir    REG_SZ    C:\\Program Files (x86)\\WinFsp\\\r\n\r\n";

    #[test]
    fn parses_install_dir() {
        assert_eq!(
            parse_reg_output(SAMPLE, "InstallDir").as_deref(),
            Some("C:\\Program Files (x86)\\WinFsp\\")
        );
    }

    #[test]
    fn value_name_is_case_insensitive() {
        assert!(parse_reg_output(SAMPLE, "installdir").is_some());
    }

    #[test]
    fn accepts_expandable_strings() {
        let output = "    Path    REG_EXPAND_SZ    %ProgramFiles%\\Tool\n";
        assert_eq!(
            parse_reg_output(output, "Path").as_deref(),
            Some("%ProgramFiles%\\Tool")
        );
    }

    #[test]
    fn other_values_do_not_match() {
        assert!(parse_reg_output(SAMPLE, "Version").is_none());
    }

    #[test]
    fn non_string_types_are_ignored() {
        let output = "    InstallDir    REG_DWORD    0x1\n";
        assert!(parse_reg_output(output, "InstallDir").is_none());
    }
}
