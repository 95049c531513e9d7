//! Locating mandatory executables.
//!
//! Lookup walks the directories itself instead of shelling out to
//! `which`/`where`, whose answers differ between the host and the subsystem.

use std::path::{Path, PathBuf};

/// A regular file the current user may run.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

/// Windows has no execute bit; any regular file with a candidate name counts.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// File names `tool` may carry on this host.
fn file_names(tool: &str) -> Vec<String> {
    let bare = tool.to_string();
    if cfg!(windows) && Path::new(tool).extension().is_none() {
        vec![bare, format!("{}.exe", tool)]
    } else {
        vec![bare]
    }
}

/// First executable named `tool` in `dirs`, tried in order.
pub fn resolve_tool_path(tool: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let names = file_names(tool);
    dirs.iter()
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| is_executable(candidate))
}

/// Directories of the host `PATH`.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Subsystem directories first, then the host PATH, without duplicates.
pub fn search_path(subsystem_dirs: &[PathBuf], system_path: &[PathBuf]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::with_capacity(subsystem_dirs.len() + system_path.len());
    for dir in subsystem_dirs.iter().chain(system_path) {
        if !result.contains(dir) {
            result.push(dir.clone());
        }
    }
    result
}
