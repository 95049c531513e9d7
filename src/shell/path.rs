//! Host path to subsystem path translation.
//!
//! The subsystem shell addresses host drives as `/c/...` and needs every
//! character that the shell would split on escaped. Translation is a pure
//! string transformation:
//!
//! 1. a leading `X:` drive becomes `/x`
//! 2. every `\` becomes `/`
//! 3. every space, `(` and `)` gets a single `\` in front
//!
//! Separators are rewritten before escaping, so the backslashes inserted in
//! step 3 survive.
//!
//! # Example
//!
//! ```
//! use forgeline::shell::translate;
//!
//! let mapped = translate(r"C:\Program Files (x86)\WinFsp").unwrap();
//! assert_eq!(mapped, r"/c/Program\ Files\ \(x86\)/WinFsp");
//! ```

use std::path::Path;

use crate::error::{ForgelineError, Result};

/// Characters that must be backslash-escaped for the subsystem shell.
const ESCAPED: &[char] = &[' ', '(', ')'];

/// Translate a host path string into the subsystem's path dialect.
///
/// Fails with [`ForgelineError::InvalidPath`] when the path does not start
/// with a drive letter.
pub fn translate(host_path: &str) -> Result<String> {
    let (drive, rest) = split_drive(host_path).ok_or_else(|| ForgelineError::InvalidPath {
        path: host_path.to_string(),
        message: "expected an absolute path starting with a drive letter".to_string(),
    })?;

    let mut mapped = String::with_capacity(host_path.len() + 8);
    mapped.push('/');
    mapped.push(drive.to_ascii_lowercase());

    let separated = rest.replace('\\', "/");
    for ch in separated.chars() {
        if ESCAPED.contains(&ch) {
            mapped.push('\\');
        }
        mapped.push(ch);
    }

    Ok(mapped)
}

/// Translate a host [`Path`].
pub fn translate_path(host_path: &Path) -> Result<String> {
    translate(&host_path.to_string_lossy())
}

/// Whether `path` starts with a drive letter, on any host platform.
pub fn has_drive(path: &Path) -> bool {
    split_drive(&path.to_string_lossy()).is_some()
}

/// Split `X:rest` into the drive letter and the remainder.
///
/// `rest` must be empty or start at the drive root; drive-relative forms
/// such as `C:foo` are not absolute.
fn split_drive(path: &str) -> Option<(char, &str)> {
    let mut chars = path.chars();
    let drive = chars.next()?;
    if !drive.is_ascii_alphabetic() || chars.next()? != ':' {
        return None;
    }
    let rest = &path[2..];
    match rest.chars().next() {
        None | Some('\\') | Some('/') => Some((drive, rest)),
        Some(_) => None,
    }
}
