//! Shared preamble of every phase script.

use std::borrow::Cow;

/// Quote `value` for a POSIX shell.
///
/// The subsystem shell is always POSIX, even on a Windows host, so this
/// always uses the unix rules.
pub fn quote(value: &str) -> String {
    shell_escape::unix::escape(Cow::Borrowed(value)).into_owned()
}

/// Environment and working directory shared by all phases.
///
/// Paths handed to the context must already be in subsystem syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    profile_script: String,
    cppflags: Vec<String>,
    ldflags: Vec<String>,
    pkg_config_dir: String,
    env: Vec<(String, String)>,
    workdir: String,
}

impl BuildContext {
    pub fn new(profile_script: &str, pkg_config_dir: String, workdir: String) -> Self {
        Self {
            profile_script: profile_script.to_string(),
            cppflags: Vec::new(),
            ldflags: Vec::new(),
            pkg_config_dir,
            env: Vec::new(),
            workdir,
        }
    }

    /// Add the include and library directory of a present feature.
    pub fn add_feature(&mut self, include_dir: &str, lib_dir: &str) {
        self.cppflags.push(format!("-I{}", include_dir));
        self.ldflags.push(format!("-L{}", lib_dir));
    }

    /// Export an extra variable.
    pub fn export(&mut self, key: &str, value: &str) {
        self.env.push((key.to_string(), value.to_string()));
    }

    /// Whether any feature contributed compiler or linker flags.
    pub fn has_feature_flags(&self) -> bool {
        !self.cppflags.is_empty()
    }

    pub fn workdir(&self) -> &str {
        &self.workdir
    }

    /// The preamble as a `&&` chain.
    pub fn render(&self) -> String {
        let mut parts = vec![format!(". {}", self.profile_script)];

        // Flags hold already escaped paths, so words are joined with an
        // escaped space to stay a single shell word.
        if !self.cppflags.is_empty() {
            let cppflags = self.cppflags.join("\\ ");
            parts.push(format!("export CPPFLAGS={}", cppflags));
            parts.push(format!("export CFLAGS={}", cppflags));
        }
        if !self.ldflags.is_empty() {
            parts.push(format!("export LDFLAGS={}", self.ldflags.join("\\ ")));
        }

        parts.push(format!(
            "export PKG_CONFIG_PATH={}:$PKG_CONFIG_PATH",
            self.pkg_config_dir
        ));

        for (key, value) in &self.env {
            parts.push(format!("export {}={}", key, quote(value)));
        }

        parts.push(format!("mkdir -p {}", self.workdir));
        parts.push(format!("cd {}", self.workdir));
        parts.join(" && ")
    }

    /// `command` preceded by the preamble.
    pub fn wrap(&self, command: &str) -> String {
        format!("{} && {}", self.render(), command)
    }
}
