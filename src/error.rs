//! Error types for forgeline operations.
//!
//! This module defines [`ForgelineError`], the primary error type used
//! throughout the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every fatal condition of a run maps to one variant, so the message names
//!   the failing component and, where it applies, the package or phase
//! - Use `anyhow::Error` (via `ForgelineError::Other`) for unexpected errors
//! - All fatal errors exit the process with code 1

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for forgeline operations.
#[derive(Debug, Error)]
pub enum ForgelineError {
    /// A mandatory tool (subsystem shell, compiler) could not be located.
    #[error("Missing prerequisite '{tool}': {message}")]
    MissingPrerequisite { tool: String, message: String },

    /// One or more declared packages failed to install.
    #[error("Dependency install failed for: {}", packages.join(", "))]
    DependencyInstallFailed { packages: Vec<String> },

    /// A host path could not be mapped into the subsystem.
    #[error("Invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// The external configure step exited non-zero.
    #[error("Configure phase failed with exit code {code:?}")]
    ConfigureFailed { code: Option<i32> },

    /// The external build step exited non-zero.
    #[error("Build phase failed with exit code {code:?}")]
    BuildFailed { code: Option<i32> },

    /// The external install step exited non-zero.
    #[error("Install phase failed with exit code {code:?}")]
    InstallFailed { code: Option<i32> },

    /// A feature provisioning command failed under the `require` policy.
    #[error("Provisioning feature '{feature}' failed: {message}")]
    FeatureProvisionFailed { feature: String, message: String },

    /// Configuration file not found at an explicitly requested location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Configuration parsed but holds invalid values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A collaborator command exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// A subprocess could not be started or awaited at all.
    #[error("Could not run '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ForgelineError {
    /// Process exit code for this error. Every fatal condition exits with 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Result type alias for forgeline operations.
pub type Result<T> = std::result::Result<T, ForgelineError>;
