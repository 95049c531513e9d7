//! Forgeline - build-configuration resolver for a POSIX subsystem on Windows.
//!
//! Forgeline probes the host for the subsystem shell, compiler and optional
//! feature libraries, reconciles the subsystem's packages, writes pkg-config
//! descriptors for the features it found, and then drives the configure,
//! build and install phases of an autotools-style project.
//!
//! # Modules
//!
//! - [`build`] - Phase scripts and the configure/build/install orchestrator
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, merging, and validation
//! - [`environment`] - Host probing and feature library discovery
//! - [`error`] - Error types and result aliases
//! - [`metadata`] - pkg-config descriptor synthesis
//! - [`packages`] - Subsystem package reconciliation
//! - [`shell`] - Command execution and host-to-subsystem path translation
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use forgeline::shell::translate;
//!
//! let path = translate(r"C:\Program Files (x86)\WinFsp").unwrap();
//! assert_eq!(path, r"/c/Program\ Files\ \(x86\)/WinFsp");
//! ```

pub mod build;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod metadata;
pub mod packages;
pub mod shell;
pub mod ui;

pub use error::{ForgelineError, Result};
