//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! dispatched via [`CommandDispatcher`]; running without a subcommand builds
//! with defaults.

pub mod build;
pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod plan;
pub mod probe;
pub mod target;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
