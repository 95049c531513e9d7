//! Command-line interface for forgeline.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    BuildArgs, Cli, Commands, CompletionsArgs, EnvironmentArgs, PhaseArgs, PlanArgs, ProbeArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
