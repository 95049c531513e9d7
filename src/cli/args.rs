//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// forgeline - Build autotools projects inside an MSYS2-style subsystem.
#[derive(Debug, Parser)]
#[command(name = "forgeline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides <source>/.forgeline/config.yml)
    #[arg(short, long, global = true, env = "FORGELINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show external command output as it runs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Provision packages, configure and build (default if no command specified)
    Build(BuildArgs),

    /// Report the detected environment
    Probe(ProbeArgs),

    /// Print the phase commands a build would run
    Plan(PlanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where to look for the subsystem, the source tree and features.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EnvironmentArgs {
    /// Source tree containing the configure script (defaults to the current directory)
    #[arg(short, long, env = "FORGELINE_SOURCE", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Subsystem shell executable
    #[arg(long, env = "FORGELINE_SHELL", value_name = "PATH")]
    pub shell: Option<PathBuf>,

    /// Install root to try first for every optional feature
    #[arg(long, env = "FORGELINE_FEATURE_ROOT", value_name = "PATH")]
    pub feature_root: Option<PathBuf>,
}

/// Settings of the configure/make phases.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PhaseArgs {
    /// Run `make install` after a successful build
    #[arg(long)]
    pub install: bool,

    /// Install prefix passed to configure
    #[arg(long, env = "FORGELINE_PREFIX", value_name = "PATH")]
    pub prefix: Option<PathBuf>,

    /// Upper bound on parallel make jobs
    #[arg(short, long, env = "FORGELINE_JOBS", value_name = "N")]
    pub jobs: Option<usize>,
}

/// Arguments for the `build` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub environment: EnvironmentArgs,

    #[command(flatten)]
    pub phases: PhaseArgs,

    /// Probe and print the plan without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `probe` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub environment: EnvironmentArgs,

    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub environment: EnvironmentArgs,

    #[command(flatten)]
    pub phases: PhaseArgs,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
