//! Output verbosity.

use std::time::Duration;

/// How much of a run is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Status lines plus configure/make output passed straight through.
    Verbose,
    /// Status lines and spinners with a short tail of command output.
    #[default]
    Normal,
    /// Errors only.
    Quiet,
}

impl OutputMode {
    /// `--verbose` wins over `--quiet`.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => Self::Verbose,
            (false, true) => Self::Quiet,
            (false, false) => Self::Normal,
        }
    }

    pub fn shows_command_output(self) -> bool {
        self == Self::Verbose
    }

    pub fn shows_spinners(self) -> bool {
        self == Self::Normal
    }

    pub fn shows_status(self) -> bool {
        self != Self::Quiet
    }
}

/// Short human duration: `250ms`, `2.5s`, `1.5m`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    match secs {
        s if s < 1.0 => format!("{}ms", d.as_millis()),
        s if s < 60.0 => format!("{:.1}s", s),
        s => format!("{:.1}m", s / 60.0),
    }
}
