//! What the operator sees during a run.
//!
//! Commands talk to a [`UserInterface`]; [`TerminalUI`] prints, [`MockUI`]
//! records for tests. Long steps (probing, package checks, phases) run behind
//! a [`SpinnerHandle`].
//!
//! # Example
//!
//! ```
//! use forgeline::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("forgeline");
//! ui.success("Build complete");
//! assert!(ui.has_success("Build complete"));
//! ```

pub mod mock;
pub mod output;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI, UiEvent};
pub use output::{format_duration, OutputMode};
pub use spinner::{live_output_callback, ProgressSpinner};
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, ForgelineTheme, Marker};

use indicatif::ProgressBar;

/// Status output of a run.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    /// Plain status line.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    /// A degraded but non-fatal condition, such as a missing optional feature.
    fn warning(&mut self, msg: &str);

    /// Shown even in quiet mode.
    fn error(&mut self, msg: &str);

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Banner at the top of a build.
    fn show_header(&mut self, title: &str);

    /// A failed script and the tail of what it printed.
    fn show_error_block(&mut self, command: &str, output: &str);
}

/// A running spinner; it ends with exactly one `finish_*` call.
pub trait SpinnerHandle {
    fn finish_success(&mut self, msg: &str);

    fn finish_error(&mut self, msg: &str);

    fn finish_skipped(&mut self, msg: &str);

    /// Bar to stream subprocess output into, when the spinner is drawn.
    fn progress_bar(&self) -> Option<ProgressBar> {
        None
    }
}
