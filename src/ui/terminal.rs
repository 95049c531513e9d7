//! Terminal UI.

use console::Term;
use std::io::Write;

use super::theme::Marker;
use super::{
    should_use_colors, ForgelineTheme, OutputMode, ProgressSpinner, SpinnerHandle, UserInterface,
};

/// Lines of failed command output shown in an error block.
const ERROR_TAIL_LINES: usize = 20;

/// Status lines go to stdout; warnings, errors and error blocks to stderr.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: ForgelineTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Colors additionally require a terminal and no `NO_COLOR`.
    pub fn new(mode: OutputMode, color: bool) -> Self {
        let theme = if color && should_use_colors() {
            ForgelineTheme::new()
        } else {
            ForgelineTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }

    fn status(&mut self, marker: Marker, msg: &str) {
        let line = self.theme.status(marker, msg);
        let term = match marker {
            Marker::Warning | Marker::Error => &mut self.err,
            Marker::Success | Marker::Skipped => &mut self.out,
        };
        writeln!(term, "{}", line).ok();
    }
}

/// The last [`ERROR_TAIL_LINES`] lines of `output`.
fn tail(output: &str) -> Vec<&str> {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].to_vec()
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            self.status(Marker::Success, msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            self.status(Marker::Warning, msg);
        }
    }

    fn error(&mut self, msg: &str) {
        self.status(Marker::Error, msg);
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() && self.out.is_term() {
            return Box::new(ProgressSpinner::new(message, self.theme.clone()));
        }
        self.message(message);
        Box::new(ProgressSpinner::hidden())
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            let banner = self.theme.banner(title);
            writeln!(self.out, "\n{}\n", banner).ok();
        }
    }

    fn show_error_block(&mut self, command: &str, output: &str) {
        let dim = self.theme.dim.clone();
        writeln!(self.err, "  {}", dim.apply_to("── script ──")).ok();
        writeln!(self.err, "  {}", self.theme.command.apply_to(command)).ok();

        let shown = tail(output);
        if !shown.is_empty() {
            writeln!(self.err, "  {}", dim.apply_to("── output (last lines) ──")).ok();
            for line in shown {
                writeln!(self.err, "  {} {}", dim.apply_to("│"), line).ok();
            }
        }
    }
}
