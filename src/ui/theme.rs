//! Status markers and terminal styles.

use console::Style;

/// Outcome shown in front of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Success,
    Warning,
    Error,
    Skipped,
}

impl Marker {
    pub fn symbol(self) -> &'static str {
        match self {
            Marker::Success => "✓",
            Marker::Warning => "⚠",
            Marker::Error => "✗",
            Marker::Skipped => "○",
        }
    }
}

/// Styles for forgeline's terminal output.
#[derive(Debug, Clone)]
pub struct ForgelineTheme {
    success: Style,
    warning: Style,
    error: Style,
    /// Secondary text: skipped phases, streamed output, error block frames.
    pub dim: Style,
    /// The banner naming the source tree.
    pub header: Style,
    /// A failed script echoed in an error block.
    pub command: Style,
}

impl Default for ForgelineTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ForgelineTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().cyan(),
            command: Style::new().dim().italic(),
        }
    }

    /// No styling at all, for pipes and `--no-color`.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            command: Style::new(),
        }
    }

    fn style(&self, marker: Marker) -> &Style {
        match marker {
            Marker::Success => &self.success,
            Marker::Warning => &self.warning,
            Marker::Error => &self.error,
            Marker::Skipped => &self.dim,
        }
    }

    /// `msg` behind the marker symbol, in the marker's style.
    pub fn status(&self, marker: Marker, msg: &str) -> String {
        self.style(marker)
            .apply_to(format!("{} {}", marker.symbol(), msg))
            .to_string()
    }

    pub fn banner(&self, title: &str) -> String {
        format!("{} {}", self.header.apply_to("⚒"), self.header.apply_to(title))
    }
}

/// Colors are off under `NO_COLOR` and when stdout is not a terminal.
pub fn should_use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none() && console::Term::stdout().is_term()
}
