//! Spinners for probing, package checks and build phases.

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::shell::{OutputCallback, OutputLine};

use super::theme::{ForgelineTheme, Marker};
use super::SpinnerHandle;

const TICK: Duration = Duration::from_millis(80);

/// Widest streamed line shown under a spinner, in characters.
const TAIL_WIDTH: usize = 72;

/// An indicatif spinner finished with a themed status line.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: ForgelineTheme,
}

impl ProgressSpinner {
    pub fn new(message: &str, theme: ForgelineTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(TICK);
        Self { bar, theme }
    }

    /// A spinner that draws nothing, for pipes and quiet runs.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: ForgelineTheme::plain(),
        }
    }

    fn finish(&mut self, marker: Marker, msg: &str) {
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(self.theme.status(marker, msg));
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn finish_success(&mut self, msg: &str) {
        self.finish(Marker::Success, msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish(Marker::Error, msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finish(Marker::Skipped, msg);
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        Some(self.bar.clone())
    }
}

/// Cut `text` to [`TAIL_WIDTH`] characters, marking the cut.
fn clip(text: &str) -> String {
    if text.chars().count() <= TAIL_WIDTH {
        return text.to_string();
    }
    let kept: String = text.chars().take(TAIL_WIDTH - 3).collect();
    format!("{}...", kept)
}

/// Stream the last `max_lines` non-empty output lines of a subprocess under
/// the spinner's `label`, indented by `indent` spaces.
pub fn live_output_callback(
    bar: ProgressBar,
    label: String,
    indent: usize,
    max_lines: usize,
) -> OutputCallback {
    let tail = Arc::new(Mutex::new(VecDeque::with_capacity(max_lines + 1)));
    let dim = ForgelineTheme::new().dim;
    let pad = " ".repeat(indent);

    Box::new(move |line: OutputLine| {
        let (OutputLine::Stdout(text) | OutputLine::Stderr(text)) = &line;
        let text = text.trim_end();
        if text.is_empty() {
            return;
        }

        let Ok(mut tail) = tail.lock() else {
            return;
        };
        tail.push_back(clip(text));
        while tail.len() > max_lines {
            tail.pop_front();
        }

        let mut msg = label.clone();
        for shown in tail.iter() {
            msg.push('\n');
            msg.push_str(&pad);
            msg.push_str(&dim.apply_to(format!("» {}", shown)).to_string());
        }
        bar.set_message(msg);
    })
}
