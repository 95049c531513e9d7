//! Recording UI for tests.
//!
//! `MockUI` keeps every call as a [`UiEvent`] in order, so tests can check
//! both what was shown and in which sequence.
//!
//! # Example
//!
//! ```
//! use forgeline::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Probing environment");
//! ui.warning("fuse not found");
//!
//! assert!(ui.has_message("Probing environment"));
//! assert!(ui.has_warning("fuse"));
//! ```

use std::sync::{Arc, Mutex};

use super::{Marker, OutputMode, SpinnerHandle, UserInterface};

/// One call made on a [`MockUI`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Message(String),
    Status(Marker, String),
    Header(String),
    SpinnerStarted(String),
    ErrorBlock { command: String, output: String },
}

/// UI that records instead of printing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    events: Vec<UiEvent>,
    spinner_outcomes: Arc<Mutex<Vec<(Marker, String)>>>,
}

impl MockUI {
    /// A recording UI in Normal mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn events(&self) -> &[UiEvent] {
        &self.events
    }

    pub fn messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Message(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    fn statuses(&self, marker: Marker) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Status(m, text) if *m == marker => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn successes(&self) -> Vec<&str> {
        self.statuses(Marker::Success)
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.statuses(Marker::Warning)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.statuses(Marker::Error)
    }

    /// Messages of every spinner started, in order.
    pub fn spinners(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::SpinnerStarted(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    /// How each finished spinner ended, in finishing order.
    pub fn spinner_outcomes(&self) -> Vec<(Marker, String)> {
        self.spinner_outcomes
            .lock()
            .map(|o| o.clone())
            .unwrap_or_default()
    }

    /// `(command, output)` of every error block shown.
    pub fn error_blocks(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::ErrorBlock { command, output } => {
                    Some((command.as_str(), output.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn has_message(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }

    pub fn has_success(&self, needle: &str) -> bool {
        self.successes().iter().any(|m| m.contains(needle))
    }

    pub fn has_warning(&self, needle: &str) -> bool {
        self.warnings().iter().any(|m| m.contains(needle))
    }

    pub fn has_error(&self, needle: &str) -> bool {
        self.errors().iter().any(|m| m.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.events.push(UiEvent::Message(msg.to_string()));
    }

    fn success(&mut self, msg: &str) {
        self.events
            .push(UiEvent::Status(Marker::Success, msg.to_string()));
    }

    fn warning(&mut self, msg: &str) {
        self.events
            .push(UiEvent::Status(Marker::Warning, msg.to_string()));
    }

    fn error(&mut self, msg: &str) {
        self.events.push(UiEvent::Status(Marker::Error, msg.to_string()));
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.events
            .push(UiEvent::SpinnerStarted(message.to_string()));
        Box::new(MockSpinner {
            outcomes: Arc::clone(&self.spinner_outcomes),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.events.push(UiEvent::Header(title.to_string()));
    }

    fn show_error_block(&mut self, command: &str, output: &str) {
        self.events.push(UiEvent::ErrorBlock {
            command: command.to_string(),
            output: output.to_string(),
        });
    }
}

/// Spinner handed out by [`MockUI`]; its outcome is visible through
/// [`MockUI::spinner_outcomes`].
#[derive(Debug)]
pub struct MockSpinner {
    outcomes: Arc<Mutex<Vec<(Marker, String)>>>,
}

impl MockSpinner {
    fn finish(&mut self, marker: Marker, msg: &str) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push((marker, msg.to_string()));
        }
    }
}

impl SpinnerHandle for MockSpinner {
    fn finish_success(&mut self, msg: &str) {
        self.finish(Marker::Success, msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish(Marker::Error, msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finish(Marker::Skipped, msg);
    }
}
