pub mod classify;
pub mod dom;
pub mod extract;
pub mod history;
pub mod markers;
pub mod metadata;
pub mod shape;
pub mod subsections;
pub mod text;
pub mod validate;
pub mod walker;

pub use walker::{parse_statute_html, ParseOutcome};

use crate::runtime::logging::{log_event, LogLevel};
use serde::Serialize;
use serde_json::json;

/// A malformed fragment the parser recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn record(&mut self, element: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        log_event(
            LogLevel::Warn,
            &message,
            element.map(|id| json!({ "element": id })),
        );
        self.entries.push(Diagnostic {
            element: element.map(ToString::to_string),
            message,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
