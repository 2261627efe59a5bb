//! Diagnostics reported against annotated elements

use crate::decl::ElementId;
use std::fmt;

/// One error reported at an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub element: ElementId,
    /// Qualified name of the marker annotation the error refers to
    pub marker: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.marker {
            Some(marker) => write!(f, "{} (@{}): {}", self.element, marker, self.message),
            None => write!(f, "{}: {}", self.element, self.message),
        }
    }
}

/// The host's messaging channel
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

/// Sink forwarding diagnostics to `tracing` at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        tracing::error!(
            element = %diagnostic.element,
            marker = diagnostic.marker.as_deref().unwrap_or("-"),
            "{}",
            diagnostic.message
        );
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.push(diagnostic.clone());
    }
}

/// A message predicted by an `ExpectError` marker
///
/// A trailing `%` matches any suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedError(String);

impl ExpectedError {
    pub fn new(pattern: impl Into<String>) -> Self {
        ExpectedError(pattern.into())
    }

    pub fn matches(&self, message: &str) -> bool {
        match self.0.strip_suffix('%') {
            Some(prefix) => message.starts_with(prefix),
            None => self.0 == message,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.0
    }
}
