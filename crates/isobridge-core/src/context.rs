//! Per-session compilation context
//!
//! The context is passed explicitly through every resolution and generation
//! step. It owns the declared-type cache, the diagnostic sink and the
//! round-scoped diagnostic state.

use crate::decl::ElementId;
use crate::diagnostics::{Diagnostic, DiagnosticSink, ExpectedError, TracingSink};
use crate::type_cache::TypeCache;
use std::collections::{BTreeMap, BTreeSet};

pub struct CompilationContext {
    types: TypeCache,
    sink: Box<dyn DiagnosticSink>,
    reported: BTreeSet<(ElementId, String)>,
    errored: BTreeSet<ElementId>,
    expected: BTreeMap<ElementId, Vec<ExpectedError>>,
    emitted: Vec<Diagnostic>,
}

impl CompilationContext {
    /// Create a context reporting through `tracing`
    pub fn new(types: TypeCache) -> Self {
        Self::with_sink(types, Box::new(TracingSink))
    }

    pub fn with_sink(types: TypeCache, sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            types,
            sink,
            reported: BTreeSet::new(),
            errored: BTreeSet::new(),
            expected: BTreeMap::new(),
            emitted: Vec::new(),
        }
    }

    pub fn types(&self) -> &TypeCache {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeCache {
        &mut self.types
    }

    /// Reset the round-scoped diagnostic state; the type cache is kept
    pub fn begin_round(&mut self) {
        self.reported.clear();
        self.errored.clear();
        self.expected.clear();
        self.emitted.clear();
    }

    /// Register messages an `ExpectError` marker predicts for `element`
    pub fn expect_errors<I, S>(&mut self, element: ElementId, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.expected.entry(element).or_default();
        entry.extend(patterns.into_iter().map(ExpectedError::new));
    }

    /// Report an error at `element`
    ///
    /// The owning type is marked as errored in every case. The message is
    /// forwarded to the sink unless the same (element, message) pair was
    /// already reported this round or an expectation predicts it.
    pub fn emit_error(
        &mut self,
        element: &ElementId,
        marker: Option<&str>,
        message: impl Into<String>,
    ) {
        let message = message.into();
        self.errored.insert(element.owner());
        if !self.reported.insert((element.clone(), message.clone())) {
            return;
        }
        if let Some(patterns) = self.expected.get_mut(element)
            && let Some(idx) = patterns.iter().position(|p| p.matches(&message))
        {
            patterns.remove(idx);
            return;
        }
        self.forward(Diagnostic {
            element: element.clone(),
            marker: marker.map(str::to_string),
            message,
        });
    }

    /// Report every unmatched expectation registered for `owner` or its methods
    pub fn verify_expectations(&mut self, owner: &ElementId) {
        let unmatched: Vec<(ElementId, ExpectedError)> = self
            .expected
            .iter_mut()
            .filter(|(element, _)| element.owner() == *owner)
            .flat_map(|(element, patterns)| {
                std::mem::take(patterns)
                    .into_iter()
                    .map(move |pattern| (element.clone(), pattern))
            })
            .collect();
        for (element, pattern) in unmatched {
            self.errored.insert(element.owner());
            self.forward(Diagnostic {
                element,
                marker: None,
                message: format!("Expected error not reported: {}", pattern.pattern()),
            });
        }
    }

    fn forward(&mut self, diagnostic: Diagnostic) {
        self.sink.report(&diagnostic);
        self.emitted.push(diagnostic);
    }

    /// Whether any error was reported for the type owning `element`
    pub fn has_errors(&self, element: &ElementId) -> bool {
        self.errored.contains(&element.owner())
    }

    /// Diagnostics forwarded to the sink this round
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.emitted
    }

    pub fn error_count(&self) -> usize {
        self.emitted.len()
    }
}

impl std::fmt::Debug for CompilationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationContext")
            .field("types", &self.types.len())
            .field("errored", &self.errored)
            .field("emitted", &self.emitted)
            .finish()
    }
}
