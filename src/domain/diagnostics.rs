//! Diagnostic channel for lenient construction.
//!
//! Name parsing, node construction and request building never abort on a
//! malformed item. They record a `Diagnostic` here and carry on with the
//! remaining items. Every entry is also emitted as a `tracing` warning.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    MissingParameter,
    MalformedRequest,
    UnresolvedName,
    UnknownOperator,
    UnknownActionType,
    EmptyAction,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::MissingParameter => "missing_parameter",
            DiagnosticKind::MalformedRequest => "malformed_request",
            DiagnosticKind::UnresolvedName => "unresolved_name",
            DiagnosticKind::UnknownOperator => "unknown_operator",
            DiagnosticKind::UnknownActionType => "unknown_action_type",
            DiagnosticKind::EmptyAction => "empty_action",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(kind = %kind, "{}", message);
        self.entries.push(Diagnostic { kind, message });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.count(kind) > 0
    }
}
