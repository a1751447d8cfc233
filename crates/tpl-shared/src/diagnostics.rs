use crate::loc::SourceLocation;
use std::fmt;

/// Severity of a compile-time diagnostic (spec.md §7 "User visibility").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// Machine-readable diagnostic code. Mirrors the taxonomy in spec.md §7
/// exactly; runtime-only failures (`TypeAssertionFailed`, `MessageStructureError`,
/// `PluginFailure`, `Cancelled`) are not here because they never flow through
/// the compile-time `DiagnosticReporter` — they bubble out of a render as
/// ordinary `Result` errors instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    ParseError,
    UnresolvedName,
    TypeMismatch,
    ArgumentMismatch,
    UnknownField,
    CallCycle,
    ContextDivergence,
    UnexpectedContext,
    UnclosedConstruct,
    StrictEscapeRequired,
    ConformanceViolation,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ParseError => "ParseError",
            Self::UnresolvedName => "UnresolvedName",
            Self::TypeMismatch => "TypeMismatch",
            Self::ArgumentMismatch => "ArgumentMismatch",
            Self::UnknownField => "UnknownField",
            Self::CallCycle => "CallCycle",
            Self::ContextDivergence => "ContextDivergence",
            Self::UnexpectedContext => "UnexpectedContext",
            Self::UnclosedConstruct => "UnclosedConstruct",
            Self::StrictEscapeRequired => "StrictEscapeRequired",
            Self::ConformanceViolation => "ConformanceViolation",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub loc: SourceLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, loc: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            loc,
            message: message.into(),
        }
    }

    pub fn warning(code: DiagnosticCode, loc: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            loc,
            message: message.into(),
        }
    }

    /// Diagnostics at the same location with the same code are considered
    /// duplicates (spec.md §7).
    fn dedup_key(&self) -> (usize, usize, &str, &DiagnosticCode) {
        (
            self.loc.start.offset,
            self.loc.end.offset,
            self.loc.file.path(),
            &self.code,
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.loc, self.code, self.message)
    }
}

/// Accumulates diagnostics across passes so the compiler can run every pass
/// on a best-effort AST and surface as many errors as possible in one go
/// (spec.md §7 "Propagation policy"), instead of aborting at the first one.
#[derive(Debug, Default)]
pub struct DiagnosticReporter {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        if self
            .diagnostics
            .iter()
            .any(|d| d.dedup_key() == diagnostic.dedup_key())
        {
            return;
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
