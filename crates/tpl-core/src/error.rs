//! Hard-abort conditions (SPEC_FULL.md ambient stack): a `thiserror`-derived
//! wrapper used only when a caller must propagate a `Result`, as distinct
//! from the recoverable `Diagnostic`s accumulated by a `DiagnosticReporter`
//! (spec.md §7 "Propagation policy" splits these two channels). There are
//! deliberately few variants here — most failure surfaces in this crate are
//! diagnostics, not `Result` errors.
#[derive(Debug, thiserror::Error)]
pub enum AbortCompilation {
    #[error("failed to load conformance rule set: {0}")]
    RuleSetLoad(#[from] serde_json::Error),
}
