//! Runtime error taxonomy (spec.md §7 "Runtime"). These bubble out of a
//! render as ordinary `Result` errors rather than flowing through the
//! compile-time `DiagnosticReporter`; spec.md §7 "Propagation policy":
//! "Runtime errors bubble out of the render; partial output already
//! flushed is not retracted."

use crate::message::MessageStructureError;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("type assertion failed: expected {expected}, got {actual}")]
    TypeAssertionFailed { expected: String, actual: String },

    #[error(transparent)]
    MessageStructure(#[from] MessageStructureError),

    /// An external function implementation (spec.md §6 "Built-in function
    /// & directive registry" / "Custom-rule plugin contract") threw while
    /// the render called it.
    #[error("plugin {name} failed: {source}")]
    PluginFailure {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Distinct from `Limited(Cancelled)`: this variant is for a render
    /// that must report cancellation as a hard failure rather than a
    /// resumable `RenderResult` (e.g. when a caller awaits a provider's
    /// `resolve()` after the render that was driving it was cancelled).
    #[error("render cancelled")]
    Cancelled,
}
