mod diagnostics;
mod loc;
mod node_id;
mod uniquename;

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticReporter, Severity};
pub use loc::{FileId, Position, SourceLocation};
pub use node_id::{NodeId, NodeIdGen};
pub use uniquename::{ClaimError, UniqueNameGenerator};
