//! The detachable rendering runtime (spec.md §4.5): providers, frames,
//! buffered appendables with logging blocks, and message rendering. This
//! crate is the consumer-facing layer above `tpl-core`/`tpl-dom`, the same
//! position the teacher's `compiler-sfc` crate occupies above
//! `compiler-core`/`compiler-dom` (see DESIGN.md).

mod appendable;
mod cancel;
mod engine;
mod error;
mod frame;
mod message;
mod provider;
mod value;

pub use appendable::{Appendable, BufferingAppendable, LogEvent, WriteOutcome};
pub use cancel::CancelToken;
pub use engine::ScriptedContentProvider;
pub use error::RuntimeError;
pub use frame::{Frame, FrameStack};
pub use message::{MessagePart, MessageRenderer, MessageStructureError, PlaceholderConstraint, validate_structure};
pub use provider::{
    ContentProvider, DependencyToken, DependencyTokenGen, DeferredValueProvider,
    ImmediateValueProvider, LimitReason, ProviderState, RenderResult, ValueProvider,
};
pub use value::Value;
