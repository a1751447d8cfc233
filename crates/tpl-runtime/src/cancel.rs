//! Cooperative cancellation (spec.md §4.5 "Cancellation is cooperative",
//! §5 "Cancellation"): checked only at explicit suspension points, never
//! preempted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shareable cancel signal. Cloning shares the same underlying flag, so
/// one `CancelToken` can be handed to a render and also held by whatever
/// external code decides to cancel it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

