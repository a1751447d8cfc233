//! Detachable providers (spec.md §3 "Provider", §4.5 "Detachable
//! providers"): lifecycle handles over an eventual value or content stream
//! that a render may have to suspend on.

use crate::error::RuntimeError;
use crate::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque dependency token (spec.md §3 "Stack frame": "an opaque
/// dependency token"). The caller never inspects its contents; it only
/// compares tokens for identity when deciding whether a newly-ready
/// provider is the one a suspended frame was waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyToken(u64);

#[derive(Debug, Default)]
pub struct DependencyTokenGen {
    next: AtomicU64,
}

impl DependencyTokenGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> DependencyToken {
        DependencyToken(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Why a render returned without completing (spec.md §4.5 "limited(reason)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitReason {
    /// The appendable reported back-pressure (spec.md §5 "Suspension
    /// points": "after writing enough bytes that the appendable reports
    /// back-pressure").
    SoftLimitReached,
    /// The cooperative cancel token was observed set at a suspension
    /// point (spec.md §4.5 "Cancellation is cooperative").
    Cancelled,
}

/// The result of invoking `render` (spec.md §4.5 "Model"): either the
/// template ran to completion, it was limited by back-pressure or
/// cancellation, or it must await a dependency before being resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderResult {
    Done,
    Limited(LimitReason),
    ContinueAfter(DependencyToken),
}

/// The state of a detachable provider (spec.md §3 "Provider": "states =
/// {pending(d), ready(v), failed(e)}"). Progression is monotonic once a
/// provider leaves `Pending` (spec.md §8 invariant): a provider that
/// reports `Ready`/`Failed` must keep reporting the same state forever.
#[derive(Debug, Clone)]
pub enum ProviderState {
    Pending(DependencyToken),
    Ready(Value),
    Failed(std::sync::Arc<RuntimeError>),
}

/// Encapsulates a computation that may require awaiting a dependency to
/// resolve a scalar value (spec.md §4.5 "Value provider").
pub trait ValueProvider {
    fn state(&self) -> ProviderState;

    /// The provider's resolved value. Callers must only invoke this once
    /// `state()` is `Ready`; per spec.md this is a programming-error
    /// precondition, not a checked one, but this implementation still
    /// panics rather than fabricating a value so misuse fails loudly in
    /// tests instead of silently rendering garbage.
    fn resolve(&self) -> Value {
        match self.state() {
            ProviderState::Ready(v) => v,
            other => panic!("resolve() called before provider was ready: {other:?}"),
        }
    }
}

/// A provider whose value is available immediately; used for literal
/// arguments and already-resolved injected parameters.
pub struct ImmediateValueProvider(Value);

impl ImmediateValueProvider {
    pub fn new(value: Value) -> Self {
        Self(value)
    }
}

impl ValueProvider for ImmediateValueProvider {
    fn state(&self) -> ProviderState {
        ProviderState::Ready(self.0.clone())
    }
}

/// A provider whose readiness is driven externally — the reference
/// implementation used by tests to model "a value provider that may
/// require awaiting a dependency" (spec.md §8 scenario 5: "a content
/// provider that ... awaits provider P1 ... resolves to 'hello'"). Real
/// providers backed by I/O or RPC are external collaborators; this is the
/// shape any of them must conform to.
pub struct DeferredValueProvider {
    token: DependencyToken,
    resolved: std::cell::RefCell<Option<Result<Value, std::sync::Arc<RuntimeError>>>>,
}

impl DeferredValueProvider {
    pub fn new(token: DependencyToken) -> Self {
        Self {
            token,
            resolved: std::cell::RefCell::new(None),
        }
    }

    pub fn token(&self) -> DependencyToken {
        self.token
    }

    /// Moves the provider from `pending` to `ready`. Spec.md §8's
    /// monotonicity invariant means this may only be called once; a
    /// second call would silently violate that invariant, so it panics.
    pub fn resolve_with(&self, value: Value) {
        let mut slot = self.resolved.borrow_mut();
        assert!(slot.is_none(), "provider resolved more than once");
        *slot = Some(Ok(value));
    }

    pub fn fail_with(&self, err: RuntimeError) {
        let mut slot = self.resolved.borrow_mut();
        assert!(slot.is_none(), "provider resolved more than once");
        *slot = Some(Err(std::sync::Arc::new(err)));
    }
}

impl ValueProvider for DeferredValueProvider {
    fn state(&self) -> ProviderState {
        match &*self.resolved.borrow() {
            None => ProviderState::Pending(self.token),
            Some(Ok(v)) => ProviderState::Ready(v.clone()),
            Some(Err(e)) => ProviderState::Failed(e.clone()),
        }
    }
}

/// Encapsulates a computation that streams typed content (spec.md §4.5
/// "Content provider"). `render_and_resolve` is re-invoked with the *same*
/// appendable on every resumption for one logical render; the runtime does
/// not check this (spec.md: "violation is a programming error, not
/// checked").
pub trait ContentProvider {
    fn render_and_resolve(
        &mut self,
        appendable: &mut dyn crate::appendable::Appendable,
    ) -> Result<RenderResult, RuntimeError>;
}

