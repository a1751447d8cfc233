//! A reference content provider (spec.md §4.5 "Content provider", §9
//! "Suspension implementation"): a scripted state machine whose generated
//! code would, in a real back end, be emitted by the code generator
//! (spec.md §6). This crate has no code generator (external collaborator,
//! spec.md §1), so `ScriptedContentProvider` stands in for "the compiled
//! form of a template" in tests — exactly the shape any back end's emitted
//! function must have: a dispatch on an explicit state number at entry,
//! never a language-level coroutine (spec.md §9 "Suspension
//! implementation").

use crate::appendable::{Appendable, WriteOutcome};
use crate::cancel::CancelToken;
use crate::error::RuntimeError;
use crate::frame::Frame;
use crate::provider::{LimitReason, ProviderState, RenderResult, ValueProvider};
use crate::value::Value;
use tpl_shared::UniqueNameGenerator;

/// One step of a scripted template body. `Write` is plain output; `Await`
/// suspends until `provider` is ready, then writes the text `render`
/// produces from the resolved value (spec.md §8 scenario 5: "writes
/// `future1: hello\n`" once P1 resolves).
enum Step<'a> {
    Write(String),
    Await {
        provider: Box<dyn ValueProvider + 'a>,
        render: Box<dyn Fn(Value) -> String + 'a>,
    },
}

/// A content provider driven by a fixed script of steps, with an explicit
/// state number as its only resumption state (spec.md §4.5 "Every
/// suspension point is identified by an integer state number unique
/// within the template"). `labels` claims a human-readable name per state
/// through the shared unique-name generator (spec.md §4.6, "used by
/// multiple components") purely for diagnostics — two suspension points
/// never collide on a label even if a caller names them the same thing.
pub struct ScriptedContentProvider<'a> {
    steps: Vec<Step<'a>>,
    cursor: usize,
    buffer: String,
    labels: UniqueNameGenerator,
    cancel: Option<CancelToken>,
    not_yet_finished: crate::provider::DependencyToken,
}

impl<'a> ScriptedContentProvider<'a> {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            cursor: 0,
            buffer: String::new(),
            labels: UniqueNameGenerator::new(vec![' '], "_"),
            cancel: None,
            not_yet_finished: crate::provider::DependencyTokenGen::new().next(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn write(mut self, text: impl Into<String>) -> Self {
        let state = self.steps.len() as u32;
        self.labels.claim_lenient(format!("state{state}")).ok();
        self.steps.push(Step::Write(text.into()));
        self
    }

    pub fn await_value(
        mut self,
        provider: impl ValueProvider + 'a,
        render: impl Fn(Value) -> String + 'a,
    ) -> Self {
        let state = self.steps.len() as u32;
        self.labels.claim_lenient(format!("state{state}")).ok();
        self.steps.push(Step::Await {
            provider: Box::new(provider),
            render: Box::new(render),
        });
        self
    }

    /// Resumption state as a [`Frame`], for callers that want to persist
    /// the continuation externally between calls instead of holding onto
    /// this struct (spec.md §4.5 Model: "render(frame, ...) -> frame |
    /// null").
    pub fn frame(&self) -> Option<Frame> {
        if self.cursor >= self.steps.len() {
            None
        } else {
            Some(Frame::new(self.cursor as u32))
        }
    }

    /// The output accumulated so far, usable for `resolve()`-style access
    /// before the render has finished (spec.md §4.5: "internally buffers
    /// already-produced output so it can ... finalize the value for later
    /// `resolve()` calls").
    pub fn buffered_so_far(&self) -> &str {
        &self.buffer
    }

    /// Replays the already-produced buffer into a fresh appendable
    /// (spec.md §4.5: "replay output into a new appendable if explicitly
    /// requested, subject to the same-appendable rule"). Callers are
    /// responsible for not mixing this with further `render_and_resolve`
    /// calls against a different appendable than the one that produced the
    /// buffer being replayed.
    pub fn replay_into(&self, appendable: &mut dyn Appendable) {
        appendable.write(&self.buffer);
    }

    fn check_cancelled(&self) -> Option<RenderResult> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            Some(RenderResult::Limited(LimitReason::Cancelled))
        } else {
            None
        }
    }
}

impl Default for ScriptedContentProvider<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> crate::provider::ContentProvider for ScriptedContentProvider<'a> {
    fn render_and_resolve(
        &mut self,
        appendable: &mut dyn Appendable,
    ) -> Result<RenderResult, RuntimeError> {
        while self.cursor < self.steps.len() {
            if let Some(limited) = self.check_cancelled() {
                return Ok(limited);
            }
            let text = match &self.steps[self.cursor] {
                Step::Write(s) => s.clone(),
                Step::Await { provider, render } => match provider.state() {
                    ProviderState::Ready(v) => {
                        log::trace!("suspension point at state {} resumed", self.cursor);
                        render(v)
                    }
                    ProviderState::Pending(token) => {
                        log::debug!("suspending at state {} on {token:?}", self.cursor);
                        return Ok(RenderResult::ContinueAfter(token));
                    }
                    ProviderState::Failed(e) => {
                        return Err(RuntimeError::PluginFailure {
                            name: "awaited value provider".to_string(),
                            source: Box::new(std::io::Error::other(e.to_string())),
                        });
                    }
                },
            };
            self.buffer.push_str(&text);
            let outcome = appendable.write(&text);
            self.cursor += 1;
            if outcome == WriteOutcome::SoftLimitReached {
                return Ok(RenderResult::Limited(LimitReason::SoftLimitReached));
            }
        }
        Ok(RenderResult::Done)
    }
}

impl<'a> ValueProvider for ScriptedContentProvider<'a> {
    fn state(&self) -> ProviderState {
        if self.cursor >= self.steps.len() {
            ProviderState::Ready(Value::String(self.buffer.clone()))
        } else {
            // Not yet finished; a caller treating the content provider as
            // a plain value provider has to drive `render_and_resolve` to
            // completion first (spec.md §4.5: the content provider
            // "finalize[s] the value for later resolve() calls").
            ProviderState::Pending(self.not_yet_finished)
        }
    }
}

