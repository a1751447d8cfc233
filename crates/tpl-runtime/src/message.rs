//! Message rendering (spec.md §4.5 "Message rendering"): localized
//! messages are sequences of raw parts and placeholders; the runtime
//! verifies start/end placeholder ordering before rendering one.
//!
//! Messages operate on already-compiled parts, not `tpl_core::ast::MsgPart`
//! (an AST node whose placeholder value is still an *expression*) — by the
//! time a message reaches the runtime, code generation has already reduced
//! each placeholder's value to a provider.

use crate::appendable::Appendable;
use crate::provider::{RenderResult, ValueProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    Raw(String),
    Placeholder(String),
}

/// A registered ordering constraint between a start and end placeholder
/// (spec.md §4.5: "for each pair (end-placeholder, start-placeholder)
/// registered by the compiler, every occurrence of the end must be
/// preceded by an occurrence of a corresponding start, and every start
/// must be matched by an end").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderConstraint {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("message structure error: {end} ({reason} relative to {start})")]
pub struct MessageStructureError {
    pub start: String,
    pub end: String,
    reason: &'static str,
}

/// Checks every registered (end, start) constraint against `parts`,
/// treating each pair as an independent balanced-nesting stack (spec.md §8
/// boundary scenario 4).
pub fn validate_structure(
    parts: &[MessagePart],
    constraints: &[PlaceholderConstraint],
) -> Result<(), MessageStructureError> {
    for constraint in constraints {
        let mut open = 0u32;
        for part in parts {
            let MessagePart::Placeholder(name) = part else {
                continue;
            };
            if *name == constraint.start {
                open += 1;
            } else if *name == constraint.end {
                if open == 0 {
                    return Err(MessageStructureError {
                        start: constraint.start.clone(),
                        end: constraint.end.clone(),
                        reason: "end placeholder with no preceding start",
                    });
                }
                open -= 1;
            }
        }
        if open > 0 {
            return Err(MessageStructureError {
                start: constraint.start.clone(),
                end: constraint.end.clone(),
                reason: "start placeholder with no matching end",
            });
        }
    }
    Ok(())
}

/// Drives a validated message's parts into an appendable, awaiting each
/// placeholder's value provider in sequence (spec.md §4.5: "Placeholder
/// values are themselves value providers; the renderer awaits each in
/// sequence"). Resumable: holds its cursor so a pending placeholder can
/// suspend the whole render and pick back up at the same part.
pub struct MessageRenderer<'a> {
    parts: &'a [MessagePart],
    providers: indexmap::IndexMap<String, Box<dyn ValueProvider + 'a>>,
    cursor: usize,
}

impl<'a> MessageRenderer<'a> {
    pub fn new(
        parts: &'a [MessagePart],
        providers: indexmap::IndexMap<String, Box<dyn ValueProvider + 'a>>,
    ) -> Self {
        Self {
            parts,
            providers,
            cursor: 0,
        }
    }

    pub fn render_and_resolve(
        &mut self,
        appendable: &mut dyn Appendable,
    ) -> Result<RenderResult, crate::error::RuntimeError> {
        use crate::appendable::WriteOutcome;
        use crate::provider::ProviderState;

        while self.cursor < self.parts.len() {
            let part = &self.parts[self.cursor];
            let text = match part {
                MessagePart::Raw(s) => s.clone(),
                MessagePart::Placeholder(name) => {
                    let provider = self
                        .providers
                        .get(name)
                        .unwrap_or_else(|| panic!("no provider registered for placeholder {name}"));
                    match provider.state() {
                        ProviderState::Ready(v) => v.get_string().unwrap_or_default().to_string(),
                        ProviderState::Pending(token) => {
                            return Ok(RenderResult::ContinueAfter(token));
                        }
                        ProviderState::Failed(e) => {
                            return Err(crate::error::RuntimeError::PluginFailure {
                                name: name.clone(),
                                source: Box::new(std::io::Error::other(e.to_string())),
                            });
                        }
                    }
                }
            };
            if appendable.write(&text) == WriteOutcome::SoftLimitReached {
                self.cursor += 1;
                return Ok(RenderResult::Limited(crate::provider::LimitReason::SoftLimitReached));
            }
            self.cursor += 1;
        }
        Ok(RenderResult::Done)
    }
}

