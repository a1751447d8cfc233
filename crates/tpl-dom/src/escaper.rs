//! The contextual autoescaper (spec.md §4.3): consumes the context
//! annotations and chooses a directive list per print site, as a data
//! table rather than an if/else chain, so the idempotence-elision pass and
//! the strict-mode check can both query it.

use crate::context::{AttrFamily, Context, Quote};
use crate::visitor::ContextAnnotations;
use std::collections::HashMap;
use tpl_core::{CmdKind, CmdNode, CompilationUnit, ContentKind, TemplateRegistry};
use tpl_shared::{Diagnostic, DiagnosticCode, DiagnosticReporter, NodeId};

/// The escaping/filtering pipeline chosen for one print site, in
/// application order.
pub type DirectiveList = Vec<&'static str>;

#[derive(Debug, Default)]
pub struct EscapeAnnotations {
    directives: HashMap<NodeId, DirectiveList>,
}

impl EscapeAnnotations {
    pub fn directives(&self, id: NodeId) -> Option<&DirectiveList> {
        self.directives.get(&id)
    }
}

/// The input kind of a print site's value, as best known statically. The
/// type checker's inferred `ContentKind` (if the expression's type is a
/// sanitized kind) or `None` for unsanitized/dynamic values.
pub type InputKind = Option<ContentKind>;

/// Looks up the directive chain for `(context, input_kind)` per the §4.3
/// table. Returns `None` when the context can't accept a dynamic value at
/// all and the caller must reject the print site (`UnexpectedContext`).
/// Exposed as data other components can query directly (e.g. tests probing
/// one context/kind pair without building a whole AST).
pub fn directives_for(ctx: &Context, input: InputKind) -> Option<DirectiveList> {
    match ctx {
        Context::Pcdata => match input {
            Some(ContentKind::Html) | Some(ContentKind::HtmlElement) => Some(vec![]),
            _ => Some(vec!["escapeHtml"]),
        },
        Context::AttrValue(AttrFamily::Normal, Quote::None) => {
            Some(vec!["escapeHtmlAttributeNospace"])
        }
        Context::AttrValue(AttrFamily::Normal, _) => match input {
            Some(ContentKind::Attributes) => Some(vec![]),
            _ => Some(vec!["escapeHtmlAttribute"]),
        },
        Context::AttrValue(AttrFamily::Uri, quote) => {
            let tail = nospace_variant(*quote);
            match input {
                Some(ContentKind::Uri) | Some(ContentKind::TrustedResourceUri) => Some(vec![tail]),
                _ => Some(vec!["normalizeUri", tail]),
            }
        }
        Context::AttrValue(AttrFamily::TrustedResourceUri, quote) => {
            let tail = nospace_variant(*quote);
            match input {
                Some(ContentKind::TrustedResourceUri) => Some(vec![tail]),
                _ => None,
            }
        }
        Context::AttrValue(AttrFamily::ScriptSrc, quote) => {
            let tail = nospace_variant(*quote);
            match input {
                Some(ContentKind::TrustedResourceUri) => Some(vec![tail]),
                _ => None,
            }
        }
        Context::AttrValue(AttrFamily::EventHandler, quote) => {
            let tail = nospace_variant(*quote);
            match input {
                Some(ContentKind::Js) => Some(vec![tail]),
                _ => Some(vec!["escapeJsValue", tail]),
            }
        }
        Context::AttrValue(AttrFamily::Style, quote) => {
            let tail = nospace_variant(*quote);
            match input {
                Some(ContentKind::Css) => Some(vec![tail]),
                _ => Some(vec!["filterCssValue", tail]),
            }
        }
        Context::AttrValue(AttrFamily::Js, quote) => {
            let tail = nospace_variant(*quote);
            match input {
                Some(ContentKind::Js) => Some(vec![tail]),
                _ => Some(vec!["escapeJsValue", tail]),
            }
        }
        Context::Script(_) => match input {
            Some(ContentKind::Js) => Some(vec![]),
            _ => Some(vec!["escapeJsValue"]),
        },
        Context::Style => match input {
            Some(ContentKind::Css) => Some(vec![]),
            _ => Some(vec!["filterCssValue"]),
        },
        Context::TagName
        | Context::BeforeAttrName
        | Context::AttrName
        | Context::BeforeAttrValue
        | Context::Comment => None,
        Context::Rcdata(_) => match input {
            Some(ContentKind::Html) | Some(ContentKind::HtmlElement) => Some(vec![]),
            _ => Some(vec!["escapeHtml"]),
        },
    }
}

/// True for the two attribute families (spec.md §4.3's strict-mode rule
/// applies to both the dedicated family and `script-src`, which shares its
/// safety contract) where a missing `trusted_resource_uri` kind is a strict-
/// mode rejection rather than a generic unexpected-context error.
fn requires_trusted_resource_uri(ctx: &Context) -> bool {
    matches!(
        ctx,
        Context::AttrValue(AttrFamily::TrustedResourceUri, _)
            | Context::AttrValue(AttrFamily::ScriptSrc, _)
    )
}

fn nospace_variant(quote: Quote) -> &'static str {
    match quote {
        Quote::None => "escapeHtmlAttributeNospace",
        Quote::Single | Quote::Double => "escapeHtmlAttribute",
    }
}

/// Runs the escaper over every print site the context visitor annotated.
/// `input_kind_of` supplies the statically-known content kind of a print
/// site's expression (from the type checker's annotations); pass a closure
/// returning `None` when no sanitized kind is known.
pub fn escape_unit(
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    contexts: &ContextAnnotations,
    input_kind_of: impl Fn(NodeId) -> InputKind,
    reporter: &mut DiagnosticReporter,
) -> EscapeAnnotations {
    log::debug!("contextual autoescaper: {} template(s)", unit.templates.len());
    let mut out = EscapeAnnotations::default();
    for tpl in &unit.templates {
        walk_body(&tpl.body, unit, registry, contexts, &input_kind_of, &mut out, reporter);
    }
    out
}

fn walk_body(
    body: &[CmdNode],
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    contexts: &ContextAnnotations,
    input_kind_of: &impl Fn(NodeId) -> InputKind,
    out: &mut EscapeAnnotations,
    reporter: &mut DiagnosticReporter,
) {
    for cmd in body {
        walk_cmd(cmd, unit, registry, contexts, input_kind_of, out, reporter);
    }
}

fn walk_cmd(
    cmd: &CmdNode,
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    contexts: &ContextAnnotations,
    input_kind_of: &impl Fn(NodeId) -> InputKind,
    out: &mut EscapeAnnotations,
    reporter: &mut DiagnosticReporter,
) {
    match &cmd.kind {
        CmdKind::Print { expr, .. } => {
            let Some(ctx) = contexts.print_context(cmd.id) else {
                return;
            };
            let input = input_kind_of(expr.id);
            match directives_for(ctx, input) {
                Some(directives) => {
                    out.directives.insert(cmd.id, directives);
                }
                None if requires_trusted_resource_uri(ctx) => {
                    reporter.report(Diagnostic::error(
                        DiagnosticCode::StrictEscapeRequired,
                        cmd.loc.clone(),
                        "trusted-resource-uri slot requires a value of kind \
                         trusted_resource_uri in strict mode"
                            .to_string(),
                    ));
                }
                None => {
                    reporter.report(Diagnostic::error(
                        DiagnosticCode::UnexpectedContext,
                        cmd.loc.clone(),
                        format!("cannot print a dynamic value into {ctx}"),
                    ));
                }
            }
        }
        CmdKind::Let { body, .. } => walk_body(body, unit, registry, contexts, input_kind_of, out, reporter),
        CmdKind::If { branches } => {
            for (_, body) in branches {
                walk_body(body, unit, registry, contexts, input_kind_of, out, reporter);
            }
        }
        CmdKind::For { body, .. } => walk_body(body, unit, registry, contexts, input_kind_of, out, reporter),
        CmdKind::Switch { cases, default, .. } => {
            for (_, body) in cases {
                walk_body(body, unit, registry, contexts, input_kind_of, out, reporter);
            }
            if let Some(default) = default {
                walk_body(default, unit, registry, contexts, input_kind_of, out, reporter);
            }
        }
        CmdKind::HtmlAttribute { value, .. } => {
            if let Some(value) = value {
                walk_cmd(value, unit, registry, contexts, input_kind_of, out, reporter);
            }
        }
        CmdKind::HtmlAttributeValue { parts, .. } => {
            walk_body(parts, unit, registry, contexts, input_kind_of, out, reporter)
        }
        CmdKind::Call { template, .. } => {
            // spec.md §4.3: when the call target's content kind is known,
            // no escaping is emitted over the call result; otherwise the
            // same table used for print sites supplies coercion directives,
            // keyed by the known callee kind as the input kind.
            let Some(ctx) = contexts.entering(cmd.id) else {
                return;
            };
            let callee_kind = registry
                .resolve_signature(unit, template)
                .map(|sig| sig.return_kind);
            if let Some(directives) = directives_for(ctx, callee_kind) {
                if !directives.is_empty() {
                    out.directives.insert(cmd.id, directives);
                }
            }
        }
        CmdKind::Param(_)
        | CmdKind::RawText(_)
        | CmdKind::HtmlOpenTag { .. }
        | CmdKind::HtmlCloseTag { .. }
        | CmdKind::Msg { .. } => {}
    }
}

/// The idempotence/elision pass (spec.md §4.3 "A late pass... detects
/// statically-safe slots and elides the corresponding directives"). Given
/// a directive chain and the print site's statically-known kind, returns
/// the chain with any now-provably-redundant leading/trailing directive
/// removed. Applied after escaping directives have been chosen (and,
/// conceptually, after code generation's own defensive insertions).
pub fn elide_redundant(directives: &[&'static str], ctx: &Context, input: InputKind) -> DirectiveList {
    match directives_for(ctx, input) {
        Some(minimal) if minimal.len() <= directives.len() => minimal,
        _ => directives.to_vec(),
    }
}
