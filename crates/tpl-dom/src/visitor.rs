//! The HTML-context visitor (spec.md §4.2): threads a current HTML context
//! across a template body in source order, annotating every node by
//! identity rather than mutating the tree.

use crate::context::{Context, ScriptSubkind};
use std::collections::HashMap;
use tpl_core::{CmdKind, CmdNode, CompilationUnit, ContentKind, TemplateRegistry};
use tpl_shared::{Diagnostic, DiagnosticCode, DiagnosticReporter, NodeId};

/// Entering and exit context for every node the visitor reaches, plus the
/// context a print site prints *into* (spec.md §4.2 "print nodes
/// additionally record the context they print into").
#[derive(Debug, Default)]
pub struct ContextAnnotations {
    entering: HashMap<NodeId, Context>,
    print_into: HashMap<NodeId, Context>,
}

impl ContextAnnotations {
    pub fn entering(&self, id: NodeId) -> Option<&Context> {
        self.entering.get(&id)
    }

    pub fn print_context(&self, id: NodeId) -> Option<&Context> {
        self.print_into.get(&id)
    }
}

/// A minimal mapping from a template's declared content kind to the
/// context its body starts in. `text`/non-HTML kinds start in `PCDATA` too
/// since the visitor only has HTML-domain contexts to offer; templates of
/// kind other than html/html_element are not subject to `stricthtml`
/// balancing (spec.md §4.2 "UnclosedConstruct... within stricthtml
/// templates").
fn entry_context_for(kind: ContentKind) -> Context {
    match kind {
        ContentKind::Css => Context::Style,
        ContentKind::Js => Context::Script(ScriptSubkind::Body),
        _ => Context::Pcdata,
    }
}

pub fn visit_unit(
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    reporter: &mut DiagnosticReporter,
) -> ContextAnnotations {
    log::debug!(
        "html-context visitor: {} template(s)",
        unit.templates.len()
    );
    let mut annotations = ContextAnnotations::default();
    for tpl in &unit.templates {
        let mut open_tags: Vec<String> = Vec::new();
        let entry = entry_context_for(tpl.content_kind);
        let exit = visit_body(
            &tpl.body,
            entry,
            unit,
            registry,
            &mut annotations,
            &mut open_tags,
            reporter,
        );
        if tpl.strict_html && !open_tags.is_empty() {
            log::trace!("template {} ends with unclosed tags", tpl.name);
            reporter.report(Diagnostic::error(
                DiagnosticCode::UnclosedConstruct,
                tpl.loc.clone(),
                format!(
                    "template {} ends with unclosed tag(s): {}",
                    tpl.name,
                    open_tags.join(", ")
                ),
            ));
        }
        let _ = exit;
    }
    annotations
}

fn visit_body(
    body: &[CmdNode],
    entry: Context,
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    annotations: &mut ContextAnnotations,
    open_tags: &mut Vec<String>,
    reporter: &mut DiagnosticReporter,
) -> Context {
    let mut current = entry;
    for cmd in body {
        current = visit_cmd(cmd, current, unit, registry, annotations, open_tags, reporter);
    }
    current
}

fn visit_cmd(
    cmd: &CmdNode,
    entry: Context,
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    annotations: &mut ContextAnnotations,
    open_tags: &mut Vec<String>,
    reporter: &mut DiagnosticReporter,
) -> Context {
    annotations.entering.insert(cmd.id, entry.clone());
    match &cmd.kind {
        CmdKind::Param(_) => entry,
        CmdKind::RawText(_) => entry,
        CmdKind::Print { .. } => {
            annotations.print_into.insert(cmd.id, entry.clone());
            entry
        }
        CmdKind::Msg { .. } => entry,
        CmdKind::HtmlOpenTag { name, self_closing } => {
            if !*self_closing {
                open_tags.push(name.clone());
            }
            if name.eq_ignore_ascii_case("script") {
                Context::Script(ScriptSubkind::Body)
            } else if name.eq_ignore_ascii_case("style") {
                Context::Style
            } else if matches!(name.to_ascii_lowercase().as_str(), "title" | "textarea") {
                Context::Rcdata(name.to_ascii_lowercase())
            } else {
                Context::Pcdata
            }
        }
        CmdKind::HtmlCloseTag { name } => {
            match open_tags.iter().rposition(|t| t.eq_ignore_ascii_case(name)) {
                Some(pos) => {
                    open_tags.truncate(pos);
                }
                None => {
                    reporter.report(Diagnostic::error(
                        DiagnosticCode::UnclosedConstruct,
                        cmd.loc.clone(),
                        format!("closing tag </{name}> has no matching open tag"),
                    ));
                }
            }
            Context::Pcdata
        }
        CmdKind::HtmlAttribute { family, value, .. } => {
            let attr_value_ctx = Context::AttrValue(*family, crate::context::Quote::Double);
            if let Some(value) = value {
                visit_cmd(value, attr_value_ctx, unit, registry, annotations, open_tags, reporter);
            }
            entry
        }
        CmdKind::HtmlAttributeValue { quote, parts } => {
            let inner = match &entry {
                Context::AttrValue(family, _) => Context::AttrValue(*family, quote_of(*quote)),
                other => other.clone(),
            };
            visit_body(parts, inner, unit, registry, annotations, open_tags, reporter);
            entry
        }
        CmdKind::Let { body, .. } => {
            visit_body(body, entry.clone(), unit, registry, annotations, open_tags, reporter);
            entry
        }
        CmdKind::If { branches } => {
            let mut exit_ctx: Option<Context> = None;
            for (_, body) in branches {
                let mut branch_open = open_tags.clone();
                let branch_exit = visit_body(
                    body,
                    entry.clone(),
                    unit,
                    registry,
                    annotations,
                    &mut branch_open,
                    reporter,
                );
                match &exit_ctx {
                    None => exit_ctx = Some(branch_exit),
                    Some(prev) if *prev != branch_exit => {
                        reporter.report(Diagnostic::error(
                            DiagnosticCode::ContextDivergence,
                            cmd.loc.clone(),
                            format!(
                                "if branches exit in different contexts: {prev} vs {branch_exit}"
                            ),
                        ));
                    }
                    _ => {}
                }
                if branch_open.len() == open_tags.len() {
                    *open_tags = branch_open;
                }
            }
            let has_else = branches.iter().any(|(cond, _)| cond.is_none());
            if !has_else {
                // An implicit empty else branch exits in the entry context;
                // if a populated branch diverges from that, it's still a
                // divergence under the same rule.
                if let Some(exit) = &exit_ctx {
                    if *exit != entry {
                        reporter.report(Diagnostic::error(
                            DiagnosticCode::ContextDivergence,
                            cmd.loc.clone(),
                            "if has no else branch and a populated branch changes context".to_string(),
                        ));
                    }
                }
            }
            exit_ctx.unwrap_or(entry)
        }
        CmdKind::For { body, .. } => {
            let mut probe_open = open_tags.clone();
            let body_entry = entry.clone();
            let body_exit = visit_body(
                body,
                body_entry.clone(),
                unit,
                registry,
                annotations,
                &mut probe_open,
                reporter,
            );
            if body_exit != body_entry {
                reporter.report(Diagnostic::error(
                    DiagnosticCode::ContextDivergence,
                    cmd.loc.clone(),
                    format!(
                        "for loop body does not return to its entry context ({body_entry} -> {body_exit})"
                    ),
                ));
            }
            entry
        }
        CmdKind::Switch {
            cases,
            default,
            ..
        } => {
            let mut exit_ctx: Option<Context> = None;
            for (_, body) in cases {
                let mut branch_open = open_tags.clone();
                let branch_exit = visit_body(
                    body,
                    entry.clone(),
                    unit,
                    registry,
                    annotations,
                    &mut branch_open,
                    reporter,
                );
                match &exit_ctx {
                    None => exit_ctx = Some(branch_exit),
                    Some(prev) if *prev != branch_exit => {
                        reporter.report(Diagnostic::error(
                            DiagnosticCode::ContextDivergence,
                            cmd.loc.clone(),
                            format!(
                                "switch branches exit in different contexts: {prev} vs {branch_exit}"
                            ),
                        ));
                    }
                    _ => {}
                }
            }
            match default {
                Some(default_body) => {
                    let mut branch_open = open_tags.clone();
                    let default_exit = visit_body(
                        default_body,
                        entry.clone(),
                        unit,
                        registry,
                        annotations,
                        &mut branch_open,
                        reporter,
                    );
                    if let Some(prev) = &exit_ctx {
                        if *prev != default_exit {
                            reporter.report(Diagnostic::error(
                                DiagnosticCode::ContextDivergence,
                                cmd.loc.clone(),
                                format!(
                                    "switch default exits in a different context than its cases: {prev} vs {default_exit}"
                                ),
                            ));
                        }
                    }
                    exit_ctx = Some(default_exit);
                }
                None => {
                    // open question (c): no default requires either a
                    // single converged context across all cases, or we
                    // reject divergence (already reported above). A
                    // switch with no default and no cases is vacuously
                    // fine and exits in the entry context.
                    if exit_ctx.is_none() {
                        exit_ctx = Some(entry.clone());
                    }
                }
            }
            exit_ctx.unwrap_or(entry)
        }
        CmdKind::Call { template, .. } => {
            // spec.md §4.2: the context at the call site is the callee's
            // required entry context, and its exit context is the callee's
            // exit context, both derived from the callee's content kind.
            // A call to an unresolvable template has already been reported
            // by the type checker; treat it as context-opaque here.
            match registry.resolve_signature(unit, template) {
                Some(sig) => {
                    let required = entry_context_for(sig.return_kind);
                    if required != entry {
                        reporter.report(Diagnostic::error(
                            DiagnosticCode::UnexpectedContext,
                            cmd.loc.clone(),
                            format!(
                                "call to {template} (kind {}) requires context {required}, but the call site is in {entry}",
                                sig.return_kind
                            ),
                        ));
                    }
                    required
                }
                None => entry,
            }
        }
    }
}

fn quote_of(ast_quote: tpl_core::Quote) -> crate::context::Quote {
    match ast_quote {
        tpl_core::Quote::None => crate::context::Quote::None,
        tpl_core::Quote::Single => crate::context::Quote::Single,
        tpl_core::Quote::Double => crate::context::Quote::Double,
    }
}
