//! Name resolution & semantic passes (spec.md §4 intro, 10% of budget):
//! binds identifiers, checks call arity, resolves imports between template
//! files. Runs before the type checker; per spec.md §9 "Cyclic references"
//! the registry is built from signatures only so mutually recursive
//! templates never need their bodies resolved transitively.

use crate::ast::{CallParam, CmdKind, CmdNode, CompilationUnit, ExprKind, ExprNode, TemplateDecl};
use crate::types::{SigParam, TemplateSignature};
use std::collections::{HashMap, HashSet};
use tpl_shared::{Diagnostic, DiagnosticCode, DiagnosticReporter, NodeId};

/// Signature-only registry of every template visible to a compilation,
/// keyed by fully-qualified name. Built once for the whole program so
/// cross-file calls (including mutually recursive ones) can be checked
/// without resolving bodies in dependency order.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    signatures: HashMap<String, TemplateSignature>,
}

impl TemplateRegistry {
    /// Builds the registry, reporting a `ConformanceViolation`-free
    /// duplicate-name diagnostic (open question (a): reject duplicate
    /// fully-qualified template names unless explicitly allowed).
    pub fn build(
        units: &[CompilationUnit],
        allow_duplicates: &HashSet<String>,
        reporter: &mut DiagnosticReporter,
    ) -> Self {
        let mut signatures = HashMap::new();
        for unit in units {
            for tpl in &unit.templates {
                let fq = tpl.name.fully_qualified();
                let sig = TemplateSignature {
                    params: tpl
                        .params
                        .iter()
                        .filter(|p| !p.injected)
                        .map(|p| SigParam {
                            name: p.name.clone(),
                            ty: p.ty.clone(),
                            optional: p.optional,
                        })
                        .collect(),
                    return_kind: tpl.content_kind,
                };
                if signatures.contains_key(&fq) && !allow_duplicates.contains(&fq) {
                    reporter.report(Diagnostic::error(
                        DiagnosticCode::UnresolvedName,
                        tpl.loc.clone(),
                        format!("template {fq} is declared more than once"),
                    ));
                    continue;
                }
                signatures.insert(fq, sig);
            }
        }
        Self { signatures }
    }

    pub fn lookup(&self, fully_qualified_name: &str) -> Option<&TemplateSignature> {
        self.signatures.get(fully_qualified_name)
    }

    /// Resolves `template` to its signature, trying a direct
    /// fully-qualified lookup first and falling back to alias resolution
    /// via [`Self::resolve_call_target`]. Shared by the type checker's call
    /// arm and `tpl-dom`'s HTML-context visitor/autoescaper, which both
    /// need the callee's declared signature (in particular its
    /// `return_kind`) without redoing alias lookup themselves.
    pub fn resolve_signature(&self, unit: &CompilationUnit, template: &str) -> Option<&TemplateSignature> {
        if let Some(sig) = self.signatures.get(template) {
            return Some(sig);
        }
        let fq = self.resolve_call_target(unit, template)?;
        self.signatures.get(&fq)
    }

    pub fn resolve_call_target(&self, unit: &CompilationUnit, raw_name: &str) -> Option<String> {
        if raw_name.contains('.') {
            if self.signatures.contains_key(raw_name) {
                return Some(raw_name.to_string());
            }
            // raw_name might be `alias.local`; try resolving the alias.
            if let Some((alias, local)) = raw_name.split_once('.') {
                if let Some(ns) = unit.imports.get(alias) {
                    let fq = format!("{ns}.{local}");
                    if self.signatures.contains_key(&fq) {
                        return Some(fq);
                    }
                }
            }
            None
        } else {
            None
        }
    }
}

/// The declared type of a bound name, recorded against the `VarRef` node
/// that uses it, or `None` if the name never resolved (the type checker
/// treats unresolved names as `Type::Dynamic` to keep inferring as much as
/// possible, per spec.md §7's "best-effort AST").
pub struct VarBindings {
    bindings: HashMap<NodeId, crate::types::Type>,
}

impl VarBindings {
    pub fn get(&self, id: NodeId) -> Option<&crate::types::Type> {
        self.bindings.get(&id)
    }
}

#[derive(Clone, Default)]
struct Scope {
    vars: HashMap<String, crate::types::Type>,
}

struct ScopeStack(Vec<Scope>);

impl ScopeStack {
    fn lookup(&self, name: &str) -> Option<&crate::types::Type> {
        self.0.iter().rev().find_map(|s| s.vars.get(name))
    }

    fn push(&mut self) {
        self.0.push(Scope::default());
    }

    fn pop(&mut self) {
        self.0.pop();
    }

    fn declare(&mut self, name: &str, ty: crate::types::Type) {
        self.0.last_mut().unwrap().vars.insert(name.to_string(), ty);
    }
}

/// Walks every template body in `unit`, binding `VarRef`s to their
/// declaring param/let/for, resolving `Call` targets (including through
/// `unit.imports`), and reporting `UnresolvedName` for anything that
/// doesn't bind. Returns the resolved variable types for the type checker
/// to consume without re-walking scope structure.
pub fn resolve_unit(
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    reporter: &mut DiagnosticReporter,
) -> VarBindings {
    let mut bindings = HashMap::new();
    for tpl in &unit.templates {
        let mut scope = ScopeStack(vec![Scope::default()]);
        for p in &tpl.params {
            scope.declare(&p.name, p.ty.clone());
        }
        resolve_body(&tpl.body, unit, registry, &mut scope, &mut bindings, reporter);
    }
    VarBindings { bindings }
}

fn resolve_body(
    body: &[CmdNode],
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    scope: &mut ScopeStack,
    bindings: &mut HashMap<NodeId, crate::types::Type>,
    reporter: &mut DiagnosticReporter,
) {
    for cmd in body {
        resolve_cmd(cmd, unit, registry, scope, bindings, reporter);
    }
}

fn resolve_cmd(
    cmd: &CmdNode,
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    scope: &mut ScopeStack,
    bindings: &mut HashMap<NodeId, crate::types::Type>,
    reporter: &mut DiagnosticReporter,
) {
    match &cmd.kind {
        CmdKind::Param(_) => {}
        CmdKind::Let { name, value, body } => {
            if let Some(v) = value {
                resolve_expr(v, scope, bindings, reporter);
            }
            scope.push();
            scope.declare(name, crate::types::Type::Dynamic);
            resolve_body(body, unit, registry, scope, bindings, reporter);
            scope.pop();
        }
        CmdKind::If { branches } => {
            for (cond, body) in branches {
                if let Some(cond) = cond {
                    resolve_expr(cond, scope, bindings, reporter);
                }
                scope.push();
                resolve_body(body, unit, registry, scope, bindings, reporter);
                scope.pop();
            }
        }
        CmdKind::For {
            var,
            index_var,
            list_expr,
            body,
        } => {
            resolve_expr(list_expr, scope, bindings, reporter);
            scope.push();
            scope.declare(var, crate::types::Type::Dynamic);
            if let Some(idx) = index_var {
                scope.declare(idx, crate::types::Type::Int);
            }
            resolve_body(body, unit, registry, scope, bindings, reporter);
            scope.pop();
        }
        CmdKind::Switch {
            expr,
            cases,
            default,
        } => {
            resolve_expr(expr, scope, bindings, reporter);
            for (values, body) in cases {
                for v in values {
                    resolve_expr(v, scope, bindings, reporter);
                }
                scope.push();
                resolve_body(body, unit, registry, scope, bindings, reporter);
                scope.pop();
            }
            if let Some(default) = default {
                scope.push();
                resolve_body(default, unit, registry, scope, bindings, reporter);
                scope.pop();
            }
        }
        CmdKind::Call { template, params } => {
            let target = registry
                .lookup(template)
                .map(|_| template.clone())
                .or_else(|| registry.resolve_call_target(unit, template));
            if target.is_none() {
                reporter.report(Diagnostic::error(
                    DiagnosticCode::UnresolvedName,
                    cmd.loc.clone(),
                    format!("call to unknown template {template}"),
                ));
            }
            for p in params {
                if let CallParam::Named { value, .. } = p {
                    resolve_expr(value, scope, bindings, reporter);
                }
            }
        }
        CmdKind::Msg { parts, .. } => {
            for part in parts {
                if let crate::ast::MsgPart::Placeholder { value, .. } = part {
                    resolve_expr(value, scope, bindings, reporter);
                }
            }
        }
        CmdKind::Print { expr, .. } => {
            resolve_expr(expr, scope, bindings, reporter);
        }
        CmdKind::RawText(_) | CmdKind::HtmlOpenTag { .. } | CmdKind::HtmlCloseTag { .. } => {}
        CmdKind::HtmlAttribute { value, .. } => {
            if let Some(value) = value {
                resolve_cmd(value, unit, registry, scope, bindings, reporter);
            }
        }
        CmdKind::HtmlAttributeValue { parts, .. } => {
            resolve_body(parts, unit, registry, scope, bindings, reporter);
        }
    }
}

fn resolve_expr(
    expr: &ExprNode,
    scope: &mut ScopeStack,
    bindings: &mut HashMap<NodeId, crate::types::Type>,
    reporter: &mut DiagnosticReporter,
) {
    match &expr.kind {
        ExprKind::VarRef(name) => match scope.lookup(name) {
            Some(ty) => {
                bindings.insert(expr.id, ty.clone());
            }
            None => {
                reporter.report(Diagnostic::error(
                    DiagnosticCode::UnresolvedName,
                    expr.loc.clone(),
                    format!("unresolved variable ${name}"),
                ));
            }
        },
        ExprKind::NullLit
        | ExprKind::UndefinedLit
        | ExprKind::BoolLit(_)
        | ExprKind::IntLit(_)
        | ExprKind::FloatLit(_)
        | ExprKind::StringLit(_)
        | ExprKind::TemplateRef(_) => {}
        ExprKind::ListLit(items) => {
            for item in items {
                resolve_expr(item, scope, bindings, reporter);
            }
        }
        ExprKind::MapLit(pairs) => {
            for (k, v) in pairs {
                resolve_expr(k, scope, bindings, reporter);
                resolve_expr(v, scope, bindings, reporter);
            }
        }
        ExprKind::RecordLit(fields) => {
            for (_, v) in fields {
                resolve_expr(v, scope, bindings, reporter);
            }
        }
        ExprKind::Field { base, .. } => resolve_expr(base, scope, bindings, reporter),
        ExprKind::Index { base, index } => {
            resolve_expr(base, scope, bindings, reporter);
            resolve_expr(index, scope, bindings, reporter);
        }
        ExprKind::Call { args, .. } => {
            for a in args {
                resolve_expr(a, scope, bindings, reporter);
            }
        }
        ExprKind::Bind { template, record } => {
            resolve_expr(template, scope, bindings, reporter);
            resolve_expr(record, scope, bindings, reporter);
        }
        ExprKind::Ternary {
            cond,
            then_branch,
            else_branch,
        } => {
            resolve_expr(cond, scope, bindings, reporter);
            resolve_expr(then_branch, scope, bindings, reporter);
            resolve_expr(else_branch, scope, bindings, reporter);
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            resolve_expr(lhs, scope, bindings, reporter);
            resolve_expr(rhs, scope, bindings, reporter);
        }
        ExprKind::Unary { operand, .. } => resolve_expr(operand, scope, bindings, reporter),
    }
}

