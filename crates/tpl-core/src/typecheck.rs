//! The type checker (spec.md §4.1). Bottom-up inference over expressions,
//! top-down propagation of expected types at call sites, producing a type
//! annotation for every expression node and a diagnostic list.

use crate::ast::{CallParam, CmdKind, CmdNode, CompilationUnit, ExprKind, ExprNode, TemplateDecl};
use crate::resolve::{TemplateRegistry, VarBindings};
use crate::types::{is_assignable, is_signature_assignable, ContentKind, ProtoRegistry, SigParam, Type};
use std::collections::HashMap;
use tpl_shared::{Diagnostic, DiagnosticCode, DiagnosticReporter, NodeId, SourceLocation};

/// Every expression's inferred static type, keyed by node identity
/// (spec.md §3 invariant: "every non-literal expression node has a type
/// annotation after type checking" — literals get one too, trivially).
#[derive(Debug, Default)]
pub struct TypeAnnotations {
    types: HashMap<NodeId, Type>,
}

impl TypeAnnotations {
    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    fn set(&mut self, id: NodeId, ty: Type) {
        self.types.insert(id, ty);
    }
}

pub struct TypeChecker<'a> {
    registry: &'a TemplateRegistry,
    vars: &'a VarBindings,
    protos: &'a ProtoRegistry,
    reporter: &'a mut DiagnosticReporter,
    annotations: TypeAnnotations,
    /// The declared (non-injected) parameters of the template currently
    /// being checked, i.e. the record bundle a `data="all"` call site in
    /// its body would forward (spec.md §4.1 "data=\"all\"... forwards the
    /// caller's record parameter bundle").
    current_template_params: Vec<SigParam>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        registry: &'a TemplateRegistry,
        vars: &'a VarBindings,
        protos: &'a ProtoRegistry,
        reporter: &'a mut DiagnosticReporter,
    ) -> Self {
        Self {
            registry,
            vars,
            protos,
            reporter,
            annotations: TypeAnnotations::default(),
            current_template_params: Vec::new(),
        }
    }

    pub fn check_unit(mut self, unit: &CompilationUnit) -> TypeAnnotations {
        for tpl in &unit.templates {
            self.check_template(tpl);
        }
        self.annotations
    }

    fn check_template(&mut self, tpl: &TemplateDecl) {
        self.current_template_params = tpl
            .params
            .iter()
            .filter(|p| !p.injected)
            .map(|p| SigParam {
                name: p.name.clone(),
                ty: p.ty.clone(),
                optional: p.optional,
            })
            .collect();
        self.check_body(&tpl.body);
    }

    fn check_body(&mut self, body: &[CmdNode]) {
        for cmd in body {
            self.check_cmd(cmd);
        }
    }

    fn check_cmd(&mut self, cmd: &CmdNode) {
        match &cmd.kind {
            CmdKind::Param(_) => {}
            CmdKind::Let { value, body, .. } => {
                if let Some(v) = value {
                    self.infer(v);
                }
                self.check_body(body);
            }
            CmdKind::If { branches } => {
                for (cond, body) in branches {
                    if let Some(cond) = cond {
                        let ty = self.infer(cond);
                        if !matches!(ty, Type::Bool | Type::Dynamic) {
                            self.reporter.report(Diagnostic::error(
                                DiagnosticCode::TypeMismatch,
                                cond.loc.clone(),
                                format!("if condition must be bool, found {ty}"),
                            ));
                        }
                    }
                    self.check_body(body);
                }
            }
            CmdKind::For {
                list_expr, body, ..
            } => {
                let ty = self.infer(list_expr);
                if !matches!(ty, Type::List(_) | Type::Dynamic) {
                    self.reporter.report(Diagnostic::error(
                        DiagnosticCode::TypeMismatch,
                        list_expr.loc.clone(),
                        format!("for loop source must be a list, found {ty}"),
                    ));
                }
                self.check_body(body);
            }
            CmdKind::Switch {
                expr,
                cases,
                default,
            } => {
                self.infer(expr);
                for (values, body) in cases {
                    for v in values {
                        self.infer(v);
                    }
                    self.check_body(body);
                }
                if let Some(default) = default {
                    self.check_body(default);
                }
            }
            CmdKind::Call { template, params } => self.check_call(cmd, template, params),
            CmdKind::Msg { parts, .. } => {
                for part in parts {
                    if let crate::ast::MsgPart::Placeholder { value, .. } = part {
                        self.infer(value);
                    }
                }
            }
            CmdKind::Print { expr, .. } => {
                self.infer(expr);
            }
            CmdKind::RawText(_) | CmdKind::HtmlOpenTag { .. } | CmdKind::HtmlCloseTag { .. } => {}
            CmdKind::HtmlAttribute { value, .. } => {
                if let Some(value) = value {
                    self.check_cmd(value);
                }
            }
            CmdKind::HtmlAttributeValue { parts, .. } => self.check_body(parts),
        }
    }

    fn check_call(&mut self, cmd: &CmdNode, template: &str, params: &[CallParam]) {
        let Some(sig) = self.registry.lookup(template).cloned() else {
            // resolve already reported UnresolvedName for this; don't pile on.
            for p in params {
                if let CallParam::Named { value, .. } = p {
                    self.infer(value);
                }
            }
            return;
        };

        for p in params {
            match p {
                CallParam::Named { name, value } => {
                    let arg_ty = self.infer(value);
                    match sig.params.iter().find(|sp| &sp.name == name) {
                        Some(sp) => {
                            if !is_assignable(&arg_ty, &sp.ty) {
                                self.reporter.report(Diagnostic::error(
                                    DiagnosticCode::ArgumentMismatch,
                                    value.loc.clone(),
                                    format!(
                                        "argument {name} expects {}, found {arg_ty}",
                                        sp.ty
                                    ),
                                ));
                            }
                        }
                        None => {
                            self.reporter.report(Diagnostic::error(
                                DiagnosticCode::ArgumentMismatch,
                                value.loc.clone(),
                                format!("{template} has no parameter named {name}"),
                            ));
                        }
                    }
                }
                CallParam::DataAll => {
                    // data="all" forwards the enclosing template's own
                    // (non-injected) params as a record; valid only when
                    // every required callee param is present in that
                    // bundle under an assignable type (spec.md §4.1).
                    for sp in &sig.params {
                        match self
                            .current_template_params
                            .iter()
                            .find(|caller_p| caller_p.name == sp.name)
                        {
                            Some(caller_p) => {
                                if !is_assignable(&caller_p.ty, &sp.ty) {
                                    self.reporter.report(Diagnostic::error(
                                        DiagnosticCode::ArgumentMismatch,
                                        cmd.loc.clone(),
                                        format!(
                                            "data=\"all\" forwards {} of type {}, but {template} expects {}: {}",
                                            sp.name, caller_p.ty, sp.name, sp.ty
                                        ),
                                    ));
                                }
                            }
                            None if !sp.optional => {
                                self.reporter.report(Diagnostic::error(
                                    DiagnosticCode::ArgumentMismatch,
                                    cmd.loc.clone(),
                                    format!(
                                        "data=\"all\" cannot satisfy {template}'s required parameter {}: the caller has no parameter of that name",
                                        sp.name
                                    ),
                                ));
                            }
                            None => {}
                        }
                    }
                }
            }
        }
    }

    fn infer(&mut self, expr: &ExprNode) -> Type {
        let ty = self.infer_uncached(expr);
        self.annotations.set(expr.id, ty.clone());
        ty
    }

    fn infer_uncached(&mut self, expr: &ExprNode) -> Type {
        match &expr.kind {
            ExprKind::NullLit => Type::Null,
            ExprKind::UndefinedLit => Type::Undefined,
            ExprKind::BoolLit(_) => Type::Bool,
            ExprKind::IntLit(_) => Type::Int,
            ExprKind::FloatLit(_) => Type::Float,
            ExprKind::StringLit(_) => Type::String,
            ExprKind::ListLit(items) => {
                let mut elem_ty = Type::Dynamic;
                for item in items {
                    elem_ty = self.infer(item);
                }
                Type::List(Box::new(elem_ty))
            }
            ExprKind::MapLit(pairs) => {
                let mut kt = Type::Dynamic;
                let mut vt = Type::Dynamic;
                for (k, v) in pairs {
                    kt = self.infer(k);
                    vt = self.infer(v);
                }
                Type::Map(Box::new(kt), Box::new(vt))
            }
            ExprKind::RecordLit(fields) => {
                let mut map = indexmap::IndexMap::new();
                for (name, v) in fields {
                    let ty = self.infer(v);
                    map.insert(name.clone(), ty);
                }
                Type::Record(map)
            }
            ExprKind::VarRef(_) => self
                .vars
                .get(expr.id)
                .cloned()
                .unwrap_or(Type::Dynamic),
            ExprKind::TemplateRef(name) => match self.registry.lookup(name) {
                Some(sig) => Type::Template(Box::new(sig.clone())),
                None => Type::Dynamic,
            },
            ExprKind::Field { base, field } => self.infer_field(base, field, &expr.loc),
            ExprKind::Index { base, index } => self.infer_index(base, index),
            ExprKind::Call { args, .. } => {
                for a in args {
                    self.infer(a);
                }
                Type::Dynamic
            }
            ExprKind::Bind { template, record } => self.infer_bind(template, record, &expr.loc),
            ExprKind::Ternary {
                cond,
                then_branch,
                else_branch,
            } => {
                self.infer(cond);
                let t = self.infer(then_branch);
                let e = self.infer(else_branch);
                if t == e {
                    t
                } else {
                    Type::Union(vec![t, e])
                }
            }
            ExprKind::Binary { op, lhs, rhs } => self.infer_binary(*op, lhs, rhs, &expr.loc),
            ExprKind::Unary { operand, .. } => self.infer(operand),
        }
    }

    fn infer_field(&mut self, base: &ExprNode, field: &str, loc: &tpl_shared::SourceLocation) -> Type {
        let base_ty = self.infer(base);
        match &base_ty {
            Type::Record(fields) => fields.get(field).cloned().unwrap_or_else(|| {
                self.reporter.report(Diagnostic::error(
                    DiagnosticCode::UnknownField,
                    loc.clone(),
                    format!("record has no field {field}"),
                ));
                Type::Dynamic
            }),
            Type::Proto(name) => self
                .protos
                .field_type(name, field)
                .cloned()
                .unwrap_or_else(|| {
                    self.reporter.report(Diagnostic::error(
                        DiagnosticCode::UnknownField,
                        loc.clone(),
                        format!("proto {name} has no field {field}"),
                    ));
                    Type::Dynamic
                }),
            Type::Dynamic => Type::Dynamic,
            other => {
                self.reporter.report(Diagnostic::error(
                    DiagnosticCode::TypeMismatch,
                    loc.clone(),
                    format!("{other} is not a record or proto, cannot access .{field}"),
                ));
                Type::Dynamic
            }
        }
    }

    fn infer_index(&mut self, base: &ExprNode, index: &ExprNode) -> Type {
        let base_ty = self.infer(base);
        let index_ty = self.infer(index);
        match &base_ty {
            Type::List(elem) => {
                if !matches!(index_ty, Type::Int | Type::Dynamic) {
                    self.reporter.report(Diagnostic::error(
                        DiagnosticCode::TypeMismatch,
                        index.loc.clone(),
                        format!("list index must be int, found {index_ty}"),
                    ));
                }
                (**elem).clone()
            }
            Type::Map(key_ty, val_ty) => {
                if !is_assignable(&index_ty, key_ty) {
                    self.reporter.report(Diagnostic::error(
                        DiagnosticCode::TypeMismatch,
                        index.loc.clone(),
                        format!("map key must be {key_ty}, found {index_ty}"),
                    ));
                }
                (**val_ty).clone()
            }
            Type::Dynamic => Type::Dynamic,
            other => {
                self.reporter.report(Diagnostic::error(
                    DiagnosticCode::TypeMismatch,
                    index.loc.clone(),
                    format!("{other} is not indexable"),
                ));
                Type::Dynamic
            }
        }
    }

    fn infer_bind(
        &mut self,
        template: &ExprNode,
        record: &ExprNode,
        loc: &tpl_shared::SourceLocation,
    ) -> Type {
        let tpl_ty = self.infer(template);
        let record_ty = self.infer(record);
        let Type::Template(sig) = &tpl_ty else {
            if !tpl_ty.is_dynamic() {
                self.reporter.report(Diagnostic::error(
                    DiagnosticCode::TypeMismatch,
                    loc.clone(),
                    format!("bind() requires a template value, found {tpl_ty}"),
                ));
            }
            return Type::Dynamic;
        };
        let Type::Record(fields) = &record_ty else {
            if !record_ty.is_dynamic() {
                self.reporter.report(Diagnostic::error(
                    DiagnosticCode::TypeMismatch,
                    loc.clone(),
                    format!("bind() requires a record value, found {record_ty}"),
                ));
            }
            return Type::Template(sig.clone());
        };

        let mut remaining = Vec::new();
        for sp in &sig.params {
            match fields.get(&sp.name) {
                Some(bound_ty) => {
                    if !is_assignable(bound_ty, &sp.ty) {
                        self.reporter.report(Diagnostic::error(
                            DiagnosticCode::ArgumentMismatch,
                            loc.clone(),
                            format!(
                                "bind() field {} expects {}, found {bound_ty}",
                                sp.name, sp.ty
                            ),
                        ));
                    }
                }
                None => remaining.push(sp.clone()),
            }
        }
        for field_name in fields.keys() {
            if !sig.params.iter().any(|sp| &sp.name == field_name) {
                self.reporter.report(Diagnostic::error(
                    DiagnosticCode::ArgumentMismatch,
                    loc.clone(),
                    format!("bind() record field {field_name} is not a parameter of the template"),
                ));
            }
        }

        Type::Template(Box::new(crate::types::TemplateSignature {
            params: remaining,
            return_kind: sig.return_kind,
        }))
    }

    fn infer_binary(
        &mut self,
        op: crate::ast::BinOp,
        lhs: &ExprNode,
        rhs: &ExprNode,
        loc: &tpl_shared::SourceLocation,
    ) -> Type {
        use crate::ast::BinOp::*;
        let lt = self.infer(lhs);
        let rt = self.infer(rhs);
        match op {
            Add => {
                if matches!(lt, Type::String) && matches!(rt, Type::String) {
                    Type::String
                } else if is_numeric(&lt) && is_numeric(&rt) {
                    numeric_result(&lt, &rt)
                } else if lt.is_dynamic() || rt.is_dynamic() {
                    Type::Dynamic
                } else {
                    self.reporter.report(Diagnostic::error(
                        DiagnosticCode::TypeMismatch,
                        loc.clone(),
                        format!("cannot add {lt} and {rt}"),
                    ));
                    Type::Dynamic
                }
            }
            Sub | Mul | Div | Mod => {
                if is_numeric(&lt) && is_numeric(&rt) {
                    numeric_result(&lt, &rt)
                } else if lt.is_dynamic() || rt.is_dynamic() {
                    Type::Dynamic
                } else {
                    self.reporter.report(Diagnostic::error(
                        DiagnosticCode::TypeMismatch,
                        loc.clone(),
                        format!("arithmetic requires numeric operands, found {lt} and {rt}"),
                    ));
                    Type::Dynamic
                }
            }
            Eq | Ne | Lt | Le | Gt | Ge => {
                if !lt.is_dynamic()
                    && !rt.is_dynamic()
                    && !compatible_primitives(&lt, &rt)
                {
                    self.reporter.report(Diagnostic::error(
                        DiagnosticCode::TypeMismatch,
                        loc.clone(),
                        format!("cannot compare {lt} and {rt}"),
                    ));
                }
                Type::Bool
            }
            And | Or => Type::Bool,
        }
    }
}

fn is_numeric(t: &Type) -> bool {
    matches!(t, Type::Int | Type::Float | Type::Number)
}

fn numeric_result(a: &Type, b: &Type) -> Type {
    if matches!(a, Type::Int) && matches!(b, Type::Int) {
        Type::Int
    } else {
        Type::Float
    }
}

fn compatible_primitives(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::String, Type::String) => true,
        (Type::Bool, Type::Bool) => true,
        _ => is_numeric(a) && is_numeric(b),
    }
}

/// A `data="all"` forwarding edge: `from` calls `to` passing its own
/// record bundle along, at the call site `loc`.
struct DataAllEdge {
    to: String,
    loc: SourceLocation,
}

/// Finds `data="all"` forwarding cycles across the whole program (spec.md
/// §4.1 "Failure modes": `CallCycle`). A single template's checker only
/// ever sees its own body, so this cycle has to be a dedicated
/// whole-program pass over the call graph rather than something
/// `check_call` can catch by itself: A → B and B → A are typically
/// checked by two different `TypeChecker` instances (often across two
/// different units), neither of which ever recurses into the other's
/// body.
pub(crate) fn detect_data_all_cycles(
    units: &[CompilationUnit],
    registry: &TemplateRegistry,
    reporter: &mut DiagnosticReporter,
) {
    let mut edges: HashMap<String, Vec<DataAllEdge>> = HashMap::new();
    for unit in units {
        for tpl in &unit.templates {
            let mut out = Vec::new();
            collect_data_all_calls(&tpl.body, unit, registry, &mut out);
            edges.entry(tpl.name.fully_qualified()).or_default().extend(out);
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        Gray,
        Black,
    }
    let mut color: HashMap<String, Color> = HashMap::new();
    let mut reported: std::collections::HashSet<String> = std::collections::HashSet::new();
    let names: Vec<String> = edges.keys().cloned().collect();
    for name in names {
        if color.get(&name).is_none() {
            visit_data_all(&name, &edges, &mut color, reporter, &mut reported);
        }
    }

    fn visit_data_all(
        node: &str,
        edges: &HashMap<String, Vec<DataAllEdge>>,
        color: &mut HashMap<String, Color>,
        reporter: &mut DiagnosticReporter,
        reported: &mut std::collections::HashSet<String>,
    ) {
        color.insert(node.to_string(), Color::Gray);
        if let Some(outs) = edges.get(node) {
            for edge in outs {
                match color.get(edge.to.as_str()) {
                    Some(Color::Gray) => {
                        if reported.insert(node.to_string()) {
                            reporter.report(Diagnostic::error(
                                DiagnosticCode::CallCycle,
                                edge.loc.clone(),
                                format!(
                                    "data=\"all\" forwarding cycle detected at call to {}",
                                    edge.to
                                ),
                            ));
                        }
                    }
                    Some(Color::Black) => {}
                    None => visit_data_all(&edge.to, edges, color, reporter, reported),
                }
            }
        }
        color.insert(node.to_string(), Color::Black);
    }
}

fn resolve_callee_fq(unit: &CompilationUnit, template: &str, registry: &TemplateRegistry) -> Option<String> {
    if registry.lookup(template).is_some() {
        return Some(template.to_string());
    }
    registry.resolve_call_target(unit, template)
}

fn collect_data_all_calls(
    body: &[CmdNode],
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    out: &mut Vec<DataAllEdge>,
) {
    for cmd in body {
        collect_data_all_calls_cmd(cmd, unit, registry, out);
    }
}

fn collect_data_all_calls_cmd(
    cmd: &CmdNode,
    unit: &CompilationUnit,
    registry: &TemplateRegistry,
    out: &mut Vec<DataAllEdge>,
) {
    match &cmd.kind {
        CmdKind::Call { template, params } => {
            if params.iter().any(|p| matches!(p, CallParam::DataAll)) {
                if let Some(fq) = resolve_callee_fq(unit, template, registry) {
                    out.push(DataAllEdge {
                        to: fq,
                        loc: cmd.loc.clone(),
                    });
                }
            }
        }
        CmdKind::Let { body, .. } => collect_data_all_calls(body, unit, registry, out),
        CmdKind::If { branches } => {
            for (_, body) in branches {
                collect_data_all_calls(body, unit, registry, out);
            }
        }
        CmdKind::For { body, .. } => collect_data_all_calls(body, unit, registry, out),
        CmdKind::Switch { cases, default, .. } => {
            for (_, body) in cases {
                collect_data_all_calls(body, unit, registry, out);
            }
            if let Some(default) = default {
                collect_data_all_calls(default, unit, registry, out);
            }
        }
        CmdKind::HtmlAttribute { value, .. } => {
            if let Some(value) = value {
                collect_data_all_calls_cmd(value, unit, registry, out);
            }
        }
        CmdKind::HtmlAttributeValue { parts, .. } => collect_data_all_calls(parts, unit, registry, out),
        _ => {}
    }
}

