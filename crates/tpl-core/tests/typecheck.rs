#[cfg(test)]
mod typecheck_tests {
    use indexmap::IndexMap;
    use std::collections::HashSet;
    use tpl_core::{
        check_units, resolve_unit, BinOp, Builder, CallParam, CmdKind, CompilationUnit, ContentKind,
        ExprKind, ProtoRegistry, TemplateRegistry, Type, TypeAnnotations, TypeChecker,
    };
    use tpl_shared::{DiagnosticCode, DiagnosticReporter};

    fn run(unit: &CompilationUnit) -> (TypeAnnotations, DiagnosticReporter) {
        let mut reporter = DiagnosticReporter::new();
        let registry = TemplateRegistry::build(&[unit.clone()], &HashSet::new(), &mut reporter);
        let vars = resolve_unit(unit, &registry, &mut reporter);
        let protos = ProtoRegistry::new();
        let annotations = TypeChecker::new(&registry, &vars, &protos, &mut reporter).check_unit(unit);
        (annotations, reporter)
    }

    #[test]
    fn string_concat_is_string() {
        let b = Builder::new("a.tpl");
        let expr = b.expr(ExprKind::Binary {
            op: BinOp::Add,
            lhs: Box::new(b.str_lit("a")),
            rhs: Box::new(b.str_lit("b")),
        });
        let tpl = b.template("ns", "t", ContentKind::Html, vec![], vec![b.print(expr.clone())]);
        let unit = b.unit(vec![tpl]);
        let (annotations, reporter) = run(&unit);
        assert!(!reporter.has_errors());
        assert_eq!(annotations.get(expr.id), Some(&Type::String));
    }

    #[test]
    fn mixed_add_is_type_error() {
        let b = Builder::new("a.tpl");
        let expr = b.expr(ExprKind::Binary {
            op: BinOp::Add,
            lhs: Box::new(b.str_lit("a")),
            rhs: Box::new(b.int_lit(1)),
        });
        let tpl = b.template("ns", "t", ContentKind::Html, vec![], vec![b.print(expr)]);
        let unit = b.unit(vec![tpl]);
        let (_annotations, reporter) = run(&unit);
        assert!(reporter.has_errors());
    }

    #[test]
    fn call_argument_type_mismatch_reported() {
        let b = Builder::new("a.tpl");
        let callee = b.template(
            "ns",
            "callee",
            ContentKind::Html,
            vec![b.param("p", Type::Int, false)],
            vec![],
        );
        let caller = b.template(
            "ns",
            "caller",
            ContentKind::Html,
            vec![],
            vec![b.cmd(CmdKind::Call {
                template: "ns.callee".into(),
                params: vec![CallParam::Named {
                    name: "p".into(),
                    value: b.str_lit("not an int"),
                }],
            })],
        );
        let unit = b.unit(vec![callee, caller]);
        let (_annotations, reporter) = run(&unit);
        assert!(reporter.has_errors());
    }

    #[test]
    fn bind_omits_bound_params_from_resulting_signature() {
        let b = Builder::new("a.tpl");
        let callee = b.template(
            "ns",
            "callee",
            ContentKind::Html,
            vec![
                b.param("p", Type::Int, false),
                b.param("q", Type::String, false),
            ],
            vec![],
        );
        let mut fields = IndexMap::new();
        fields.insert("p".to_string(), b.int_lit(1));
        let bind_expr = b.expr(ExprKind::Bind {
            template: Box::new(b.expr(ExprKind::TemplateRef("ns.callee".into()))),
            record: Box::new(b.expr(ExprKind::RecordLit(fields.into_iter().collect()))),
        });
        let caller = b.template(
            "ns",
            "caller",
            ContentKind::Html,
            vec![],
            vec![b.cmd(CmdKind::Let {
                name: "partial".into(),
                value: Some(bind_expr.clone()),
                body: vec![],
            })],
        );
        let unit = b.unit(vec![callee, caller]);
        let (annotations, reporter) = run(&unit);
        assert!(!reporter.has_errors());
        let Some(Type::Template(sig)) = annotations.get(bind_expr.id) else {
            panic!("expected a template type");
        };
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].name, "q");
    }

    #[test]
    fn data_all_is_rejected_when_callee_param_is_missing_from_caller() {
        let b = Builder::new("a.tpl");
        let callee = b.template(
            "ns",
            "callee",
            ContentKind::Html,
            vec![b.param("p", Type::Int, false)],
            vec![],
        );
        let caller = b.template(
            "ns",
            "caller",
            ContentKind::Html,
            vec![b.param("q", Type::Int, false)],
            vec![b.cmd(CmdKind::Call {
                template: "ns.callee".into(),
                params: vec![CallParam::DataAll],
            })],
        );
        let unit = b.unit(vec![callee, caller]);
        let (_annotations, reporter) = run(&unit);
        assert!(reporter.has_errors());
    }

    #[test]
    fn data_all_is_rejected_when_caller_param_type_is_not_assignable() {
        let b = Builder::new("a.tpl");
        let callee = b.template(
            "ns",
            "callee",
            ContentKind::Html,
            vec![b.param("p", Type::Int, false)],
            vec![],
        );
        let caller = b.template(
            "ns",
            "caller",
            ContentKind::Html,
            vec![b.param("p", Type::String, false)],
            vec![b.cmd(CmdKind::Call {
                template: "ns.callee".into(),
                params: vec![CallParam::DataAll],
            })],
        );
        let unit = b.unit(vec![callee, caller]);
        let (_annotations, reporter) = run(&unit);
        assert!(reporter.has_errors());
    }

    #[test]
    fn data_all_passes_when_caller_params_are_an_assignable_superset() {
        let b = Builder::new("a.tpl");
        let callee = b.template(
            "ns",
            "callee",
            ContentKind::Html,
            vec![b.param("p", Type::Int, false)],
            vec![],
        );
        let caller = b.template(
            "ns",
            "caller",
            ContentKind::Html,
            vec![
                b.param("p", Type::Int, false),
                b.param("extra", Type::String, false),
            ],
            vec![b.cmd(CmdKind::Call {
                template: "ns.callee".into(),
                params: vec![CallParam::DataAll],
            })],
        );
        let unit = b.unit(vec![callee, caller]);
        let (_annotations, reporter) = run(&unit);
        assert!(!reporter.has_errors());
    }

    #[test]
    fn data_all_allows_a_missing_optional_callee_param() {
        let b = Builder::new("a.tpl");
        let callee = b.template(
            "ns",
            "callee",
            ContentKind::Html,
            vec![b.param("p", Type::Int, true)],
            vec![],
        );
        let caller = b.template("ns", "caller", ContentKind::Html, vec![], vec![b.cmd(CmdKind::Call {
            template: "ns.callee".into(),
            params: vec![CallParam::DataAll],
        })]);
        let unit = b.unit(vec![callee, caller]);
        let (_annotations, reporter) = run(&unit);
        assert!(!reporter.has_errors());
    }

    #[test]
    fn unknown_record_field_reported() {
        let b = Builder::new("a.tpl");
        let mut fields = IndexMap::new();
        fields.insert("a".to_string(), b.str_lit("x"));
        let record = b.expr(ExprKind::RecordLit(fields.into_iter().collect()));
        let field_access = b.expr(ExprKind::Field {
            base: Box::new(record),
            field: "b".into(),
        });
        let tpl = b.template(
            "ns",
            "t",
            ContentKind::Html,
            vec![],
            vec![b.print(field_access)],
        );
        let unit = b.unit(vec![tpl]);
        let (_annotations, reporter) = run(&unit);
        assert!(reporter.has_errors());
    }

    /// spec.md §4.1 "Failure modes": two templates that each forward the
    /// other their whole record bundle via `data="all"` form a cycle that
    /// neither template's own checker pass can see on its own — it only
    /// shows up once the whole-program call graph is examined, which is
    /// what `check_units` does on top of per-unit type checking.
    #[test]
    fn data_all_forwarding_cycle_between_two_templates_is_reported() {
        let b = Builder::new("a.tpl");
        let a = b.template(
            "ns",
            "a",
            ContentKind::Html,
            vec![b.param("p", Type::Int, true)],
            vec![b.cmd(CmdKind::Call {
                template: "ns.b".into(),
                params: vec![CallParam::DataAll],
            })],
        );
        let b_tpl = b.template(
            "ns",
            "b",
            ContentKind::Html,
            vec![b.param("p", Type::Int, true)],
            vec![b.cmd(CmdKind::Call {
                template: "ns.a".into(),
                params: vec![CallParam::DataAll],
            })],
        );
        let unit = b.unit(vec![a, b_tpl]);
        let result = check_units(&[unit], &ProtoRegistry::new(), None, &HashSet::new());
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::CallCycle));
    }

    #[test]
    fn data_all_forwarding_without_a_cycle_is_not_reported() {
        let b = Builder::new("a.tpl");
        let leaf = b.template("ns", "leaf", ContentKind::Html, vec![b.param("p", Type::Int, true)], vec![]);
        let middle = b.template(
            "ns",
            "middle",
            ContentKind::Html,
            vec![b.param("p", Type::Int, true)],
            vec![b.cmd(CmdKind::Call {
                template: "ns.leaf".into(),
                params: vec![CallParam::DataAll],
            })],
        );
        let unit = b.unit(vec![leaf, middle]);
        let result = check_units(&[unit], &ProtoRegistry::new(), None, &HashSet::new());
        assert!(!result
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::CallCycle));
    }
}
