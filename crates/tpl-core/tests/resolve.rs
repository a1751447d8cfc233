#[cfg(test)]
mod resolve_tests {
    use std::collections::HashSet;
    use tpl_core::{resolve_unit, Builder, CmdKind, ContentKind, TemplateRegistry, Type};
    use tpl_shared::DiagnosticReporter;

    #[test]
    fn unresolved_variable_is_reported() {
        let b = Builder::new("a.tpl");
        let tpl = b.template(
            "ns",
            "t",
            ContentKind::Html,
            vec![],
            vec![b.print(b.var("missing"))],
        );
        let unit = b.unit(vec![tpl]);
        let mut reporter = DiagnosticReporter::new();
        let registry = TemplateRegistry::build(&[unit.clone()], &HashSet::new(), &mut reporter);
        resolve_unit(&unit, &registry, &mut reporter);
        assert!(reporter.has_errors());
    }

    #[test]
    fn param_reference_resolves() {
        let b = Builder::new("a.tpl");
        let tpl = b.template(
            "ns",
            "t",
            ContentKind::Html,
            vec![b.param("p", Type::String, false)],
            vec![b.print(b.var("p"))],
        );
        let unit = b.unit(vec![tpl]);
        let mut reporter = DiagnosticReporter::new();
        let registry = TemplateRegistry::build(&[unit.clone()], &HashSet::new(), &mut reporter);
        resolve_unit(&unit, &registry, &mut reporter);
        assert!(!reporter.has_errors());
    }

    #[test]
    fn duplicate_template_name_rejected_by_default() {
        let b = Builder::new("a.tpl");
        let t1 = b.template("ns", "t", ContentKind::Html, vec![], vec![]);
        let t2 = b.template("ns", "t", ContentKind::Html, vec![], vec![]);
        let unit = b.unit(vec![t1, t2]);
        let mut reporter = DiagnosticReporter::new();
        TemplateRegistry::build(&[unit], &HashSet::new(), &mut reporter);
        assert!(reporter.has_errors());
    }

    #[test]
    fn duplicate_template_name_allowed_with_override() {
        let b = Builder::new("a.tpl");
        let t1 = b.template("ns", "t", ContentKind::Html, vec![], vec![]);
        let t2 = b.template("ns", "t", ContentKind::Html, vec![], vec![]);
        let unit = b.unit(vec![t1, t2]);
        let mut reporter = DiagnosticReporter::new();
        let mut allowed = HashSet::new();
        allowed.insert("ns.t".to_string());
        TemplateRegistry::build(&[unit], &allowed, &mut reporter);
        assert!(!reporter.has_errors());
    }

    #[test]
    fn unknown_call_target_reported() {
        let b = Builder::new("a.tpl");
        let tpl = b.template(
            "ns",
            "t",
            ContentKind::Html,
            vec![],
            vec![b.cmd(CmdKind::Call {
                template: "ns.missing".into(),
                params: vec![],
            })],
        );
        let unit = b.unit(vec![tpl]);
        let mut reporter = DiagnosticReporter::new();
        let registry = TemplateRegistry::build(&[unit.clone()], &HashSet::new(), &mut reporter);
        resolve_unit(&unit, &registry, &mut reporter);
        assert!(reporter.has_errors());
    }
}
