#[cfg(test)]
mod compile_tests {
    use std::collections::HashSet;
    use tpl_core::{check_units, Builder, ContentKind, ProtoRegistry, Type};

    #[test]
    fn clean_unit_has_no_errors() {
        let b = Builder::new("a.tpl");
        let tpl = b.template(
            "ns",
            "t",
            ContentKind::Html,
            vec![b.param("name", Type::String, false)],
            vec![b.print(b.var("name"))],
        );
        let unit = b.unit(vec![tpl]);
        let result = check_units(&[unit], &ProtoRegistry::new(), None, &HashSet::new());
        assert!(!result.has_errors());
    }

    #[test]
    fn unresolved_name_surfaces_in_aggregated_diagnostics() {
        let b = Builder::new("a.tpl");
        let tpl = b.template(
            "ns",
            "t",
            ContentKind::Html,
            vec![],
            vec![b.print(b.var("missing"))],
        );
        let unit = b.unit(vec![tpl]);
        let result = check_units(&[unit], &ProtoRegistry::new(), None, &HashSet::new());
        assert!(result.has_errors());
    }
}
