#[cfg(test)]
mod escaper_tests {
    use std::collections::HashSet;
    use tpl_core::{Builder, CmdKind, ContentKind, TemplateRegistry, Type};
    use tpl_dom::{directives_for, escape_unit, visit_unit, AttrFamily, Context, Quote, ScriptSubkind};
    use tpl_shared::{DiagnosticCode, DiagnosticReporter};

    fn registry_for(unit: &tpl_core::CompilationUnit, reporter: &mut DiagnosticReporter) -> TemplateRegistry {
        TemplateRegistry::build(&[unit.clone()], &HashSet::new(), reporter)
    }

    #[test]
    fn pcdata_html_value_needs_no_escaping() {
        let result = directives_for(&Context::Pcdata, Some(ContentKind::Html));
        assert_eq!(result, Some(vec![]));
    }

    #[test]
    fn pcdata_unsanitized_value_gets_escape_html() {
        let result = directives_for(&Context::Pcdata, None);
        assert_eq!(result, Some(vec!["escapeHtml"]));
    }

    #[test]
    fn uri_attr_gets_normalize_then_escape() {
        let result = directives_for(&Context::AttrValue(AttrFamily::Uri, Quote::Double), None);
        assert_eq!(result, Some(vec!["normalizeUri", "escapeHtmlAttribute"]));
    }

    #[test]
    fn trusted_resource_uri_with_matching_kind_only_escapes() {
        let result = directives_for(
            &Context::AttrValue(AttrFamily::TrustedResourceUri, Quote::Double),
            Some(ContentKind::TrustedResourceUri),
        );
        assert_eq!(result, Some(vec!["escapeHtmlAttribute"]));
    }

    #[test]
    fn trusted_resource_uri_with_unknown_kind_has_no_safe_directive() {
        let result = directives_for(
            &Context::AttrValue(AttrFamily::TrustedResourceUri, Quote::Double),
            None,
        );
        assert_eq!(result, None);
    }

    #[test]
    fn script_body_js_value_is_unescaped() {
        let result = directives_for(&Context::Script(ScriptSubkind::Body), Some(ContentKind::Js));
        assert_eq!(result, Some(vec![]));
    }

    #[test]
    fn trusted_resource_uri_attr_with_unknown_kind_rejects_in_strict_mode() {
        let b = Builder::new("a.tpl");
        let script_src = b.var("u");
        let attr = b.attribute(
            "src",
            AttrFamily::TrustedResourceUri,
            Quote::Double,
            vec![b.print(script_src.clone())],
        );
        let tpl = b.template(
            "ns",
            "t",
            ContentKind::Html,
            vec![b.param("u", Type::String, false)],
            vec![b.open_tag("script"), attr, b.close_tag("script")],
        );
        let unit = b.unit(vec![tpl]);
        let mut reporter = DiagnosticReporter::new();
        let registry = registry_for(&unit, &mut reporter);
        let contexts = visit_unit(&unit, &registry, &mut reporter);
        let _ = escape_unit(&unit, &registry, &contexts, |_| None, &mut reporter);
        assert!(reporter
            .diagnostics()
            .iter()
            .any(|d| d.code == DiagnosticCode::StrictEscapeRequired));
    }

    #[test]
    fn call_to_known_html_kind_in_pcdata_needs_no_escaping() {
        let b = Builder::new("a.tpl");
        let callee = b.template("ns", "snippet", ContentKind::Html, vec![], vec![]);
        let call = b.cmd(CmdKind::Call {
            template: "ns.snippet".to_string(),
            params: vec![],
        });
        let caller = b.template("ns", "page", ContentKind::Html, vec![], vec![call.clone()]);
        let unit = b.unit(vec![callee, caller]);
        let mut reporter = DiagnosticReporter::new();
        let registry = registry_for(&unit, &mut reporter);
        let contexts = visit_unit(&unit, &registry, &mut reporter);
        let out = escape_unit(&unit, &registry, &contexts, |_| None, &mut reporter);
        assert!(out.directives(call.id).is_none());
    }

    #[test]
    fn call_to_known_css_kind_in_pcdata_gets_coercion_directive() {
        let b = Builder::new("a.tpl");
        let callee = b.template("ns", "style_snippet", ContentKind::Css, vec![], vec![]);
        let call = b.cmd(CmdKind::Call {
            template: "ns.style_snippet".to_string(),
            params: vec![],
        });
        let caller = b.template("ns", "page", ContentKind::Html, vec![], vec![call.clone()]);
        let unit = b.unit(vec![callee, caller]);
        let mut reporter = DiagnosticReporter::new();
        let registry = registry_for(&unit, &mut reporter);
        let contexts = visit_unit(&unit, &registry, &mut reporter);
        let out = escape_unit(&unit, &registry, &contexts, |_| None, &mut reporter);
        assert_eq!(out.directives(call.id), Some(&vec!["escapeHtml"]));
    }
}
