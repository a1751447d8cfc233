//! The built-in function & directive registry (spec.md §6): name, arity,
//! parameter/return types, purity, and — for directives — the contextual
//! safety descriptor the autoescaper consults.

use indexmap::IndexMap;
use tpl_core::ContentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Variadic,
}

/// Which autoescaper slot a directive's output is safe to land in without
/// further escaping (spec.md §6 "contextual-safety descriptor").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyDescriptor {
    /// Safe as the entire content of a PCDATA text node.
    Pcdata,
    /// Safe inside a quoted (or unquoted) HTML attribute value.
    HtmlAttribute,
    /// Safe as a URI occupying a `uri`-family attribute value.
    Uri,
    /// Safe as a URI occupying a `trusted-resource-uri`-family slot.
    TrustedResourceUri,
    /// Safe as a JS expression/value.
    Js,
    /// Safe as a CSS value.
    Css,
}

#[derive(Debug, Clone)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub arity: Arity,
    pub param_types: Vec<ContentKind>,
    pub return_kind: ContentKind,
    pub pure: bool,
}

#[derive(Debug, Clone)]
pub struct Directive {
    pub name: &'static str,
    pub safety: SafetyDescriptor,
}

#[derive(Debug, Default)]
pub struct BuiltinRegistry {
    functions: IndexMap<&'static str, BuiltinFunction>,
    directives: IndexMap<&'static str, Directive>,
}

impl BuiltinRegistry {
    /// The registry populated with every directive named in the §4.3
    /// directive-selection table, plus `ordainAsSafe`/`getString` (the
    /// round-trip operations named in §8).
    pub fn standard() -> Self {
        let mut reg = Self::default();
        reg.register_directive("escapeHtml", SafetyDescriptor::Pcdata);
        reg.register_directive("escapeHtmlAttribute", SafetyDescriptor::HtmlAttribute);
        reg.register_directive("escapeHtmlAttributeNospace", SafetyDescriptor::HtmlAttribute);
        reg.register_directive("normalizeUri", SafetyDescriptor::Uri);
        reg.register_directive(
            "filterTrustedResourceUri",
            SafetyDescriptor::TrustedResourceUri,
        );
        reg.register_directive("escapeJsValue", SafetyDescriptor::Js);
        reg.register_directive("filterCssValue", SafetyDescriptor::Css);

        reg.register_function(BuiltinFunction {
            name: "ordainAsSafe",
            arity: Arity::Exact(2),
            param_types: vec![ContentKind::Text, ContentKind::Text],
            return_kind: ContentKind::Html,
            pure: true,
        });
        reg.register_function(BuiltinFunction {
            name: "getString",
            arity: Arity::Exact(1),
            param_types: vec![ContentKind::Html],
            return_kind: ContentKind::Text,
            pure: true,
        });
        reg
    }

    pub fn register_function(&mut self, f: BuiltinFunction) {
        self.functions.insert(f.name, f);
    }

    pub fn register_directive(&mut self, name: &'static str, safety: SafetyDescriptor) {
        self.directives.insert(
            name,
            Directive { name, safety },
        );
    }

    pub fn function(&self, name: &str) -> Option<&BuiltinFunction> {
        self.functions.get(name)
    }

    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.directives.get(name)
    }
}
