//! The conformance engine (spec.md §4.4): rule-based linting over the AST,
//! independent of name resolution and type checking. Each rule carries its
//! own whitelist of file-identity substrings that suppress it.

use crate::ast::{CmdKind, CmdNode, CompilationUnit, ExprKind, ExprNode};
use serde::{Deserialize, Serialize};
use tpl_shared::{Diagnostic, DiagnosticCode, DiagnosticReporter};

/// One conformance rule (spec.md §4.4 "Rule kinds"). Deserialized from a
/// rule-set config file; unknown fields are rejected so a typo in a rule
/// definition fails loudly instead of silently doing nothing. Each variant
/// carries its own `whitelist`: a list of substring patterns matched
/// contiguously against the *file identity* (not the violating text,
/// spec.md §4.4 "Whitelist matching is substring-of-path with contiguous
/// match"); any match suppresses the rule for that whole file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(tag = "kind")]
pub enum Rule {
    #[serde(rename = "banned_function")]
    BannedFunction {
        name: String,
        message: String,
        #[serde(default)]
        whitelist: Vec<String>,
    },
    /// `banned_directive(pipe_name)` (spec.md §4.4): forbids a print site
    /// from applying a named escaping directive ("pipe"), e.g.
    /// `{$x|noAutoescape}`. Matched against the author-written directive
    /// names a `Print` node carries, not against HTML attribute names.
    #[serde(rename = "banned_directive")]
    BannedDirective {
        name: String,
        message: String,
        #[serde(default)]
        whitelist: Vec<String>,
    },
    #[serde(rename = "banned_raw_text")]
    BannedRawText {
        substring: String,
        message: String,
        #[serde(default)]
        whitelist: Vec<String>,
    },
    #[serde(rename = "banned_text_everywhere_except_comments")]
    BannedTextEverywhereExceptComments {
        substring: String,
        message: String,
        #[serde(default)]
        whitelist: Vec<String>,
    },
    #[serde(rename = "banned_html_tag")]
    BannedHtmlTag {
        tag: String,
        message: String,
        #[serde(default)]
        whitelist: Vec<String>,
    },
    #[serde(rename = "banned_css_selector")]
    BannedCssSelector {
        selector: String,
        message: String,
        #[serde(default)]
        whitelist: Vec<String>,
    },
    /// An escape hatch for a rule this engine has no dedicated variant for;
    /// matched the same way as `banned_raw_text` against a node's textual
    /// rendering, named so the violation message can say what matched.
    #[serde(rename = "custom")]
    Custom {
        name: String,
        substring: String,
        message: String,
        #[serde(default)]
        whitelist: Vec<String>,
    },
}

impl Rule {
    fn message(&self) -> &str {
        match self {
            Rule::BannedFunction { message, .. }
            | Rule::BannedDirective { message, .. }
            | Rule::BannedRawText { message, .. }
            | Rule::BannedTextEverywhereExceptComments { message, .. }
            | Rule::BannedHtmlTag { message, .. }
            | Rule::BannedCssSelector { message, .. }
            | Rule::Custom { message, .. } => message,
        }
    }

    fn whitelist(&self) -> &[String] {
        match self {
            Rule::BannedFunction { whitelist, .. }
            | Rule::BannedDirective { whitelist, .. }
            | Rule::BannedRawText { whitelist, .. }
            | Rule::BannedTextEverywhereExceptComments { whitelist, .. }
            | Rule::BannedHtmlTag { whitelist, .. }
            | Rule::BannedCssSelector { whitelist, .. }
            | Rule::Custom { whitelist, .. } => whitelist,
        }
    }

    /// Contiguous substring match against the file identity (spec.md §4.4,
    /// §8 boundary scenario 7): `a/b/c/foo/bar/baz.soy` is whitelisted by
    /// pattern `foo/bar/baz.soy` (a genuine substring), but
    /// `a/b/c/foo/c/bar/baz.soy` is not (the pattern does not occur as a
    /// contiguous run of characters in that path).
    fn suppressed_for(&self, file_identity: &str) -> bool {
        self.whitelist()
            .iter()
            .any(|pattern| file_identity.contains(pattern.as_str()))
    }
}

/// A whole rule set loaded from the conformance configuration (spec.md §6
/// "Persisted state"); whitelisting lives on each [`Rule`], not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Loads a rule set from its textual configuration (spec.md §6
    /// "Persisted state: the loader rejects unknown fields"). A malformed
    /// or unrecognized-field config is a hard-abort condition, not a
    /// recoverable diagnostic — there is no AST yet to attach one to.
    pub fn load(json: &str) -> Result<Self, crate::error::AbortCompilation> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Runs every rule in `rules` against `unit` in a single AST traversal,
/// reporting `ConformanceViolation` for anything not covered by the rule's
/// own whitelist for this file's identity.
pub fn check_conformance(unit: &CompilationUnit, rules: &RuleSet, reporter: &mut DiagnosticReporter) {
    let file_identity = unit
        .file
        .as_ref()
        .map(|f| f.to_string())
        .unwrap_or_default();

    let mut walker = ConformanceWalker {
        rules: &rules.rules,
        file_identity: &file_identity,
        reporter,
    };
    for tpl in &unit.templates {
        walker.walk_body(&tpl.body);
    }
}

struct ConformanceWalker<'a> {
    rules: &'a [Rule],
    file_identity: &'a str,
    reporter: &'a mut DiagnosticReporter,
}

impl<'a> ConformanceWalker<'a> {
    fn report(&mut self, loc: &tpl_shared::SourceLocation, rule: &Rule) {
        if rule.suppressed_for(self.file_identity) {
            return;
        }
        self.reporter.report(Diagnostic::error(
            DiagnosticCode::ConformanceViolation,
            loc.clone(),
            rule.message().to_string(),
        ));
    }

    fn walk_body(&mut self, body: &[CmdNode]) {
        for cmd in body {
            self.walk_cmd(cmd);
        }
    }

    fn walk_cmd(&mut self, cmd: &CmdNode) {
        match &cmd.kind {
            CmdKind::Param(_) => {}
            CmdKind::Let { value, body, .. } => {
                if let Some(v) = value {
                    self.walk_expr(v);
                }
                self.walk_body(body);
            }
            CmdKind::If { branches } => {
                for (cond, body) in branches {
                    if let Some(cond) = cond {
                        self.walk_expr(cond);
                    }
                    self.walk_body(body);
                }
            }
            CmdKind::For { list_expr, body, .. } => {
                self.walk_expr(list_expr);
                self.walk_body(body);
            }
            CmdKind::Switch {
                expr,
                cases,
                default,
            } => {
                self.walk_expr(expr);
                for (values, body) in cases {
                    for v in values {
                        self.walk_expr(v);
                    }
                    self.walk_body(body);
                }
                if let Some(default) = default {
                    self.walk_body(default);
                }
            }
            CmdKind::Call { template, params } => {
                for rule in self.rules {
                    if let Rule::BannedFunction { name, .. } = rule {
                        if name == template {
                            self.report(&cmd.loc, rule);
                        }
                    }
                }
                for p in params {
                    if let crate::ast::CallParam::Named { value, .. } = p {
                        self.walk_expr(value);
                    }
                }
            }
            CmdKind::Msg { parts, .. } => {
                for part in parts {
                    match part {
                        crate::ast::MsgPart::Placeholder { value, .. } => self.walk_expr(value),
                        crate::ast::MsgPart::Raw(text) => {
                            for rule in self.rules {
                                match rule {
                                    Rule::BannedRawText { substring, .. }
                                    | Rule::BannedTextEverywhereExceptComments { substring, .. } => {
                                        if text.contains(substring.as_str()) {
                                            self.report(&cmd.loc, rule);
                                        }
                                    }
                                    Rule::Custom { substring, .. } => {
                                        if text.contains(substring.as_str()) {
                                            self.report(&cmd.loc, rule);
                                        }
                                    }
                                    _ => {}
                                }
                            }
                        }
                    }
                }
            }
            CmdKind::Print { expr, directives } => {
                for rule in self.rules {
                    if let Rule::BannedDirective { name, .. } = rule {
                        if directives.iter().any(|d| d == name) {
                            self.report(&cmd.loc, rule);
                        }
                    }
                }
                self.walk_expr(expr);
            }
            CmdKind::RawText(text) => {
                for rule in self.rules {
                    match rule {
                        Rule::BannedRawText { substring, .. }
                        | Rule::BannedTextEverywhereExceptComments { substring, .. } => {
                            if text.contains(substring.as_str()) {
                                self.report(&cmd.loc, rule);
                            }
                        }
                        Rule::Custom { substring, .. } => {
                            if text.contains(substring.as_str()) {
                                self.report(&cmd.loc, rule);
                            }
                        }
                        _ => {}
                    }
                }
            }
            CmdKind::HtmlOpenTag { name, .. } => {
                for rule in self.rules {
                    if let Rule::BannedHtmlTag { tag, .. } = rule {
                        if tag == name {
                            self.report(&cmd.loc, rule);
                        }
                    }
                }
            }
            CmdKind::HtmlCloseTag { .. } => {}
            CmdKind::HtmlAttribute { name, value, .. } => {
                for rule in self.rules {
                    if let Rule::BannedCssSelector { selector, .. } = rule {
                        if name == "style" && selector_appears(value, selector) {
                            self.report(&cmd.loc, rule);
                        }
                    }
                }
                if let Some(value) = value {
                    self.walk_cmd(value);
                }
            }
            CmdKind::HtmlAttributeValue { parts, .. } => self.walk_body(parts),
        }
    }

    fn walk_expr(&mut self, expr: &ExprNode) {
        match &expr.kind {
            ExprKind::Call { callee, args } => {
                for rule in self.rules {
                    if let Rule::BannedFunction { name, .. } = rule {
                        if name == callee {
                            self.report(&expr.loc, rule);
                        }
                    }
                }
                for a in args {
                    self.walk_expr(a);
                }
            }
            ExprKind::ListLit(items) => {
                for item in items {
                    self.walk_expr(item);
                }
            }
            ExprKind::MapLit(pairs) => {
                for (k, v) in pairs {
                    self.walk_expr(k);
                    self.walk_expr(v);
                }
            }
            ExprKind::RecordLit(fields) => {
                for (_, v) in fields {
                    self.walk_expr(v);
                }
            }
            ExprKind::Field { base, .. } => self.walk_expr(base),
            ExprKind::Index { base, index } => {
                self.walk_expr(base);
                self.walk_expr(index);
            }
            ExprKind::Bind { template, record } => {
                self.walk_expr(template);
                self.walk_expr(record);
            }
            ExprKind::Ternary {
                cond,
                then_branch,
                else_branch,
            } => {
                self.walk_expr(cond);
                self.walk_expr(then_branch);
                self.walk_expr(else_branch);
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.walk_expr(lhs);
                self.walk_expr(rhs);
            }
            ExprKind::Unary { operand, .. } => self.walk_expr(operand),
            ExprKind::NullLit
            | ExprKind::UndefinedLit
            | ExprKind::BoolLit(_)
            | ExprKind::IntLit(_)
            | ExprKind::FloatLit(_)
            | ExprKind::StringLit(_)
            | ExprKind::VarRef(_)
            | ExprKind::TemplateRef(_) => {}
        }
    }
}

fn selector_appears(value: &Option<Box<CmdNode>>, selector: &str) -> bool {
    let Some(value) = value else { return false };
    let CmdKind::HtmlAttributeValue { parts, .. } = &value.kind else {
        return false;
    };
    parts.iter().any(|p| match &p.kind {
        CmdKind::RawText(text) => text.contains(selector),
        _ => false,
    })
}

