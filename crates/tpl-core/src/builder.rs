//! Fixture construction helpers for tests. There is no parser in this crate
//! (spec.md §1: parsing is an external collaborator), so unit and
//! integration tests build ASTs directly, the same way the teacher crate's
//! own `tests/test_utils.rs` constructs fixtures without going through its
//! tokenizer for transform-level tests.

use crate::ast::*;
use crate::types::{ContentKind, Type};
use tpl_shared::{FileId, NodeIdGen, SourceLocation};

pub struct Builder {
    ids: NodeIdGen,
    file: FileId,
}

impl Builder {
    pub fn new(file: &str) -> Self {
        Self {
            ids: NodeIdGen::new(),
            file: FileId::new(file.to_string()),
        }
    }

    fn loc(&self) -> SourceLocation {
        SourceLocation::synthetic(self.file.clone())
    }

    pub fn expr(&self, kind: ExprKind) -> ExprNode {
        ExprNode {
            id: self.ids.next(),
            loc: self.loc(),
            kind,
        }
    }

    pub fn cmd(&self, kind: CmdKind) -> CmdNode {
        CmdNode {
            id: self.ids.next(),
            loc: self.loc(),
            kind,
        }
    }

    pub fn var(&self, name: &str) -> ExprNode {
        self.expr(ExprKind::VarRef(name.to_string()))
    }

    pub fn str_lit(&self, s: &str) -> ExprNode {
        self.expr(ExprKind::StringLit(s.to_string()))
    }

    pub fn int_lit(&self, n: i64) -> ExprNode {
        self.expr(ExprKind::IntLit(n))
    }

    pub fn print(&self, expr: ExprNode) -> CmdNode {
        self.print_with_directives(expr, vec![])
    }

    pub fn print_with_directives(&self, expr: ExprNode, directives: Vec<&str>) -> CmdNode {
        self.cmd(CmdKind::Print {
            expr,
            directives: directives.into_iter().map(str::to_string).collect(),
        })
    }

    pub fn raw_text(&self, s: &str) -> CmdNode {
        self.cmd(CmdKind::RawText(s.to_string()))
    }

    pub fn open_tag(&self, name: &str) -> CmdNode {
        self.cmd(CmdKind::HtmlOpenTag {
            name: name.to_string(),
            self_closing: false,
        })
    }

    pub fn close_tag(&self, name: &str) -> CmdNode {
        self.cmd(CmdKind::HtmlCloseTag {
            name: name.to_string(),
        })
    }

    pub fn attribute(&self, name: &str, family: AttrFamily, quote: Quote, value: Vec<CmdNode>) -> CmdNode {
        let value_node = self.cmd(CmdKind::HtmlAttributeValue {
            quote,
            parts: value,
        });
        self.cmd(CmdKind::HtmlAttribute {
            name: name.to_string(),
            family,
            value: Some(Box::new(value_node)),
        })
    }

    pub fn param(&self, name: &str, ty: Type, optional: bool) -> ParamDecl {
        ParamDecl {
            name: name.to_string(),
            ty,
            optional,
            default: None,
            injected: false,
        }
    }

    pub fn template(
        &self,
        namespace: &str,
        local: &str,
        content_kind: ContentKind,
        params: Vec<ParamDecl>,
        body: Vec<CmdNode>,
    ) -> TemplateDecl {
        TemplateDecl {
            id: self.ids.next(),
            loc: self.loc(),
            name: QualifiedName::new(namespace, local),
            visibility: Visibility::Public,
            strict_html: true,
            content_kind,
            params,
            body,
        }
    }

    pub fn unit(&self, templates: Vec<TemplateDecl>) -> CompilationUnit {
        CompilationUnit {
            file: Some(self.file.clone()),
            templates,
            imports: Default::default(),
        }
    }
}
