//! The AST (spec.md §3 "AST node"): a tagged variant over expression and
//! command kinds. Nodes are immutable after the parser (an external
//! collaborator, spec.md §1) builds them; passes attach results to a
//! per-node-identity side table instead of mutating the tree (spec.md §9
//! "Tree mutation & annotation").

use crate::types::{ContentKind, Type};
use tpl_shared::{NodeId, SourceLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode {
    pub id: NodeId,
    pub loc: SourceLocation,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: ExprNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    NullLit,
    UndefinedLit,
    BoolLit(bool),
    IntLit(i64),
    FloatLit(f64),
    StringLit(String),
    ListLit(Vec<ExprNode>),
    MapLit(Vec<(ExprNode, ExprNode)>),
    RecordLit(Vec<(String, ExprNode)>),
    VarRef(String),
    Field {
        base: Box<ExprNode>,
        field: String,
    },
    Index {
        base: Box<ExprNode>,
        index: Box<ExprNode>,
    },
    /// A call to a built-in or registered function, e.g. `length($xs)`.
    /// Template-to-template calls are a command (`CmdKind::Call`), not an
    /// expression, per spec.md §3.
    Call {
        callee: String,
        args: Vec<ExprNode>,
    },
    /// A reference to a template by name used as a first-class value, whose
    /// static type is the template's signature.
    TemplateRef(String),
    /// `bind(tpl, record)`: partially applies a template's parameters.
    Bind {
        template: Box<ExprNode>,
        record: Box<ExprNode>,
    },
    Ternary {
        cond: Box<ExprNode>,
        then_branch: Box<ExprNode>,
        else_branch: Box<ExprNode>,
    },
    Binary {
        op: BinOp,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    Unary {
        op: UnOp,
        operand: Box<ExprNode>,
    },
}

/// `{call tpl}{param n: v /}{/call}`-style parameter passed at a call site,
/// or the `data="all"` forwarding form.
#[derive(Debug, Clone, PartialEq)]
pub enum CallParam {
    Named { name: String, value: ExprNode },
    DataAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    None,
    Single,
    Double,
}

/// The attribute "family" that governs which directives an autoescaper
/// slot requires (spec.md §4.2 "Context alphabet").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrFamily {
    Normal,
    Uri,
    TrustedResourceUri,
    ScriptSrc,
    Style,
    Js,
    EventHandler,
}

/// A message placeholder or raw text run inside a `{msg}` command
/// (spec.md §4.5 "Message rendering").
#[derive(Debug, Clone, PartialEq)]
pub enum MsgPart {
    Raw(String),
    Placeholder { name: String, value: ExprNode },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CmdNode {
    pub id: NodeId,
    pub loc: SourceLocation,
    pub kind: CmdKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CmdKind {
    /// `{@param name: Type}` / `{@inject name: Type}` declarations appear as
    /// statements at the top of a template body in source form.
    Param(ParamDecl),
    Let {
        name: String,
        /// Present for the inline form `{let $x: expr /}`; absent for the
        /// block form `{let $x}...{/let}`, where `body` supplies the value.
        value: Option<ExprNode>,
        body: Vec<CmdNode>,
    },
    If {
        /// `None` condition marks the trailing `else` branch.
        branches: Vec<(Option<ExprNode>, Vec<CmdNode>)>,
    },
    For {
        var: String,
        index_var: Option<String>,
        list_expr: ExprNode,
        body: Vec<CmdNode>,
    },
    Switch {
        expr: ExprNode,
        cases: Vec<(Vec<ExprNode>, Vec<CmdNode>)>,
        default: Option<Vec<CmdNode>>,
    },
    Call {
        template: String,
        params: Vec<CallParam>,
    },
    Msg {
        desc: String,
        parts: Vec<MsgPart>,
    },
    /// A dynamic print site: the one place the autoescaper must decide an
    /// escaping pipeline for (spec.md §4.3).
    Print {
        expr: ExprNode,
        /// Author-written directive ("pipe") names applied at this print
        /// site, e.g. `{$x|noAutoescape}` (spec.md §4.4
        /// `banned_directive(pipe_name)`). Distinct from the directive list
        /// the autoescaper computes, which lives in `tpl_dom`'s side table.
        directives: Vec<String>,
    },
    RawText(String),
    HtmlOpenTag {
        name: String,
        self_closing: bool,
    },
    HtmlCloseTag {
        name: String,
    },
    HtmlAttribute {
        name: String,
        family: AttrFamily,
        value: Option<Box<CmdNode>>,
    },
    HtmlAttributeValue {
        quote: Quote,
        parts: Vec<CmdNode>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
    pub default: Option<ExprNode>,
    pub injected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub namespace: String,
    pub local: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    pub fn fully_qualified(&self) -> String {
        format!("{}.{}", self.namespace, self.local)
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fully_qualified())
    }
}

/// A compiled template: name-qualified, with a signature, body, and
/// content kind (spec.md §3 "Template").
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDecl {
    pub id: NodeId,
    pub loc: SourceLocation,
    pub name: QualifiedName,
    pub visibility: Visibility,
    pub strict_html: bool,
    pub content_kind: ContentKind,
    pub params: Vec<ParamDecl>,
    pub body: Vec<CmdNode>,
}

impl TemplateDecl {
    pub fn param(&self, name: &str) -> Option<&ParamDecl> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// A whole compilation unit: every template declared in one file, plus the
/// aliases it imports from other files (spec.md §4 intro: name resolution
/// "resolves imports between template files").
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompilationUnit {
    pub file: Option<tpl_shared::FileId>,
    pub templates: Vec<TemplateDecl>,
    /// alias -> namespace it refers to, e.g. `import "foo.bar" as f`.
    pub imports: std::collections::HashMap<String, String>,
}
