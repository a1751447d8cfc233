//! The HTML context alphabet (spec.md §4.2 "Context alphabet"): the states
//! of an HTML5-tokenizer-derived state machine, augmented with attribute
//! family/quote refinements the autoescaper needs.
//!
//! Attribute family and quoting reuse the AST's own enums (`tpl_core::
//! AttrFamily`/`Quote`) rather than redeclaring them, since an
//! `HtmlAttribute` node's `family` field is exactly what selects the
//! `AttrValue` refinement below.

use std::fmt;
pub use tpl_core::{AttrFamily, Quote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptSubkind {
    Template,
    Regex,
    StringLiteral,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Context {
    Pcdata,
    TagName,
    BeforeAttrName,
    AttrName,
    BeforeAttrValue,
    AttrValue(AttrFamily, Quote),
    /// `title`/`textarea` bodies: raw character data, no markup, but not a
    /// script/style blob either.
    Rcdata(String),
    Script(ScriptSubkind),
    Style,
    Comment,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pcdata => write!(f, "PCDATA"),
            Self::TagName => write!(f, "TAG_NAME"),
            Self::BeforeAttrName => write!(f, "BEFORE_ATTR_NAME"),
            Self::AttrName => write!(f, "ATTR_NAME"),
            Self::BeforeAttrValue => write!(f, "BEFORE_ATTR_VALUE"),
            Self::AttrValue(family, quote) => write!(f, "ATTR_VALUE({family:?}, {quote:?})"),
            Self::Rcdata(tag) => write!(f, "RCDATA({tag})"),
            Self::Script(sub) => write!(f, "SCRIPT({sub:?})"),
            Self::Style => write!(f, "STYLE"),
            Self::Comment => write!(f, "COMMENT"),
        }
    }
}
