//! Semantic core: AST, type lattice, name resolution, type checking, and
//! conformance. Parsing and code generation are external collaborators
//! (spec.md §1); HTML-context analysis and autoescaping live in `tpl-dom`,
//! which depends on this crate's AST and type system.

mod ast;
mod builder;
mod compile;
mod conformance;
mod error;
mod resolve;
mod typecheck;
mod types;

pub use ast::*;
pub use builder::Builder;
pub use compile::{check_units, SemanticResult, UnitAnalysis};
pub use conformance::{check_conformance, Rule, RuleSet};
pub use error::AbortCompilation;
pub use resolve::{resolve_unit, TemplateRegistry, VarBindings};
pub use typecheck::{TypeAnnotations, TypeChecker};
pub use types::{
    is_assignable, is_signature_assignable, ContentKind, ProtoRegistry, SigParam, TagRefinement,
    TemplateSignature, Type,
};
