//! HTML-context visitor, contextual autoescaper, and built-in
//! function/directive registry (spec.md §4.2, §4.3, §6), layered on top of
//! `tpl-core`'s generic AST, type lattice, and diagnostics.

mod context;
mod escaper;
mod registry;
mod visitor;

pub use context::{AttrFamily, Context, Quote, ScriptSubkind};
pub use escaper::{directives_for, elide_redundant, escape_unit, DirectiveList, EscapeAnnotations, InputKind};
pub use registry::{Arity, BuiltinFunction, BuiltinRegistry, Directive, SafetyDescriptor};
pub use visitor::{visit_unit, ContextAnnotations};
