//! The algebraic type lattice (spec.md §3 "Type lattice").

use indexmap::IndexMap;
use std::fmt;

/// A sanitized content kind: a syntactic category a value can be ordained
/// into, governing safe-interpolation rules (spec.md Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Html,
    HtmlElement,
    Attributes,
    Css,
    Uri,
    TrustedResourceUri,
    Js,
    Text,
}

impl ContentKind {
    /// `html_element` is a strict subtype of `html`; every other kind is
    /// only ever equal to itself (spec.md §3 "Type lattice").
    pub fn is_subtype_of(self, other: ContentKind) -> bool {
        self == other || (self == ContentKind::HtmlElement && other == ContentKind::Html)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Html => "html",
            Self::HtmlElement => "html_element",
            Self::Attributes => "attributes",
            Self::Css => "css",
            Self::Uri => "uri",
            Self::TrustedResourceUri => "trusted_resource_uri",
            Self::Js => "js",
            Self::Text => "text",
        };
        write!(f, "{s}")
    }
}

/// An element-tag refinement of `html<tag>`. `Any` is the top refinement
/// `html<?>`, assignable from/to any concrete tag refinement as far as the
/// lattice's join goes, but a concrete tag is still required to be an exact
/// match of another concrete tag to be mutually assignable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagRefinement {
    Tag(String),
    Any,
}

impl fmt::Display for TagRefinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, "html<{tag}>"),
            Self::Any => write!(f, "html<?>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSignature {
    pub params: Vec<SigParam>,
    pub return_kind: ContentKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SigParam {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Null,
    Undefined,
    Bool,
    Int,
    Float,
    /// `int ∪ float`, the declared type of an arithmetic expression whose
    /// operands could be either.
    Number,
    String,
    Content(ContentKind),
    HtmlTag(TagRefinement),
    List(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Record(IndexMap<String, Type>),
    /// References an externally-registered proto schema by name; the
    /// schema's field types are not modeled here (the schema registry is an
    /// external collaborator per spec.md §1).
    Proto(String),
    Union(Vec<Type>),
    Template(Box<TemplateSignature>),
    /// The dynamic/unknown type `?`.
    Dynamic,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Undefined => write!(f, "undefined"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Content(k) => write!(f, "{k}"),
            Self::HtmlTag(r) => write!(f, "{r}"),
            Self::List(t) => write!(f, "list<{t}>"),
            Self::Map(k, v) => write!(f, "map<{k},{v}>"),
            Self::Record(fields) => {
                write!(f, "record{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                write!(f, "}}")
            }
            Self::Proto(name) => write!(f, "proto<{name}>"),
            Self::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
            Self::Template(sig) => {
                write!(f, "(")?;
                for (i, p) in sig.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", p.name, p.ty)?;
                }
                write!(f, ") => {}", sig.return_kind)
            }
            Self::Dynamic => write!(f, "?"),
        }
    }
}

impl Type {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this type's value set includes `null` (a nullable union
    /// member, or `?` itself).
    pub fn accepts_null(&self) -> bool {
        match self {
            Self::Dynamic | Self::Null => true,
            Self::Union(members) => members.iter().any(Type::accepts_null),
            _ => false,
        }
    }

    fn content_kind(&self) -> Option<ContentKind> {
        match self {
            Self::Content(k) => Some(*k),
            Self::HtmlTag(_) => Some(ContentKind::HtmlElement),
            _ => None,
        }
    }
}

/// `from` is assignable to `to` under spec.md §3/§4.1's rules.
pub fn is_assignable(from: &Type, to: &Type) -> bool {
    if from == to {
        return true;
    }
    if from.is_dynamic() || to.is_dynamic() {
        return true;
    }
    if from.is_null() && to.accepts_null() {
        return true;
    }
    // numeric widening int -> float is implicit, one direction only.
    if matches!(from, Type::Int) && matches!(to, Type::Float) {
        return true;
    }
    if matches!(from, Type::Int | Type::Float) && matches!(to, Type::Number) {
        return true;
    }
    if matches!(from, Type::Number) && matches!(to, Type::Number) {
        return true;
    }

    // element-tag refinements: `html<?>` is the top refinement, accepting
    // and accepted by any concrete tag; two concrete tags are only mutually
    // assignable when they name the same tag.
    if let (Type::HtmlTag(from_tag), Type::HtmlTag(to_tag)) = (from, to) {
        return match to_tag {
            TagRefinement::Any => true,
            TagRefinement::Tag(_) => from_tag == to_tag,
        };
    }

    // sanitized content kinds: html_element/html<tag> assignable to html,
    // no other direction without an explicit cast/ordain.
    if let (Some(from_kind), Some(to_kind)) = (from.content_kind(), to.content_kind()) {
        return from_kind.is_subtype_of(to_kind);
    }

    match (from, to) {
        (Type::List(a), Type::List(b)) => is_assignable(a, b),
        (Type::Map(ak, av), Type::Map(bk, bv)) => is_assignable(ak, bk) && is_assignable(av, bv),
        (Type::Record(a), Type::Record(b)) => {
            // a record is assignable to another record type if every field
            // the target declares is present in the source with an
            // assignable type (structural width subtyping).
            b.iter().all(|(name, bt)| {
                a.get(name)
                    .map(|at| is_assignable(at, bt))
                    .unwrap_or(false)
            })
        }
        (from, Type::Union(members)) => members.iter().any(|m| is_assignable(from, m)),
        (Type::Union(members), to) => members.iter().all(|m| is_assignable(m, to)),
        (Type::Template(a), Type::Template(b)) => is_signature_assignable(a, b),
        _ => false,
    }
}

/// A template-signature type `A` is assignable to `B` (i.e. a value typed
/// `A` can be used where `B` is expected) when it is covariant in its
/// return kind and contravariant in its positional parameter types
/// (spec.md §3 "Template-signature types").
pub fn is_signature_assignable(from: &TemplateSignature, to: &TemplateSignature) -> bool {
    if from.params.len() != to.params.len() {
        return false;
    }
    if !from.return_kind.is_subtype_of(to.return_kind) {
        return false;
    }
    from.params
        .iter()
        .zip(&to.params)
        .all(|(from_p, to_p)| is_assignable(&to_p.ty, &from_p.ty))
}

/// Field types for externally-registered proto schemas (spec.md §3
/// "proto<M> referring to an externally-registered schema"). The schema
/// source itself (a `.proto` file, a descriptor set) is an external
/// collaborator; this registry is just the lookup surface the type checker
/// consumes.
#[derive(Debug, Default, Clone)]
pub struct ProtoRegistry {
    schemas: IndexMap<String, IndexMap<String, Type>>,
}

impl ProtoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, fields: IndexMap<String, Type>) {
        self.schemas.insert(name.into(), fields);
    }

    pub fn field_type(&self, proto_name: &str, field: &str) -> Option<&Type> {
        self.schemas.get(proto_name)?.get(field)
    }
}
