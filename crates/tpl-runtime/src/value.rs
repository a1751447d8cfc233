//! Runtime values (spec.md §3 data model, as consumed by the rendering
//! runtime after code generation has resolved expressions to concrete
//! data). Sanitized values carry the content kind they were ordained with
//! so the round-trip operations named in spec.md §8 (`ordainAsSafe` /
//! `getString`) have a concrete home.

use indexmap::IndexMap;
use tpl_core::{ContentKind, Type};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<Value, Value>),
    Record(IndexMap<String, Value>),
    /// A value of a sanitized content kind (spec.md Glossary "Ordain"): an
    /// untrusted string wrapped as safe for a given kind by a trusted
    /// producer.
    Sanitized { kind: ContentKind, content: String },
}

// `Value` is used as a map key (`map<K,V>`, spec.md §3), so it needs
// `Eq`/`Hash`. Floats break strict `Eq`, so keys are compared/hashed by
// their rendered bit pattern; this only matters when a caller actually
// builds a `map<float, _>`, which the type checker allows but the source
// language rarely produces.
impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null | Value::Undefined => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::List(items) => items.hash(state),
            Value::Map(entries) => {
                for (k, v) in entries {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Record(fields) => {
                for (k, v) in fields {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Sanitized { kind, content } => {
                (*kind as u8 as usize, content.as_str()).hash(state)
            }
        }
    }
}

impl Value {
    /// `ordainAsSafe(s, K)` (spec.md §6, §8 round-trip): wraps an untrusted
    /// string as a value of sanitized kind `K`. Unsafe in the sense the
    /// type system describes — the caller vouches the string is already
    /// safe for `K`'s syntactic contexts.
    pub fn ordain_as_safe(content: impl Into<String>, kind: ContentKind) -> Value {
        Value::Sanitized {
            kind,
            content: content.into(),
        }
    }

    /// `getString()` (spec.md §8 round-trip): the underlying string of a
    /// sanitized value, or the plain string contents of a `string` value.
    /// Any other value kind has no single string representation.
    pub fn get_string(&self) -> Option<&str> {
        match self {
            Value::Sanitized { content, .. } => Some(content),
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn content_kind(&self) -> Option<ContentKind> {
        match self {
            Value::Sanitized { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Sanitized { .. } => "sanitized",
        }
    }

    /// A runtime type-assertion check (spec.md §7 `TypeAssertionFailed`):
    /// verifies a dynamically-typed (`?`) value actually conforms to its
    /// declared static type at a runtime check boundary — e.g. an injected
    /// parameter whose declared type the caller cannot be statically
    /// trusted to have honored.
    pub fn assert_type(&self, expected: &Type) -> Result<(), (String, String)> {
        let ok = match (self, expected) {
            (_, Type::Dynamic) => true,
            (Value::Null, t) => t.accepts_null(),
            (Value::Undefined, Type::Undefined) => true,
            (Value::Bool(_), Type::Bool) => true,
            (Value::Int(_), Type::Int | Type::Number | Type::Float) => true,
            (Value::Float(_), Type::Float | Type::Number) => true,
            (Value::String(_), Type::String) => true,
            (Value::Sanitized { kind, .. }, Type::Content(expected_kind)) => {
                kind.is_subtype_of(*expected_kind)
            }
            (Value::List(items), Type::List(elem)) => {
                return items
                    .iter()
                    .try_for_each(|item| item.assert_type(elem));
            }
            (Value::Map(entries), Type::Map(k, v)) => {
                return entries.iter().try_for_each(|(key, val)| {
                    key.assert_type(k)?;
                    val.assert_type(v)
                });
            }
            (Value::Record(fields), Type::Record(decl)) => {
                return decl.iter().try_for_each(|(name, ty)| match fields.get(name) {
                    Some(v) => v.assert_type(ty),
                    None => Err((
                        format!("field {name}: {ty}"),
                        "record missing that field".to_string(),
                    )),
                });
            }
            (v, Type::Union(members)) => members.iter().any(|m| v.assert_type(m).is_ok()),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err((expected.to_string(), self.type_name().to_string()))
        }
    }
}

