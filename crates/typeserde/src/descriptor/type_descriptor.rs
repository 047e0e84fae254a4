// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a descriptor. Descriptors are immutable once built.
pub type TypeRef = Arc<TypeDescriptor>;

/// Generic parameter bindings of an instantiated record or signature.
pub type Bindings = BTreeMap<String, TypeRef>;

/// Atomic wire kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomKind {
    Int,
    Str,
    Bool,
    Float,
}

impl AtomKind {
    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Float => "float",
        }
    }
}

/// Type kind enumeration.
///
/// `Ref`, `Var` and `JointTag` only appear in raw descriptors; normalization
/// replaces or strips them before rule dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Atom(AtomKind),
    Bytes,
    None,
    Uuid,
    DateTime,
    List(TypeRef),
    Tuple(Vec<TypeRef>),
    Dict(TypeRef, TypeRef),
    Enum(EnumDescriptor),
    Record(RecordDescriptor),
    /// Raw union; a `None` tail means optional, a `JointTag` tail means joint.
    Union(Vec<TypeRef>),
    Optional(TypeRef),
    Joint(TypeRef),
    CallableArgs(Arc<Signature>),
    CallableReturn(Arc<Signature>),
    /// Forward reference to a named type.
    Ref(String),
    /// Generic type variable.
    Var(String),
    /// Tail marker of a joint union.
    JointTag,
}

/// Flat discriminant of [`TypeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Atom,
    Bytes,
    None,
    Uuid,
    DateTime,
    List,
    Tuple,
    Dict,
    Enum,
    Record,
    Union,
    Optional,
    Joint,
    CallableArgs,
    CallableReturn,
    Ref,
    Var,
    JointTag,
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDescriptor {
    /// Type kind.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Create a new shared descriptor.
    pub fn new(kind: TypeKind) -> TypeRef {
        Arc::new(Self { kind })
    }

    pub fn atom(kind: AtomKind) -> TypeRef {
        Self::new(TypeKind::Atom(kind))
    }

    pub fn int() -> TypeRef {
        Self::atom(AtomKind::Int)
    }

    pub fn string() -> TypeRef {
        Self::atom(AtomKind::Str)
    }

    pub fn boolean() -> TypeRef {
        Self::atom(AtomKind::Bool)
    }

    pub fn float() -> TypeRef {
        Self::atom(AtomKind::Float)
    }

    pub fn bytes() -> TypeRef {
        Self::new(TypeKind::Bytes)
    }

    pub fn none() -> TypeRef {
        Self::new(TypeKind::None)
    }

    pub fn uuid() -> TypeRef {
        Self::new(TypeKind::Uuid)
    }

    pub fn datetime() -> TypeRef {
        Self::new(TypeKind::DateTime)
    }

    pub fn list(element: TypeRef) -> TypeRef {
        Self::new(TypeKind::List(element))
    }

    pub fn tuple(elements: Vec<TypeRef>) -> TypeRef {
        Self::new(TypeKind::Tuple(elements))
    }

    pub fn dict(key: TypeRef, value: TypeRef) -> TypeRef {
        Self::new(TypeKind::Dict(key, value))
    }

    /// Raw union of `members`, normalized later.
    pub fn union(members: Vec<TypeRef>) -> TypeRef {
        Self::new(TypeKind::Union(members))
    }

    /// `Optional[inner]`, expressed as the raw union `Union[inner, None]`.
    pub fn optional(inner: TypeRef) -> TypeRef {
        Self::union(vec![inner, Self::none()])
    }

    /// `Joint[members...]`, expressed as the raw union `Union[members..., JointTag]`.
    pub fn joint(mut members: Vec<TypeRef>) -> TypeRef {
        members.push(Self::new(TypeKind::JointTag));
        Self::union(members)
    }

    /// Forward reference resolved against the engine's type context.
    pub fn reference(name: impl Into<String>) -> TypeRef {
        Self::new(TypeKind::Ref(name.into()))
    }

    /// Generic type variable resolved against the active bindings.
    pub fn var(name: impl Into<String>) -> TypeRef {
        Self::new(TypeKind::Var(name.into()))
    }

    pub fn callable_args(signature: Arc<Signature>) -> TypeRef {
        Self::new(TypeKind::CallableArgs(signature))
    }

    pub fn callable_return(signature: Arc<Signature>) -> TypeRef {
        Self::new(TypeKind::CallableReturn(signature))
    }

    /// Flat discriminant of this descriptor.
    pub fn kind_tag(&self) -> Kind {
        match &self.kind {
            TypeKind::Atom(_) => Kind::Atom,
            TypeKind::Bytes => Kind::Bytes,
            TypeKind::None => Kind::None,
            TypeKind::Uuid => Kind::Uuid,
            TypeKind::DateTime => Kind::DateTime,
            TypeKind::List(_) => Kind::List,
            TypeKind::Tuple(_) => Kind::Tuple,
            TypeKind::Dict(..) => Kind::Dict,
            TypeKind::Enum(_) => Kind::Enum,
            TypeKind::Record(_) => Kind::Record,
            TypeKind::Union(_) => Kind::Union,
            TypeKind::Optional(_) => Kind::Optional,
            TypeKind::Joint(_) => Kind::Joint,
            TypeKind::CallableArgs(_) => Kind::CallableArgs,
            TypeKind::CallableReturn(_) => Kind::CallableReturn,
            TypeKind::Ref(_) => Kind::Ref,
            TypeKind::Var(_) => Kind::Var,
            TypeKind::JointTag => Kind::JointTag,
        }
    }

    /// Child descriptors in declaration order.
    ///
    /// For records these are the field types (parallel to [`Self::field_names`]);
    /// for callables, the annotated parameter types in declaration order.
    pub fn element_types(&self) -> Vec<TypeRef> {
        match &self.kind {
            TypeKind::List(e) | TypeKind::Optional(e) | TypeKind::Joint(e) => vec![e.clone()],
            TypeKind::Tuple(items) | TypeKind::Union(items) => items.clone(),
            TypeKind::Dict(k, v) => vec![k.clone(), v.clone()],
            TypeKind::Record(r) => r.fields.iter().map(|f| f.ty.clone()).collect(),
            TypeKind::CallableArgs(sig) => sig
                .parameters()
                .filter_map(|p| p.annotation.clone())
                .collect(),
            TypeKind::CallableReturn(sig) => sig.returns.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Field names of a record.
    pub fn field_names(&self) -> Option<Vec<&str>> {
        match &self.kind {
            TypeKind::Record(r) => Some(r.fields.iter().map(|f| f.name.as_str()).collect()),
            _ => None,
        }
    }

    /// Whether a callable takes an implicit receiver.
    pub fn is_method(&self) -> bool {
        self.signature().is_some_and(|s| s.is_method)
    }

    /// Name of the parameter absorbing extra positional arguments.
    pub fn varargs_name(&self) -> Option<&str> {
        self.signature()?.varargs.as_ref().map(|p| p.name.as_str())
    }

    /// Name of the parameter absorbing extra keyword arguments.
    pub fn varkw_name(&self) -> Option<&str> {
        self.signature()?.varkw.as_ref().map(|p| p.name.as_str())
    }

    /// Record payload, if this is a record.
    pub fn as_record(&self) -> Option<&RecordDescriptor> {
        match &self.kind {
            TypeKind::Record(r) => Some(r),
            _ => None,
        }
    }

    fn signature(&self) -> Option<&Signature> {
        match &self.kind {
            TypeKind::CallableArgs(sig) | TypeKind::CallableReturn(sig) => Some(sig),
            _ => None,
        }
    }

    /// Check if this is the null type.
    pub fn is_none(&self) -> bool {
        matches!(self.kind, TypeKind::None)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Atom(a) => f.write_str(a.name()),
            TypeKind::Bytes => f.write_str("bytes"),
            TypeKind::None => f.write_str("None"),
            TypeKind::Uuid => f.write_str("UUID"),
            TypeKind::DateTime => f.write_str("datetime"),
            TypeKind::List(e) => write!(f, "List[{}]", e),
            TypeKind::Tuple(items) => write_params(f, "Tuple", items),
            TypeKind::Dict(k, v) => write!(f, "Dict[{}, {}]", k, v),
            TypeKind::Enum(e) => f.write_str(&e.name),
            TypeKind::Record(r) => {
                f.write_str(&r.name)?;
                write_bindings(f, &r.bindings)
            }
            TypeKind::Union(members) => write_params(f, "Union", members),
            TypeKind::Optional(inner) => write!(f, "Optional[{}]", inner),
            TypeKind::Joint(inner) => write!(f, "Joint[{}]", inner),
            TypeKind::CallableArgs(sig) => write!(f, "Args[{}]", sig.name),
            TypeKind::CallableReturn(sig) => write!(f, "Return[{}]", sig.name),
            TypeKind::Ref(name) => write!(f, "'{}'", name),
            TypeKind::Var(name) => write!(f, "~{}", name),
            TypeKind::JointTag => f.write_str("JointTag"),
        }
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, head: &str, items: &[TypeRef]) -> fmt::Result {
    write!(f, "{}[", head)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

fn write_bindings(f: &mut fmt::Formatter<'_>, bindings: &Bindings) -> fmt::Result {
    if bindings.is_empty() {
        return Ok(());
    }
    f.write_str("[")?;
    for (i, (name, ty)) in bindings.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}={}", name, ty)?;
    }
    f.write_str("]")
}

/// Field descriptor for record members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Named-tuple-like record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordDescriptor {
    /// Record kind name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Generic instantiation; field types resolve their variables here.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: Bindings,
}

impl RecordDescriptor {
    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Underlying value of an enum member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Int(i64),
    Str(String),
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Str(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<i64> for EnumValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for EnumValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for EnumValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Enum member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: EnumValue,
}

/// Enumeration type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// Enum name.
    pub name: String,
    /// Members in declaration order.
    pub members: Vec<EnumMember>,
}

impl EnumDescriptor {
    /// Get member by name.
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Get member by underlying value.
    pub fn member_by_value(&self, value: &EnumValue) -> Option<&EnumMember> {
        self.members.iter().find(|m| &m.value == value)
    }
}

/// Callable parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Declared type; `None` when the parameter is unannotated.
    #[serde(default)]
    pub annotation: Option<TypeRef>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, annotation: Option<TypeRef>) -> Self {
        Self {
            name: name.into(),
            annotation,
        }
    }
}

/// Declared signature of a remotely callable function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Qualified callable name, used in diagnostics.
    pub name: String,
    /// Positional-or-keyword parameters, receiver included when `is_method`.
    #[serde(default)]
    pub positional: Vec<Parameter>,
    /// Absorber of extra positional arguments.
    #[serde(default)]
    pub varargs: Option<Parameter>,
    /// Parameters accepted by keyword only.
    #[serde(default)]
    pub keyword_only: Vec<Parameter>,
    /// Absorber of extra keyword arguments.
    #[serde(default)]
    pub varkw: Option<Parameter>,
    /// Return annotation.
    #[serde(default)]
    pub returns: Option<TypeRef>,
    /// First positional parameter is an implicit receiver.
    #[serde(default)]
    pub is_method: bool,
    /// Generic instantiation of the owning type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: Bindings,
}

impl Signature {
    /// Positional parameters callers supply (receiver skipped).
    pub fn declared_positional(&self) -> &[Parameter] {
        if self.is_method && !self.positional.is_empty() {
            &self.positional[1..]
        } else {
            &self.positional
        }
    }

    /// Every parameter callers supply, in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.declared_positional()
            .iter()
            .chain(self.varargs.iter())
            .chain(self.keyword_only.iter())
            .chain(self.varkw.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let ty = TypeDescriptor::list(TypeDescriptor::dict(
            TypeDescriptor::string(),
            TypeDescriptor::optional(TypeDescriptor::int()),
        ));
        assert_eq!(ty.to_string(), "List[Dict[str, Union[int, None]]]");
    }

    #[test]
    fn test_joint_appends_tag() {
        let ty = TypeDescriptor::joint(vec![TypeDescriptor::reference("A")]);
        match &ty.kind {
            TypeKind::Union(members) => {
                assert_eq!(members.len(), 2);
                assert_eq!(members[1].kind_tag(), Kind::JointTag);
            }
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_structural_equality() {
        let a = TypeDescriptor::list(TypeDescriptor::int());
        let b = TypeDescriptor::list(TypeDescriptor::int());
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_declared_positional_skips_receiver() {
        let sig = Signature {
            name: "svc.ping".into(),
            positional: vec![
                Parameter::new("self", None),
                Parameter::new("n", Some(TypeDescriptor::int())),
            ],
            varargs: None,
            keyword_only: Vec::new(),
            varkw: None,
            returns: None,
            is_method: true,
            bindings: Bindings::new(),
        };
        let names: Vec<_> = sig.declared_positional().iter().map(|p| &p.name).collect();
        assert_eq!(names, ["n"]);
        let ty = TypeDescriptor::callable_args(Arc::new(sig));
        assert!(ty.is_method());
        assert_eq!(ty.element_types().len(), 1);
    }

    #[test]
    fn test_schema_from_json() {
        let json = r#"{"list": {"dict": [{"atom": "str"}, {"union": [{"atom": "int"}, "none"]}]}}"#;
        let ty: TypeDescriptor = serde_json::from_str(json).expect("parse schema");
        assert_eq!(ty.to_string(), "List[Dict[str, Union[int, None]]]");
    }
}
