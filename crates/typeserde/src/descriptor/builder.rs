// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for records, enums and signatures.

use crate::descriptor::{
    Bindings, EnumDescriptor, EnumMember, EnumValue, FieldDescriptor, Parameter,
    RecordDescriptor, Signature, TypeDescriptor, TypeKind, TypeRef,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Builder for record descriptors.
///
/// # Panics
///
/// [`RecordBuilder::build`] panics on a repeated field name: the field list
/// is static schema, so a duplicate is a programming error.
#[derive(Debug)]
pub struct RecordBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    bindings: Bindings,
}

impl RecordBuilder {
    /// Create a new builder for a record type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            bindings: Bindings::new(),
        }
    }

    /// Add a field.
    pub fn field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(FieldDescriptor::new(name, ty));
        self
    }

    /// Add a nullable field (`Optional[ty]`).
    pub fn optional_field(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.field(name, TypeDescriptor::optional(ty))
    }

    /// Bind a generic parameter used by the field types.
    pub fn bind(mut self, var: impl Into<String>, ty: TypeRef) -> Self {
        self.bindings.insert(var.into(), ty);
        self
    }

    /// Build the record descriptor.
    pub fn build(self) -> TypeRef {
        let mut seen = HashSet::new();
        for field in &self.fields {
            assert!(
                seen.insert(field.name.as_str()),
                "record `{}` declares field `{}` twice",
                self.name,
                field.name
            );
        }
        TypeDescriptor::new(TypeKind::Record(RecordDescriptor {
            name: self.name,
            fields: self.fields,
            bindings: self.bindings,
        }))
    }
}

/// Builder for enum types.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    members: Vec<EnumMember>,
    next_value: i64,
}

impl EnumBuilder {
    /// Create a new enum builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            next_value: 0,
        }
    }

    /// Add a member with auto-incrementing integer value.
    pub fn member(mut self, name: impl Into<String>) -> Self {
        let value = self.next_value;
        self.next_value += 1;
        self.members.push(EnumMember {
            name: name.into(),
            value: EnumValue::Int(value),
        });
        self
    }

    /// Add a member with an explicit value.
    pub fn member_with_value(mut self, name: impl Into<String>, value: impl Into<EnumValue>) -> Self {
        let value = value.into();
        if let EnumValue::Int(v) = value {
            self.next_value = v + 1;
        }
        self.members.push(EnumMember {
            name: name.into(),
            value,
        });
        self
    }

    /// Build the enum descriptor.
    pub fn build(self) -> TypeRef {
        TypeDescriptor::new(TypeKind::Enum(EnumDescriptor {
            name: self.name,
            members: self.members,
        }))
    }
}

/// Builder for callable signatures.
#[derive(Debug)]
pub struct SignatureBuilder {
    signature: Signature,
}

impl SignatureBuilder {
    /// Create a builder for a free function.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            signature: Signature {
                name: name.into(),
                positional: Vec::new(),
                varargs: None,
                keyword_only: Vec::new(),
                varkw: None,
                returns: None,
                is_method: false,
                bindings: Bindings::new(),
            },
        }
    }

    /// Create a builder for a method; adds the unannotated `self` receiver.
    pub fn method(name: impl Into<String>) -> Self {
        let mut builder = Self::new(name);
        builder.signature.is_method = true;
        builder
            .signature
            .positional
            .push(Parameter::new("self", None));
        builder
    }

    /// Add an annotated positional-or-keyword parameter.
    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.signature
            .positional
            .push(Parameter::new(name, Some(ty)));
        self
    }

    /// Add a positional parameter without annotation.
    pub fn untyped_param(mut self, name: impl Into<String>) -> Self {
        self.signature.positional.push(Parameter::new(name, None));
        self
    }

    /// Set the `*args` absorber.
    pub fn varargs(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.signature.varargs = Some(Parameter::new(name, Some(ty)));
        self
    }

    /// Add a keyword-only parameter.
    pub fn keyword_only(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.signature
            .keyword_only
            .push(Parameter::new(name, Some(ty)));
        self
    }

    /// Set the `**kwargs` absorber.
    pub fn varkw(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.signature.varkw = Some(Parameter::new(name, Some(ty)));
        self
    }

    /// Set the return annotation.
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.signature.returns = Some(ty);
        self
    }

    /// Bind a generic parameter of the owning type.
    pub fn bind(mut self, var: impl Into<String>, ty: TypeRef) -> Self {
        self.signature.bindings.insert(var.into(), ty);
        self
    }

    /// Build the signature.
    pub fn build(self) -> Arc<Signature> {
        Arc::new(self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let point = RecordBuilder::new("Point")
            .field("x", TypeDescriptor::int())
            .optional_field("label", TypeDescriptor::string())
            .build();
        assert_eq!(point.field_names(), Some(vec!["x", "label"]));
        assert_eq!(point.to_string(), "Point");
    }

    #[test]
    #[should_panic(expected = "declares field `x` twice")]
    fn test_record_builder_rejects_duplicates() {
        RecordBuilder::new("Bad")
            .field("x", TypeDescriptor::int())
            .field("x", TypeDescriptor::string())
            .build();
    }

    #[test]
    fn test_enum_builder_values() {
        let color = EnumBuilder::new("Color")
            .member("RED")
            .member_with_value("GREEN", 5)
            .member("BLUE")
            .member_with_value("OTHER", "other")
            .build();
        let TypeKind::Enum(e) = &color.kind else {
            panic!("expected enum");
        };
        assert_eq!(e.member("RED").map(|m| &m.value), Some(&EnumValue::Int(0)));
        assert_eq!(e.member("BLUE").map(|m| &m.value), Some(&EnumValue::Int(6)));
        assert_eq!(
            e.member_by_value(&EnumValue::from("other")).map(|m| m.name.as_str()),
            Some("OTHER")
        );
    }

    #[test]
    fn test_signature_builder_method() {
        let sig = SignatureBuilder::method("Svc.get")
            .param("key", TypeDescriptor::string())
            .varkw("options", TypeDescriptor::boolean())
            .build();
        assert!(sig.is_method);
        assert_eq!(sig.positional[0].name, "self");
        assert_eq!(sig.declared_positional().len(), 1);
        let ty = TypeDescriptor::callable_args(sig);
        assert_eq!(ty.varkw_name(), Some("options"));
        assert_eq!(ty.varargs_name(), None);
    }
}
