// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name resolution for forward references.
//!
//! Descriptors refer to named types with [`crate::descriptor::TypeDescriptor::reference`]; this
//! is how a record mentions itself or a type declared later. The
//! [`TypeResolver`] supplies those names during normalization.

use crate::descriptor::{TypeKind, TypeRef};
use std::collections::HashMap;

/// Registry that resolves type names to their descriptors.
pub trait TypeResolver {
    /// Look up a descriptor by name.
    ///
    /// Returns `None` if the name is unknown.
    fn resolve(&self, name: &str) -> Option<&TypeRef>;
}

/// Simple [`HashMap`]-backed [`TypeResolver`].
#[derive(Debug, Default, Clone)]
pub struct TypeContext {
    types: HashMap<String, TypeRef>,
}

impl TypeContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, ty: TypeRef) {
        self.types.insert(name.into(), ty);
    }

    /// Register a descriptor under `name` (builder style).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.register(name, ty);
        self
    }

    /// Register a record or enum under its own name.
    ///
    /// Returns `false` (and registers nothing) for unnamed kinds.
    pub fn register_named(&mut self, ty: TypeRef) -> bool {
        let name = match &ty.kind {
            TypeKind::Record(r) => r.name.clone(),
            TypeKind::Enum(e) => e.name.clone(),
            _ => return false,
        };
        self.register(name, ty);
        true
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeResolver for TypeContext {
    fn resolve(&self, name: &str) -> Option<&TypeRef> {
        self.types.get(name)
    }
}

impl FromIterator<(String, TypeRef)> for TypeContext {
    fn from_iter<I: IntoIterator<Item = (String, TypeRef)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EnumBuilder, RecordBuilder, TypeDescriptor};

    #[test]
    fn test_register_named() {
        let mut ctx = TypeContext::new();
        assert!(ctx.register_named(RecordBuilder::new("Node").build()));
        assert!(ctx.register_named(EnumBuilder::new("Color").member("RED").build()));
        assert!(!ctx.register_named(TypeDescriptor::int()));
        assert_eq!(ctx.len(), 2);
        assert!(ctx.resolve("Node").is_some());
        assert!(ctx.resolve("Missing").is_none());
    }
}
