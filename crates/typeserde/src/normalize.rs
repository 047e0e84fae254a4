// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor normalization.
//!
//! Turns a raw descriptor into the canonical form rules dispatch on:
//!
//! - forward references resolve through the [`TypeResolver`]
//! - generic variables resolve through the active [`Bindings`]
//! - unions are flattened, de-duplicated and tail-stripped into
//!   `Optional`, `Joint` or a plain `Union`
//!
//! Structural kinds (lists, tuples, dicts, unions) normalize deeply. Nominal
//! kinds (records, enums, signatures) stop at their own boundary: only their
//! generic bindings are normalized here, their field and parameter types are
//! normalized when the engine visits them as dependencies. This keeps a
//! normalized descriptor finite even when a record refers to itself.
//!
//! Normalization is idempotent.

use crate::context::TypeResolver;
use crate::descriptor::{
    Bindings, RecordDescriptor, Signature, TypeDescriptor, TypeKind, TypeRef,
};
use crate::error::{SerdeError, SerdeResult};
use crate::rules::{callable, record, union};
use std::sync::Arc;

/// Normalizes descriptors within one resolution scope.
pub struct Normalizer<'a, R: TypeResolver + ?Sized> {
    resolver: &'a R,
    bindings: &'a Bindings,
    max_depth: usize,
}

impl<'a, R: TypeResolver + ?Sized> Normalizer<'a, R> {
    /// Create a normalizer resolving names through `resolver` and type
    /// variables through `bindings`.
    pub fn new(resolver: &'a R, bindings: &'a Bindings, max_depth: usize) -> Self {
        Self {
            resolver,
            bindings,
            max_depth,
        }
    }

    /// Normalize `ty`.
    pub fn normalize(&self, ty: &TypeRef) -> SerdeResult<TypeRef> {
        self.normalize_at(ty, 0)
    }

    pub(crate) fn normalize_at(&self, ty: &TypeRef, depth: usize) -> SerdeResult<TypeRef> {
        if depth > self.max_depth {
            return Err(SerdeError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        let next = depth + 1;

        match &ty.kind {
            TypeKind::Atom(_)
            | TypeKind::Bytes
            | TypeKind::None
            | TypeKind::Uuid
            | TypeKind::DateTime
            | TypeKind::Enum(_) => Ok(ty.clone()),
            TypeKind::List(element) => Ok(TypeDescriptor::list(self.normalize_at(element, next)?)),
            TypeKind::Tuple(items) => {
                let items = items
                    .iter()
                    .map(|item| self.normalize_at(item, next))
                    .collect::<SerdeResult<Vec<_>>>()?;
                Ok(TypeDescriptor::tuple(items))
            }
            TypeKind::Dict(key, value) => Ok(TypeDescriptor::dict(
                self.normalize_at(key, next)?,
                self.normalize_at(value, next)?,
            )),
            TypeKind::Record(r) => {
                if r.bindings.is_empty() {
                    return Ok(ty.clone());
                }
                Ok(TypeDescriptor::new(TypeKind::Record(RecordDescriptor {
                    bindings: self.normalize_bindings(&r.bindings, next)?,
                    ..r.clone()
                })))
            }
            TypeKind::CallableArgs(sig) => {
                callable::check_signature(sig)?;
                Ok(TypeDescriptor::callable_args(
                    self.normalize_signature(sig, next)?,
                ))
            }
            TypeKind::CallableReturn(sig) => Ok(TypeDescriptor::callable_return(
                self.normalize_signature(sig, next)?,
            )),
            TypeKind::Ref(name) => {
                let target = self
                    .resolver
                    .resolve(name)
                    .ok_or_else(|| SerdeError::UnresolvedReference { name: name.clone() })?;
                self.normalize_at(target, next)
            }
            TypeKind::Var(name) => {
                let bound = self
                    .bindings
                    .get(name)
                    .ok_or_else(|| SerdeError::UnboundTypeVariable { name: name.clone() })?;
                self.normalize_at(bound, next)
            }
            TypeKind::Union(members) => union::normalize_union(self, ty, members, next),
            TypeKind::Optional(inner) => Ok(union::make_optional(self.normalize_at(inner, next)?)),
            TypeKind::Joint(inner) => record::make_joint(ty, self.normalize_at(inner, next)?),
            TypeKind::JointTag => Err(SerdeError::MalformedUnion {
                union: ty.to_string(),
                reason: "joint tag outside of a union".into(),
            }),
        }
    }

    fn normalize_bindings(&self, bindings: &Bindings, depth: usize) -> SerdeResult<Bindings> {
        bindings
            .iter()
            .map(|(name, ty)| Ok((name.clone(), self.normalize_at(ty, depth)?)))
            .collect()
    }

    fn normalize_signature(&self, sig: &Arc<Signature>, depth: usize) -> SerdeResult<Arc<Signature>> {
        if sig.bindings.is_empty() {
            return Ok(sig.clone());
        }
        Ok(Arc::new(Signature {
            bindings: self.normalize_bindings(&sig.bindings, depth)?,
            ..(**sig).clone()
        }))
    }
}
