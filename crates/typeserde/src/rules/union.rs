// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Union normalization plus the optional and general union rules.

use super::record::make_joint;
use crate::context::TypeResolver;
use crate::descriptor::{TypeDescriptor, TypeKind, TypeRef};
use crate::engine::{DecodeFn, EncodeFn};
use crate::error::{SerdeError, SerdeResult};
use crate::normalize::Normalizer;
use crate::value::Wire;
use std::sync::Arc;

/// Normalize the raw union `ty` with `members`.
///
/// The tail decides the shape: the joint tag makes it a joint, a `None`
/// member makes it optional, anything else leaves a plain union that
/// collapses to its sole member when only one remains.
pub(crate) fn normalize_union<R: TypeResolver + ?Sized>(
    n: &Normalizer<'_, R>,
    ty: &TypeRef,
    members: &[TypeRef],
    depth: usize,
) -> SerdeResult<TypeRef> {
    let flat = flatten(members);
    let malformed = |reason: &str| SerdeError::MalformedUnion {
        union: ty.to_string(),
        reason: reason.to_string(),
    };
    let Some((last, rest)) = flat.split_last() else {
        return Err(malformed("union has no members"));
    };
    let is_tag = |m: &TypeRef| matches!(m.kind, TypeKind::JointTag);

    if is_tag(last) {
        if rest.is_empty() {
            return Err(malformed("joint has no members"));
        }
        if rest.iter().any(is_tag) {
            return Err(malformed("joint tag must appear once, at the tail"));
        }
        let body = n.normalize_at(&TypeDescriptor::union(rest.to_vec()), depth)?;
        return make_joint(ty, body);
    }
    if rest.iter().any(is_tag) {
        return Err(malformed("joint tag must appear once, at the tail"));
    }

    if flat.iter().any(|m| m.is_none()) {
        let others: Vec<TypeRef> = flat.iter().filter(|m| !m.is_none()).cloned().collect();
        if others.is_empty() {
            return Ok(TypeDescriptor::none());
        }
        let inner = n.normalize_at(&TypeDescriptor::union(others), depth)?;
        return Ok(make_optional(inner));
    }

    let normalized = flat
        .iter()
        .map(|m| n.normalize_at(m, depth))
        .collect::<SerdeResult<Vec<_>>>()?;
    let reflat = flatten(&normalized);
    if reflat != normalized {
        // A member resolved to a union, an optional or None; run the tail
        // rules again on the resolved list.
        return n.normalize_at(&TypeDescriptor::union(reflat), depth + 1);
    }
    match reflat.as_slice() {
        [single] => Ok(single.clone()),
        _ => Ok(TypeDescriptor::union(reflat)),
    }
}

/// `Optional[inner]`, absorbing `None` and nested optionals.
pub(crate) fn make_optional(inner: TypeRef) -> TypeRef {
    match inner.kind {
        TypeKind::None | TypeKind::Optional(_) => inner,
        _ => TypeDescriptor::new(TypeKind::Optional(inner)),
    }
}

/// Inline nested unions and optionals, dropping repeated members. The
/// first occurrence keeps its position.
fn flatten(members: &[TypeRef]) -> Vec<TypeRef> {
    fn push(out: &mut Vec<TypeRef>, m: &TypeRef) {
        match &m.kind {
            TypeKind::Union(inner) => inner.iter().for_each(|i| push(out, i)),
            TypeKind::Optional(inner) => {
                push(out, inner);
                push(out, &TypeDescriptor::none());
            }
            _ if out.contains(m) => {}
            _ => out.push(m.clone()),
        }
    }
    let mut out = Vec::with_capacity(members.len());
    for member in members {
        push(&mut out, member);
    }
    out
}

pub(super) fn optional_decoder(inner: DecodeFn) -> DecodeFn {
    Arc::new(move |wire| match wire {
        Wire::Null => Ok(crate::value::Value::Null),
        other => inner(other),
    })
}

pub(super) fn optional_encoder(inner: EncodeFn) -> EncodeFn {
    Arc::new(move |value| {
        if value.is_null() {
            Ok(Wire::Null)
        } else {
            inner(value)
        }
    })
}

/// Try members in declaration order; the first success wins.
pub(super) fn decoder(ty: &TypeDescriptor, members: &[TypeRef], decoders: Vec<DecodeFn>) -> DecodeFn {
    let union = ty.to_string();
    let names: Vec<String> = members.iter().map(ToString::to_string).collect();
    Arc::new(move |wire| {
        let mut attempts = Vec::with_capacity(decoders.len());
        for (name, dec) in names.iter().zip(&decoders) {
            match dec(wire) {
                Ok(value) => return Ok(value),
                Err(e) => attempts.push(format!("{}: {}", name, e)),
            }
        }
        Err(SerdeError::UnionDecode {
            union: union.clone(),
            attempts,
        })
    })
}

pub(super) fn encoder(ty: &TypeDescriptor, members: &[TypeRef], encoders: Vec<EncodeFn>) -> EncodeFn {
    let union = ty.to_string();
    let names: Vec<String> = members.iter().map(ToString::to_string).collect();
    Arc::new(move |value| {
        let mut attempts = Vec::with_capacity(encoders.len());
        for (name, enc) in names.iter().zip(&encoders) {
            match enc(value) {
                Ok(wire) => return Ok(wire),
                Err(e) => attempts.push(format!("{}: {}", name, e)),
            }
        }
        Err(SerdeError::UnionEncode {
            union: union.clone(),
            attempts,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::AtomKind;
    use crate::value::Value;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_flatten_dedupes_in_order() {
        let flat = flatten(&[
            TypeDescriptor::int(),
            TypeDescriptor::union(vec![TypeDescriptor::string(), TypeDescriptor::int()]),
            TypeDescriptor::string(),
        ]);
        assert_eq!(flat, vec![TypeDescriptor::int(), TypeDescriptor::string()]);
    }

    #[test]
    fn test_make_optional_absorbs() {
        let opt = make_optional(TypeDescriptor::int());
        assert_eq!(make_optional(opt.clone()), opt);
        assert_eq!(make_optional(TypeDescriptor::none()), TypeDescriptor::none());
    }

    #[test]
    fn test_optional_passes_null_through() {
        let dec = optional_decoder(super::super::leaf::atom_decoder(AtomKind::Int));
        assert_eq!(dec(&json!(null)).expect("null"), Value::Null);
        assert_eq!(dec(&json!(4)).expect("int"), Value::Int(4));
        let enc = optional_encoder(super::super::leaf::atom_encoder(AtomKind::Int));
        assert_eq!(enc(&Value::Null).expect("null"), json!(null));
    }

    #[test]
    fn test_optional_delegates_once_per_value() {
        let decodes = Arc::new(AtomicUsize::new(0));
        let encodes = Arc::new(AtomicUsize::new(0));
        let inner_dec: DecodeFn = {
            let decodes = decodes.clone();
            Arc::new(move |wire| {
                decodes.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Str(wire.to_string()))
            })
        };
        let inner_enc: EncodeFn = {
            let encodes = encodes.clone();
            Arc::new(move |_| {
                encodes.fetch_add(1, Ordering::SeqCst);
                Ok(json!("x"))
            })
        };
        let dec = optional_decoder(inner_dec);
        let enc = optional_encoder(inner_enc);

        assert_eq!(dec(&json!(null)).expect("null"), Value::Null);
        assert_eq!(enc(&Value::Null).expect("null"), json!(null));
        assert_eq!(decodes.load(Ordering::SeqCst), 0);
        assert_eq!(encodes.load(Ordering::SeqCst), 0);

        assert_eq!(dec(&json!(7)).expect("delegated"), Value::from("7"));
        assert_eq!(enc(&Value::Int(7)).expect("delegated"), json!("x"));
        assert_eq!(decodes.load(Ordering::SeqCst), 1);
        assert_eq!(encodes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_union_first_success_wins() {
        let members = vec![TypeDescriptor::bytes(), TypeDescriptor::string()];
        let ty = TypeDescriptor::union(members.clone());
        let config = crate::config::SerdeConfig::default();
        let dec = decoder(
            &ty,
            &members,
            vec![
                super::super::leaf::bytes_decoder(config.bytes_alphabet),
                super::super::leaf::atom_decoder(AtomKind::Str),
            ],
        );
        assert_eq!(dec(&json!("AAE=")).expect("bytes"), Value::Bytes(vec![0, 1]));
        assert_eq!(dec(&json!("!?")).expect("str"), Value::from("!?"));
        match dec(&json!([1])) {
            Err(SerdeError::UnionDecode { attempts, .. }) => {
                assert_eq!(attempts.len(), 2);
                assert!(attempts[0].starts_with("bytes: "));
                assert!(attempts[1].starts_with("str: "));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_union_encode_failure_reports_encode() {
        let members = vec![TypeDescriptor::int(), TypeDescriptor::uuid()];
        let ty = TypeDescriptor::union(members.clone());
        let enc = encoder(
            &ty,
            &members,
            vec![
                super::super::leaf::atom_encoder(AtomKind::Int),
                super::super::leaf::uuid_encoder(),
            ],
        );
        assert_eq!(enc(&Value::Int(3)).expect("int"), json!(3));
        match enc(&Value::from("nope")) {
            Err(SerdeError::UnionEncode { attempts, .. }) => assert_eq!(attempts.len(), 2),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
