// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Callable argument and return marshalling.
//!
//! Arguments travel as `[args, kwargs]`. Dependencies are ordered by slot
//! (parameter name, then the `*args` and `**kwargs` absorbers) so that the
//! same signature always yields the same graph; at call time positional
//! values are matched in declaration order. Decoders and encoders share one
//! [`ArgumentPlan`] layout so both directions route every name identically.

use super::{describe_wire, Dependency};
use crate::descriptor::{Signature, TypeDescriptor, TypeRef};
use crate::engine::{DecodeFn, EncodeFn};
use crate::error::{SerdeError, SerdeResult};
use crate::value::{CallArgs, Value, Wire};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Dependency slot of a callable parameter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// Positional-or-keyword or keyword-only parameter.
    Named(String),
    /// Absorber of extra positional arguments.
    VarArgs,
    /// Absorber of extra keyword arguments.
    VarKw,
}

/// Reject signatures the argument rule cannot marshal.
///
/// Every parameter lacking an annotation is reported in one
/// [`SerdeError::MissingAnnotation`].
pub(crate) fn check_signature(sig: &Signature) -> SerdeResult<()> {
    let invalid = |reason: String| SerdeError::InvalidSignature {
        callable: sig.name.clone(),
        reason,
    };
    if sig.is_method && sig.positional.is_empty() {
        return Err(invalid("method declares no receiver parameter".into()));
    }

    let mut seen = HashSet::new();
    for p in sig.parameters() {
        if !seen.insert(p.name.as_str()) {
            return Err(invalid(format!("parameter `{}` declared twice", p.name)));
        }
    }

    let missing: Vec<String> = sig
        .parameters()
        .filter(|p| p.annotation.is_none())
        .map(|p| p.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(SerdeError::MissingAnnotation {
            callable: sig.name.clone(),
            params: missing,
        });
    }
    Ok(())
}

/// Annotated slots of `sig`, sorted.
pub fn slots(sig: &Signature) -> SerdeResult<Vec<(Slot, TypeRef)>> {
    check_signature(sig)?;
    let mut out = BTreeMap::new();
    for p in sig.declared_positional().iter().chain(&sig.keyword_only) {
        if let Some(ty) = &p.annotation {
            out.insert(Slot::Named(p.name.clone()), ty.clone());
        }
    }
    if let Some(ty) = sig.varargs.as_ref().and_then(|p| p.annotation.clone()) {
        out.insert(Slot::VarArgs, ty);
    }
    if let Some(ty) = sig.varkw.as_ref().and_then(|p| p.annotation.clone()) {
        out.insert(Slot::VarKw, ty);
    }
    Ok(out.into_iter().collect())
}

pub(super) fn args_dependencies(sig: &Signature) -> SerdeResult<Vec<Dependency>> {
    Ok(slots(sig)?
        .into_iter()
        .map(|(_, ty)| Dependency::scoped(ty, &sig.bindings))
        .collect())
}

/// The declared return type, or `None` when unannotated.
pub(super) fn return_dependency(sig: &Signature) -> Dependency {
    let ty = sig.returns.clone().unwrap_or_else(TypeDescriptor::none);
    Dependency::scoped(ty, &sig.bindings)
}

/// Name-to-converter routing table for one signature.
struct ArgumentPlan<F> {
    callable: String,
    positional: Vec<(String, F)>,
    keywords: HashMap<String, F>,
    varargs: Option<(String, F)>,
    varkw: Option<F>,
}

impl<F: Clone> ArgumentPlan<F> {
    /// `converters` follow the order of [`slots`].
    fn new(sig: &Signature, converters: &[F]) -> SerdeResult<Self> {
        let slots = slots(sig)?;
        let incomplete = || SerdeError::Incomplete {
            descriptor: format!("Args[{}]", sig.name),
        };
        if slots.len() != converters.len() {
            return Err(incomplete());
        }
        let table: HashMap<Slot, F> = slots
            .into_iter()
            .map(|(slot, _)| slot)
            .zip(converters.iter().cloned())
            .collect();
        let lookup = |slot: Slot| table.get(&slot).cloned().ok_or_else(incomplete);

        let positional = sig
            .declared_positional()
            .iter()
            .map(|p| Ok((p.name.clone(), lookup(Slot::Named(p.name.clone()))?)))
            .collect::<SerdeResult<Vec<_>>>()?;
        let keywords = sig
            .declared_positional()
            .iter()
            .chain(&sig.keyword_only)
            .map(|p| Ok((p.name.clone(), lookup(Slot::Named(p.name.clone()))?)))
            .collect::<SerdeResult<HashMap<_, _>>>()?;
        let varargs = match &sig.varargs {
            Some(p) => Some((p.name.clone(), lookup(Slot::VarArgs)?)),
            None => None,
        };
        let varkw = match &sig.varkw {
            Some(_) => Some(lookup(Slot::VarKw)?),
            None => None,
        };

        Ok(Self {
            callable: sig.name.clone(),
            positional,
            keywords,
            varargs,
            varkw,
        })
    }

    /// Route each argument to its converter and run it.
    fn apply<'v, In: 'v, Out>(
        &self,
        args: &'v [In],
        kwargs: impl IntoIterator<Item = (&'v String, &'v In)>,
        convert: impl Fn(&F, &In) -> SerdeResult<Out>,
    ) -> SerdeResult<(Vec<Out>, Vec<(String, Out)>)> {
        let mut out_args = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            let (name, converter) = match (self.positional.get(index), &self.varargs) {
                (Some((name, f)), _) | (None, Some((name, f))) => (name, f),
                (None, None) => {
                    return Err(SerdeError::TooManyArguments {
                        callable: self.callable.clone(),
                        expected: self.positional.len(),
                        got: args.len(),
                    })
                }
            };
            let value = convert(converter, arg).map_err(|e| e.in_argument(&self.callable, name))?;
            out_args.push(value);
        }

        let filled = &self.positional[..args.len().min(self.positional.len())];
        let mut out_kwargs = Vec::new();
        for (keyword, arg) in kwargs {
            let converter = match (self.keywords.get(keyword), &self.varkw) {
                (Some(f), _) => {
                    if filled.iter().any(|(name, _)| name == keyword) {
                        return Err(SerdeError::DuplicateArgument {
                            callable: self.callable.clone(),
                            name: keyword.clone(),
                        });
                    }
                    f
                }
                (None, Some(f)) => f,
                (None, None) => {
                    return Err(SerdeError::UnexpectedKeyword {
                        callable: self.callable.clone(),
                        keyword: keyword.clone(),
                    })
                }
            };
            let value =
                convert(converter, arg).map_err(|e| e.in_argument(&self.callable, keyword))?;
            out_kwargs.push((keyword.clone(), value));
        }
        Ok((out_args, out_kwargs))
    }
}

pub(super) fn args_decoder(sig: &Signature, deps: &[DecodeFn]) -> SerdeResult<DecodeFn> {
    let plan = ArgumentPlan::new(sig, deps)?;
    Ok(Arc::new(move |wire| {
        let (args, kwargs) = match wire {
            Wire::Array(parts) => match parts.as_slice() {
                [Wire::Array(args), Wire::Object(kwargs)] => (args, kwargs),
                _ => return Err(SerdeError::mismatch("[args, kwargs]", describe_wire(wire))),
            },
            other => return Err(SerdeError::mismatch("[args, kwargs]", describe_wire(other))),
        };
        let (args, kwargs) = plan.apply(args.as_slice(), kwargs, |dec, w| dec(w))?;
        Ok(Value::Call(CallArgs {
            args,
            kwargs: kwargs.into_iter().collect(),
        }))
    }))
}

pub(super) fn args_encoder(sig: &Signature, deps: &[EncodeFn]) -> SerdeResult<EncodeFn> {
    let plan = ArgumentPlan::new(sig, deps)?;
    Ok(Arc::new(move |value| {
        let Value::Call(call) = value else {
            return Err(SerdeError::mismatch("call arguments", value.type_name()));
        };
        let (args, kwargs) = plan.apply(call.args.as_slice(), &call.kwargs, |enc, v| enc(v))?;
        Ok(Wire::Array(vec![
            Wire::Array(args),
            Wire::Object(kwargs.into_iter().collect()),
        ]))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SignatureBuilder;

    #[test]
    fn test_slots_sorted_and_receiver_skipped() {
        let sig = SignatureBuilder::method("Svc.put")
            .param("value", TypeDescriptor::string())
            .param("key", TypeDescriptor::int())
            .varkw("extra", TypeDescriptor::boolean())
            .varargs("rest", TypeDescriptor::float())
            .keyword_only("ttl", TypeDescriptor::int())
            .build();
        let order: Vec<Slot> = slots(&sig).expect("slots").into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            order,
            [
                Slot::Named("key".into()),
                Slot::Named("ttl".into()),
                Slot::Named("value".into()),
                Slot::VarArgs,
                Slot::VarKw,
            ]
        );
    }

    #[test]
    fn test_receiverless_method_rejected() {
        let mut sig = (*SignatureBuilder::method("Svc.bad").build()).clone();
        sig.positional.clear();
        assert!(matches!(
            check_signature(&sig),
            Err(SerdeError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let sig = SignatureBuilder::new("f")
            .param("a", TypeDescriptor::int())
            .keyword_only("a", TypeDescriptor::int())
            .build();
        let err = check_signature(&sig).expect_err("duplicate");
        assert!(err.to_string().contains("parameter `a` declared twice"));
    }

    #[test]
    fn test_return_defaults_to_none() {
        let sig = SignatureBuilder::new("f").build();
        assert!(return_dependency(&sig).ty.is_none());
    }
}
