// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization rules.
//!
//! Each [`Rule`] recognizes one normalized descriptor kind, names the
//! descriptors it depends on, and synthesizes the decoder/encoder for its
//! kind from the converters of those dependencies. Rules never see raw
//! descriptors: references, type variables and union tails are gone by the
//! time dispatch runs.
//!
//! | Rule             | Wire form                                      |
//! |------------------|------------------------------------------------|
//! | `Atom`           | JSON number, string or bool                    |
//! | `Bytes`          | base64 string                                  |
//! | `None`           | `null`                                         |
//! | `Uuid`           | hyphenated hex string                          |
//! | `DateTime`       | `YYYY-MM-DDTHH:MM:SS.ffffff`                   |
//! | `List`, `Tuple`  | array                                          |
//! | `Dict`           | object with string keys                        |
//! | `Enum`           | member value                                   |
//! | `Record`, `Joint`| object keyed by field name                     |
//! | `Union`          | first member that decodes                      |
//! | `Optional`       | `null` or the inner form                       |
//! | `CallableArgs`   | `[args, kwargs]`                               |
//! | `CallableReturn` | wire form of the return annotation             |

pub(crate) mod callable;
mod container;
mod enumeration;
mod leaf;
pub(crate) mod record;
pub(crate) mod union;

use crate::config::SerdeConfig;
use crate::descriptor::{Bindings, TypeDescriptor, TypeKind, TypeRef};
use crate::engine::{DecodeFn, EncodeFn};
use crate::error::{SerdeError, SerdeResult};
use crate::value::Wire;

pub use callable::Slot;

/// A descriptor a rule needs a converter for, with the generic scope it
/// must be normalized in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub ty: TypeRef,
    pub bindings: Bindings,
}

impl Dependency {
    /// Dependency with no generic scope of its own.
    pub fn plain(ty: TypeRef) -> Self {
        Self {
            ty,
            bindings: Bindings::new(),
        }
    }

    pub fn scoped(ty: TypeRef, bindings: &Bindings) -> Self {
        Self {
            ty,
            bindings: bindings.clone(),
        }
    }
}

/// Closed set of serialization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
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
}

impl Rule {
    /// Every rule, in dispatch order.
    pub const ALL: [Rule; 15] = [
        Rule::Atom,
        Rule::Bytes,
        Rule::None,
        Rule::Uuid,
        Rule::DateTime,
        Rule::List,
        Rule::Tuple,
        Rule::Dict,
        Rule::Enum,
        Rule::Record,
        Rule::Union,
        Rule::Optional,
        Rule::Joint,
        Rule::CallableArgs,
        Rule::CallableReturn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::Atom => "atom",
            Rule::Bytes => "bytes",
            Rule::None => "none",
            Rule::Uuid => "uuid",
            Rule::DateTime => "datetime",
            Rule::List => "list",
            Rule::Tuple => "tuple",
            Rule::Dict => "dict",
            Rule::Enum => "enum",
            Rule::Record => "record",
            Rule::Union => "union",
            Rule::Optional => "optional",
            Rule::Joint => "joint",
            Rule::CallableArgs => "callable_args",
            Rule::CallableReturn => "callable_return",
        }
    }

    /// Whether this rule handles the normalized descriptor `ty`.
    pub fn matches(self, ty: &TypeDescriptor) -> bool {
        matches!(
            (self, &ty.kind),
            (Rule::Atom, TypeKind::Atom(_))
                | (Rule::Bytes, TypeKind::Bytes)
                | (Rule::None, TypeKind::None)
                | (Rule::Uuid, TypeKind::Uuid)
                | (Rule::DateTime, TypeKind::DateTime)
                | (Rule::List, TypeKind::List(_))
                | (Rule::Tuple, TypeKind::Tuple(_))
                | (Rule::Dict, TypeKind::Dict(..))
                | (Rule::Enum, TypeKind::Enum(_))
                | (Rule::Record, TypeKind::Record(_))
                | (Rule::Union, TypeKind::Union(_))
                | (Rule::Optional, TypeKind::Optional(_))
                | (Rule::Joint, TypeKind::Joint(_))
                | (Rule::CallableArgs, TypeKind::CallableArgs(_))
                | (Rule::CallableReturn, TypeKind::CallableReturn(_))
        )
    }

    /// Select the single rule matching `ty`.
    pub fn dispatch(ty: &TypeDescriptor) -> SerdeResult<Rule> {
        let mut candidates = Rule::ALL.iter().copied().filter(|rule| rule.matches(ty));
        let first = candidates
            .next()
            .ok_or_else(|| SerdeError::NoMatchingRule {
                descriptor: ty.to_string(),
            })?;
        let rest: Vec<Rule> = candidates.collect();
        if !rest.is_empty() {
            return Err(SerdeError::AmbiguousRule {
                descriptor: ty.to_string(),
                rules: std::iter::once(first).chain(rest).map(Rule::name).collect(),
            });
        }
        Ok(first)
    }

    /// Descriptors whose converters this rule composes, in the order
    /// [`Rule::decoder`] and [`Rule::encoder`] expect them.
    pub fn dependencies(self, ty: &TypeDescriptor) -> SerdeResult<Vec<Dependency>> {
        match (self, &ty.kind) {
            (Rule::Atom, _)
            | (Rule::Bytes, _)
            | (Rule::None, _)
            | (Rule::Uuid, _)
            | (Rule::DateTime, _)
            | (Rule::Enum, _) => Ok(Vec::new()),
            (Rule::List, TypeKind::List(element)) => Ok(vec![Dependency::plain(element.clone())]),
            (Rule::Tuple, TypeKind::Tuple(items)) => {
                Ok(items.iter().cloned().map(Dependency::plain).collect())
            }
            (Rule::Dict, TypeKind::Dict(key, value)) => Ok(vec![
                Dependency::plain(key.clone()),
                Dependency::plain(value.clone()),
            ]),
            (Rule::Record, TypeKind::Record(r)) => Ok(record::record_dependencies(r)),
            (Rule::Joint, TypeKind::Joint(inner)) => record::joint_dependencies(ty, inner),
            (Rule::Union, TypeKind::Union(members)) => {
                Ok(members.iter().cloned().map(Dependency::plain).collect())
            }
            (Rule::Optional, TypeKind::Optional(inner)) => {
                Ok(vec![Dependency::plain(inner.clone())])
            }
            (Rule::CallableArgs, TypeKind::CallableArgs(sig)) => callable::args_dependencies(sig),
            (Rule::CallableReturn, TypeKind::CallableReturn(sig)) => {
                Ok(vec![callable::return_dependency(sig)])
            }
            _ => Err(self.misapplied(ty)),
        }
    }

    /// Synthesize the decoder for `ty` from its dependency decoders.
    pub fn decoder(
        self,
        ty: &TypeDescriptor,
        deps: &[DecodeFn],
        config: &SerdeConfig,
    ) -> SerdeResult<DecodeFn> {
        match (self, &ty.kind) {
            (Rule::Atom, TypeKind::Atom(kind)) => Ok(leaf::atom_decoder(*kind)),
            (Rule::Bytes, _) => Ok(leaf::bytes_decoder(config.bytes_alphabet)),
            (Rule::None, _) => Ok(leaf::none_decoder(config.strict_none)),
            (Rule::Uuid, _) => Ok(leaf::uuid_decoder()),
            (Rule::DateTime, _) => Ok(leaf::datetime_decoder()),
            (Rule::List, _) => Ok(container::list_decoder(dep(deps, 0, ty)?)),
            (Rule::Tuple, TypeKind::Tuple(items)) => {
                container::tuple_decoder(ty, deps_exact(deps, items.len(), ty)?)
            }
            (Rule::Dict, _) => Ok(container::dict_decoder(
                dep(deps, 0, ty)?,
                dep(deps, 1, ty)?,
            )),
            (Rule::Enum, TypeKind::Enum(e)) => Ok(enumeration::decoder(e)),
            (Rule::Record, TypeKind::Record(r)) => {
                let plan = record::FieldPlan::for_record(r);
                Ok(record::decoder(plan, deps_exact(deps, r.fields.len(), ty)?))
            }
            (Rule::Joint, TypeKind::Joint(inner)) => {
                let plan = record::FieldPlan::for_joint(ty, inner)?;
                let n = plan.len();
                Ok(record::decoder(plan, deps_exact(deps, n, ty)?))
            }
            (Rule::Union, TypeKind::Union(members)) => {
                Ok(union::decoder(ty, members, deps_exact(deps, members.len(), ty)?))
            }
            (Rule::Optional, _) => Ok(union::optional_decoder(dep(deps, 0, ty)?)),
            (Rule::CallableArgs, TypeKind::CallableArgs(sig)) => {
                callable::args_decoder(sig, deps)
            }
            (Rule::CallableReturn, _) => dep(deps, 0, ty),
            _ => Err(self.misapplied(ty)),
        }
    }

    /// Synthesize the encoder for `ty` from its dependency encoders.
    pub fn encoder(
        self,
        ty: &TypeDescriptor,
        deps: &[EncodeFn],
        config: &SerdeConfig,
    ) -> SerdeResult<EncodeFn> {
        match (self, &ty.kind) {
            (Rule::Atom, TypeKind::Atom(kind)) => Ok(leaf::atom_encoder(*kind)),
            (Rule::Bytes, _) => Ok(leaf::bytes_encoder(config.bytes_alphabet)),
            (Rule::None, _) => Ok(leaf::none_encoder()),
            (Rule::Uuid, _) => Ok(leaf::uuid_encoder()),
            (Rule::DateTime, _) => Ok(leaf::datetime_encoder()),
            (Rule::List, _) => Ok(container::list_encoder(dep(deps, 0, ty)?)),
            (Rule::Tuple, TypeKind::Tuple(items)) => {
                container::tuple_encoder(ty, deps_exact(deps, items.len(), ty)?)
            }
            (Rule::Dict, _) => Ok(container::dict_encoder(
                dep(deps, 0, ty)?,
                dep(deps, 1, ty)?,
            )),
            (Rule::Enum, TypeKind::Enum(e)) => Ok(enumeration::encoder(e)),
            (Rule::Record, TypeKind::Record(r)) => {
                let plan = record::FieldPlan::for_record(r);
                Ok(record::encoder(plan, deps_exact(deps, r.fields.len(), ty)?))
            }
            (Rule::Joint, TypeKind::Joint(inner)) => {
                let plan = record::FieldPlan::for_joint(ty, inner)?;
                let n = plan.len();
                Ok(record::encoder(plan, deps_exact(deps, n, ty)?))
            }
            (Rule::Union, TypeKind::Union(members)) => {
                Ok(union::encoder(ty, members, deps_exact(deps, members.len(), ty)?))
            }
            (Rule::Optional, _) => Ok(union::optional_encoder(dep(deps, 0, ty)?)),
            (Rule::CallableArgs, TypeKind::CallableArgs(sig)) => {
                callable::args_encoder(sig, deps)
            }
            (Rule::CallableReturn, _) => dep(deps, 0, ty),
            _ => Err(self.misapplied(ty)),
        }
    }

    fn misapplied(self, ty: &TypeDescriptor) -> SerdeError {
        SerdeError::NoMatchingRule {
            descriptor: format!("{} (offered to rule `{}`)", ty, self.name()),
        }
    }
}

fn dep<F: Clone>(deps: &[F], index: usize, ty: &TypeDescriptor) -> SerdeResult<F> {
    deps.get(index).cloned().ok_or_else(|| SerdeError::Incomplete {
        descriptor: ty.to_string(),
    })
}

fn deps_exact<F: Clone>(deps: &[F], expected: usize, ty: &TypeDescriptor) -> SerdeResult<Vec<F>> {
    if deps.len() != expected {
        return Err(SerdeError::Incomplete {
            descriptor: ty.to_string(),
        });
    }
    Ok(deps.to_vec())
}

/// Short description of a wire value for diagnostics.
pub(crate) fn describe_wire(wire: &Wire) -> String {
    const MAX: usize = 40;
    let kind = match wire {
        Wire::Null => return "null".to_string(),
        Wire::Bool(_) => "bool",
        Wire::Number(_) => "number",
        Wire::String(_) => "string",
        Wire::Array(_) => "array",
        Wire::Object(_) => "object",
    };
    let mut text = wire.to_string();
    if text.len() > MAX {
        let mut cut = MAX;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    format!("{} {}", kind, text)
}
