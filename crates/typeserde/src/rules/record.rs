// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record and joint rules.
//!
//! A record travels as an object keyed by field name. A joint is the
//! concatenation of several records' fields into one flat object; both
//! share the same field plan so their wire behavior cannot drift apart.

use super::{describe_wire, Dependency};
use crate::descriptor::{RecordDescriptor, TypeDescriptor, TypeKind, TypeRef};
use crate::engine::{DecodeFn, EncodeFn};
use crate::error::{SerdeError, SerdeResult};
use crate::value::{Record, Value, Wire};
use std::collections::HashSet;
use std::sync::Arc;

/// Field names and the record name they assemble into.
#[derive(Debug, Clone)]
pub(crate) struct FieldPlan {
    record: String,
    fields: Vec<String>,
}

impl FieldPlan {
    pub(super) fn for_record(r: &RecordDescriptor) -> Self {
        Self {
            record: r.name.clone(),
            fields: r.fields.iter().map(|f| f.name.clone()).collect(),
        }
    }

    /// Merged plan of a joint: member fields in member order, record name
    /// `A+B`.
    pub(super) fn for_joint(ty: &TypeDescriptor, inner: &TypeDescriptor) -> SerdeResult<Self> {
        let members = joint_members(ty, inner)?;
        Ok(Self {
            record: members
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join("+"),
            fields: members
                .iter()
                .flat_map(|m| m.fields.iter().map(|f| f.name.clone()))
                .collect(),
        })
    }

    pub(super) fn len(&self) -> usize {
        self.fields.len()
    }
}

pub(super) fn record_dependencies(r: &RecordDescriptor) -> Vec<Dependency> {
    r.fields
        .iter()
        .map(|f| Dependency::scoped(f.ty.clone(), &r.bindings))
        .collect()
}

pub(super) fn joint_dependencies(
    ty: &TypeDescriptor,
    inner: &TypeDescriptor,
) -> SerdeResult<Vec<Dependency>> {
    Ok(joint_members(ty, inner)?
        .into_iter()
        .flat_map(record_dependencies)
        .collect())
}

/// Validate the normalized joint body `inner` and wrap it.
pub(crate) fn make_joint(ty: &TypeRef, inner: TypeRef) -> SerdeResult<TypeRef> {
    joint_members(ty, &inner)?;
    Ok(TypeDescriptor::new(TypeKind::Joint(inner)))
}

/// Member records of a joint; every member must be a record and field
/// names must not repeat across members.
fn joint_members<'a>(
    ty: &TypeDescriptor,
    inner: &'a TypeDescriptor,
) -> SerdeResult<Vec<&'a RecordDescriptor>> {
    let malformed = |reason: String| SerdeError::MalformedUnion {
        union: ty.to_string(),
        reason,
    };
    let members: Vec<&RecordDescriptor> = match &inner.kind {
        TypeKind::Record(r) => vec![r],
        TypeKind::Union(members) => members
            .iter()
            .map(|m| {
                m.as_record()
                    .ok_or_else(|| malformed(format!("joint member `{}` is not a record", m)))
            })
            .collect::<SerdeResult<_>>()?,
        _ => return Err(malformed(format!("joint member `{}` is not a record", inner))),
    };

    let mut seen = HashSet::new();
    for field in members.iter().flat_map(|m| m.fields.iter()) {
        if !seen.insert(field.name.as_str()) {
            return Err(malformed(format!(
                "field `{}` appears in more than one member",
                field.name
            )));
        }
    }
    Ok(members)
}

/// Missing wire fields decode as `null`, so optional fields may be omitted.
pub(super) fn decoder(plan: FieldPlan, fields: Vec<DecodeFn>) -> DecodeFn {
    Arc::new(move |wire| {
        let Wire::Object(map) = wire else {
            return Err(SerdeError::mismatch(
                format!("record {}", plan.record),
                describe_wire(wire),
            ));
        };
        let mut record = Record::new(plan.record.clone());
        for (name, dec) in plan.fields.iter().zip(&fields) {
            let field_wire = map.get(name).unwrap_or(&Wire::Null);
            let value = dec(field_wire).map_err(|e| e.in_field(&plan.record, name))?;
            record.fields.push((name.clone(), value));
        }
        Ok(Value::Record(record))
    })
}

/// Absent native fields encode as `null`, mirroring the decoder.
pub(super) fn encoder(plan: FieldPlan, fields: Vec<EncodeFn>) -> EncodeFn {
    Arc::new(move |value| {
        let Value::Record(record) = value else {
            return Err(SerdeError::mismatch(
                format!("record {}", plan.record),
                value.type_name(),
            ));
        };
        let mut map = serde_json::Map::with_capacity(plan.fields.len());
        for (name, enc) in plan.fields.iter().zip(&fields) {
            let field_value = record.get(name).unwrap_or(&Value::Null);
            let wire = enc(field_value).map_err(|e| e.in_field(&plan.record, name))?;
            map.insert(name.clone(), wire);
        }
        Ok(Wire::Object(map))
    })
}
