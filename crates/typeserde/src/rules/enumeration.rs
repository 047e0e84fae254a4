// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enum rule: members travel as their underlying value.

use super::describe_wire;
use crate::descriptor::{EnumDescriptor, EnumValue};
use crate::engine::{DecodeFn, EncodeFn};
use crate::error::SerdeError;
use crate::value::{Value, Wire};
use std::sync::Arc;

pub(super) fn decoder(e: &EnumDescriptor) -> DecodeFn {
    let e = e.clone();
    Arc::new(move |wire| {
        let raw = match wire {
            Wire::Number(n) => n.as_i64().map(EnumValue::Int),
            Wire::String(s) => Some(EnumValue::Str(s.clone())),
            _ => None,
        };
        let unknown = || SerdeError::UnknownEnumValue {
            enum_name: e.name.clone(),
            value: describe_wire(wire),
        };
        let raw = raw.ok_or_else(unknown)?;
        let member = e.member_by_value(&raw).ok_or_else(unknown)?;
        Ok(Value::Enum {
            member: member.name.clone(),
            value: member.value.clone(),
        })
    })
}

/// Encoding looks the member up by name; the native value field is not
/// trusted.
pub(super) fn encoder(e: &EnumDescriptor) -> EncodeFn {
    let e = e.clone();
    Arc::new(move |value| {
        let Value::Enum { member, .. } = value else {
            return Err(SerdeError::mismatch(
                format!("enum {}", e.name),
                value.type_name(),
            ));
        };
        let found = e.member(member).ok_or_else(|| SerdeError::UnknownEnumValue {
            enum_name: e.name.clone(),
            value: member.clone(),
        })?;
        Ok(match &found.value {
            EnumValue::Int(v) => Wire::from(*v),
            EnumValue::Str(v) => Wire::String(v.clone()),
        })
    })
}
