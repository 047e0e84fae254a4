// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Container rules: lists, fixed tuples and string-keyed dicts.

use super::describe_wire;
use crate::descriptor::TypeDescriptor;
use crate::engine::{DecodeFn, EncodeFn};
use crate::error::{SerdeError, SerdeResult};
use crate::value::{Dict, Value, Wire};
use std::sync::Arc;

pub(super) fn list_decoder(element: DecodeFn) -> DecodeFn {
    Arc::new(move |wire| match wire {
        Wire::Array(items) => items
            .iter()
            .map(|item| element(item))
            .collect::<SerdeResult<Vec<_>>>()
            .map(Value::List),
        other => Err(SerdeError::mismatch("list", describe_wire(other))),
    })
}

pub(super) fn list_encoder(element: EncodeFn) -> EncodeFn {
    Arc::new(move |value| match value {
        Value::List(items) => items
            .iter()
            .map(|item| element(item))
            .collect::<SerdeResult<Vec<_>>>()
            .map(Wire::Array),
        other => Err(SerdeError::mismatch("list", other.type_name())),
    })
}

pub(super) fn tuple_decoder(ty: &TypeDescriptor, items: Vec<DecodeFn>) -> SerdeResult<DecodeFn> {
    let descriptor = ty.to_string();
    Ok(Arc::new(move |wire| {
        let Wire::Array(values) = wire else {
            return Err(SerdeError::mismatch("tuple", describe_wire(wire)));
        };
        check_arity(&descriptor, items.len(), values.len())?;
        items
            .iter()
            .zip(values)
            .map(|(dec, v)| dec(v))
            .collect::<SerdeResult<Vec<_>>>()
            .map(Value::Tuple)
    }))
}

pub(super) fn tuple_encoder(ty: &TypeDescriptor, items: Vec<EncodeFn>) -> SerdeResult<EncodeFn> {
    let descriptor = ty.to_string();
    Ok(Arc::new(move |value| {
        let Value::Tuple(values) = value else {
            return Err(SerdeError::mismatch("tuple", value.type_name()));
        };
        check_arity(&descriptor, items.len(), values.len())?;
        items
            .iter()
            .zip(values)
            .map(|(enc, v)| enc(v))
            .collect::<SerdeResult<Vec<_>>>()
            .map(Wire::Array)
    }))
}

fn check_arity(descriptor: &str, expected: usize, got: usize) -> SerdeResult<()> {
    if expected != got {
        return Err(SerdeError::ArityMismatch {
            descriptor: descriptor.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

/// Dict keys travel as JSON object keys. The key decoder sees the key as a
/// string first and, if it refuses that, as the number or bool the key text
/// spells, mirroring [`object_key`].
pub(super) fn dict_decoder(key: DecodeFn, value: DecodeFn) -> DecodeFn {
    Arc::new(move |wire| {
        let Wire::Object(map) = wire else {
            return Err(SerdeError::mismatch("dict", describe_wire(wire)));
        };
        let mut dict = Dict::with_capacity(map.len());
        for (k, v) in map {
            let k = decode_key(&key, k)?;
            dict.insert(k, value(v)?);
        }
        Ok(Value::Dict(dict))
    })
}

fn decode_key(key: &DecodeFn, text: &str) -> SerdeResult<Value> {
    let first = match key(&Wire::String(text.to_string())) {
        Ok(k) => return Ok(k),
        Err(e) => e,
    };
    match serde_json::from_str::<Wire>(text) {
        Ok(scalar @ (Wire::Number(_) | Wire::Bool(_))) => key(&scalar).map_err(|_| first),
        _ => Err(first),
    }
}

pub(super) fn dict_encoder(key: EncodeFn, value: EncodeFn) -> EncodeFn {
    Arc::new(move |native| {
        let Value::Dict(dict) = native else {
            return Err(SerdeError::mismatch("dict", native.type_name()));
        };
        let mut map = serde_json::Map::with_capacity(dict.len());
        for (k, v) in dict.iter() {
            let k = object_key(key(k)?)?;
            map.insert(k, value(v)?);
        }
        Ok(Wire::Object(map))
    })
}

fn object_key(wire: Wire) -> SerdeResult<String> {
    match wire {
        Wire::String(s) => Ok(s),
        Wire::Number(n) => Ok(n.to_string()),
        Wire::Bool(b) => Ok(b.to_string()),
        other => Err(SerdeError::mismatch("string-like dict key", describe_wire(&other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AtomKind, EnumBuilder, TypeKind};
    use serde_json::json;

    fn int_dec() -> DecodeFn {
        super::super::leaf::atom_decoder(AtomKind::Int)
    }

    fn int_enc() -> EncodeFn {
        super::super::leaf::atom_encoder(AtomKind::Int)
    }

    #[test]
    fn test_list_element_error_propagates() {
        let dec = list_decoder(int_dec());
        assert_eq!(
            dec(&json!([1, 2])).expect("decode"),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert!(matches!(
            dec(&json!([1, null])),
            Err(SerdeError::TypeMismatch { .. })
        ));
        assert!(dec(&json!({})).is_err());
    }

    #[test]
    fn test_tuple_arity() {
        let ty = TypeDescriptor::tuple(vec![TypeDescriptor::int(), TypeDescriptor::int()]);
        let dec = tuple_decoder(&ty, vec![int_dec(), int_dec()]).expect("build");
        assert_eq!(
            dec(&json!([1, 2])).expect("decode"),
            Value::Tuple(vec![Value::Int(1), Value::Int(2)])
        );
        match dec(&json!([1, 2, 3])) {
            Err(SerdeError::ArityMismatch { expected, got, .. }) => {
                assert_eq!((expected, got), (2, 3));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let enc = tuple_encoder(&ty, vec![int_enc(), int_enc()]).expect("build");
        assert!(matches!(
            enc(&Value::Tuple(vec![Value::Int(1)])),
            Err(SerdeError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_dict_keys_are_strings_on_the_wire() {
        let dec = dict_decoder(int_dec(), int_dec());
        let value = dec(&json!({"1": 10, "2": 20})).expect("decode");
        assert_eq!(value.dict_get(&Value::Int(2)), Some(&Value::Int(20)));

        let enc = dict_encoder(int_enc(), int_enc());
        assert_eq!(enc(&value).expect("encode"), json!({"1": 10, "2": 20}));
    }

    #[test]
    fn test_dict_bool_keys_round_trip() {
        let atom = super::super::leaf::atom_decoder;
        let dec = dict_decoder(atom(AtomKind::Bool), int_dec());
        let enc = dict_encoder(super::super::leaf::atom_encoder(AtomKind::Bool), int_enc());

        let value = Value::dict([(true, 1), (false, 0)]);
        let wire = enc(&value).expect("encode");
        assert_eq!(wire, json!({"true": 1, "false": 0}));
        assert_eq!(dec(&wire).expect("decode"), value);
        assert!(matches!(
            dec(&json!({"maybe": 1})),
            Err(SerdeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_dict_int_enum_keys_round_trip() {
        let color = EnumBuilder::new("Color").member("RED").member("GREEN").build();
        let TypeKind::Enum(e) = &color.kind else {
            panic!("expected enum");
        };
        let dec = dict_decoder(super::super::enumeration::decoder(e), int_dec());
        let enc = dict_encoder(super::super::enumeration::encoder(e), int_enc());

        let value = dec(&json!({"1": 5, "0": 7})).expect("decode");
        assert_eq!(enc(&value).expect("encode"), json!({"1": 5, "0": 7}));
        let green = Value::Enum {
            member: "GREEN".into(),
            value: crate::descriptor::EnumValue::Int(1),
        };
        assert_eq!(value.dict_get(&green), Some(&Value::Int(5)));
        assert!(matches!(
            dec(&json!({"9": 1})),
            Err(SerdeError::UnknownEnumValue { .. })
        ));
    }
}
