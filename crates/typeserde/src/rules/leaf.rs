// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Leaf rules: atoms, bytes, none, UUIDs and timestamps.

use super::describe_wire;
use crate::config::BytesAlphabet;
use crate::descriptor::AtomKind;
use crate::engine::{DecodeFn, EncodeFn};
use crate::error::{SerdeError, SerdeResult};
use crate::value::{Value, Wire};
use base64::Engine as _;
use chrono::NaiveDateTime;
use std::sync::Arc;
use uuid::Uuid;

/// Timestamp wire layout, microsecond precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const TIMESTAMP_PARSE: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(super) fn atom_decoder(kind: AtomKind) -> DecodeFn {
    Arc::new(move |wire| cast_atom(kind, wire))
}

pub(super) fn atom_encoder(kind: AtomKind) -> EncodeFn {
    Arc::new(move |value| match (kind, value) {
        (AtomKind::Int, Value::Int(v)) => Ok(Wire::from(*v)),
        (AtomKind::Str, Value::Str(v)) => Ok(Wire::String(v.clone())),
        (AtomKind::Bool, Value::Bool(v)) => Ok(Wire::Bool(*v)),
        (AtomKind::Float, Value::Float(v)) => serde_json::Number::from_f64(*v)
            .map(Wire::Number)
            .ok_or_else(|| SerdeError::mismatch("finite float", v.to_string())),
        _ => Err(SerdeError::mismatch(kind.name(), value.type_name())),
    })
}

/// Cast a wire value to an atom, accepting the lossless or conventional
/// conversions between numbers, strings and booleans.
fn cast_atom(kind: AtomKind, wire: &Wire) -> SerdeResult<Value> {
    let mismatch = || SerdeError::mismatch(kind.name(), describe_wire(wire));
    match (kind, wire) {
        (_, Wire::Null | Wire::Array(_) | Wire::Object(_)) => Err(mismatch()),

        (AtomKind::Int, Wire::Number(n)) => {
            if let Some(v) = n.as_i64() {
                return Ok(Value::Int(v));
            }
            // Floats truncate toward zero; u64 beyond i64 lands here too.
            let whole = n.as_f64().map(f64::trunc).filter(|f| f.is_finite());
            match whole {
                Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(Value::Int(f as i64)),
                _ => Err(mismatch()),
            }
        }
        (AtomKind::Int, Wire::Bool(b)) => Ok(Value::Int(i64::from(*b))),
        (AtomKind::Int, Wire::String(s)) => {
            s.trim().parse::<i64>().map(Value::Int).map_err(|_| mismatch())
        }

        (AtomKind::Str, Wire::String(s)) => Ok(Value::Str(s.clone())),
        (AtomKind::Str, Wire::Number(n)) => Ok(Value::Str(n.to_string())),
        (AtomKind::Str, Wire::Bool(b)) => Ok(Value::Str(b.to_string())),

        (AtomKind::Bool, Wire::Bool(b)) => Ok(Value::Bool(*b)),
        (AtomKind::Bool, Wire::Number(n)) => n
            .as_f64()
            .map(|f| Value::Bool(f != 0.0))
            .ok_or_else(mismatch),
        (AtomKind::Bool, Wire::String(_)) => Err(mismatch()),

        (AtomKind::Float, Wire::Number(n)) => n.as_f64().map(Value::Float).ok_or_else(mismatch),
        (AtomKind::Float, Wire::Bool(b)) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        (AtomKind::Float, Wire::String(s)) => {
            s.trim().parse::<f64>().map(Value::Float).map_err(|_| mismatch())
        }
    }
}

pub(super) fn bytes_decoder(alphabet: BytesAlphabet) -> DecodeFn {
    Arc::new(move |wire| match wire {
        Wire::String(s) => alphabet
            .engine()
            .decode(s)
            .map(Value::Bytes)
            .map_err(|e| SerdeError::MalformedBytes {
                reason: e.to_string(),
            }),
        other => Err(SerdeError::mismatch("base64 string", describe_wire(other))),
    })
}

pub(super) fn bytes_encoder(alphabet: BytesAlphabet) -> EncodeFn {
    Arc::new(move |value| match value {
        Value::Bytes(b) => Ok(Wire::String(alphabet.engine().encode(b))),
        other => Err(SerdeError::mismatch("bytes", other.type_name())),
    })
}

/// `None` decodes to null. Unless `strict`, the wire value is ignored.
pub(super) fn none_decoder(strict: bool) -> DecodeFn {
    Arc::new(move |wire| {
        if strict && !wire.is_null() {
            return Err(SerdeError::mismatch("null", describe_wire(wire)));
        }
        Ok(Value::Null)
    })
}

pub(super) fn none_encoder() -> EncodeFn {
    Arc::new(|_| Ok(Wire::Null))
}

pub(super) fn uuid_decoder() -> DecodeFn {
    Arc::new(|wire| match wire {
        Wire::String(s) => Uuid::parse_str(s)
            .map(Value::Uuid)
            .map_err(|source| SerdeError::MalformedUuid {
                value: s.clone(),
                source,
            }),
        other => Err(SerdeError::mismatch("UUID string", describe_wire(other))),
    })
}

pub(super) fn uuid_encoder() -> EncodeFn {
    Arc::new(|value| match value {
        Value::Uuid(u) => Ok(Wire::String(u.hyphenated().to_string())),
        other => Err(SerdeError::mismatch("UUID", other.type_name())),
    })
}

pub(super) fn datetime_decoder() -> DecodeFn {
    Arc::new(|wire| match wire {
        Wire::String(s) => parse_timestamp(s).map(Value::DateTime),
        other => Err(SerdeError::mismatch("timestamp string", describe_wire(other))),
    })
}

pub(super) fn datetime_encoder() -> EncodeFn {
    Arc::new(|value| match value {
        Value::DateTime(dt) => Ok(Wire::String(dt.format(TIMESTAMP_FORMAT).to_string())),
        other => Err(SerdeError::mismatch("datetime", other.type_name())),
    })
}

/// Parse `YYYY-MM-DDTHH:MM:SS.f`, where the fraction has 1 to 6 digits.
fn parse_timestamp(s: &str) -> SerdeResult<NaiveDateTime> {
    let malformed = || SerdeError::MalformedTimestamp {
        value: s.to_string(),
    };
    let (_, fraction) = s.rsplit_once('.').ok_or_else(malformed)?;
    if fraction.is_empty() || fraction.len() > 6 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_PARSE).map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_int_casts() {
        let dec = atom_decoder(AtomKind::Int);
        assert_eq!(dec(&json!(42)).expect("int"), Value::Int(42));
        assert_eq!(dec(&json!(3.9)).expect("float"), Value::Int(3));
        assert_eq!(dec(&json!(-3.9)).expect("negative float"), Value::Int(-3));
        assert_eq!(dec(&json!(true)).expect("bool"), Value::Int(1));
        assert_eq!(dec(&json!(" 17 ")).expect("numeric string"), Value::Int(17));
        assert!(matches!(dec(&json!("abc")), Err(SerdeError::TypeMismatch { .. })));
        assert!(matches!(dec(&json!(null)), Err(SerdeError::TypeMismatch { .. })));
        assert!(matches!(dec(&json!([1])), Err(SerdeError::TypeMismatch { .. })));
    }

    #[test]
    fn test_str_and_bool_casts() {
        let s = atom_decoder(AtomKind::Str);
        assert_eq!(s(&json!("hi")).expect("str"), Value::from("hi"));
        assert_eq!(s(&json!(5)).expect("number"), Value::from("5"));
        assert!(s(&json!(null)).is_err());

        let b = atom_decoder(AtomKind::Bool);
        assert_eq!(b(&json!(false)).expect("bool"), Value::Bool(false));
        assert_eq!(b(&json!(2)).expect("number"), Value::Bool(true));
        assert!(b(&json!("true")).is_err());
    }

    #[test]
    fn test_float_casts() {
        let dec = atom_decoder(AtomKind::Float);
        assert_eq!(dec(&json!(1)).expect("int"), Value::Float(1.0));
        assert_eq!(dec(&json!("2.5")).expect("string"), Value::Float(2.5));
        assert!(dec(&json!({})).is_err());
    }

    #[test]
    fn test_atom_encode_requires_exact_variant() {
        let enc = atom_encoder(AtomKind::Int);
        assert_eq!(enc(&Value::Int(7)).expect("encode"), json!(7));
        assert!(matches!(
            enc(&Value::from("7")),
            Err(SerdeError::TypeMismatch { .. })
        ));
        let enc = atom_encoder(AtomKind::Float);
        assert!(enc(&Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_bytes() {
        let dec = bytes_decoder(BytesAlphabet::Standard);
        let enc = bytes_encoder(BytesAlphabet::Standard);
        assert_eq!(dec(&json!("AAEC")).expect("decode"), Value::Bytes(vec![0, 1, 2]));
        assert_eq!(enc(&Value::Bytes(vec![0xfb, 0xff])).expect("encode"), json!("+/8="));
        assert!(matches!(dec(&json!("!!")), Err(SerdeError::MalformedBytes { .. })));

        let url = bytes_encoder(BytesAlphabet::UrlSafe);
        assert_eq!(url(&Value::Bytes(vec![0xfb, 0xff])).expect("encode"), json!("-_8="));
    }

    #[test]
    fn test_none_lenient_and_strict() {
        let lenient = none_decoder(false);
        assert_eq!(lenient(&json!(5)).expect("ignored"), Value::Null);
        let strict = none_decoder(true);
        assert_eq!(strict(&json!(null)).expect("null"), Value::Null);
        assert!(strict(&json!(5)).is_err());
        assert_eq!(none_encoder()(&Value::Int(1)).expect("encode"), Wire::Null);
    }

    #[test]
    fn test_uuid() {
        let dec = uuid_decoder();
        let v = dec(&json!("67E55044-10B1-426F-9247-BB680E5FE0C8")).expect("decode");
        assert_eq!(
            uuid_encoder()(&v).expect("encode"),
            json!("67e55044-10b1-426f-9247-bb680e5fe0c8")
        );
        assert!(matches!(
            dec(&json!("not-a-uuid")),
            Err(SerdeError::MalformedUuid { .. })
        ));
    }

    #[test]
    fn test_timestamp() {
        let dec = datetime_decoder();
        let value = dec(&json!("2024-03-01T12:30:45.5")).expect("decode");
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_micro_opt(12, 30, 45, 500_000))
            .expect("valid date");
        assert_eq!(value, Value::DateTime(expected));
        assert_eq!(
            datetime_encoder()(&value).expect("encode"),
            json!("2024-03-01T12:30:45.500000")
        );
    }

    #[test]
    fn test_timestamp_requires_fraction() {
        let dec = datetime_decoder();
        for bad in [
            "2024-03-01T12:30:45",
            "2024-03-01T12:30:45.",
            "2024-03-01T12:30:45.1234567",
            "2024-03-01 12:30:45.000001",
            "yesterday",
        ] {
            assert!(
                matches!(dec(&json!(bad)), Err(SerdeError::MalformedTimestamp { .. })),
                "accepted {}",
                bad
            );
        }
    }
}
