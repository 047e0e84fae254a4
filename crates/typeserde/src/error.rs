// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for graph construction and value conversion.

use thiserror::Error;

/// Result type for engine operations.
pub type SerdeResult<T> = Result<T, SerdeError>;

/// Errors raised while normalizing descriptors, building converter graphs,
/// or running the generated converters.
///
/// Descriptors are rendered with their `Display` form so a message points at
/// the failing node without the caller re-deriving the graph.
#[derive(Debug, Error)]
pub enum SerdeError {
    // Normalization
    #[error("unresolved type reference `{name}`")]
    UnresolvedReference { name: String },

    #[error("unbound type variable `{name}`")]
    UnboundTypeVariable { name: String },

    #[error("malformed union `{union}`: {reason}")]
    MalformedUnion { union: String, reason: String },

    #[error("type graph deeper than {limit} levels")]
    DepthLimitExceeded { limit: usize },

    // Dispatch
    #[error("no rule matches `{descriptor}`")]
    NoMatchingRule { descriptor: String },

    #[error("rules {rules:?} all match `{descriptor}`")]
    AmbiguousRule {
        descriptor: String,
        rules: Vec<&'static str>,
    },

    // Leaf conversion
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("malformed base64 payload: {reason}")]
    MalformedBytes { reason: String },

    #[error("malformed UUID `{value}`: {source}")]
    MalformedUuid {
        value: String,
        #[source]
        source: uuid::Error,
    },

    #[error("malformed timestamp `{value}` (expected YYYY-MM-DDTHH:MM:SS.ffffff)")]
    MalformedTimestamp { value: String },

    #[error("`{value}` is not a member of enum `{enum_name}`")]
    UnknownEnumValue { enum_name: String, value: String },

    #[error("arity mismatch for `{descriptor}`: expected {expected} items, got {got}")]
    ArityMismatch {
        descriptor: String,
        expected: usize,
        got: usize,
    },

    // Structural conversion
    #[error("cannot build record `{record}` at field `{field}`: {source}")]
    RecordBuild {
        record: String,
        field: String,
        #[source]
        source: Box<SerdeError>,
    },

    #[error("callable `{callable}` is missing annotations for {params:?}")]
    MissingAnnotation {
        callable: String,
        params: Vec<String>,
    },

    #[error("invalid signature for `{callable}`: {reason}")]
    InvalidSignature { callable: String, reason: String },

    #[error("callable `{callable}` takes {expected} positional arguments but {got} were given")]
    TooManyArguments {
        callable: String,
        expected: usize,
        got: usize,
    },

    #[error("callable `{callable}` got an unexpected keyword argument `{keyword}`")]
    UnexpectedKeyword { callable: String, keyword: String },

    #[error("callable `{callable}` got multiple values for argument `{name}`")]
    DuplicateArgument { callable: String, name: String },

    #[error("callable `{callable}` argument `{parameter}`: {source}")]
    Argument {
        callable: String,
        parameter: String,
        #[source]
        source: Box<SerdeError>,
    },

    // Union
    #[error("no member of `{union}` accepts the value: {}", .attempts.join("; "))]
    UnionDecode {
        union: String,
        attempts: Vec<String>,
    },

    #[error("no member of `{union}` can encode the value: {}", .attempts.join("; "))]
    UnionEncode {
        union: String,
        attempts: Vec<String>,
    },

    #[error("converter for `{descriptor}` used before its graph finished building")]
    Incomplete { descriptor: String },
}

impl SerdeError {
    /// Shorthand for a [`SerdeError::TypeMismatch`].
    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Wrap `self` as the failure of `field` inside `record`.
    pub fn in_field(self, record: &str, field: &str) -> Self {
        Self::RecordBuild {
            record: record.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// Wrap `self` as the failure of `parameter` of `callable`.
    pub fn in_argument(self, callable: &str, parameter: &str) -> Self {
        Self::Argument {
            callable: callable.to_string(),
            parameter: parameter.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns `true` for errors raised while building a graph rather than
    /// while converting a value.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedReference { .. }
                | Self::UnboundTypeVariable { .. }
                | Self::MalformedUnion { .. }
                | Self::DepthLimitExceeded { .. }
                | Self::NoMatchingRule { .. }
                | Self::AmbiguousRule { .. }
                | Self::MissingAnnotation { .. }
                | Self::InvalidSignature { .. }
        )
    }
}
