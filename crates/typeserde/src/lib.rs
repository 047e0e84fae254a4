// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # typeserde - Type-directed serialization for RPC marshalling
//!
//! Builds composable decode/encode functions from runtime type descriptors.
//! A descriptor says what a value is (atoms, containers, unions, records,
//! enums, callable signatures); the engine normalizes it, walks its
//! dependency graph once, and hands back a [`ConverterPair`] that converts
//! between JSON-compatible wire values and native [`Value`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use typeserde::descriptor::{RecordBuilder, TypeDescriptor};
//! use typeserde::{SerdeEngine, SerdeResult, TypeContext};
//!
//! fn main() -> SerdeResult<()> {
//!     // A linked list node that refers to itself by name
//!     let node = RecordBuilder::new("Node")
//!         .field("value", TypeDescriptor::int())
//!         .optional_field("next", TypeDescriptor::reference("Node"))
//!         .build();
//!
//!     let engine = SerdeEngine::new(TypeContext::new().with("Node", node.clone()));
//!     let pair = engine.build(&node)?;
//!
//!     let wire = json!({"value": 1, "next": {"value": 2, "next": null}});
//!     let value = pair.decode(&wire)?;
//!     assert_eq!(pair.encode(&value)?, wire);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  TypeDescriptor (raw)   Ref / Var / Union tails allowed        |
//! +---------------------------------------------------------------+
//! |  Normalizer             TypeContext + Bindings -> canonical    |
//! +---------------------------------------------------------------+
//! |  Rule::dispatch         exactly one rule per canonical kind    |
//! +---------------------------------------------------------------+
//! |  GraphBuilder           memoized DFS, late-bound back-edges    |
//! +---------------------------------------------------------------+
//! |  ConverterPair          decode(&Wire) / encode(&Value)         |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Modules
//!
//! - [`descriptor`] - type descriptors and builders
//! - [`normalize`] - canonicalization of raw descriptors
//! - [`rules`] - the closed set of serialization rules
//! - [`engine`] - graph construction, converter pairs, shared cache
//! - [`config`] - engine configuration (TOML-loadable)
//! - [`value`] - native values and the wire alias

pub mod config;
pub mod context;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod rules;
pub mod value;


pub use config::{BytesAlphabet, ConfigError, SerdeConfig};
pub use context::{TypeContext, TypeResolver};
pub use descriptor::{TypeDescriptor, TypeKind, TypeRef};
pub use engine::{ConverterPair, DecodeFn, EncodeFn, SerdeEngine};
pub use error::{SerdeError, SerdeResult};
pub use rules::Rule;
pub use value::{CallArgs, Dict, Record, Value, Wire};
