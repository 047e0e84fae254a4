// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] is the language-neutral answer to "what type is
//! this": atoms, containers, unions, records, enums and callable
//! signatures. Raw descriptors may hold forward references, generic
//! variables and union tail markers; [`crate::normalize`] turns them into
//! the canonical form the rules dispatch on.
//!
//! # Example
//!
//! ```rust
//! use typeserde::descriptor::{RecordBuilder, TypeDescriptor};
//!
//! let point = RecordBuilder::new("Point")
//!     .field("x", TypeDescriptor::int())
//!     .field("y", TypeDescriptor::int())
//!     .optional_field("label", TypeDescriptor::string())
//!     .build();
//!
//! assert_eq!(point.field_names(), Some(vec!["x", "y", "label"]));
//! ```

mod builder;
mod type_descriptor;

pub use builder::{EnumBuilder, RecordBuilder, SignatureBuilder};
pub use type_descriptor::{
    AtomKind, Bindings, EnumDescriptor, EnumMember, EnumValue, FieldDescriptor, Kind, Parameter,
    RecordDescriptor, Signature, TypeDescriptor, TypeKind, TypeRef,
};
