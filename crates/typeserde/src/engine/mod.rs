// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serde engine: turns descriptors into [`ConverterPair`]s.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use typeserde::descriptor::TypeDescriptor;
//! use typeserde::{SerdeEngine, TypeContext, Value};
//!
//! let engine = SerdeEngine::new(TypeContext::new());
//! let ty = TypeDescriptor::list(TypeDescriptor::optional(TypeDescriptor::int()));
//! let pair = engine.build(&ty).unwrap();
//!
//! let value = pair.decode(&json!([1, null])).unwrap();
//! assert_eq!(value, Value::List(vec![Value::Int(1), Value::Null]));
//! assert_eq!(pair.encode(&value).unwrap(), json!([1, null]));
//! ```

mod cache;
mod converter;
mod graph;

pub use converter::{ConverterPair, DecodeFn, EncodeFn};

use crate::config::{ConfigError, SerdeConfig};
use crate::context::TypeContext;
use crate::descriptor::{Bindings, RecordDescriptor, Signature, TypeDescriptor, TypeKind, TypeRef};
use crate::error::SerdeResult;
use crate::normalize::Normalizer;
use cache::ConverterCache;
use graph::GraphBuilder;
use std::sync::Arc;

/// Builds converter pairs for descriptors resolved against a [`TypeContext`].
pub struct SerdeEngine {
    context: TypeContext,
    config: SerdeConfig,
    cache: Option<ConverterCache>,
}

impl SerdeEngine {
    /// Create an engine with the default configuration.
    pub fn new(context: TypeContext) -> Self {
        Self::with_config(context, SerdeConfig::default())
    }

    /// Create an engine with `config` as given.
    ///
    /// The config is not validated here; configs loaded through
    /// [`SerdeConfig::from_file`] already are. Use
    /// [`SerdeEngine::try_with_config`] for configs assembled in code.
    pub fn with_config(context: TypeContext, config: SerdeConfig) -> Self {
        let cache = config.shared_cache.then(ConverterCache::new);
        log::debug!(
            "[SerdeEngine::with_config] {} named types, shared cache {}",
            context.len(),
            if cache.is_some() { "on" } else { "off" }
        );
        Self {
            context,
            config,
            cache,
        }
    }

    /// Create an engine after checking `config` with [`SerdeConfig::validate`].
    pub fn try_with_config(context: TypeContext, config: SerdeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(context, config))
    }

    pub fn config(&self) -> &SerdeConfig {
        &self.config
    }

    pub fn context(&self) -> &TypeContext {
        &self.context
    }

    /// Canonical form of `ty`.
    pub fn normalize(&self, ty: &TypeRef) -> SerdeResult<TypeRef> {
        self.normalizer(&Bindings::new()).normalize(ty)
    }

    /// Build the converter pair for `ty`.
    pub fn build(&self, ty: &TypeRef) -> SerdeResult<ConverterPair> {
        self.build_with_bindings(ty, &Bindings::new())
    }

    /// Build the converter pair for a generic `ty` instantiated with
    /// `bindings`.
    ///
    /// A root record or signature takes the bindings as its own, so its
    /// field and parameter types see them.
    pub fn build_with_bindings(&self, ty: &TypeRef, bindings: &Bindings) -> SerdeResult<ConverterPair> {
        let root = self.scope_root(ty, bindings)?;
        GraphBuilder::new(&self.context, &self.config, self.cache.as_ref()).build(&root, bindings)
    }

    /// Register a named type for forward references.
    ///
    /// Cached converters may have resolved the old meaning of `name`, so
    /// the cache is dropped.
    pub fn register_type(&mut self, name: impl Into<String>, ty: TypeRef) {
        self.context.register(name, ty);
        self.invalidate_cache();
    }

    /// Drop every cached converter pair. Pairs already handed out stay valid.
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            log::debug!(
                "[SerdeEngine::invalidate_cache] dropping {} entries",
                cache.len()
            );
            cache.clear();
        }
    }

    /// Number of cached converter pairs (zero without a shared cache).
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, ConverterCache::len)
    }

    fn normalizer<'a>(&'a self, bindings: &'a Bindings) -> Normalizer<'a, TypeContext> {
        Normalizer::new(&self.context, bindings, self.config.max_depth)
    }

    fn scope_root(&self, ty: &TypeRef, bindings: &Bindings) -> SerdeResult<TypeRef> {
        if bindings.is_empty() {
            return Ok(ty.clone());
        }
        let n = self.normalizer(bindings);
        let root = n.normalize(ty)?;
        let merge = |own: &Bindings| -> SerdeResult<Bindings> {
            let mut merged = own.clone();
            for (name, bound) in bindings {
                if !merged.contains_key(name) {
                    merged.insert(name.clone(), n.normalize(bound)?);
                }
            }
            Ok(merged)
        };
        let scoped = match &root.kind {
            TypeKind::Record(r) => TypeDescriptor::new(TypeKind::Record(RecordDescriptor {
                bindings: merge(&r.bindings)?,
                ..r.clone()
            })),
            TypeKind::CallableArgs(sig) => TypeDescriptor::callable_args(Arc::new(Signature {
                bindings: merge(&sig.bindings)?,
                ..(**sig).clone()
            })),
            TypeKind::CallableReturn(sig) => TypeDescriptor::callable_return(Arc::new(Signature {
                bindings: merge(&sig.bindings)?,
                ..(**sig).clone()
            })),
            _ => root,
        };
        Ok(scoped)
    }
}
