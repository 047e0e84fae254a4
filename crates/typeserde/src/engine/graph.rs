// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converter graph construction.
//!
//! The builder walks the dependency graph depth-first. Each normalized
//! descriptor gets one node, inserted into the memo table *before* its
//! dependencies are visited; a dependency that leads back to a node still
//! under construction receives the node's late-bound converters instead of
//! recursing. This is what makes self-referential records terminate.
//!
//! ```text
//!   Node { value: int, next: Optional[Node] }
//!
//!   visit(Node)            memo: Node -> cell (unfinished)
//!     visit(int)           memo: int  -> cell (finished)
//!     visit(Optional[Node])
//!       visit(Node)        hit, unfinished -> late-bound handle
//!                          memo: Optional[Node] -> cell (finished)
//!   finish(Node)
//! ```

use super::cache::ConverterCache;
use super::converter::{Arena, ConverterPair, DecodeFn, EncodeFn, NodeCell};
use crate::config::SerdeConfig;
use crate::context::TypeResolver;
use crate::descriptor::{Bindings, TypeRef};
use crate::error::{SerdeError, SerdeResult};
use crate::normalize::Normalizer;
use crate::rules::Rule;
use std::collections::HashMap;
use std::sync::Arc;

/// Memo table entry.
enum Link {
    /// Node built (or being built) by this walk.
    Local(Arc<NodeCell>),
    /// Node taken from the shared cache.
    Cached(ConverterPair),
}

/// Single-use builder for one top-level `build` call.
pub(crate) struct GraphBuilder<'a, R: TypeResolver + ?Sized> {
    resolver: &'a R,
    config: &'a SerdeConfig,
    cache: Option<&'a ConverterCache>,
    memo: HashMap<TypeRef, Link>,
    nodes: Vec<Arc<NodeCell>>,
    borrowed: Vec<Arc<Arena>>,
    reused: usize,
}

impl<'a, R: TypeResolver + ?Sized> GraphBuilder<'a, R> {
    pub(crate) fn new(
        resolver: &'a R,
        config: &'a SerdeConfig,
        cache: Option<&'a ConverterCache>,
    ) -> Self {
        Self {
            resolver,
            config,
            cache,
            memo: HashMap::new(),
            nodes: Vec::new(),
            borrowed: Vec::new(),
            reused: 0,
        }
    }

    /// Build the graph rooted at `root` and return its pair.
    ///
    /// Nothing is published to the shared cache unless the whole graph
    /// builds.
    pub(crate) fn build(mut self, root: &TypeRef, bindings: &Bindings) -> SerdeResult<ConverterPair> {
        let (descriptor, converters) = self.visit(root, bindings, 0)?;
        let local = self.nodes.len();
        let arena = Arena::new(self.nodes, self.borrowed);
        log::debug!(
            "[GraphBuilder::build] {}: {} new nodes, {} reused",
            descriptor,
            local,
            self.reused
        );

        if let Some(cache) = self.cache {
            let published = cache.publish(arena.nodes().iter().filter_map(|cell| {
                let converters = cell.converters()?.clone();
                Some(ConverterPair::new(
                    cell.descriptor().clone(),
                    converters,
                    arena.clone(),
                ))
            }));
            log::debug!("[GraphBuilder::build] published {} cache entries", published);
        }
        Ok(ConverterPair::new(descriptor, converters, arena))
    }

    fn visit(
        &mut self,
        raw: &TypeRef,
        bindings: &Bindings,
        depth: usize,
    ) -> SerdeResult<(TypeRef, (DecodeFn, EncodeFn))> {
        if depth > self.config.max_depth {
            return Err(SerdeError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        let ty = Normalizer::new(self.resolver, bindings, self.config.max_depth).normalize(raw)?;

        if let Some(link) = self.memo.get(&ty) {
            let converters = match link {
                Link::Local(cell) => match cell.converters() {
                    Some(done) => done.clone(),
                    None => {
                        log::trace!("[GraphBuilder::visit] back-edge to {}", ty);
                        cell.late_bound()
                    }
                },
                Link::Cached(pair) => (pair.decoder(), pair.encoder()),
            };
            return Ok((ty, converters));
        }

        if let Some(pair) = self.cache.and_then(|cache| cache.get(&ty)) {
            log::trace!("[GraphBuilder::visit] cache hit for {}", ty);
            self.reused += 1;
            self.borrowed.push(pair.arena().clone());
            let converters = (pair.decoder(), pair.encoder());
            self.memo.insert(ty.clone(), Link::Cached(pair));
            return Ok((ty, converters));
        }

        let rule = Rule::dispatch(&ty)?;
        log::trace!("[GraphBuilder::visit] {} -> rule {}", ty, rule.name());

        let cell = NodeCell::new(ty.clone());
        self.memo.insert(ty.clone(), Link::Local(cell.clone()));
        self.nodes.push(cell.clone());

        let dependencies = rule.dependencies(&ty)?;
        let mut decoders = Vec::with_capacity(dependencies.len());
        let mut encoders = Vec::with_capacity(dependencies.len());
        for dep in &dependencies {
            let (_, (decode, encode)) = self.visit(&dep.ty, &dep.bindings, depth + 1)?;
            decoders.push(decode);
            encoders.push(encode);
        }

        let decode = rule.decoder(&ty, &decoders, self.config)?;
        let encode = rule.encoder(&ty, &encoders, self.config)?;
        Ok((ty, cell.finish(decode, encode)))
    }
}
