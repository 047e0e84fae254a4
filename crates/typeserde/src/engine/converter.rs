// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled converters.

use crate::descriptor::TypeRef;
use crate::error::{SerdeError, SerdeResult};
use crate::value::{Value, Wire};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Wire to native conversion.
pub type DecodeFn = Arc<dyn Fn(&Wire) -> SerdeResult<Value> + Send + Sync>;

/// Native to wire conversion.
pub type EncodeFn = Arc<dyn Fn(&Value) -> SerdeResult<Wire> + Send + Sync>;

/// One node of a converter graph.
///
/// The converters are set exactly once, after every dependency of the node
/// has been visited. Edges that reach the node before then hold a [`Weak`]
/// handle and read the converters at call time.
pub(crate) struct NodeCell {
    descriptor: TypeRef,
    converters: OnceLock<(DecodeFn, EncodeFn)>,
}

impl NodeCell {
    pub(crate) fn new(descriptor: TypeRef) -> Arc<Self> {
        Arc::new(Self {
            descriptor,
            converters: OnceLock::new(),
        })
    }

    pub(crate) fn descriptor(&self) -> &TypeRef {
        &self.descriptor
    }

    pub(crate) fn converters(&self) -> Option<&(DecodeFn, EncodeFn)> {
        self.converters.get()
    }

    /// Install the node's converters; a second call keeps the first pair.
    pub(crate) fn finish(&self, decode: DecodeFn, encode: EncodeFn) -> (DecodeFn, EncodeFn) {
        self.converters.get_or_init(|| (decode, encode)).clone()
    }

    /// Converters that resolve this node when called rather than now.
    pub(crate) fn late_bound(self: &Arc<Self>) -> (DecodeFn, EncodeFn) {
        let weak = Arc::downgrade(self);
        let label = self.descriptor.to_string();
        let decode: DecodeFn = {
            let weak = weak.clone();
            let label = label.clone();
            Arc::new(move |wire| (resolve(&weak, &label)?.0)(wire))
        };
        let encode: EncodeFn = Arc::new(move |value| (resolve(&weak, &label)?.1)(value));
        (decode, encode)
    }
}

fn resolve(cell: &Weak<NodeCell>, label: &str) -> SerdeResult<(DecodeFn, EncodeFn)> {
    cell.upgrade()
        .and_then(|cell| cell.converters().cloned())
        .ok_or_else(|| SerdeError::Incomplete {
            descriptor: label.to_string(),
        })
}

/// Keeps every node of a built graph alive for as long as any converter
/// pair taken from it.
pub(crate) struct Arena {
    nodes: Vec<Arc<NodeCell>>,
    borrowed: Vec<Arc<Arena>>,
}

impl Arena {
    pub(crate) fn new(nodes: Vec<Arc<NodeCell>>, borrowed: Vec<Arc<Arena>>) -> Arc<Self> {
        Arc::new(Self { nodes, borrowed })
    }

    pub(crate) fn nodes(&self) -> &[Arc<NodeCell>] {
        &self.nodes
    }

    /// Nodes owned by this arena plus every arena it borrows from.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len() + self.borrowed.iter().map(|a| a.node_count()).sum::<usize>()
    }
}

/// Compiled decode/encode pair for one normalized descriptor.
#[derive(Clone)]
pub struct ConverterPair {
    descriptor: TypeRef,
    decode: DecodeFn,
    encode: EncodeFn,
    arena: Arc<Arena>,
}

impl ConverterPair {
    pub(crate) fn new(
        descriptor: TypeRef,
        (decode, encode): (DecodeFn, EncodeFn),
        arena: Arc<Arena>,
    ) -> Self {
        Self {
            descriptor,
            decode,
            encode,
            arena,
        }
    }

    /// Convert a wire value to its native form.
    pub fn decode(&self, wire: &Wire) -> SerdeResult<Value> {
        (self.decode)(wire)
    }

    /// Convert a native value to its wire form.
    pub fn encode(&self, value: &Value) -> SerdeResult<Wire> {
        (self.encode)(value)
    }

    /// Normalized descriptor this pair converts.
    pub fn descriptor(&self) -> &TypeRef {
        &self.descriptor
    }

    /// The decode function, for callers that compose converters themselves.
    pub fn decoder(&self) -> DecodeFn {
        let arena = self.arena.clone();
        let decode = self.decode.clone();
        Arc::new(move |wire| {
            let _keep = &arena;
            decode(wire)
        })
    }

    /// The encode function, for callers that compose converters themselves.
    pub fn encoder(&self) -> EncodeFn {
        let arena = self.arena.clone();
        let encode = self.encode.clone();
        Arc::new(move |value| {
            let _keep = &arena;
            encode(value)
        })
    }

    pub(crate) fn arena(&self) -> &Arc<Arena> {
        &self.arena
    }
}

impl fmt::Debug for ConverterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterPair")
            .field("descriptor", &self.descriptor.to_string())
            .field("nodes", &self.arena.node_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use serde_json::json;

    #[test]
    fn test_late_bound_before_and_after_finish() {
        let cell = NodeCell::new(TypeDescriptor::int());
        let (decode, _) = cell.late_bound();
        assert!(matches!(
            decode(&json!(1)),
            Err(SerdeError::Incomplete { .. })
        ));

        let identity: DecodeFn = Arc::new(|_| Ok(Value::Int(7)));
        let null: EncodeFn = Arc::new(|_| Ok(Wire::Null));
        cell.finish(identity, null);
        assert_eq!(decode(&json!(1)).expect("finished"), Value::Int(7));
    }

    #[test]
    fn test_late_bound_after_drop() {
        let cell = NodeCell::new(TypeDescriptor::int());
        let (_, encode) = cell.late_bound();
        drop(cell);
        assert!(encode(&Value::Null).is_err());
    }

    #[test]
    fn test_pair_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ConverterPair>();
    }
}
