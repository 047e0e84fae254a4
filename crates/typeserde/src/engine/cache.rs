// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine-wide converter cache.
//!
//! Keyed by normalized descriptor. Entries are only ever whole pairs from a
//! graph that finished building, so a concurrent reader sees either no entry
//! or a usable one.

use super::converter::ConverterPair;
use crate::descriptor::TypeRef;
use dashmap::DashMap;

#[derive(Default)]
pub(crate) struct ConverterCache {
    entries: DashMap<TypeRef, ConverterPair>,
}

impl ConverterCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, ty: &TypeRef) -> Option<ConverterPair> {
        self.entries.get(ty).map(|entry| entry.value().clone())
    }

    /// Insert pairs, keeping any entry another build published first.
    /// Returns the number of new entries.
    pub(crate) fn publish(&self, pairs: impl IntoIterator<Item = ConverterPair>) -> usize {
        let mut added = 0;
        for pair in pairs {
            let key = pair.descriptor().clone();
            if let dashmap::mapref::entry::Entry::Vacant(slot) = self.entries.entry(key) {
                slot.insert(pair);
                added += 1;
            }
        }
        added
    }

    pub(crate) fn clear(&self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::engine::converter::{Arena, DecodeFn, EncodeFn};
    use crate::value::{Value, Wire};
    use std::sync::Arc;

    fn pair(ty: TypeRef, marker: i64) -> ConverterPair {
        let decode: DecodeFn = Arc::new(move |_| Ok(Value::Int(marker)));
        let encode: EncodeFn = Arc::new(|_| Ok(Wire::Null));
        ConverterPair::new(ty, (decode, encode), Arena::new(Vec::new(), Vec::new()))
    }

    #[test]
    fn test_first_publish_wins() {
        let cache = ConverterCache::new();
        assert_eq!(cache.publish([pair(TypeDescriptor::int(), 1)]), 1);
        assert_eq!(cache.publish([pair(TypeDescriptor::int(), 2)]), 0);
        let hit = cache.get(&TypeDescriptor::int()).expect("cached");
        assert_eq!(hit.decode(&Wire::Null).expect("decode"), Value::Int(1));

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(cache.get(&TypeDescriptor::int()).is_none());
    }
}
