// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod heap_bits;
pub(crate) mod heap_gc;
pub mod indexes;

pub(crate) use heap_bits::{CompactionLists, HeapMarkAndSweep, WorkQueues};

use crate::{
    ecmascript::{
        builtins::{
            builtin_function::BuiltinFunctionHeapData,
            error::ErrorHeapData,
            promise::PromiseHeapData,
            promise_objects::promise_abstract_operations::{
                promise_reaction_records::PromiseReactionRecord,
                promise_resolving_functions::PromiseResolvingFunctionsHeapData,
            },
        },
        execution::RealmHeapData,
        types::{ObjectHeapData, StringHeapData},
    },
    engine::rootable::HeapRootData,
};

/// Arena storage of every heap-allocated value. Handles are indexes into
/// these vectors; a `None` slot is only ever observed while a realm is
/// being created.
#[derive(Debug)]
pub struct Heap {
    pub(crate) builtin_functions: Vec<Option<BuiltinFunctionHeapData>>,
    pub(crate) errors: Vec<Option<ErrorHeapData>>,
    /// Root slots. Not compacted: a slot's index is the identity of its
    /// `Global`.
    pub(crate) globals: Vec<Option<HeapRootData>>,
    pub(crate) objects: Vec<Option<ObjectHeapData>>,
    pub(crate) promise_reaction_records: Vec<Option<PromiseReactionRecord>>,
    pub(crate) promise_resolving_functions: Vec<Option<PromiseResolvingFunctionsHeapData>>,
    pub(crate) promises: Vec<Option<PromiseHeapData>>,
    pub(crate) realms: Vec<Option<RealmHeapData>>,
    pub(crate) strings: Vec<Option<StringHeapData>>,
    /// Bytes allocated since the last garbage collection.
    pub(crate) alloc_counter: usize,
}

pub trait CreateHeapData<T, F> {
    /// Creates a [`Value`] from the given data. Allocating the data is **not**
    /// guaranteed.
    ///
    /// [`Value`]: crate::ecmascript::types::Value
    fn create(&mut self, data: T) -> F;
}

/// Number of entries in each arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapCounts {
    pub builtin_functions: usize,
    pub errors: usize,
    pub globals: usize,
    pub objects: usize,
    pub promise_reaction_records: usize,
    pub promise_resolving_functions: usize,
    pub promises: usize,
    pub realms: usize,
    pub strings: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            builtin_functions: Vec::with_capacity(64),
            errors: Vec::with_capacity(16),
            globals: Vec::with_capacity(64),
            objects: Vec::with_capacity(64),
            promise_reaction_records: Vec::with_capacity(64),
            promise_resolving_functions: Vec::with_capacity(64),
            promises: Vec::with_capacity(64),
            realms: Vec::with_capacity(1),
            strings: Vec::with_capacity(64),
            alloc_counter: 0,
        }
    }

    pub fn counts(&self) -> HeapCounts {
        HeapCounts {
            builtin_functions: self.builtin_functions.len(),
            errors: self.errors.len(),
            globals: self.globals.iter().filter(|slot| slot.is_some()).count(),
            objects: self.objects.len(),
            promise_reaction_records: self.promise_reaction_records.len(),
            promise_resolving_functions: self.promise_resolving_functions.len(),
            promises: self.promises.len(),
            realms: self.realms.len(),
            strings: self.strings.len(),
        }
    }

    /// Bytes allocated since the last garbage collection.
    pub fn allocated_since_gc(&self) -> usize {
        self.alloc_counter
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
