// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{
    Heap,
    indexes::{
        BaseIndex, BuiltinFunctionIndex, ErrorIndex, ObjectIndex, PromiseIndex,
        PromiseReactionIndex, PromiseResolvingFunctionsIndex, RealmIndex, StringIndex,
    },
};
use crate::ecmascript::types::Value;

/// Tracing contract of everything stored in or pointing into the heap.
///
/// `mark_values` must push every heap reference owned by `self` onto the
/// work queues; `sweep_values` must rewrite every such reference to its
/// post-compaction index. The two must visit exactly the same edges.
pub(crate) trait HeapMarkAndSweep {
    fn mark_values(&self, queues: &mut WorkQueues);

    fn sweep_values(&mut self, compactions: &CompactionLists);
}

impl<T: HeapMarkAndSweep> HeapMarkAndSweep for Option<T> {
    fn mark_values(&self, queues: &mut WorkQueues) {
        if let Some(content) = self {
            content.mark_values(queues);
        }
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        if let Some(content) = self {
            content.sweep_values(compactions);
        }
    }
}

impl<T: HeapMarkAndSweep> HeapMarkAndSweep for Vec<T> {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.iter().for_each(|entry| entry.mark_values(queues));
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        self.iter_mut()
            .for_each(|entry| entry.sweep_values(compactions));
    }
}

impl<T: HeapMarkAndSweep> HeapMarkAndSweep for Box<[T]> {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.iter().for_each(|entry| entry.mark_values(queues));
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        self.iter_mut()
            .for_each(|entry| entry.sweep_values(compactions));
    }
}

#[derive(Debug)]
pub(crate) struct HeapBits {
    pub builtin_functions: Box<[bool]>,
    pub errors: Box<[bool]>,
    pub objects: Box<[bool]>,
    pub promise_reaction_records: Box<[bool]>,
    pub promise_resolving_functions: Box<[bool]>,
    pub promises: Box<[bool]>,
    pub realms: Box<[bool]>,
    pub strings: Box<[bool]>,
}

impl HeapBits {
    pub fn new(heap: &Heap) -> Self {
        Self {
            builtin_functions: vec![false; heap.builtin_functions.len()].into_boxed_slice(),
            errors: vec![false; heap.errors.len()].into_boxed_slice(),
            objects: vec![false; heap.objects.len()].into_boxed_slice(),
            promise_reaction_records: vec![false; heap.promise_reaction_records.len()]
                .into_boxed_slice(),
            promise_resolving_functions: vec![false; heap.promise_resolving_functions.len()]
                .into_boxed_slice(),
            promises: vec![false; heap.promises.len()].into_boxed_slice(),
            realms: vec![false; heap.realms.len()].into_boxed_slice(),
            strings: vec![false; heap.strings.len()].into_boxed_slice(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct WorkQueues {
    pub builtin_functions: Vec<BuiltinFunctionIndex>,
    pub errors: Vec<ErrorIndex>,
    pub objects: Vec<ObjectIndex>,
    pub promise_reaction_records: Vec<PromiseReactionIndex>,
    pub promise_resolving_functions: Vec<PromiseResolvingFunctionsIndex>,
    pub promises: Vec<PromiseIndex>,
    pub realms: Vec<RealmIndex>,
    pub strings: Vec<StringIndex>,
}

impl WorkQueues {
    pub fn new(heap: &Heap) -> Self {
        Self {
            builtin_functions: Vec::with_capacity(heap.builtin_functions.len() / 4),
            errors: Vec::with_capacity(heap.errors.len() / 4),
            objects: Vec::with_capacity(heap.objects.len() / 4),
            promise_reaction_records: Vec::with_capacity(
                heap.promise_reaction_records.len() / 4,
            ),
            promise_resolving_functions: Vec::with_capacity(
                heap.promise_resolving_functions.len() / 4,
            ),
            promises: Vec::with_capacity(heap.promises.len() / 4),
            realms: Vec::with_capacity(heap.realms.len() / 4),
            strings: Vec::with_capacity(heap.strings.len() / 4),
        }
    }

    pub fn push_value(&mut self, value: Value) {
        match value {
            Value::Undefined
            | Value::Null
            | Value::Boolean(_)
            | Value::Number(_) => {}
            Value::String(data) => self.strings.push(data.0),
            Value::Object(data) => self.objects.push(data.0),
            Value::Error(data) => self.errors.push(data.0),
            Value::Promise(data) => self.promises.push(data.0),
            Value::BuiltinFunction(data) => self.builtin_functions.push(data.0),
            Value::BuiltinPromiseResolvingFunction(data) => {
                self.promise_resolving_functions.push(data.functions.0)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.builtin_functions.is_empty()
            && self.errors.is_empty()
            && self.objects.is_empty()
            && self.promise_reaction_records.is_empty()
            && self.promise_resolving_functions.is_empty()
            && self.promises.is_empty()
            && self.realms.is_empty()
            && self.strings.is_empty()
    }
}

/// Describes how indexes into one arena move when the arena is compacted.
///
/// `indexes` holds, in ascending order, the first surviving index after
/// each run of collected slots; `shifts` holds the total number of slots
/// collected before that index.
#[derive(Debug)]
pub(crate) struct CompactionList {
    indexes: Box<[u32]>,
    shifts: Box<[u32]>,
}

impl CompactionList {
    pub fn get_shift_for_index(&self, index: u32) -> u32 {
        let position = self.indexes.partition_point(|&candidate| candidate <= index);
        if position == 0 {
            0
        } else {
            self.shifts[position - 1]
        }
    }

    pub fn shift_index<T: ?Sized>(&self, index: &mut BaseIndex<T>) {
        let base_index = index.into_index() as u32;
        *index = BaseIndex::from_u32_index(base_index - self.get_shift_for_index(base_index));
    }

    fn build(indexes: Vec<u32>, shifts: Vec<u32>) -> Self {
        assert_eq!(indexes.len(), shifts.len());
        Self {
            indexes: indexes.into_boxed_slice(),
            shifts: shifts.into_boxed_slice(),
        }
    }

    pub(crate) fn from_mark_bits(marks: &[bool]) -> Self {
        let mut builder = CompactionListBuilder::default();
        marks.iter().for_each(|&bit| {
            if bit {
                builder.mark_used();
            } else {
                builder.mark_unused();
            }
        });
        builder.done()
    }
}

#[derive(Debug, Default)]
pub(crate) struct CompactionListBuilder {
    indexes: Vec<u32>,
    shifts: Vec<u32>,
    current_index: u32,
    current_shift: u32,
    last_pushed_shift: u32,
}

impl CompactionListBuilder {
    pub fn mark_used(&mut self) {
        if self.current_shift != self.last_pushed_shift {
            debug_assert!(self.indexes.last().is_none_or(|&last| last < self.current_index));
            self.indexes.push(self.current_index);
            self.shifts.push(self.current_shift);
            self.last_pushed_shift = self.current_shift;
        }
        self.current_index += 1;
    }

    pub fn mark_unused(&mut self) {
        self.current_shift += 1;
        self.current_index += 1;
    }

    pub fn done(self) -> CompactionList {
        CompactionList::build(self.indexes, self.shifts)
    }
}

pub(crate) struct CompactionLists {
    pub builtin_functions: CompactionList,
    pub errors: CompactionList,
    pub objects: CompactionList,
    pub promise_reaction_records: CompactionList,
    pub promise_resolving_functions: CompactionList,
    pub promises: CompactionList,
    pub realms: CompactionList,
    pub strings: CompactionList,
}

impl CompactionLists {
    pub fn create_from_bits(bits: &HeapBits) -> Self {
        Self {
            builtin_functions: CompactionList::from_mark_bits(&bits.builtin_functions),
            errors: CompactionList::from_mark_bits(&bits.errors),
            objects: CompactionList::from_mark_bits(&bits.objects),
            promise_reaction_records: CompactionList::from_mark_bits(
                &bits.promise_reaction_records,
            ),
            promise_resolving_functions: CompactionList::from_mark_bits(
                &bits.promise_resolving_functions,
            ),
            promises: CompactionList::from_mark_bits(&bits.promises),
            realms: CompactionList::from_mark_bits(&bits.realms),
            strings: CompactionList::from_mark_bits(&bits.strings),
        }
    }
}

/// Marks every not yet marked entry named in `marks` and queues the
/// references it owns.
pub(crate) fn mark_heap_vector_values<T: HeapMarkAndSweep>(
    marks: &[BaseIndex<T>],
    bits: &mut [bool],
    vec: &[Option<T>],
    queues: &mut WorkQueues,
) {
    marks.iter().for_each(|&idx| {
        let index = idx.into_index();
        if let Some(marked) = bits.get_mut(index) {
            if *marked {
                // Already marked, ignore
                return;
            }
            *marked = true;
            vec[index].mark_values(queues);
        }
    });
}

/// Drops every unmarked entry of `vec` and rewrites the references held
/// by the survivors.
pub(crate) fn sweep_heap_vector_values<T: HeapMarkAndSweep>(
    vec: &mut Vec<Option<T>>,
    compactions: &CompactionLists,
    bits: &[bool],
) {
    assert_eq!(vec.len(), bits.len());
    let mut iter = bits.iter();
    vec.retain_mut(|item| {
        if *iter.next().unwrap() {
            item.sweep_values(compactions);
            true
        } else {
            false
        }
    });
}
