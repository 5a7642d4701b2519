// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::thread;

use super::{
    Heap,
    heap_bits::{
        CompactionLists, HeapBits, HeapMarkAndSweep, WorkQueues, mark_heap_vector_values,
        sweep_heap_vector_values,
    },
    indexes::{
        BuiltinFunctionIndex, ErrorIndex, ObjectIndex, PromiseIndex, PromiseReactionIndex,
        PromiseResolvingFunctionsIndex, RealmIndex, StringIndex,
    },
};
use crate::ecmascript::execution::Agent;

/// Marks everything reachable from the realms, the global roots and the
/// execution context stack, then compacts every arena and rewrites all
/// surviving references.
pub(crate) fn heap_gc(agent: &mut Agent) {
    let before = agent.heap.counts();
    let allocated = agent.heap.allocated_since_gc();
    let Agent {
        heap,
        execution_context_stack,
        ..
    } = agent;
    let mut bits = HeapBits::new(heap);
    let mut queues = WorkQueues::new(heap);

    heap.realms.iter().enumerate().for_each(|(index, realm)| {
        if realm.is_some() {
            queues.realms.push(RealmIndex::from_index(index));
        }
    });
    heap.globals.mark_values(&mut queues);
    execution_context_stack.mark_values(&mut queues);

    while !queues.is_empty() {
        let Heap {
            builtin_functions,
            errors,
            globals: _,
            objects,
            promise_reaction_records,
            promise_resolving_functions,
            promises,
            realms,
            strings,
            alloc_counter: _,
        } = heap;

        let mut builtin_function_marks: Box<[BuiltinFunctionIndex]> =
            queues.builtin_functions.drain(..).collect();
        builtin_function_marks.sort();
        mark_heap_vector_values(
            &builtin_function_marks,
            &mut bits.builtin_functions,
            builtin_functions,
            &mut queues,
        );

        let mut error_marks: Box<[ErrorIndex]> = queues.errors.drain(..).collect();
        error_marks.sort();
        mark_heap_vector_values(&error_marks, &mut bits.errors, errors, &mut queues);

        let mut object_marks: Box<[ObjectIndex]> = queues.objects.drain(..).collect();
        object_marks.sort();
        mark_heap_vector_values(&object_marks, &mut bits.objects, objects, &mut queues);

        let mut promise_reaction_record_marks: Box<[PromiseReactionIndex]> =
            queues.promise_reaction_records.drain(..).collect();
        promise_reaction_record_marks.sort();
        mark_heap_vector_values(
            &promise_reaction_record_marks,
            &mut bits.promise_reaction_records,
            promise_reaction_records,
            &mut queues,
        );

        let mut promise_resolving_function_marks: Box<[PromiseResolvingFunctionsIndex]> =
            queues.promise_resolving_functions.drain(..).collect();
        promise_resolving_function_marks.sort();
        mark_heap_vector_values(
            &promise_resolving_function_marks,
            &mut bits.promise_resolving_functions,
            promise_resolving_functions,
            &mut queues,
        );

        let mut promise_marks: Box<[PromiseIndex]> = queues.promises.drain(..).collect();
        promise_marks.sort();
        mark_heap_vector_values(&promise_marks, &mut bits.promises, promises, &mut queues);

        let mut realm_marks: Box<[RealmIndex]> = queues.realms.drain(..).collect();
        realm_marks.sort();
        mark_heap_vector_values(&realm_marks, &mut bits.realms, realms, &mut queues);

        let mut string_marks: Box<[StringIndex]> = queues.strings.drain(..).collect();
        string_marks.sort();
        mark_heap_vector_values(&string_marks, &mut bits.strings, strings, &mut queues);
    }

    sweep(heap, execution_context_stack, &bits);

    heap.alloc_counter = 0;
    log::debug!(
        "Garbage collected after {allocated} bytes: {before:?} -> {:?}",
        heap.counts()
    );
}

fn sweep<T: HeapMarkAndSweep + Send>(heap: &mut Heap, external_roots: &mut T, bits: &HeapBits) {
    let compactions = CompactionLists::create_from_bits(bits);

    let Heap {
        builtin_functions,
        errors,
        globals,
        objects,
        promise_reaction_records,
        promise_resolving_functions,
        promises,
        realms,
        strings,
        alloc_counter: _,
    } = heap;

    thread::scope(|s| {
        s.spawn(|| {
            // Globals are never compacted; only the references they hold move.
            globals.sweep_values(&compactions);
            external_roots.sweep_values(&compactions);
        });
        s.spawn(|| {
            sweep_heap_vector_values(builtin_functions, &compactions, &bits.builtin_functions);
        });
        s.spawn(|| {
            sweep_heap_vector_values(errors, &compactions, &bits.errors);
        });
        s.spawn(|| {
            sweep_heap_vector_values(objects, &compactions, &bits.objects);
        });
        s.spawn(|| {
            sweep_heap_vector_values(
                promise_reaction_records,
                &compactions,
                &bits.promise_reaction_records,
            );
        });
        s.spawn(|| {
            sweep_heap_vector_values(
                promise_resolving_functions,
                &compactions,
                &bits.promise_resolving_functions,
            );
        });
        s.spawn(|| {
            sweep_heap_vector_values(promises, &compactions, &bits.promises);
        });
        s.spawn(|| {
            sweep_heap_vector_values(realms, &compactions, &bits.realms);
        });
        s.spawn(|| {
            sweep_heap_vector_values(strings, &compactions, &bits.strings);
        });
    });
}
