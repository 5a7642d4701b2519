// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.1.2 PromiseReaction Records](https://tc39.es/ecma262/#sec-promisereaction-records)

use std::ops::{Index, IndexMut};

use super::{promise_capability_records::PromiseCapability, promise_jobs::new_promise_reaction_job};
use crate::{
    ecmascript::{
        builtins::promise::PromiseReactions,
        execution::Agent,
        types::{Function, Value},
    },
    heap::{
        CompactionLists, CreateHeapData, Heap, HeapMarkAndSweep, WorkQueues,
        indexes::PromiseReactionIndex,
    },
};

/// \[\[Type\]\]
///
/// fulfill or reject
///
/// The \[\[Type\]\] is used when \[\[Handler\]\] is empty to allow for
/// behaviour specific to the settlement type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PromiseReactionType {
    Fulfill,
    Reject,
}

/// \[\[Handler\]\]
///
/// a JobCallback Record or empty
///
/// The function that should be applied to the incoming value, and whose
/// return value will govern what happens to the derived promise. If
/// \[\[Handler\]\] is empty, a function that depends on the value of
/// \[\[Type\]\] will be used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PromiseReactionHandler {
    JobCallback(Function),
    Empty,
}

impl PromiseReactionHandler {
    /// Non-callable handlers are stored as empty.
    pub(crate) fn from_handler(handler: Value) -> Self {
        match Function::try_from(handler) {
            Ok(callback) => PromiseReactionHandler::JobCallback(callback),
            Err(_) => PromiseReactionHandler::Empty,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PromiseReactionRecord {
    /// \[\[Capability\]\]
    ///
    /// a PromiseCapability Record or undefined
    ///
    /// The capabilities of the promise for which this record provides a
    /// reaction handler.
    pub(crate) capability: Option<PromiseCapability>,
    /// \[\[Type\]\]
    pub(crate) reaction_type: PromiseReactionType,
    /// \[\[Handler\]\]
    pub(crate) handler: PromiseReactionHandler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PromiseReaction(pub(crate) PromiseReactionIndex);

impl PromiseReaction {
    pub(crate) const fn get_index(self) -> usize {
        self.0.into_index()
    }
}

/// ### [27.2.1.8 TriggerPromiseReactions ( reactions, argument )](https://tc39.es/ecma262/#sec-triggerpromisereactions)
///
/// Schedules one job per reaction, in registration order. No handler runs
/// before this returns.
pub(crate) fn trigger_promise_reactions(
    agent: &mut Agent,
    reactions: PromiseReactions,
    argument: Value,
) {
    log::trace!("Triggering {} promise reaction(s)", reactions.len());
    // 1. For each element reaction of reactions, do
    for reaction in reactions.into_vec() {
        // a. Let job be NewPromiseReactionJob(reaction, argument).
        let job = new_promise_reaction_job(agent, reaction, argument);
        // b. Perform HostEnqueuePromiseJob(job.[[Job]], job.[[Realm]]).
        agent.enqueue_promise_job(job);
    }
    // 2. Return unused.
}

impl Index<PromiseReaction> for Agent {
    type Output = PromiseReactionRecord;

    fn index(&self, index: PromiseReaction) -> &Self::Output {
        &self.heap.promise_reaction_records[index]
    }
}

impl IndexMut<PromiseReaction> for Agent {
    fn index_mut(&mut self, index: PromiseReaction) -> &mut Self::Output {
        &mut self.heap.promise_reaction_records[index]
    }
}

impl Index<PromiseReaction> for Vec<Option<PromiseReactionRecord>> {
    type Output = PromiseReactionRecord;

    fn index(&self, index: PromiseReaction) -> &Self::Output {
        self.get(index.get_index())
            .expect("PromiseReaction out of bounds")
            .as_ref()
            .expect("PromiseReaction slot empty")
    }
}

impl IndexMut<PromiseReaction> for Vec<Option<PromiseReactionRecord>> {
    fn index_mut(&mut self, index: PromiseReaction) -> &mut Self::Output {
        self.get_mut(index.get_index())
            .expect("PromiseReaction out of bounds")
            .as_mut()
            .expect("PromiseReaction slot empty")
    }
}

impl CreateHeapData<PromiseReactionRecord, PromiseReaction> for Heap {
    fn create(&mut self, data: PromiseReactionRecord) -> PromiseReaction {
        self.promise_reaction_records.push(Some(data));
        self.alloc_counter += core::mem::size_of::<Option<PromiseReactionRecord>>();
        PromiseReaction(PromiseReactionIndex::last(&self.promise_reaction_records))
    }
}

impl HeapMarkAndSweep for PromiseReaction {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.promise_reaction_records.push(self.0);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        compactions
            .promise_reaction_records
            .shift_index(&mut self.0);
    }
}

impl HeapMarkAndSweep for PromiseReactionRecord {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.capability.mark_values(queues);
        if let PromiseReactionHandler::JobCallback(callback) = &self.handler {
            callback.mark_values(queues);
        }
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        self.capability.sweep_values(compactions);
        if let PromiseReactionHandler::JobCallback(callback) = &mut self.handler {
            callback.sweep_values(compactions);
        }
    }
}
