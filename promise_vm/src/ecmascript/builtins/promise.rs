// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub(crate) mod data;

use std::ops::{Index, IndexMut};

pub use data::PromiseHeapData;
pub(crate) use data::{PromiseReactions, PromiseState};

pub use super::promise_objects::{
    promise_abstract_operations::{
        promise_capability_records::PromiseCapability,
        promise_resolving_functions::ResolvingFunctions,
    },
    promise_constructor::promise_resolve,
};
use super::promise_objects::promise_abstract_operations::{
    promise_jobs::new_promise_reaction_job,
    promise_reaction_records::{
        PromiseReactionHandler, PromiseReactionRecord, PromiseReactionType,
        trigger_promise_reactions,
    },
    promise_resolving_functions::PromiseResolvingFunctions,
};
use crate::{
    ecmascript::{
        execution::{Agent, JsError, JsResult, PromiseRejectionTrackerOperation, Realm},
        types::{Object, Value},
    },
    heap::{
        CompactionLists, CreateHeapData, Heap, HeapMarkAndSweep, WorkQueues, indexes::PromiseIndex,
    },
};

/// Observable settlement state of a promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseStatus {
    Pending,
    Fulfilled,
    Rejected,
}

/// ### [27.2 Promise Objects](https://tc39.es/ecma262/#sec-promise-objects)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Promise(pub(crate) PromiseIndex);

impl Promise {
    pub(crate) const fn get_index(self) -> usize {
        self.0.into_index()
    }

    /// Allocates a new pending promise whose prototype comes from `realm`.
    pub fn create(agent: &mut Agent, realm: Realm) -> Self {
        agent.heap.create(PromiseHeapData::new(realm))
    }

    /// Create a new fulfilled Promise in the current realm.
    pub fn new_resolved(agent: &mut Agent, value: Value) -> Self {
        let realm = agent.current_realm();
        agent.heap.create(PromiseHeapData {
            promise_state: PromiseState::Fulfilled {
                promise_result: value,
            },
            ..PromiseHeapData::new(realm)
        })
    }

    /// Create a new rejected, unhandled Promise in the current realm.
    pub fn new_rejected(agent: &mut Agent, reason: Value) -> Self {
        let realm = agent.current_realm();
        let promise = agent.heap.create(PromiseHeapData {
            promise_state: PromiseState::Rejected {
                promise_result: reason,
            },
            ..PromiseHeapData::new(realm)
        });
        agent.promise_rejection_tracker(promise, PromiseRejectionTrackerOperation::Reject);
        promise
    }

    pub fn state(self, agent: &Agent) -> PromiseStatus {
        match agent[self].promise_state {
            PromiseState::Pending { .. } => PromiseStatus::Pending,
            PromiseState::Fulfilled { .. } => PromiseStatus::Fulfilled,
            PromiseState::Rejected { .. } => PromiseStatus::Rejected,
        }
    }

    /// \[\[PromiseResult\]\], or None while the promise is pending.
    pub fn result(self, agent: &Agent) -> Option<Value> {
        match agent[self].promise_state {
            PromiseState::Pending { .. } => None,
            PromiseState::Fulfilled { promise_result }
            | PromiseState::Rejected { promise_result } => Some(promise_result),
        }
    }

    /// Get the result of a settled Promise, or None if the Promise is still
    /// pending. A rejection is returned as an error.
    pub fn try_get_result(self, agent: &Agent) -> Option<JsResult<Value>> {
        match agent[self].promise_state {
            PromiseState::Pending { .. } => None,
            PromiseState::Fulfilled { promise_result } => Some(Ok(promise_result)),
            PromiseState::Rejected { promise_result } => Some(Err(JsError::new(promise_result))),
        }
    }

    pub fn is_handled(self, agent: &Agent) -> bool {
        agent[self].is_handled
    }

    pub fn set_is_handled(self, agent: &mut Agent) {
        agent[self].is_handled = true;
    }

    pub fn realm(self, agent: &Agent) -> Realm {
        agent[self].realm
    }

    /// ### [27.2.1.3 CreateResolvingFunctions ( promise )](https://tc39.es/ecma262/#sec-createresolvingfunctions)
    pub fn create_resolving_functions(self, agent: &mut Agent) -> ResolvingFunctions {
        PromiseResolvingFunctions::new(agent, self).into_functions()
    }

    /// ### [27.2.1.4 FulfillPromise ( promise, value )](https://tc39.es/ecma262/#sec-fulfillpromise)
    ///
    /// Panics if the promise is already settled: settling twice is only
    /// possible by bypassing the resolving functions.
    pub fn fulfill(self, agent: &mut Agent, value: Value) {
        // 1. Assert: The value of promise.[[PromiseState]] is pending.
        // 2. Let reactions be promise.[[PromiseFulfillReactions]].
        let promise_state = &mut agent[self].promise_state;
        let reactions = match promise_state {
            PromiseState::Pending {
                fulfill_reactions, ..
            } => fulfill_reactions.take(),
            _ => unreachable!("Tried to fulfill a settled promise"),
        };
        // 3. Set promise.[[PromiseResult]] to value.
        // 4. Set promise.[[PromiseFulfillReactions]] to undefined.
        // 5. Set promise.[[PromiseRejectReactions]] to undefined.
        // 6. Set promise.[[PromiseState]] to FULFILLED.
        *promise_state = PromiseState::Fulfilled {
            promise_result: value,
        };
        log::debug!("{self:?} fulfilled");
        // 7. Perform TriggerPromiseReactions(reactions, value).
        if let Some(reactions) = reactions {
            trigger_promise_reactions(agent, reactions, value);
        }
    }

    /// ### [27.2.1.7 RejectPromise ( promise, reason )](https://tc39.es/ecma262/#sec-rejectpromise)
    ///
    /// Panics if the promise is already settled.
    pub fn reject(self, agent: &mut Agent, reason: Value) {
        // 1. Assert: The value of promise.[[PromiseState]] is pending.
        // 2. Let reactions be promise.[[PromiseRejectReactions]].
        let promise_state = &mut agent[self].promise_state;
        let reactions = match promise_state {
            PromiseState::Pending {
                reject_reactions, ..
            } => reject_reactions.take(),
            _ => unreachable!("Tried to reject a settled promise"),
        };
        // 3. Set promise.[[PromiseResult]] to reason.
        // 4. Set promise.[[PromiseFulfillReactions]] to undefined.
        // 5. Set promise.[[PromiseRejectReactions]] to undefined.
        // 6. Set promise.[[PromiseState]] to REJECTED.
        *promise_state = PromiseState::Rejected {
            promise_result: reason,
        };
        log::debug!("{self:?} rejected");
        // 7. If promise.[[PromiseIsHandled]] is false, perform HostPromiseRejectionTracker(promise, "reject").
        if !agent[self].is_handled {
            agent.promise_rejection_tracker(self, PromiseRejectionTrackerOperation::Reject);
        }
        // 8. Perform TriggerPromiseReactions(reactions, reason).
        if let Some(reactions) = reactions {
            trigger_promise_reactions(agent, reactions, reason);
        }
    }

    /// ### [27.2.5.4.1 PerformPromiseThen ( promise, onFulfilled, onRejected \[ , resultCapability \] )](https://tc39.es/ecma262/#sec-performpromisethen)
    ///
    /// Non-callable handlers are treated as absent. Without a result
    /// capability the registration is fire-and-forget and None is returned.
    pub fn perform_then(
        self,
        agent: &mut Agent,
        on_fulfilled: Value,
        on_rejected: Value,
        result_capability: Option<PromiseCapability>,
    ) -> Option<Promise> {
        // 3. If IsCallable(onFulfilled) is false, then
        //    a. Let onFulfilledJobCallback be empty.
        // 4. Else,
        //    a. Let onFulfilledJobCallback be HostMakeJobCallback(onFulfilled).
        let on_fulfilled = PromiseReactionHandler::from_handler(on_fulfilled);
        // 5. If IsCallable(onRejected) is false, then
        //    a. Let onRejectedJobCallback be empty.
        // 6. Else,
        //    a. Let onRejectedJobCallback be HostMakeJobCallback(onRejected).
        let on_rejected = PromiseReactionHandler::from_handler(on_rejected);
        // 7. Let fulfillReaction be the PromiseReaction Record { [[Capability]]: resultCapability, [[Type]]: FULFILL, [[Handler]]: onFulfilledJobCallback }.
        let fulfill_reaction = agent.heap.create(PromiseReactionRecord {
            capability: result_capability,
            reaction_type: PromiseReactionType::Fulfill,
            handler: on_fulfilled,
        });
        // 8. Let rejectReaction be the PromiseReaction Record { [[Capability]]: resultCapability, [[Type]]: REJECT, [[Handler]]: onRejectedJobCallback }.
        let reject_reaction = agent.heap.create(PromiseReactionRecord {
            capability: result_capability,
            reaction_type: PromiseReactionType::Reject,
            handler: on_rejected,
        });

        match &mut agent[self].promise_state {
            // 9. If promise.[[PromiseState]] is PENDING, then
            PromiseState::Pending {
                fulfill_reactions,
                reject_reactions,
            } => {
                // a. Append fulfillReaction to promise.[[PromiseFulfillReactions]].
                PromiseReactions::push(fulfill_reactions, fulfill_reaction);
                // b. Append rejectReaction to promise.[[PromiseRejectReactions]].
                PromiseReactions::push(reject_reactions, reject_reaction);
            }
            // 10. Else if promise.[[PromiseState]] is FULFILLED, then
            PromiseState::Fulfilled { promise_result } => {
                // a. Let value be promise.[[PromiseResult]].
                let promise_result = *promise_result;
                // b. Let fulfillJob be NewPromiseReactionJob(fulfillReaction, value).
                let fulfill_job = new_promise_reaction_job(agent, fulfill_reaction, promise_result);
                // c. Perform HostEnqueuePromiseJob(fulfillJob.[[Job]], fulfillJob.[[Realm]]).
                agent.enqueue_promise_job(fulfill_job);
            }
            // 11. Else,
            PromiseState::Rejected { promise_result } => {
                // a. Assert: The value of promise.[[PromiseState]] is rejected.
                // b. Let reason be promise.[[PromiseResult]].
                let promise_result = *promise_result;
                // c. If promise.[[PromiseIsHandled]] is false, perform HostPromiseRejectionTracker(promise, "handle").
                if !agent[self].is_handled {
                    agent.promise_rejection_tracker(self, PromiseRejectionTrackerOperation::Handle);
                }
                // d. Let rejectJob be NewPromiseReactionJob(rejectReaction, reason).
                let reject_job = new_promise_reaction_job(agent, reject_reaction, promise_result);
                // e. Perform HostEnqueuePromiseJob(rejectJob.[[Job]], rejectJob.[[Realm]]).
                agent.enqueue_promise_job(reject_job);
            }
        }

        // 12. Set promise.[[PromiseIsHandled]] to true.
        agent[self].is_handled = true;

        // 13. If resultCapability is undefined, then
        //     a. Return undefined.
        // 14. Else,
        //     a. Return resultCapability.[[Promise]].
        result_capability.map(|capability| capability.promise())
    }

    /// Registers handlers the way `Promise.prototype.then` does: a derived
    /// promise is always created and returned. It belongs to the current
    /// realm, or to this promise's realm when no realm has been entered.
    pub fn then(self, agent: &mut Agent, on_fulfilled: Value, on_rejected: Value) -> Promise {
        let realm = agent
            .running_realm()
            .unwrap_or_else(|| self.realm(agent));
        let capability = PromiseCapability::new_in_realm(agent, realm);
        let derived = capability.promise();
        self.perform_then(agent, on_fulfilled, on_rejected, Some(capability));
        derived
    }

    pub fn into_value(self) -> Value {
        self.into()
    }

    pub fn into_object(self) -> Object {
        self.into()
    }
}

impl From<Promise> for Value {
    fn from(value: Promise) -> Self {
        Value::Promise(value)
    }
}

impl From<Promise> for Object {
    fn from(value: Promise) -> Self {
        Object::Promise(value)
    }
}

impl TryFrom<Value> for Promise {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, ()> {
        match value {
            Value::Promise(promise) => Ok(promise),
            _ => Err(()),
        }
    }
}

impl TryFrom<Object> for Promise {
    type Error = ();

    fn try_from(value: Object) -> Result<Self, ()> {
        match value {
            Object::Promise(promise) => Ok(promise),
            _ => Err(()),
        }
    }
}

impl Index<Promise> for Agent {
    type Output = PromiseHeapData;

    fn index(&self, index: Promise) -> &Self::Output {
        &self.heap.promises[index]
    }
}

impl IndexMut<Promise> for Agent {
    fn index_mut(&mut self, index: Promise) -> &mut Self::Output {
        &mut self.heap.promises[index]
    }
}

impl Index<Promise> for Vec<Option<PromiseHeapData>> {
    type Output = PromiseHeapData;

    fn index(&self, index: Promise) -> &Self::Output {
        self.get(index.get_index())
            .expect("Promise out of bounds")
            .as_ref()
            .expect("Promise slot empty")
    }
}

impl IndexMut<Promise> for Vec<Option<PromiseHeapData>> {
    fn index_mut(&mut self, index: Promise) -> &mut Self::Output {
        self.get_mut(index.get_index())
            .expect("Promise out of bounds")
            .as_mut()
            .expect("Promise slot empty")
    }
}

impl CreateHeapData<PromiseHeapData, Promise> for Heap {
    fn create(&mut self, data: PromiseHeapData) -> Promise {
        self.promises.push(Some(data));
        self.alloc_counter += core::mem::size_of::<Option<PromiseHeapData>>();
        Promise(PromiseIndex::last(&self.promises))
    }
}

impl HeapMarkAndSweep for Promise {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.promises.push(self.0);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        compactions.promises.shift_index(&mut self.0);
    }
}
