// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.1.3 CreateResolvingFunctions ( promise )](https://tc39.es/ecma262/#sec-createresolvingfunctions)
//!
//! The resolve and reject functions of one pair share a single heap record
//! holding the target promise and the \[\[AlreadyResolved\]\] flag.

use std::ops::{Index, IndexMut};

use super::promise_jobs::new_promise_resolve_thenable_job;
use crate::{
    ecmascript::{
        abstract_operations::operations_on_objects::get,
        builtins::{ArgumentsList, promise::Promise},
        execution::{Agent, ExceptionType, JsResult},
        types::{Function, Object, Value},
    },
    heap::{
        CompactionLists, CreateHeapData, Heap, HeapMarkAndSweep, WorkQueues,
        indexes::PromiseResolvingFunctionsIndex,
    },
};

#[derive(Debug, Clone)]
pub struct PromiseResolvingFunctionsHeapData {
    /// \[\[Promise\]\]
    pub(crate) promise: Promise,
    /// \[\[AlreadyResolved\]\]
    pub(crate) already_resolved: bool,
}

/// A resolve/reject function pair bound to one promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PromiseResolvingFunctions(pub(crate) PromiseResolvingFunctionsIndex);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PromiseResolvingFunctionType {
    Resolve,
    Reject,
}

/// One half of a [`PromiseResolvingFunctions`] pair as a callable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuiltinPromiseResolvingFunction {
    pub(crate) functions: PromiseResolvingFunctions,
    pub(crate) resolve_type: PromiseResolvingFunctionType,
}

/// The Record { \[\[Resolve\]\], \[\[Reject\]\] } returned by
/// CreateResolvingFunctions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvingFunctions {
    pub resolve: Function,
    pub reject: Function,
}

impl PromiseResolvingFunctions {
    pub(crate) const fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub(crate) fn new(agent: &mut Agent, promise: Promise) -> Self {
        // 1. Let alreadyResolved be the Record { [[Value]]: false }.
        agent.heap.create(PromiseResolvingFunctionsHeapData {
            promise,
            already_resolved: false,
        })
    }

    pub fn promise(self, agent: &Agent) -> Promise {
        agent[self].promise
    }

    pub fn is_already_resolved(self, agent: &Agent) -> bool {
        agent[self].already_resolved
    }

    pub(crate) fn into_functions(self) -> ResolvingFunctions {
        ResolvingFunctions {
            resolve: Function::BuiltinPromiseResolvingFunction(BuiltinPromiseResolvingFunction {
                functions: self,
                resolve_type: PromiseResolvingFunctionType::Resolve,
            }),
            reject: Function::BuiltinPromiseResolvingFunction(BuiltinPromiseResolvingFunction {
                functions: self,
                resolve_type: PromiseResolvingFunctionType::Reject,
            }),
        }
    }

    /// Sets \[\[AlreadyResolved\]\] and returns the target promise, or None
    /// if either function of the pair was already called.
    fn claim(self, agent: &mut Agent) -> Option<Promise> {
        let data = &mut agent[self];
        if data.already_resolved {
            None
        } else {
            data.already_resolved = true;
            Some(data.promise)
        }
    }

    /// ### [27.2.1.3.1 Promise Reject Functions](https://tc39.es/ecma262/#sec-promise-reject-functions)
    pub fn reject(self, agent: &mut Agent, reason: Value) {
        // 1. Let F be the active function object.
        // 2. Assert: F has a [[Promise]] internal slot whose value is an Object.
        // 3. Let promise be F.[[Promise]].
        // 4. Let alreadyResolved be F.[[AlreadyResolved]].
        // 5. If alreadyResolved.[[Value]] is true, return undefined.
        // 6. Set alreadyResolved.[[Value]] to true.
        let Some(promise) = self.claim(agent) else {
            log::trace!("{self:?} already resolved, ignoring reject");
            return;
        };
        // 7. Perform RejectPromise(promise, reason).
        promise.reject(agent, reason);
        // 8. Return undefined.
    }

    /// ### [27.2.1.3.2 Promise Resolve Functions](https://tc39.es/ecma262/#sec-promise-resolve-functions)
    pub fn resolve(self, agent: &mut Agent, resolution: Value) {
        // 1. Let F be the active function object.
        // 2. Assert: F has a [[Promise]] internal slot whose value is an Object.
        // 3. Let promise be F.[[Promise]].
        // 4. Let alreadyResolved be F.[[AlreadyResolved]].
        // 5. If alreadyResolved.[[Value]] is true, return undefined.
        // 6. Set alreadyResolved.[[Value]] to true.
        let Some(promise) = self.claim(agent) else {
            log::trace!("{self:?} already resolved, ignoring resolve");
            return;
        };
        // 7. If SameValue(resolution, promise) is true, then
        if resolution == promise.into() {
            // a. Let selfResolutionError be a newly created TypeError object.
            let self_resolution_error = agent.create_exception(
                ExceptionType::TypeError,
                "Tried to resolve a promise with itself.",
            );
            // b. Perform RejectPromise(promise, selfResolutionError).
            promise.reject(agent, self_resolution_error);
            // c. Return undefined.
            return;
        }
        // 8. If resolution is not an Object, then
        let Ok(resolution) = Object::try_from(resolution) else {
            // a. Perform FulfillPromise(promise, resolution).
            promise.fulfill(agent, resolution);
            // b. Return undefined.
            return;
        };
        // 9. Let then be Completion(Get(resolution, "then")).
        let then_action = match get(agent, resolution, &"then".into()) {
            // 11. Let thenAction be then.[[Value]].
            Ok(then_action) => then_action,
            // 10. If then is an abrupt completion, then
            Err(err) => {
                // a. Perform RejectPromise(promise, then.[[Value]]).
                promise.reject(agent, err.value());
                // b. Return undefined.
                return;
            }
        };
        // 12. If IsCallable(thenAction) is false, then
        let Ok(then_action) = Function::try_from(then_action) else {
            // a. Perform FulfillPromise(promise, resolution).
            promise.fulfill(agent, resolution.into_value());
            // b. Return undefined.
            return;
        };
        // 13. Let thenJobCallback be HostMakeJobCallback(thenAction).
        // 14. Let job be NewPromiseResolveThenableJob(promise, resolution, thenJobCallback).
        let job = new_promise_resolve_thenable_job(agent, promise, resolution, then_action);
        // 15. Perform HostEnqueuePromiseJob(job.[[Job]], job.[[Realm]]).
        agent.enqueue_promise_job(job);
        // 16. Return undefined.
    }
}

impl BuiltinPromiseResolvingFunction {
    pub fn promise(self, agent: &Agent) -> Promise {
        self.functions.promise(agent)
    }

    pub fn resolve_type(self) -> PromiseResolvingFunctionType {
        self.resolve_type
    }

    pub(crate) fn internal_call(
        self,
        agent: &mut Agent,
        _this_argument: Value,
        arguments_list: ArgumentsList,
    ) -> JsResult<Value> {
        let argument = arguments_list.get(0);
        match self.resolve_type {
            PromiseResolvingFunctionType::Resolve => self.functions.resolve(agent, argument),
            PromiseResolvingFunctionType::Reject => self.functions.reject(agent, argument),
        }
        Ok(Value::Undefined)
    }
}

impl From<BuiltinPromiseResolvingFunction> for Value {
    fn from(value: BuiltinPromiseResolvingFunction) -> Self {
        Value::BuiltinPromiseResolvingFunction(value)
    }
}

impl From<BuiltinPromiseResolvingFunction> for Object {
    fn from(value: BuiltinPromiseResolvingFunction) -> Self {
        Object::BuiltinPromiseResolvingFunction(value)
    }
}

impl Index<PromiseResolvingFunctions> for Agent {
    type Output = PromiseResolvingFunctionsHeapData;

    fn index(&self, index: PromiseResolvingFunctions) -> &Self::Output {
        &self.heap.promise_resolving_functions[index]
    }
}

impl IndexMut<PromiseResolvingFunctions> for Agent {
    fn index_mut(&mut self, index: PromiseResolvingFunctions) -> &mut Self::Output {
        &mut self.heap.promise_resolving_functions[index]
    }
}

impl Index<PromiseResolvingFunctions> for Vec<Option<PromiseResolvingFunctionsHeapData>> {
    type Output = PromiseResolvingFunctionsHeapData;

    fn index(&self, index: PromiseResolvingFunctions) -> &Self::Output {
        self.get(index.get_index())
            .expect("PromiseResolvingFunctions out of bounds")
            .as_ref()
            .expect("PromiseResolvingFunctions slot empty")
    }
}

impl IndexMut<PromiseResolvingFunctions> for Vec<Option<PromiseResolvingFunctionsHeapData>> {
    fn index_mut(&mut self, index: PromiseResolvingFunctions) -> &mut Self::Output {
        self.get_mut(index.get_index())
            .expect("PromiseResolvingFunctions out of bounds")
            .as_mut()
            .expect("PromiseResolvingFunctions slot empty")
    }
}

impl CreateHeapData<PromiseResolvingFunctionsHeapData, PromiseResolvingFunctions> for Heap {
    fn create(&mut self, data: PromiseResolvingFunctionsHeapData) -> PromiseResolvingFunctions {
        self.promise_resolving_functions.push(Some(data));
        self.alloc_counter += core::mem::size_of::<Option<PromiseResolvingFunctionsHeapData>>();
        PromiseResolvingFunctions(PromiseResolvingFunctionsIndex::last(
            &self.promise_resolving_functions,
        ))
    }
}

impl HeapMarkAndSweep for PromiseResolvingFunctions {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.promise_resolving_functions.push(self.0);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        compactions
            .promise_resolving_functions
            .shift_index(&mut self.0);
    }
}

impl HeapMarkAndSweep for BuiltinPromiseResolvingFunction {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.functions.mark_values(queues);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        self.functions.sweep_values(compactions);
    }
}

impl HeapMarkAndSweep for PromiseResolvingFunctionsHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.promise.mark_values(queues);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        self.promise.sweep_values(compactions);
    }
}
