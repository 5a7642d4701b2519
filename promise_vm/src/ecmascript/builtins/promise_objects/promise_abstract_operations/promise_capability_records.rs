// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.1.1 PromiseCapability Records](https://tc39.es/ecma262/#sec-promisecapability-records)

use super::promise_resolving_functions::{PromiseResolvingFunctions, ResolvingFunctions};
use crate::{
    ecmascript::{
        builtins::promise::Promise,
        execution::{Agent, ExceptionType, JsResult, Realm},
        types::Value,
    },
    heap::{CompactionLists, HeapMarkAndSweep, WorkQueues},
};

/// A promise capability encapsulates a promise together with the resolving
/// functions that settle it.
///
/// Only intrinsic `%Promise%` constructors are supported, so the capability
/// stores the resolving function pair record directly instead of two
/// arbitrary callables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PromiseCapability {
    /// \[\[Promise\]\]
    promise: Promise,
    /// \[\[Resolve\]\] and \[\[Reject\]\]
    resolving_functions: PromiseResolvingFunctions,
}

impl PromiseCapability {
    /// ### [27.2.1.5 NewPromiseCapability ( C )](https://tc39.es/ecma262/#sec-newpromisecapability)
    ///
    /// NewPromiseCapability(%Promise%) in the current realm.
    pub fn new(agent: &mut Agent) -> Self {
        let realm = agent.current_realm();
        Self::new_in_realm(agent, realm)
    }

    pub fn new_in_realm(agent: &mut Agent, realm: Realm) -> Self {
        let promise = Promise::create(agent, realm);
        Self::from_promise(agent, promise)
    }

    /// ### [27.2.1.5 NewPromiseCapability ( C )](https://tc39.es/ecma262/#sec-newpromisecapability)
    ///
    /// `constructor` must be the `%Promise%` intrinsic of some realm.
    pub fn new_from_constructor(agent: &mut Agent, constructor: Value) -> JsResult<Self> {
        // 1. If IsConstructor(C) is false, throw a TypeError exception.
        let Some(realm) = agent.realm_of_promise_constructor(constructor) else {
            return Err(
                agent.throw_exception(ExceptionType::TypeError, "Not a promise constructor")
            );
        };
        // 2. NOTE: C is assumed to be a constructor function that supports the parameter conventions of the Promise constructor.
        // 3. Let resolvingFunctions be the Record { [[Resolve]]: undefined, [[Reject]]: undefined }.
        // 4-9. Let promise be ? Construct(C, « executor »).
        // The executor of the intrinsic constructor only stores the
        // resolving functions, so the promise is created directly.
        Ok(Self::new_in_realm(agent, realm))
    }

    /// Pairs an existing promise with a fresh set of resolving functions.
    pub fn from_promise(agent: &mut Agent, promise: Promise) -> Self {
        Self {
            promise,
            resolving_functions: PromiseResolvingFunctions::new(agent, promise),
        }
    }

    pub fn promise(self) -> Promise {
        self.promise
    }

    pub fn resolving_functions(self) -> ResolvingFunctions {
        self.resolving_functions.into_functions()
    }

    /// Calls \[\[Resolve\]\] with `resolution`.
    pub fn resolve(self, agent: &mut Agent, resolution: Value) {
        self.resolving_functions.resolve(agent, resolution);
    }

    /// Calls \[\[Reject\]\] with `reason`.
    pub fn reject(self, agent: &mut Agent, reason: Value) {
        self.resolving_functions.reject(agent, reason);
    }
}

impl HeapMarkAndSweep for PromiseCapability {
    fn mark_values(&self, queues: &mut WorkQueues) {
        let Self {
            promise,
            resolving_functions,
        } = self;
        promise.mark_values(queues);
        resolving_functions.mark_values(queues);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        let Self {
            promise,
            resolving_functions,
        } = self;
        promise.sweep_values(compactions);
        resolving_functions.sweep_values(compactions);
    }
}
