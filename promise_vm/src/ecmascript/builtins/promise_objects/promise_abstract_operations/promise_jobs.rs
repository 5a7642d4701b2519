// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [27.2.2 Promise Jobs](https://tc39.es/ecma262/#sec-promise-jobs)

use super::{
    promise_reaction_records::{PromiseReaction, PromiseReactionHandler, PromiseReactionType},
    promise_resolving_functions::PromiseResolvingFunctions,
};
use crate::{
    ecmascript::{
        abstract_operations::operations_on_objects::call_function,
        builtins::{ArgumentsList, promise::Promise},
        execution::{Agent, InnerJob, Job, JsError, JsResult},
        types::{Function, Object, Value},
    },
    engine::Global,
};

#[derive(Debug)]
pub(crate) struct PromiseResolveThenableJob {
    promise_to_resolve: Global<Promise>,
    thenable: Global<Object>,
    then: Global<Function>,
}

impl PromiseResolveThenableJob {
    pub(crate) fn run(self, agent: &mut Agent) -> JsResult<()> {
        let Self {
            promise_to_resolve,
            thenable,
            then,
        } = self;
        let promise_to_resolve = promise_to_resolve.take(agent);
        let thenable = thenable.take(agent);
        let then = then.take(agent);
        log::trace!("Running resolve-thenable job for {promise_to_resolve:?}");
        // The following are substeps of point 1 in NewPromiseResolveThenableJob.
        // a. Let resolvingFunctions be CreateResolvingFunctions(promiseToResolve).
        let resolving_functions = PromiseResolvingFunctions::new(agent, promise_to_resolve);
        let functions = resolving_functions.into_functions();
        // b. Let thenCallResult be Completion(HostCallJobCallback(then, thenable, « resolvingFunctions.[[Resolve]], resolvingFunctions.[[Reject]] »)).
        let then_call_result = call_function(
            agent,
            then,
            thenable.into_value(),
            ArgumentsList(&[functions.resolve.into_value(), functions.reject.into_value()]),
        );
        // c. If thenCallResult is an abrupt completion, then
        if let Err(err) = then_call_result {
            // i. Return ? Call(resolvingFunctions.[[Reject]], undefined, « thenCallResult.[[Value]] »).
            resolving_functions.reject(agent, err.value());
        }
        // d. Return ? thenCallResult.
        Ok(())
    }
}

/// ### [27.2.2.2 NewPromiseResolveThenableJob ( promiseToResolve, thenable, then )](https://tc39.es/ecma262/#sec-newpromiseresolvethenablejob)
pub(crate) fn new_promise_resolve_thenable_job(
    agent: &mut Agent,
    promise_to_resolve: Promise,
    thenable: Object,
    then: Function,
) -> Job {
    // 2. Let getThenRealmResult be Completion(GetFunctionRealm(then.[[Callback]])).
    // 3. If getThenRealmResult is a normal completion, let thenRealm be getThenRealmResult.[[Value]].
    // 5. NOTE: thenRealm is never null.
    let then_realm = then.realm(agent);
    // 6. Return the Record { [[Job]]: job, [[Realm]]: thenRealm }.
    Job {
        realm: Some(then_realm),
        inner: InnerJob::PromiseResolveThenable(PromiseResolveThenableJob {
            promise_to_resolve: Global::new(agent, promise_to_resolve),
            thenable: Global::new(agent, thenable),
            then: Global::new(agent, then),
        }),
    }
}

#[derive(Debug)]
pub(crate) struct PromiseReactionJob {
    reaction: Global<PromiseReaction>,
    argument: Global<Value>,
}

impl PromiseReactionJob {
    /// Errors never escape a job whose reaction has a capability. A
    /// fire-and-forget reaction whose handler throws returns the thrown
    /// value so that the host can report it.
    pub(crate) fn run(self, agent: &mut Agent) -> JsResult<()> {
        let Self { reaction, argument } = self;
        let reaction = reaction.take(agent);
        let argument = argument.take(agent);
        log::trace!("Running promise reaction job for {reaction:?}");
        // The following are substeps of point 1 in NewPromiseReactionJob.
        let handler_result = match agent[reaction].handler {
            PromiseReactionHandler::Empty => match agent[reaction].reaction_type {
                PromiseReactionType::Fulfill => {
                    // d.i.1. Let handlerResult be NormalCompletion(argument).
                    Ok(argument)
                }
                PromiseReactionType::Reject => {
                    // d.ii.1. Let handlerResult be ThrowCompletion(argument).
                    Err(JsError::new(argument))
                }
            },
            // e.1. Let handlerResult be Completion(HostCallJobCallback(handler, undefined, « argument »)).
            PromiseReactionHandler::JobCallback(callback) => call_function(
                agent,
                callback,
                Value::Undefined,
                ArgumentsList(&[argument]),
            ),
        };

        // f. If promiseCapability is undefined, then
        let Some(promise_capability) = agent[reaction].capability else {
            // i. Assert: handlerResult is not an abrupt completion.
            // ii. Return empty.
            return handler_result.map(|_| ());
        };
        match handler_result {
            // h. If handlerResult is an abrupt completion, then
            Err(err) => {
                // i. Return ? Call(promiseCapability.[[Reject]], undefined, « handlerResult.[[Value]] »).
                promise_capability.reject(agent, err.value())
            }
            // i. Else,
            Ok(value) => {
                // i. Return ? Call(promiseCapability.[[Resolve]], undefined, « handlerResult.[[Value]] »).
                promise_capability.resolve(agent, value)
            }
        };
        Ok(())
    }
}

/// ### [27.2.2.1 NewPromiseReactionJob ( reaction, argument )](https://tc39.es/ecma262/#sec-newpromisereactionjob)
pub(crate) fn new_promise_reaction_job(
    agent: &mut Agent,
    reaction: PromiseReaction,
    argument: Value,
) -> Job {
    let handler_realm = match agent[reaction].handler {
        // 3. If reaction.[[Handler]] is not empty, then
        //    a. Let getHandlerRealmResult be Completion(GetFunctionRealm(reaction.[[Handler]].[[Callback]])).
        //    b. If getHandlerRealmResult is a normal completion, set handlerRealm to getHandlerRealmResult.[[Value]].
        PromiseReactionHandler::JobCallback(callback) => Some(callback.realm(agent)),
        // 2. Let handlerRealm be null.
        PromiseReactionHandler::Empty => None,
    };

    // 4. Return the Record { [[Job]]: job, [[Realm]]: handlerRealm }.
    let reaction = Global::new(agent, reaction);
    let argument = Global::new(agent, argument);
    Job {
        realm: handler_realm,
        inner: InnerJob::PromiseReaction(PromiseReactionJob { reaction, argument }),
    }
}
