// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.3 The Promise Constructor](https://tc39.es/ecma262/#sec-promise-constructor)

use super::promise_abstract_operations::{
    promise_capability_records::PromiseCapability,
    promise_resolving_functions::PromiseResolvingFunctions,
};
use crate::{
    ecmascript::{
        abstract_operations::operations_on_objects::{call_function, get},
        builtins::{
            ArgumentsList, Behaviour, BuiltinFunction, BuiltinFunctionArgs,
            create_builtin_function, promise::Promise,
        },
        execution::{Agent, ExceptionType, JsResult, Realm},
        types::{Function, Object, Property, Value},
    },
};

pub(crate) struct PromiseConstructor;

impl PromiseConstructor {
    /// ### [27.2.3.1 Promise ( executor )](https://tc39.es/ecma262/#sec-promise-executor)
    fn constructor(
        agent: &mut Agent,
        _this_value: Value,
        arguments: ArgumentsList,
        new_target: Option<Object>,
    ) -> JsResult<Value> {
        let executor = arguments.get(0);

        // 1. If NewTarget is undefined, throw a TypeError exception.
        let Some(new_target) = new_target else {
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Promise Constructor requires 'new'",
            ));
        };
        let Some(realm) = agent.realm_of_promise_constructor(new_target.into_value()) else {
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Promise subclassing is not supported",
            ));
        };

        // 2. If IsCallable(executor) is false, throw a TypeError exception.
        let Ok(executor) = Function::try_from(executor) else {
            return Err(agent.throw_exception(ExceptionType::TypeError, "Not a callable value"));
        };

        // 3. Let promise be ? OrdinaryCreateFromConstructor(NewTarget, "%Promise.prototype%", « [[PromiseState]], [[PromiseResult]], [[PromiseFulfillReactions]], [[PromiseRejectReactions]], [[PromiseIsHandled]] »).
        // 4. Set promise.[[PromiseState]] to pending.
        // 5. Set promise.[[PromiseFulfillReactions]] to a new empty List.
        // 6. Set promise.[[PromiseRejectReactions]] to a new empty List.
        // 7. Set promise.[[PromiseIsHandled]] to false.
        let promise = Promise::create(agent, realm);

        // 8. Let resolvingFunctions be CreateResolvingFunctions(promise).
        let resolving_functions = PromiseResolvingFunctions::new(agent, promise);
        let functions = resolving_functions.into_functions();

        // 9. Let completion be Completion(Call(executor, undefined, « resolvingFunctions.[[Resolve]], resolvingFunctions.[[Reject]] »)).
        // 10. If completion is an abrupt completion, then
        if let Err(err) = call_function(
            agent,
            executor,
            Value::Undefined,
            ArgumentsList(&[functions.resolve.into_value(), functions.reject.into_value()]),
        ) {
            // a. Perform ? Call(resolvingFunctions.[[Reject]], undefined, « completion.[[Value]] »).
            resolving_functions.reject(agent, err.value());
        }

        // 11. Return promise.
        Ok(promise.into_value())
    }

    /// ### [27.2.4.6 Promise.reject ( r )](https://tc39.es/ecma262/#sec-promise.reject)
    fn reject(agent: &mut Agent, this_value: Value, arguments: ArgumentsList) -> JsResult<Value> {
        let r = arguments.get(0);
        // 1. Let C be the this value.
        // 2. Let promiseCapability be ? NewPromiseCapability(C).
        let promise_capability = PromiseCapability::new_from_constructor(agent, this_value)?;
        // 3. Perform ? Call(promiseCapability.[[Reject]], undefined, « r »).
        promise_capability.reject(agent, r);
        // 4. Return promiseCapability.[[Promise]].
        Ok(promise_capability.promise().into_value())
    }

    /// ### [27.2.4.7 Promise.resolve ( x )](https://tc39.es/ecma262/#sec-promise.resolve)
    fn resolve(agent: &mut Agent, this_value: Value, arguments: ArgumentsList) -> JsResult<Value> {
        // 1. Let C be the this value.
        // 2. If C is not an Object, throw a TypeError exception.
        if !this_value.is_object() {
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Promise.resolve called on a non-object",
            ));
        }
        // 3. Return ? PromiseResolve(C, x).
        promise_resolve(agent, this_value, arguments.get(0)).map(Promise::into_value)
    }

    /// Creates `%Promise%` for `realm` along with its static methods.
    pub(crate) fn create_intrinsic(agent: &mut Agent, realm: Realm) -> BuiltinFunction {
        let constructor = create_builtin_function(
            agent,
            Behaviour::Constructor(Self::constructor),
            BuiltinFunctionArgs::new(1, "Promise").in_realm(realm),
        );
        let reject = create_builtin_function(
            agent,
            Behaviour::Regular(Self::reject),
            BuiltinFunctionArgs::new(1, "reject").in_realm(realm),
        );
        let resolve = create_builtin_function(
            agent,
            Behaviour::Regular(Self::resolve),
            BuiltinFunctionArgs::new(1, "resolve").in_realm(realm),
        );
        let this = Object::BuiltinFunction(constructor);
        this.define_own_property(agent, "reject", Property::Data(reject.into()));
        this.define_own_property(agent, "resolve", Property::Data(resolve.into()));
        constructor
    }
}

/// ### [27.2.4.7.1 PromiseResolve ( C, x )](https://tc39.es/ecma262/#sec-promise-resolve)
///
/// Returns `x` itself when it is a promise whose `constructor` property is
/// `constructor`; otherwise a new promise of `constructor` resolved with `x`.
pub fn promise_resolve(agent: &mut Agent, constructor: Value, x: Value) -> JsResult<Promise> {
    // 1. If IsPromise(x) is true, then
    if let Value::Promise(promise) = x {
        // a. Let xConstructor be ? Get(x, "constructor").
        let x_constructor = get(agent, promise.into_object(), &"constructor".into())?;
        // b. If SameValue(xConstructor, C) is true, return x.
        if x_constructor == constructor {
            return Ok(promise);
        }
    }
    // 2. Let promiseCapability be ? NewPromiseCapability(C).
    let promise_capability = PromiseCapability::new_from_constructor(agent, constructor)?;
    // 3. Perform ? Call(promiseCapability.[[Resolve]], undefined, « x »).
    promise_capability.resolve(agent, x);
    // 4. Return promiseCapability.[[Promise]].
    Ok(promise_capability.promise())
}
