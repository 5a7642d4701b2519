// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.5 Properties of the Promise Prototype Object](https://tc39.es/ecma262/#sec-properties-of-the-promise-prototype-object)

use super::promise_abstract_operations::promise_capability_records::PromiseCapability;
use crate::ecmascript::{
    abstract_operations::operations_on_objects::{call_function, get},
    builtins::{
        ArgumentsList, Behaviour, BuiltinFunction, BuiltinFunctionArgs, create_builtin_function,
    },
    execution::{Agent, ExceptionType, JsResult, Realm},
    types::{Function, Object, OrdinaryObject, Property, Value},
};

pub(crate) struct PromisePrototype;

impl PromisePrototype {
    /// ### [27.2.5.1 Promise.prototype.catch ( onRejected )](https://tc39.es/ecma262/#sec-promise.prototype.catch)
    fn catch(agent: &mut Agent, this_value: Value, arguments: ArgumentsList) -> JsResult<Value> {
        let on_rejected = arguments.get(0);
        // 1. Let promise be the this value.
        // 2. Return ? Invoke(promise, "then", « undefined, onRejected »).
        let Ok(promise) = Object::try_from(this_value) else {
            return Err(agent.throw_exception(ExceptionType::TypeError, "'this' is not an object"));
        };
        let then = get(agent, promise, &"then".into())?;
        let Ok(then) = Function::try_from(then) else {
            return Err(agent.throw_exception(ExceptionType::TypeError, "'then' is not callable"));
        };
        call_function(
            agent,
            then,
            this_value,
            ArgumentsList(&[Value::Undefined, on_rejected]),
        )
    }

    /// ### [27.2.5.4 Promise.prototype.then ( onFulfilled, onRejected )](https://tc39.es/ecma262/#sec-promise.prototype.then)
    fn then(agent: &mut Agent, this_value: Value, arguments: ArgumentsList) -> JsResult<Value> {
        let on_fulfilled = arguments.get(0);
        let on_rejected = arguments.get(1);
        // 1. Let promise be the this value.
        // 2. If IsPromise(promise) is false, throw a TypeError exception.
        let Value::Promise(promise) = this_value else {
            return Err(agent.throw_exception(ExceptionType::TypeError, "'this' is not a promise"));
        };
        // 3. Let C be ? SpeciesConstructor(promise, %Promise%).
        // 4. Let resultCapability be ? NewPromiseCapability(C).
        // NOTE: Species and subclasses are not supported.
        let result_capability = PromiseCapability::new(agent);
        // 5. Return PerformPromiseThen(promise, onFulfilled, onRejected, resultCapability).
        let derived =
            promise.perform_then(agent, on_fulfilled, on_rejected, Some(result_capability));
        Ok(derived.into())
    }

    /// Creates `%Promise.prototype%` for `realm` and links it with
    /// `%Promise%` through `prototype` and `constructor`.
    pub(crate) fn create_intrinsic(
        agent: &mut Agent,
        realm: Realm,
        promise_constructor: BuiltinFunction,
    ) -> OrdinaryObject {
        let this = OrdinaryObject::create(agent, None);
        let catch = create_builtin_function(
            agent,
            Behaviour::Regular(Self::catch),
            BuiltinFunctionArgs::new(1, "catch").in_realm(realm),
        );
        let then = create_builtin_function(
            agent,
            Behaviour::Regular(Self::then),
            BuiltinFunctionArgs::new(2, "then").in_realm(realm),
        );
        this.set(agent, "catch", catch.into());
        this.set(agent, "constructor", promise_constructor.into());
        this.set(agent, "then", then.into());
        Object::BuiltinFunction(promise_constructor).define_own_property(
            agent,
            "prototype",
            Property::Data(this.into()),
        );
        this
    }
}
