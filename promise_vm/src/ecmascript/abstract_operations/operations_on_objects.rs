// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [7.3 Operations on Objects](https://tc39.es/ecma262/#sec-operations-on-objects)

use crate::ecmascript::{
    builtins::ArgumentsList,
    execution::{Agent, ExceptionType, JsResult},
    types::{Function, Object, Property, PropertyKey, Value},
};

/// ### [7.3.2 Get ( O, P )](https://tc39.es/ecma262/#sec-get-o-p)
///
/// The abstract operation Get takes arguments O (an Object) and P (a property
/// key) and returns either a normal completion containing an ECMAScript
/// language value or a throw completion. It is used to retrieve the value of a
/// specific property of an object.
pub fn get(agent: &mut Agent, o: Object, p: &PropertyKey) -> JsResult<Value> {
    // 1. Return ? O.[[Get]](P, O).
    let receiver = o.into_value();
    let mut object = Some(o);
    while let Some(current) = object {
        match current.get_own_property(agent, p) {
            Some(Property::Data(value)) => return Ok(value),
            Some(Property::Getter(getter)) => {
                return call_function(agent, getter, receiver, ArgumentsList(&[]));
            }
            None => object = current.internal_prototype(agent),
        }
    }
    Ok(Value::Undefined)
}

/// ### [7.3.13 Call ( F, V \[ , argumentsList \] )](https://tc39.es/ecma262/#sec-call)
///
/// Calls a function object. The call stack limit of the agent's options is
/// enforced for builtin functions, which throw a RangeError past it.
pub fn call_function(
    agent: &mut Agent,
    f: Function,
    v: Value,
    arguments_list: ArgumentsList,
) -> JsResult<Value> {
    match f {
        Function::BuiltinFunction(function) => function.internal_call(agent, v, arguments_list),
        Function::BuiltinPromiseResolvingFunction(function) => {
            function.internal_call(agent, v, arguments_list)
        }
    }
}

/// ### [7.3.14 Construct ( F \[ , argumentsList \[ , newTarget \] \] )](https://tc39.es/ecma262/#sec-construct)
///
/// `F` is also used as newTarget.
pub fn construct(agent: &mut Agent, f: Function, arguments_list: ArgumentsList) -> JsResult<Object> {
    match f {
        Function::BuiltinFunction(function) if function.is_constructor(agent) => {
            function.internal_construct(agent, arguments_list, f)
        }
        _ => Err(agent.throw_exception(ExceptionType::TypeError, "Not a constructor")),
    }
}
