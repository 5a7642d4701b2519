// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{Object, Value};
use crate::{
    ecmascript::{
        builtins::{
            builtin_function::BuiltinFunction,
            promise_objects::promise_abstract_operations::promise_resolving_functions::BuiltinPromiseResolvingFunction,
        },
        execution::{Agent, Realm},
    },
    heap::{CompactionLists, HeapMarkAndSweep, WorkQueues},
};

/// The callable subset of [`Object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Function {
    BuiltinFunction(BuiltinFunction),
    BuiltinPromiseResolvingFunction(BuiltinPromiseResolvingFunction),
}

impl Function {
    pub fn into_value(self) -> Value {
        self.into()
    }

    pub fn into_object(self) -> Object {
        self.into()
    }

    /// ### [7.3.24 GetFunctionRealm ( obj )](https://tc39.es/ecma262/#sec-getfunctionrealm)
    pub fn realm(self, agent: &Agent) -> Realm {
        match self {
            Function::BuiltinFunction(function) => agent[function].realm,
            Function::BuiltinPromiseResolvingFunction(function) => {
                function.promise(agent).realm(agent)
            }
        }
    }
}

impl From<BuiltinFunction> for Function {
    fn from(value: BuiltinFunction) -> Self {
        Function::BuiltinFunction(value)
    }
}

impl From<BuiltinPromiseResolvingFunction> for Function {
    fn from(value: BuiltinPromiseResolvingFunction) -> Self {
        Function::BuiltinPromiseResolvingFunction(value)
    }
}

impl From<Function> for Object {
    fn from(value: Function) -> Self {
        match value {
            Function::BuiltinFunction(data) => Object::BuiltinFunction(data),
            Function::BuiltinPromiseResolvingFunction(data) => {
                Object::BuiltinPromiseResolvingFunction(data)
            }
        }
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        match value {
            Function::BuiltinFunction(data) => Value::BuiltinFunction(data),
            Function::BuiltinPromiseResolvingFunction(data) => {
                Value::BuiltinPromiseResolvingFunction(data)
            }
        }
    }
}

impl TryFrom<Value> for Function {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, ()> {
        match value {
            Value::BuiltinFunction(data) => Ok(Function::BuiltinFunction(data)),
            Value::BuiltinPromiseResolvingFunction(data) => {
                Ok(Function::BuiltinPromiseResolvingFunction(data))
            }
            _ => Err(()),
        }
    }
}

impl TryFrom<Object> for Function {
    type Error = ();

    fn try_from(value: Object) -> Result<Self, ()> {
        Function::try_from(Value::from(value))
    }
}

impl HeapMarkAndSweep for Function {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.push_value((*self).into());
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        match self {
            Function::BuiltinFunction(data) => data.sweep_values(compactions),
            Function::BuiltinPromiseResolvingFunction(data) => data.sweep_values(compactions),
        }
    }
}
