// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{Function, Object, OrdinaryObject, String};
use crate::{
    ecmascript::{
        builtins::{
            builtin_function::BuiltinFunction, error::Error, promise::Promise,
            promise_objects::promise_abstract_operations::promise_resolving_functions::BuiltinPromiseResolvingFunction,
        },
        execution::Agent,
    },
    heap::{CompactionLists, HeapMarkAndSweep, WorkQueues},
};

/// ### [6.1 ECMAScript Language Types](https://tc39.es/ecma262/#sec-ecmascript-language-types)
///
/// Only the primitives and object kinds that the promise machinery
/// produces or inspects are represented.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    /// ### [6.1.1 The Undefined Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-undefined-type)
    #[default]
    Undefined,

    /// ### [6.1.2 The Null Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-null-type)
    Null,

    /// ### [6.1.3 The Boolean Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-boolean-type)
    Boolean(bool),

    /// ### [6.1.6.1 The Number Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-number-type)
    Number(f64),

    /// ### [6.1.4 The String Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-string-type)
    String(String),

    /// ### [6.1.7 The Object Type](https://tc39.es/ecma262/#sec-object-type)
    Object(OrdinaryObject),
    Error(Error),
    Promise(Promise),
    BuiltinFunction(BuiltinFunction),
    BuiltinPromiseResolvingFunction(BuiltinPromiseResolvingFunction),
}

impl Value {
    pub fn from_str(agent: &mut Agent, str: &str) -> Self {
        Value::String(String::from_str(agent, str))
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_object(self) -> bool {
        Object::try_from(self).is_ok()
    }

    /// ### [7.2.3 IsCallable ( argument )](https://tc39.es/ecma262/#sec-iscallable)
    pub fn is_callable(self) -> bool {
        Function::try_from(self).is_ok()
    }

    /// Host-facing rendering of the value, used for diagnostics only.
    pub fn string_repr(self, agent: &Agent) -> std::string::String {
        match self {
            Value::Undefined => "undefined".into(),
            Value::Null => "null".into(),
            Value::Boolean(bool) => bool.to_string(),
            Value::Number(number) => number_to_string(number),
            Value::String(string) => string.to_string_lossy(agent).into_owned(),
            Value::Object(_) => "[object Object]".into(),
            Value::Error(error) => error.string_repr(agent),
            Value::Promise(_) => "[object Promise]".into(),
            Value::BuiltinFunction(function) => format!(
                "function {}() {{ [native code] }}",
                agent[function].name
            ),
            Value::BuiltinPromiseResolvingFunction(_) => "function () { [native code] }".into(),
        }
    }
}

/// ### [6.1.6.1.20 Number::toString ( x, 10 )](https://tc39.es/ecma262/#sec-numeric-types-number-tostring)
fn number_to_string(number: f64) -> std::string::String {
    if number.is_nan() {
        "NaN".into()
    } else if number.is_infinite() {
        (if number > 0.0 { "Infinity" } else { "-Infinity" }).into()
    } else if number == 0.0 {
        "0".into()
    } else {
        let mut buffer = ryu_js::Buffer::new();
        buffer.format_finite(number).into()
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, Into::into)
    }
}

impl HeapMarkAndSweep for Value {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.push_value(*self);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        match self {
            Value::Undefined | Value::Null | Value::Boolean(_) | Value::Number(_) => {}
            Value::String(data) => data.sweep_values(compactions),
            Value::Object(data) => data.sweep_values(compactions),
            Value::Error(data) => data.sweep_values(compactions),
            Value::Promise(data) => data.sweep_values(compactions),
            Value::BuiltinFunction(data) => data.sweep_values(compactions),
            Value::BuiltinPromiseResolvingFunction(data) => data.sweep_values(compactions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::number_to_string;

    #[test]
    fn numbers_render_like_javascript() {
        assert_eq!(number_to_string(42.0), "42");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(1.5), "1.5");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1e-7), "1e-7");
        assert_eq!(number_to_string(1.2345678901234568e20), "123456789012345680000");
        assert_eq!(number_to_string(-0.000001), "-0.000001");
    }
}
