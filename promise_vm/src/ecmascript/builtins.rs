// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2 Promise Objects](https://tc39.es/ecma262/#sec-promise-objects)
//!
//! Only the built-ins needed to express promises exist here: native
//! functions, error objects, promises and the promise resolving functions.

pub mod builtin_function;
pub mod error;
pub mod promise;
pub mod promise_objects;

pub use builtin_function::{
    ArgumentsList, Behaviour, BuiltinFunction, BuiltinFunctionArgs, ClosureFn, ConstructorFn,
    RegularFn, create_builtin_function,
};
