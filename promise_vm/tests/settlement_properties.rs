// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod common;

use common::{recorder, setup, take_calls, thenable_resolving_with};
use promise_vm::ecmascript::{
    abstract_operations::operations_on_objects::call_function,
    builtins::{
        ArgumentsList,
        promise::{Promise, PromiseStatus},
    },
    types::Value,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Call {
    Resolve(i32),
    ResolveThenable(i32),
    Reject(i32),
}

fn call_strategy() -> impl Strategy<Value = Call> {
    prop_oneof![
        any::<i32>().prop_map(Call::Resolve),
        any::<i32>().prop_map(Call::ResolveThenable),
        any::<i32>().prop_map(Call::Reject),
    ]
}

proptest! {
    #[test]
    fn only_the_first_resolving_call_settles(
        calls in prop::collection::vec(call_strategy(), 1..16),
        handlers in 0usize..4,
    ) {
        let (mut agent, hooks, realm) = setup();
        take_calls();
        agent.run_in_realm(realm, |agent| {
            let promise = Promise::create(agent, realm);
            for tag in 0..handlers as i32 {
                let on_fulfilled = recorder(agent, tag);
                let on_rejected = recorder(agent, tag);
                promise.then(agent, on_fulfilled, on_rejected);
            }
            let functions = promise.create_resolving_functions(agent);
            for call in &calls {
                let (function, argument) = match *call {
                    Call::Resolve(value) => (functions.resolve, Value::from(value)),
                    Call::ResolveThenable(value) => {
                        (functions.resolve, thenable_resolving_with(agent, Value::from(value)))
                    }
                    Call::Reject(value) => (functions.reject, Value::from(value)),
                };
                call_function(agent, function, Value::Undefined, ArgumentsList::new(&[argument]))
                    .unwrap();
            }
            hooks.run_all(agent);

            let (expected_status, expected_result) = match calls[0] {
                Call::Resolve(value) | Call::ResolveThenable(value) => {
                    (PromiseStatus::Fulfilled, Value::from(value))
                }
                Call::Reject(value) => (PromiseStatus::Rejected, Value::from(value)),
            };
            prop_assert_eq!(promise.state(agent), expected_status);
            prop_assert_eq!(promise.result(agent), Some(expected_result));

            // Every handler ran exactly once, in registration order.
            let observed = take_calls();
            let expected: Vec<(Value, Value)> = (0..handlers as i32)
                .map(|tag| (Value::from(tag), expected_result))
                .collect();
            prop_assert_eq!(observed, expected);
            Ok(())
        })?;
    }
}
