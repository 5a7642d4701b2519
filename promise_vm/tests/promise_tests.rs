// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod common;

use common::{
    recorder, repr, resolve_executor, returning, setup, setup_with_options, take_calls,
    thenable_resolving_then_rejecting, thenable_resolving_with, thenable_with_throwing_getter,
    thrower,
};
use promise_vm::{
    ecmascript::{
        abstract_operations::operations_on_objects::{call_function, construct, get},
        builtins::{
            ArgumentsList,
            promise::{Promise, PromiseCapability, PromiseStatus, promise_resolve},
        },
        execution::{ExceptionType, Options, PromiseRejectionTrackerOperation},
        types::{Function, Object, OrdinaryObject, Value},
    },
    engine::Global,
};

#[test]
fn resolve_with_non_object_fulfills_synchronously() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let functions = promise.create_resolving_functions(agent);
        call_function(
            agent,
            functions.resolve,
            Value::Undefined,
            ArgumentsList::new(&[Value::from(3)]),
        )
        .unwrap();
        assert_eq!(promise.state(agent), PromiseStatus::Fulfilled);
        assert_eq!(promise.result(agent), Some(Value::from(3)));
        assert_eq!(hooks.pending_jobs(), 0);
    });
}

#[test]
fn only_the_first_call_of_a_resolving_pair_has_effect() {
    let (mut agent, _, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let functions = promise.create_resolving_functions(agent);
        let reason = Value::from_str(agent, "first");
        call_function(
            agent,
            functions.reject,
            Value::Undefined,
            ArgumentsList::new(&[reason]),
        )
        .unwrap();
        for _ in 0..3 {
            call_function(
                agent,
                functions.resolve,
                Value::Undefined,
                ArgumentsList::new(&[Value::from(1)]),
            )
            .unwrap();
            call_function(
                agent,
                functions.reject,
                Value::Undefined,
                ArgumentsList::new(&[Value::from(2)]),
            )
            .unwrap();
        }
        assert_eq!(promise.state(agent), PromiseStatus::Rejected);
        assert_eq!(promise.result(agent), Some(reason));
    });
}

#[test]
fn resolving_pair_is_inert_while_a_thenable_is_being_adopted() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let functions = promise.create_resolving_functions(agent);
        let thenable = thenable_resolving_with(agent, Value::from(10));
        call_function(
            agent,
            functions.resolve,
            Value::Undefined,
            ArgumentsList::new(&[thenable]),
        )
        .unwrap();
        // Adoption is pending in a job; the outer pair is already spent.
        assert_eq!(promise.state(agent), PromiseStatus::Pending);
        call_function(
            agent,
            functions.reject,
            Value::Undefined,
            ArgumentsList::new(&[Value::from(0)]),
        )
        .unwrap();
        assert_eq!(promise.state(agent), PromiseStatus::Pending);
        assert_eq!(hooks.run_all(agent), 1);
        assert_eq!(promise.state(agent), PromiseStatus::Fulfilled);
        assert_eq!(promise.result(agent), Some(Value::from(10)));
    });
}

#[test]
fn thenable_calling_both_of_its_functions_only_resolves() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let thenable = thenable_resolving_then_rejecting(agent, Value::from(1), Value::from(2));
        PromiseCapability::from_promise(agent, promise).resolve(agent, thenable);
        hooks.run_all(agent);
        assert_eq!(promise.state(agent), PromiseStatus::Fulfilled);
        assert_eq!(promise.result(agent), Some(Value::from(1)));
    });
}

#[test]
fn self_resolution_rejects_with_type_error() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let functions = promise.create_resolving_functions(agent);
        call_function(
            agent,
            functions.resolve,
            Value::Undefined,
            ArgumentsList::new(&[promise.into_value()]),
        )
        .unwrap();
        assert_eq!(promise.state(agent), PromiseStatus::Rejected);
        let Some(Value::Error(error)) = promise.result(agent) else {
            panic!("Expected an Error");
        };
        assert_eq!(error.kind(agent), ExceptionType::TypeError);
        assert_eq!(hooks.pending_jobs(), 0);
    });
}

#[test]
fn throwing_then_getter_rejects_with_the_thrown_value() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let thenable = thenable_with_throwing_getter(agent);
        PromiseCapability::from_promise(agent, promise).resolve(agent, thenable);
        assert_eq!(promise.state(agent), PromiseStatus::Rejected);
        let reason = promise.result(agent).unwrap();
        assert_eq!(repr(agent, reason), "Error: getter threw");
        assert_eq!(hooks.pending_jobs(), 0);
    });
}

#[test]
fn object_without_callable_then_fulfills_with_the_object() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let object = OrdinaryObject::create(agent, None);
        object.set(agent, "then", Value::from(5));
        PromiseCapability::from_promise(agent, promise).resolve(agent, object.into());
        assert_eq!(promise.state(agent), PromiseStatus::Fulfilled);
        assert_eq!(promise.result(agent), Some(Value::from(object)));
        assert_eq!(hooks.pending_jobs(), 0);
    });
}

#[test]
fn thenable_chain_settles_after_one_turn_per_link() {
    const DEPTH: usize = 5;
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let mut resolution = Value::from(42);
        for _ in 0..DEPTH {
            resolution = thenable_resolving_with(agent, resolution);
        }
        let promise = Promise::create(agent, realm);
        PromiseCapability::from_promise(agent, promise).resolve(agent, resolution);
        for _ in 0..DEPTH {
            assert_eq!(promise.state(agent), PromiseStatus::Pending);
            assert_eq!(hooks.pending_jobs(), 1);
            hooks.run_one(agent).unwrap().unwrap();
        }
        assert_eq!(promise.state(agent), PromiseStatus::Fulfilled);
        assert_eq!(promise.result(agent), Some(Value::from(42)));
        assert_eq!(hooks.pending_jobs(), 0);
    });
}

#[test]
fn reactions_run_in_registration_order() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        for tag in 0..3 {
            let handler = recorder(agent, tag);
            promise.then(agent, handler, Value::Undefined);
        }
        promise.fulfill(agent, Value::from(7));
        assert!(take_calls().is_empty());
        let handler = recorder(agent, 3);
        promise.then(agent, handler, Value::Undefined);
        hooks.run_all(agent);
        let tags: Vec<Value> = take_calls().into_iter().map(|(tag, _)| tag).collect();
        assert_eq!(tags, (0..4).map(|tag: i32| Value::from(tag)).collect::<Vec<_>>());
    });
}

#[test]
fn rejection_dispatches_the_reject_list_in_order() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        for tag in 0..3 {
            let on_fulfilled = recorder(agent, -1);
            let on_rejected = recorder(agent, tag);
            promise.then(agent, on_fulfilled, on_rejected);
        }
        promise.reject(agent, Value::from(9));
        hooks.run_all(agent);
        assert_eq!(
            take_calls(),
            (0..3)
                .map(|tag: i32| (Value::from(tag), Value::from(9)))
                .collect::<Vec<_>>()
        );
    });
}

#[test]
fn then_on_settled_promise_schedules_immediately() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::new_resolved(agent, Value::from(1));
        let handler = recorder(agent, 0);
        let derived = promise.then(agent, handler, Value::Undefined);
        assert_eq!(hooks.pending_jobs(), 1);
        // Handlers never run synchronously.
        assert!(take_calls().is_empty());
        hooks.run_all(agent);
        assert_eq!(take_calls(), [(Value::from(0), Value::from(1))]);
        assert_eq!(derived.result(agent), Some(Value::from(1)));
    });
}

#[test]
fn then_creates_the_derived_promise_in_the_current_realm() {
    let (mut agent, _, realm) = setup();
    let other_realm = agent.create_realm();
    let promise = Promise::create(&mut agent, other_realm);

    let derived = agent.run_in_realm(realm, |agent| {
        promise.then(agent, Value::Undefined, Value::Undefined)
    });
    assert_eq!(derived.realm(&agent), realm);

    // Without an entered realm the promise's own realm is used.
    let derived = promise.then(&mut agent, Value::Undefined, Value::Undefined);
    assert_eq!(derived.realm(&agent), other_realm);
    assert_eq!(derived.state(&agent), PromiseStatus::Pending);
}

#[test]
#[should_panic(expected = "Tried to fulfill a settled promise")]
fn fulfilling_a_fulfilled_promise_panics() {
    let (mut agent, _, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        promise.fulfill(agent, Value::from(1));
        promise.fulfill(agent, Value::from(2));
    });
}

#[test]
#[should_panic(expected = "Tried to reject a settled promise")]
fn rejecting_a_fulfilled_promise_panics() {
    let (mut agent, _, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        promise.fulfill(agent, Value::from(1));
        promise.reject(agent, Value::from(2));
    });
}

#[test]
#[should_panic(expected = "Tried to fulfill a settled promise")]
fn fulfilling_a_rejected_promise_panics() {
    let (mut agent, _, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        promise.reject(agent, Value::from(1));
        promise.fulfill(agent, Value::from(2));
    });
}

#[test]
fn fulfilling_with_one_pending_reaction_schedules_one_job() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let capability = PromiseCapability::new(agent);
        let handler = recorder(agent, 1);
        let derived = promise.perform_then(agent, handler, Value::Null, Some(capability));
        assert_eq!(derived, Some(capability.promise()));
        assert_eq!(hooks.pending_jobs(), 0);
        promise.fulfill(agent, Value::from(42));
        assert_eq!(hooks.pending_jobs(), 1);
        hooks.run_one(agent).unwrap().unwrap();
        assert_eq!(take_calls(), [(Value::from(1), Value::from(42))]);
        assert_eq!(capability.promise().state(agent), PromiseStatus::Fulfilled);
        assert_eq!(capability.promise().result(agent), Some(Value::from(42)));
    });
}

#[test]
fn missing_handlers_pass_settlement_through() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let fulfilled = Promise::create(agent, realm);
        let rejected = Promise::create(agent, realm);
        let fulfilled_derived = fulfilled.then(agent, Value::Undefined, Value::Undefined);
        let rejected_derived = rejected.then(agent, Value::from(1), Value::Null);
        fulfilled.fulfill(agent, Value::from(1));
        rejected.reject(agent, Value::from(2));
        hooks.run_all(agent);
        assert_eq!(fulfilled_derived.state(agent), PromiseStatus::Fulfilled);
        assert_eq!(fulfilled_derived.result(agent), Some(Value::from(1)));
        assert_eq!(rejected_derived.state(agent), PromiseStatus::Rejected);
        assert_eq!(rejected_derived.result(agent), Some(Value::from(2)));
    });
}

#[test]
fn throwing_handler_rejects_the_derived_promise() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::new_resolved(agent, Value::Undefined);
        let handler = thrower(agent);
        let derived = promise.then(agent, handler, Value::Undefined);
        // The error is contained in the derived promise.
        hooks.run_one(agent).unwrap().unwrap();
        assert_eq!(derived.state(agent), PromiseStatus::Rejected);
        let reason = derived.result(agent).unwrap();
        assert_eq!(repr(agent, reason), "Error: boom");
    });
}

#[test]
fn handler_returning_a_thenable_is_unwrapped() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::new_resolved(agent, Value::Undefined);
        let thenable = thenable_resolving_with(agent, Value::from(8));
        let handler = returning(agent, thenable);
        let derived = promise.then(agent, handler, Value::Undefined);
        assert_eq!(hooks.run_all(agent), 2);
        assert_eq!(derived.result(agent), Some(Value::from(8)));
    });
}

#[test]
fn handler_returning_a_promise_adopts_its_state() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let inner = Promise::new_rejected(agent, Value::from(4));
        let promise = Promise::new_resolved(agent, Value::Undefined);
        let handler = returning(agent, inner.into_value());
        let derived = promise.then(agent, handler, Value::Undefined);
        // Reaction, resolve-thenable, then the adoption reaction.
        assert_eq!(hooks.run_all(agent), 3);
        assert_eq!(derived.state(agent), PromiseStatus::Rejected);
        assert_eq!(derived.result(agent), Some(Value::from(4)));
        assert!(inner.is_handled(agent));
    });
}

#[test]
fn fire_and_forget_reaction_reports_a_throw() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let handler = thrower(agent);
        assert_eq!(
            promise.perform_then(agent, handler, Value::Undefined, None),
            None
        );
        promise.fulfill(agent, Value::Undefined);
        let result = hooks.run_one(agent).unwrap();
        let err = result.unwrap_err();
        assert_eq!(err.to_string(agent), "Error: boom");
    });
}

#[test]
fn unhandled_rejection_is_tracked_until_handled() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let reason = Value::from_str(agent, "err");
        promise.reject(agent, reason);
        assert!(!promise.is_handled(agent));
        assert_eq!(
            *hooks.tracker_calls.borrow(),
            [(promise, PromiseRejectionTrackerOperation::Reject)]
        );

        let handler = recorder(agent, 0);
        promise.then(agent, Value::Undefined, handler);
        assert!(promise.is_handled(agent));
        assert_eq!(
            hooks.tracker_calls.borrow()[1..],
            [(promise, PromiseRejectionTrackerOperation::Handle)]
        );

        // Only the first handler attachment is reported.
        promise.then(agent, Value::Undefined, Value::Undefined);
        assert_eq!(hooks.tracker_calls.borrow().len(), 2);
        hooks.run_all(agent);
        assert_eq!(take_calls(), [(Value::from(0), reason)]);
    });
}

#[test]
fn rejecting_a_handled_promise_is_not_tracked() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        let derived = promise.then(agent, Value::Undefined, Value::Undefined);
        promise.reject(agent, Value::from(1));
        assert!(hooks.tracker_calls.borrow().is_empty());
        hooks.run_all(agent);
        // The pass-through rejection of the unhandled derived promise is.
        assert_eq!(
            *hooks.tracker_calls.borrow(),
            [(derived, PromiseRejectionTrackerOperation::Reject)]
        );
    });
}

#[test]
fn set_is_handled_suppresses_tracking() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::create(agent, realm);
        promise.set_is_handled(agent);
        promise.reject(agent, Value::Undefined);
        assert!(hooks.tracker_calls.borrow().is_empty());
    });
}

#[test]
fn try_get_result_maps_settlement_to_result() {
    let (mut agent, _, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let pending = Promise::create(agent, realm);
        let fulfilled = Promise::new_resolved(agent, Value::from(1));
        let rejected = Promise::new_rejected(agent, Value::from(2));
        assert!(pending.try_get_result(agent).is_none());
        assert_eq!(fulfilled.try_get_result(agent).unwrap().unwrap(), Value::from(1));
        assert_eq!(
            rejected.try_get_result(agent).unwrap().unwrap_err().value(),
            Value::from(2)
        );
    });
}

#[test]
fn promise_constructor_runs_the_executor() {
    let (mut agent, _, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let constructor = Function::from(realm.intrinsics(agent).promise());
        let executor = resolve_executor(agent, Value::from(5));
        let Object::Promise(promise) =
            construct(agent, constructor, ArgumentsList::new(&[executor])).unwrap()
        else {
            panic!("Expected a promise");
        };
        assert_eq!(promise.state(agent), PromiseStatus::Fulfilled);
        assert_eq!(promise.result(agent), Some(Value::from(5)));
    });
}

#[test]
fn promise_constructor_rejects_when_the_executor_throws() {
    let (mut agent, _, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let constructor = Function::from(realm.intrinsics(agent).promise());
        let executor = thrower(agent);
        let Object::Promise(promise) =
            construct(agent, constructor, ArgumentsList::new(&[executor])).unwrap()
        else {
            panic!("Expected a promise");
        };
        assert_eq!(promise.state(agent), PromiseStatus::Rejected);
        let reason = promise.result(agent).unwrap();
        assert_eq!(repr(agent, reason), "Error: boom");
    });
}

#[test]
fn promise_constructor_type_errors() {
    let (mut agent, _, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let constructor = Function::from(realm.intrinsics(agent).promise());
        let err = construct(agent, constructor, ArgumentsList::new(&[Value::from(1)])).unwrap_err();
        let Value::Error(error) = err.value() else {
            panic!("Expected an Error");
        };
        assert_eq!(error.kind(agent), ExceptionType::TypeError);

        let executor = thrower(agent);
        let err = call_function(
            agent,
            constructor,
            Value::Undefined,
            ArgumentsList::new(&[executor]),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(agent),
            "TypeError: Promise Constructor requires 'new'"
        );
    });
}

#[test]
fn promise_resolve_returns_promises_of_the_same_constructor() {
    let (mut agent, _, realm) = setup();
    let other_realm = agent.create_realm();
    agent.run_in_realm(realm, |agent| {
        let constructor: Value = realm.intrinsics(agent).promise().into();
        let promise = Promise::create(agent, realm);
        assert_eq!(
            promise_resolve(agent, constructor, promise.into_value()).unwrap(),
            promise
        );

        let wrapped = promise_resolve(agent, constructor, Value::from(3)).unwrap();
        assert_eq!(wrapped.result(agent), Some(Value::from(3)));

        // A promise of another realm's %Promise% is adopted, not returned.
        let foreign = Promise::create(agent, other_realm);
        let adopted = promise_resolve(agent, constructor, foreign.into_value()).unwrap();
        assert_ne!(adopted, foreign);
        assert_eq!(adopted.realm(agent), realm);

        let err = promise_resolve(agent, Value::from(1), Value::from(3)).unwrap_err();
        assert_eq!(err.to_string(agent), "TypeError: Not a promise constructor");
    });
}

#[test]
fn static_methods_and_catch_are_reachable_through_get() {
    let (mut agent, hooks, realm) = setup();
    agent.run_in_realm(realm, |agent| {
        let constructor = realm.intrinsics(agent).promise();
        let reject = get(agent, constructor.into(), &"reject".into()).unwrap();
        let Ok(reject) = Function::try_from(reject) else {
            panic!("Promise.reject is not callable");
        };
        let Value::Promise(rejected) = call_function(
            agent,
            reject,
            constructor.into(),
            ArgumentsList::new(&[Value::from(6)]),
        )
        .unwrap() else {
            panic!("Expected a promise");
        };
        assert_eq!(rejected.state(agent), PromiseStatus::Rejected);

        let catch = get(agent, rejected.into_object(), &"catch".into()).unwrap();
        let Ok(catch) = Function::try_from(catch) else {
            panic!("Promise.prototype.catch is not callable");
        };
        let handler = recorder(agent, 0);
        let derived = call_function(
            agent,
            catch,
            rejected.into_value(),
            ArgumentsList::new(&[handler]),
        )
        .unwrap();
        hooks.run_all(agent);
        assert_eq!(take_calls(), [(Value::from(0), Value::from(6))]);
        let Value::Promise(derived) = derived else {
            panic!("Expected a promise");
        };
        assert_eq!(derived.result(agent), Some(Value::from(6)));
    });
}

#[test]
fn handlers_past_the_call_stack_limit_reject_with_range_error() {
    let (mut agent, hooks, realm) = setup_with_options(Options {
        call_stack_limit: 1,
        ..Default::default()
    });
    agent.run_in_realm(realm, |agent| {
        let promise = Promise::new_resolved(agent, Value::Undefined);
        let handler = recorder(agent, 0);
        let derived = promise.then(agent, handler, Value::Undefined);
        hooks.run_all(agent);
        assert!(take_calls().is_empty());
        let Some(Value::Error(error)) = derived.result(agent) else {
            panic!("Expected an Error");
        };
        assert_eq!(error.kind(agent), ExceptionType::RangeError);
    });
}

#[test]
fn gc_collects_unreachable_chains_and_keeps_rooted_ones() {
    let (mut agent, hooks, realm) = setup();
    let baseline = agent.heap_counts();
    let rooted = agent.run_in_realm(realm, |agent| {
        // Unreachable: a promise whose only reaction settles a promise
        // reacting back onto the first.
        let first = Promise::create(agent, realm);
        let second = first.then(agent, Value::Undefined, Value::Undefined);
        second.perform_then(agent, Value::Undefined, Value::Undefined, None);

        let head = Promise::create(agent, realm);
        let handler = recorder(agent, 0);
        let tail = head.then(agent, handler, Value::Undefined);
        (Global::new(agent, head), Global::new(agent, tail))
    });
    agent.gc();
    let counts = agent.heap_counts();
    assert_eq!(counts.promises, baseline.promises + 2);
    assert_eq!(counts.promise_reaction_records, baseline.promise_reaction_records + 2);

    let (head, tail) = rooted;
    let head = head.take(&mut agent);
    let tail = tail.take(&mut agent);
    agent.run_in_realm(realm, |agent| head.fulfill(agent, Value::from(11)));
    hooks.run_all(&mut agent);
    assert_eq!(take_calls(), [(Value::from(0), Value::from(11))]);
    assert_eq!(tail.result(&agent), Some(Value::from(11)));

    agent.gc();
    assert_eq!(agent.heap_counts().promises, baseline.promises);
}
