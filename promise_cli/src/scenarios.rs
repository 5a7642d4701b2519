// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use clap::ValueEnum;
use promise_vm::{
    ecmascript::{
        abstract_operations::operations_on_objects::call_function,
        builtins::{
            ArgumentsList, Behaviour, BuiltinFunctionArgs, ClosureFn, create_builtin_function,
            promise::{Promise, PromiseStatus},
        },
        execution::{Agent, ExceptionType, JsResult},
        types::{Function, OrdinaryObject, Value},
    },
    engine::Global,
};

use crate::host_hooks::CliHostHooks;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub(crate) enum Scenario {
    /// Fulfills the head of a then-chain that adds one per link.
    Chain,
    /// Resolves a promise with nested thenables, one job per level.
    Thenable,
    /// Resolves a promise with itself.
    SelfResolution,
    /// Rejects two promises and handles only one of them.
    UnhandledRejection,
    /// Builds unreachable promise cycles and collects them.
    CycleGc,
}

impl Scenario {
    pub(crate) fn run(
        self,
        agent: &mut Agent,
        host_hooks: &CliHostHooks,
        depth: u32,
    ) -> JsResult<()> {
        match self {
            Scenario::Chain => chain(agent, host_hooks, depth),
            Scenario::Thenable => thenable(agent, host_hooks, depth),
            Scenario::SelfResolution => self_resolution(agent, host_hooks),
            Scenario::UnhandledRejection => unhandled_rejection(agent, host_hooks),
            Scenario::CycleGc => cycle_gc(agent, host_hooks, depth),
        }
    }
}

fn chain(agent: &mut Agent, host_hooks: &CliHostHooks, depth: u32) -> JsResult<()> {
    let realm = agent.current_realm();
    let head = Promise::create(agent, realm);
    let mut tail = head;
    for _ in 0..depth {
        let add_one = closure(agent, add, vec![Value::from(1)]);
        tail = tail.then(agent, add_one, Value::Undefined);
    }
    let functions = head.create_resolving_functions(agent);
    call_function(
        agent,
        functions.resolve,
        Value::Undefined,
        ArgumentsList::new(&[Value::from(0)]),
    )?;
    let jobs = host_hooks.run_jobs(agent)?;
    println!("chain of {depth} after {jobs} jobs: {}", describe(agent, tail));
    Ok(())
}

fn thenable(agent: &mut Agent, host_hooks: &CliHostHooks, depth: u32) -> JsResult<()> {
    let mut resolution = Value::from_str(agent, "done");
    for _ in 0..depth {
        let then = closure(agent, resolve_with_capture, vec![resolution]);
        let object = OrdinaryObject::create(agent, None);
        object.set(agent, "then", then);
        resolution = object.into();
    }
    let realm = agent.current_realm();
    let promise = Promise::create(agent, realm);
    let functions = promise.create_resolving_functions(agent);
    call_function(
        agent,
        functions.resolve,
        Value::Undefined,
        ArgumentsList::new(&[resolution]),
    )?;
    println!("after resolve: {}", describe(agent, promise));
    let jobs = host_hooks.run_jobs(agent)?;
    println!("after {jobs} jobs: {}", describe(agent, promise));
    Ok(())
}

fn self_resolution(agent: &mut Agent, host_hooks: &CliHostHooks) -> JsResult<()> {
    let realm = agent.current_realm();
    let promise = Promise::create(agent, realm);
    let on_rejected = printer(agent, "caught");
    promise.then(agent, Value::Undefined, on_rejected);
    let functions = promise.create_resolving_functions(agent);
    call_function(
        agent,
        functions.resolve,
        Value::Undefined,
        ArgumentsList::new(&[promise.into_value()]),
    )?;
    host_hooks.run_jobs(agent)?;
    Ok(())
}

fn unhandled_rejection(agent: &mut Agent, host_hooks: &CliHostHooks) -> JsResult<()> {
    let reason = Value::from_str(agent, "nobody listens");
    Promise::new_rejected(agent, reason);
    let reason = Value::from_str(agent, "handled later");
    let handled = Promise::new_rejected(agent, reason);
    host_hooks.run_jobs(agent)?;
    let on_rejected = printer(agent, "caught");
    handled.then(agent, Value::Undefined, on_rejected);
    host_hooks.run_jobs(agent)?;
    Ok(())
}

fn cycle_gc(agent: &mut Agent, host_hooks: &CliHostHooks, depth: u32) -> JsResult<()> {
    let realm = agent.current_realm();
    for _ in 0..depth {
        let first = Promise::create(agent, realm);
        let second = first.then(agent, Value::Undefined, Value::Undefined);
        second.perform_then(agent, Value::Undefined, Value::Undefined, None);
    }
    let head = Promise::create(agent, realm);
    let on_fulfilled = printer(agent, "rooted chain fulfilled");
    head.then(agent, on_fulfilled, Value::Undefined);
    let head = Global::new(agent, head);

    let before = agent.heap_counts();
    agent.gc();
    let after = agent.heap_counts();
    println!(
        "promises: {} -> {}, reactions: {} -> {}",
        before.promises,
        after.promises,
        before.promise_reaction_records,
        after.promise_reaction_records
    );

    let head = head.take(agent);
    head.fulfill(agent, Value::from(depth));
    host_hooks.run_jobs(agent)?;
    Ok(())
}

fn describe(agent: &Agent, promise: Promise) -> String {
    let result = promise.result(agent).unwrap_or_default().string_repr(agent);
    match promise.state(agent) {
        PromiseStatus::Pending => "pending".to_string(),
        PromiseStatus::Fulfilled => format!("fulfilled with {result}"),
        PromiseStatus::Rejected => format!("rejected with {result}"),
    }
}

fn closure(agent: &mut Agent, behaviour: ClosureFn, captures: Vec<Value>) -> Value {
    create_builtin_function(
        agent,
        Behaviour::Closure(behaviour),
        BuiltinFunctionArgs::new(1, "").with_captures(captures),
    )
    .into()
}

fn printer(agent: &mut Agent, label: &str) -> Value {
    let label = Value::from_str(agent, label);
    closure(agent, print, vec![label])
}

fn print(
    agent: &mut Agent,
    _: Value,
    arguments: ArgumentsList,
    captures: &[Value],
) -> JsResult<Value> {
    println!(
        "{}: {}",
        captures[0].string_repr(agent),
        arguments.get(0).string_repr(agent)
    );
    Ok(Value::Undefined)
}

fn add(
    agent: &mut Agent,
    _: Value,
    arguments: ArgumentsList,
    captures: &[Value],
) -> JsResult<Value> {
    match (arguments.get(0), captures[0]) {
        (Value::Number(value), Value::Number(addend)) => Ok(Value::Number(value + addend)),
        _ => Err(agent.throw_exception(ExceptionType::TypeError, "Expected a number")),
    }
}

fn resolve_with_capture(
    agent: &mut Agent,
    _: Value,
    arguments: ArgumentsList,
    captures: &[Value],
) -> JsResult<Value> {
    let Ok(resolve) = Function::try_from(arguments.get(0)) else {
        return Err(agent.throw_exception(ExceptionType::TypeError, "Not a callable value"));
    };
    call_function(
        agent,
        resolve,
        Value::Undefined,
        ArgumentsList::new(&[captures[0]]),
    )
}
