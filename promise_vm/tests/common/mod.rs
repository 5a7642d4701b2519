// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque};

use promise_vm::ecmascript::{
    abstract_operations::operations_on_objects::call_function,
    builtins::{
        ArgumentsList, Behaviour, BuiltinFunctionArgs, ClosureFn, create_builtin_function,
        promise::Promise,
    },
    execution::{
        Agent, ExceptionType, HostHooks, Job, JsResult, Options,
        PromiseRejectionTrackerOperation, Realm,
    },
    types::{Function, OrdinaryObject, Value},
};

/// Host hooks with a manually stepped FIFO job queue that also records
/// every rejection tracker call.
#[derive(Debug, Default)]
pub struct TestHostHooks {
    jobs: RefCell<VecDeque<Job>>,
    pub tracker_calls: RefCell<Vec<(Promise, PromiseRejectionTrackerOperation)>>,
}

impl TestHostHooks {
    pub fn pending_jobs(&self) -> usize {
        self.jobs.borrow().len()
    }

    /// Runs the oldest queued job. Returns None if the queue is empty.
    pub fn run_one(&self, agent: &mut Agent) -> Option<JsResult<()>> {
        let job = self.jobs.borrow_mut().pop_front()?;
        Some(job.run(agent))
    }

    /// Runs jobs until the queue is empty, panicking on an escaped error.
    /// Returns the number of jobs run.
    pub fn run_all(&self, agent: &mut Agent) -> usize {
        let mut count = 0;
        while let Some(result) = self.run_one(agent) {
            if let Err(err) = result {
                panic!("Job threw: {}", err.to_string(agent));
            }
            count += 1;
        }
        count
    }
}

impl HostHooks for TestHostHooks {
    fn enqueue_promise_job(&self, job: Job) {
        self.jobs.borrow_mut().push_back(job);
    }

    fn promise_rejection_tracker(
        &self,
        promise: Promise,
        operation: PromiseRejectionTrackerOperation,
    ) {
        self.tracker_calls.borrow_mut().push((promise, operation));
    }
}

pub fn setup() -> (Agent, &'static TestHostHooks, Realm) {
    setup_with_options(Options::default())
}

pub fn setup_with_options(options: Options) -> (Agent, &'static TestHostHooks, Realm) {
    let hooks: &'static TestHostHooks = Box::leak(Box::default());
    let mut agent = Agent::new(options, hooks);
    let realm = agent.create_realm();
    (agent, hooks, realm)
}

thread_local! {
    static CALLS: RefCell<Vec<(Value, Value)>> = const { RefCell::new(Vec::new()) };
}

/// Takes the `(tag, argument)` pairs recorded by [`recorder`] handlers on
/// this thread.
pub fn take_calls() -> Vec<(Value, Value)> {
    CALLS.with_borrow_mut(std::mem::take)
}

fn closure(agent: &mut Agent, behaviour: ClosureFn, captures: Vec<Value>) -> Value {
    create_builtin_function(
        agent,
        Behaviour::Closure(behaviour),
        BuiltinFunctionArgs::new(1, "").with_captures(captures),
    )
    .into()
}

/// A handler that records its first argument under `tag` and returns it.
pub fn recorder(agent: &mut Agent, tag: i32) -> Value {
    fn record(
        _: &mut Agent,
        _: Value,
        arguments: ArgumentsList,
        captures: &[Value],
    ) -> JsResult<Value> {
        let argument = arguments.get(0);
        CALLS.with_borrow_mut(|calls| calls.push((captures[0], argument)));
        Ok(argument)
    }
    closure(agent, record, vec![Value::from(tag)])
}

/// A handler that ignores its argument and returns `value`.
pub fn returning(agent: &mut Agent, value: Value) -> Value {
    fn return_capture(
        _: &mut Agent,
        _: Value,
        _: ArgumentsList,
        captures: &[Value],
    ) -> JsResult<Value> {
        Ok(captures[0])
    }
    closure(agent, return_capture, vec![value])
}

/// A handler that throws an `Error` with the message "boom".
pub fn thrower(agent: &mut Agent) -> Value {
    fn throw(agent: &mut Agent, _: Value, _: ArgumentsList, _: &[Value]) -> JsResult<Value> {
        Err(agent.throw_exception(ExceptionType::Error, "boom"))
    }
    closure(agent, throw, vec![])
}

/// An executor that calls its resolve argument with `value`.
pub fn resolve_executor(agent: &mut Agent, value: Value) -> Value {
    fn executor(
        agent: &mut Agent,
        _: Value,
        arguments: ArgumentsList,
        captures: &[Value],
    ) -> JsResult<Value> {
        let resolve = Function::try_from(arguments.get(0))
            .map_err(|_| agent.throw_exception(ExceptionType::TypeError, "resolve is not callable"))?;
        call_function(agent, resolve, Value::Undefined, ArgumentsList::new(&[captures[0]]))
    }
    closure(agent, executor, vec![value])
}

/// An object whose `then` calls its resolve argument with `value`
/// synchronously.
pub fn thenable_resolving_with(agent: &mut Agent, value: Value) -> Value {
    fn then(
        agent: &mut Agent,
        _: Value,
        arguments: ArgumentsList,
        captures: &[Value],
    ) -> JsResult<Value> {
        let resolve = Function::try_from(arguments.get(0))
            .map_err(|_| agent.throw_exception(ExceptionType::TypeError, "resolve is not callable"))?;
        call_function(agent, resolve, Value::Undefined, ArgumentsList::new(&[captures[0]]))
    }
    let then = closure(agent, then, vec![value]);
    let object = OrdinaryObject::create(agent, None);
    object.set(agent, "then", then);
    object.into()
}

/// An object whose `then` calls resolve with `first` and then reject with
/// `second`.
pub fn thenable_resolving_then_rejecting(agent: &mut Agent, first: Value, second: Value) -> Value {
    fn then(
        agent: &mut Agent,
        _: Value,
        arguments: ArgumentsList,
        captures: &[Value],
    ) -> JsResult<Value> {
        let (Ok(resolve), Ok(reject)) = (
            Function::try_from(arguments.get(0)),
            Function::try_from(arguments.get(1)),
        ) else {
            return Err(agent.throw_exception(ExceptionType::TypeError, "not callable"));
        };
        call_function(agent, resolve, Value::Undefined, ArgumentsList::new(&[captures[0]]))?;
        call_function(agent, reject, Value::Undefined, ArgumentsList::new(&[captures[1]]))
    }
    let then = closure(agent, then, vec![first, second]);
    let object = OrdinaryObject::create(agent, None);
    object.set(agent, "then", then);
    object.into()
}

/// An object whose `then` getter throws.
pub fn thenable_with_throwing_getter(agent: &mut Agent) -> Value {
    fn getter(agent: &mut Agent, _: Value, _: ArgumentsList, _: &[Value]) -> JsResult<Value> {
        Err(agent.throw_exception(ExceptionType::Error, "getter threw"))
    }
    let Value::BuiltinFunction(getter) = closure(agent, getter, vec![]) else {
        unreachable!()
    };
    let object = OrdinaryObject::create(agent, None);
    object.define_getter(agent, "then", getter.into());
    object.into()
}

/// Renders a value for assertions.
pub fn repr(agent: &Agent, value: Value) -> String {
    value.string_repr(agent)
}
