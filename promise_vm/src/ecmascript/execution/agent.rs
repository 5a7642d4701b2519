// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{ExecutionContext, Realm, realm::create_realm};
use crate::{
    ecmascript::{
        builtins::{
            error::ErrorHeapData,
            promise::Promise,
            promise_objects::promise_abstract_operations::promise_jobs::{
                PromiseReactionJob, PromiseResolveThenableJob,
            },
        },
        types::{Function, String, Value},
    },
    heap::{CreateHeapData, Heap, HeapCounts, heap_gc::heap_gc},
};

#[derive(Debug, Clone)]
pub struct Options {
    /// Turns [`Agent::gc`] into a no-op.
    pub disable_gc: bool,
    /// Maximum depth of nested builtin function calls before a RangeError
    /// is thrown.
    pub call_stack_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            disable_gc: false,
            call_stack_limit: 3000,
        }
    }
}

pub type JsResult<T> = std::result::Result<T, JsError>;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct JsError(pub(crate) Value);

impl JsError {
    pub(crate) fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(self) -> Value {
        self.0
    }

    pub fn to_string(self, agent: &Agent) -> std::string::String {
        self.0.string_repr(agent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExceptionType {
    Error,
    AggregateError,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    UriError,
}

impl ExceptionType {
    pub fn name(self) -> &'static str {
        match self {
            ExceptionType::Error => "Error",
            ExceptionType::AggregateError => "AggregateError",
            ExceptionType::EvalError => "EvalError",
            ExceptionType::RangeError => "RangeError",
            ExceptionType::ReferenceError => "ReferenceError",
            ExceptionType::SyntaxError => "SyntaxError",
            ExceptionType::TypeError => "TypeError",
            ExceptionType::UriError => "URIError",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseRejectionTrackerOperation {
    Reject,
    Handle,
}

pub trait HostHooks: std::fmt::Debug {
    /// ### [9.5.5 HostEnqueuePromiseJob ( job, realm )](https://tc39.es/ecma262/#sec-hostenqueuepromisejob)
    ///
    /// Jobs must be run in the order they were enqueued, and only after the
    /// currently running job or host call has returned.
    fn enqueue_promise_job(&self, job: Job);

    /// ### [27.2.1.9 HostPromiseRejectionTracker ( promise, operation )](https://tc39.es/ecma262/#sec-host-promise-rejection-tracker)
    ///
    /// Called with `Reject` when a promise is rejected without any handlers,
    /// and with `Handle` when a handler is added to such a promise for the
    /// first time.
    ///
    /// The default implementation of HostPromiseRejectionTracker is to return
    /// unused.
    fn promise_rejection_tracker(
        &self,
        _promise: Promise,
        _operation: PromiseRejectionTrackerOperation,
    ) {
    }
}

/// ### [9.5 Jobs and Host Operations to Enqueue Jobs](https://tc39.es/ecma262/#sec-jobs)
///
/// Holds every heap reference it needs through roots, so a queued job stays
/// valid across garbage collections.
#[derive(Debug)]
pub struct Job {
    pub(crate) realm: Option<Realm>,
    pub(crate) inner: InnerJob,
}

#[derive(Debug)]
pub(crate) enum InnerJob {
    PromiseResolveThenable(PromiseResolveThenableJob),
    PromiseReaction(PromiseReactionJob),
}

impl Job {
    pub fn realm(&self) -> Option<Realm> {
        self.realm
    }

    /// Runs the job, entering its realm if it has one. An error is only
    /// returned by a reaction without a derived promise whose handler
    /// threw.
    pub fn run(self, agent: &mut Agent) -> JsResult<()> {
        let Self { realm, inner } = self;
        match realm {
            Some(realm) => agent.run_in_realm(realm, |agent| inner.run(agent)),
            None => inner.run(agent),
        }
    }
}

impl InnerJob {
    fn run(self, agent: &mut Agent) -> JsResult<()> {
        match self {
            InnerJob::PromiseResolveThenable(job) => job.run(agent),
            InnerJob::PromiseReaction(job) => job.run(agent),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            InnerJob::PromiseResolveThenable(_) => "PromiseResolveThenable",
            InnerJob::PromiseReaction(_) => "PromiseReaction",
        }
    }
}

/// ### [9.7 Agents](https://tc39.es/ecma262/#sec-agents)
#[derive(Debug)]
pub struct Agent {
    pub(crate) heap: Heap,
    pub(crate) options: Options,
    pub(crate) host_hooks: &'static dyn HostHooks,
    pub(crate) execution_context_stack: Vec<ExecutionContext>,
}

impl Agent {
    pub fn new(options: Options, host_hooks: &'static dyn HostHooks) -> Self {
        Self {
            heap: Heap::new(),
            options,
            host_hooks,
            execution_context_stack: Vec::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn host_hooks(&self) -> &'static dyn HostHooks {
        self.host_hooks
    }

    /// Creates a new realm with its own `%Promise%` and
    /// `%Promise.prototype%`.
    pub fn create_realm(&mut self) -> Realm {
        create_realm(self)
    }

    /// The realm of the running execution context.
    ///
    /// Panics if no realm has been entered.
    pub fn current_realm(&self) -> Realm {
        self.execution_context_stack
            .last()
            .expect("No running execution context")
            .realm
    }

    pub(crate) fn running_realm(&self) -> Option<Realm> {
        self.execution_context_stack
            .last()
            .map(|context| context.realm)
    }

    /// Runs `f` with `realm` as the current realm.
    pub fn run_in_realm<F, R>(&mut self, realm: Realm, f: F) -> R
    where
        F: FnOnce(&mut Agent) -> R,
    {
        self.execution_context_stack.push(ExecutionContext {
            realm,
            function: None,
        });
        let result = f(self);
        self.execution_context_stack.pop();
        result
    }

    /// Collects garbage unless disabled by [`Options::disable_gc`].
    ///
    /// Handles held outside of the heap, other than [`Global`] roots, are
    /// invalidated.
    ///
    /// [`Global`]: crate::engine::Global
    pub fn gc(&mut self) {
        if self.options.disable_gc {
            return;
        }
        assert!(
            self.execution_context_stack
                .iter()
                .all(|context| context.function.is_none()),
            "Cannot collect garbage while a function is running"
        );
        heap_gc(self);
    }

    /// Number of live entries in each heap arena.
    pub fn heap_counts(&self) -> HeapCounts {
        self.heap.counts()
    }

    /// Bytes allocated on the heap since the last garbage collection.
    pub fn allocated_since_gc(&self) -> usize {
        self.heap.allocated_since_gc()
    }

    pub(crate) fn create_exception(&mut self, kind: ExceptionType, message: &str) -> Value {
        let message = String::from_str(self, message);
        let error = self.heap.create(ErrorHeapData::new(kind, Some(message)));
        Value::Error(error)
    }

    /// ### [5.2.3.2 Throw an Exception](https://tc39.es/ecma262/#sec-throw-an-exception)
    pub fn throw_exception(&mut self, kind: ExceptionType, message: &str) -> JsError {
        JsError(self.create_exception(kind, message))
    }

    /// Returns the realm whose `%Promise%` is `constructor`.
    pub(crate) fn realm_of_promise_constructor(&self, constructor: Value) -> Option<Realm> {
        let Value::BuiltinFunction(function) = constructor else {
            return None;
        };
        let realm = self[function].realm;
        (realm.intrinsics(self).promise() == function).then_some(realm)
    }

    /// Pushes the execution context of a called function.
    pub(crate) fn enter_function(&mut self, realm: Realm, function: Function) -> JsResult<()> {
        if self.execution_context_stack.len() >= self.options.call_stack_limit {
            return Err(
                self.throw_exception(ExceptionType::RangeError, "Maximum call stack size exceeded")
            );
        }
        self.execution_context_stack.push(ExecutionContext {
            realm,
            function: Some(function),
        });
        Ok(())
    }

    pub(crate) fn leave_function(&mut self) {
        let context = self.execution_context_stack.pop();
        debug_assert!(context.is_some_and(|context| context.function.is_some()));
    }

    pub(crate) fn enqueue_promise_job(&self, job: Job) {
        log::trace!("Enqueueing {} job", job.inner.kind());
        self.host_hooks.enqueue_promise_job(job);
    }

    pub(crate) fn promise_rejection_tracker(
        &self,
        promise: Promise,
        operation: PromiseRejectionTrackerOperation,
    ) {
        log::debug!("Promise rejection tracker: {promise:?} {operation:?}");
        self.host_hooks.promise_rejection_tracker(promise, operation);
    }
}
