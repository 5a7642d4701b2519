// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{cell::RefCell, collections::VecDeque, fmt::Debug};

use ahash::AHashSet;
use promise_vm::ecmascript::{
    builtins::promise::Promise,
    execution::{Agent, HostHooks, Job, JsResult, PromiseRejectionTrackerOperation},
};

#[derive(Default)]
pub(crate) struct CliHostHooks {
    promise_job_queue: RefCell<VecDeque<Job>>,
    /// Rejected promises without handlers. The handles are only valid until
    /// the next garbage collection.
    unhandled_rejections: RefCell<AHashSet<Promise>>,
}

// RefCell doesn't implement Debug
impl Debug for CliHostHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliHostHooks")
            .field("queued_jobs", &self.promise_job_queue.borrow().len())
            .finish()
    }
}

impl CliHostHooks {
    fn pop_promise_job(&self) -> Option<Job> {
        self.promise_job_queue.borrow_mut().pop_front()
    }

    /// Runs jobs until the queue is empty. Returns the number of jobs run,
    /// or the error of the first job that threw.
    pub(crate) fn run_jobs(&self, agent: &mut Agent) -> JsResult<usize> {
        let mut count = 0;
        while let Some(job) = self.pop_promise_job() {
            job.run(agent)?;
            count += 1;
        }
        log::debug!("Ran {count} jobs");
        Ok(count)
    }

    /// Renders the reasons of the rejections nobody handled, oldest
    /// promise first.
    pub(crate) fn take_unhandled_rejections(&self, agent: &Agent) -> Vec<String> {
        let mut unhandled: Vec<Promise> = self.unhandled_rejections.take().into_iter().collect();
        unhandled.sort();
        unhandled
            .into_iter()
            .map(|promise| {
                promise
                    .result(agent)
                    .map(|reason| reason.string_repr(agent))
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl HostHooks for CliHostHooks {
    fn enqueue_promise_job(&self, job: Job) {
        self.promise_job_queue.borrow_mut().push_back(job);
    }

    fn promise_rejection_tracker(
        &self,
        promise: Promise,
        operation: PromiseRejectionTrackerOperation,
    ) {
        let mut unhandled = self.unhandled_rejections.borrow_mut();
        match operation {
            PromiseRejectionTrackerOperation::Reject => {
                unhandled.insert(promise);
            }
            PromiseRejectionTrackerOperation::Handle => {
                unhandled.remove(&promise);
            }
        }
    }
}
