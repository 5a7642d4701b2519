// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{cell::RefCell, collections::VecDeque};

use super::{
    Agent, JsResult,
    agent::{HostHooks, Job},
};

/// Host hooks with a plain FIFO promise job queue and no rejection
/// tracking.
#[derive(Debug, Default)]
pub struct DefaultHostHooks {
    promise_job_queue: RefCell<VecDeque<Job>>,
}

impl DefaultHostHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop_promise_job(&self) -> Option<Job> {
        self.promise_job_queue.borrow_mut().pop_front()
    }

    pub fn pending_jobs(&self) -> usize {
        self.promise_job_queue.borrow().len()
    }
}

impl HostHooks for DefaultHostHooks {
    fn enqueue_promise_job(&self, job: Job) {
        self.promise_job_queue.borrow_mut().push_back(job);
    }
}

/// Runs queued promise jobs, including the ones they enqueue, until the
/// queue is empty or a job returns an error. Jobs after a failing one stay
/// queued.
pub fn run_microtask_queue(agent: &mut Agent, host_hooks: &DefaultHostHooks) -> JsResult<()> {
    while let Some(job) = host_hooks.pop_promise_job() {
        job.run(agent)?;
    }
    Ok(())
}
