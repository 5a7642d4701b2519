// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod agent;
mod default_host_hooks;
mod execution_context;
mod realm;

pub use agent::{
    Agent, ExceptionType, HostHooks, Job, JsError, JsResult, Options,
    PromiseRejectionTrackerOperation,
};
pub(crate) use agent::InnerJob;
pub use default_host_hooks::{DefaultHostHooks, run_microtask_queue};
pub(crate) use execution_context::ExecutionContext;
pub use realm::{Intrinsics, Realm, RealmHeapData};
