// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::Realm;
use crate::{
    ecmascript::types::Function,
    heap::{CompactionLists, HeapMarkAndSweep, WorkQueues},
};

/// ### [9.4 Execution Contexts](https://tc39.es/ecma262/#sec-execution-contexts)
///
/// Only the components the promise machinery observes are kept: the realm
/// that new promises and errors are created in, and the running function.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExecutionContext {
    /// ### Realm
    pub realm: Realm,

    /// ### Function
    ///
    /// None when the host entered the realm directly or a job is running
    /// without a handler function.
    pub function: Option<Function>,
}

impl HeapMarkAndSweep for ExecutionContext {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.realm.mark_values(queues);
        self.function.mark_values(queues);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        self.realm.sweep_values(compactions);
        self.function.sweep_values(compactions);
    }
}
