// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [27.2.1 Promise Abstract Operations](https://tc39.es/ecma262/#sec-promise-abstract-operations)

pub mod promise_capability_records;
pub(crate) mod promise_jobs;
pub mod promise_reaction_records;
pub mod promise_resolving_functions;
