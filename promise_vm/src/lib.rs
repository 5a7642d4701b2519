// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Promise objects for an ECMAScript engine: the promise state machine,
//! resolving functions, thenable adoption, reaction jobs and the host job
//! queue, all stored in a compacting mark and sweep heap.

pub mod ecmascript;
pub mod engine;
pub mod heap;

pub use heap::{Heap, HeapCounts};
