// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::Index;

use super::Agent;
use crate::{
    ecmascript::{
        builtins::{
            BuiltinFunction,
            promise_objects::{
                promise_constructor::PromiseConstructor, promise_prototype::PromisePrototype,
            },
        },
        types::OrdinaryObject,
    },
    heap::{CompactionLists, HeapMarkAndSweep, WorkQueues, indexes::RealmIndex},
};

/// ### [9.3 Realms](https://tc39.es/ecma262/#sec-code-realms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Realm(pub(crate) RealmIndex);

impl Realm {
    pub(crate) const fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub fn intrinsics(self, agent: &Agent) -> &Intrinsics {
        &agent[self].intrinsics
    }
}

/// ### [9.3.1 Realm Records](https://tc39.es/ecma262/#sec-realm-records)
#[derive(Debug, Clone)]
pub struct RealmHeapData {
    /// ### \[\[Intrinsics\]\]
    pub(crate) intrinsics: Intrinsics,
}

/// The intrinsic objects of a realm that the promise machinery refers to.
#[derive(Debug, Clone)]
pub struct Intrinsics {
    promise: BuiltinFunction,
    promise_prototype: OrdinaryObject,
}

impl Intrinsics {
    /// %Promise%
    pub fn promise(&self) -> BuiltinFunction {
        self.promise
    }

    /// %Promise.prototype%
    pub fn promise_prototype(&self) -> OrdinaryObject {
        self.promise_prototype
    }
}

/// ### [9.3.1 CreateRealm ( )](https://tc39.es/ecma262/#sec-createrealm)
pub(crate) fn create_realm(agent: &mut Agent) -> Realm {
    // The realm's slot is reserved first so that its intrinsics can refer
    // back to it.
    agent.heap.realms.push(None);
    let realm = Realm(RealmIndex::last(&agent.heap.realms));
    let promise = PromiseConstructor::create_intrinsic(agent, realm);
    let promise_prototype = PromisePrototype::create_intrinsic(agent, realm, promise);
    agent.heap.realms[realm.get_index()] = Some(RealmHeapData {
        intrinsics: Intrinsics {
            promise,
            promise_prototype,
        },
    });
    log::debug!("Created {realm:?}");
    realm
}

impl Index<Realm> for Agent {
    type Output = RealmHeapData;

    fn index(&self, index: Realm) -> &Self::Output {
        self.heap
            .realms
            .get(index.get_index())
            .expect("Realm out of bounds")
            .as_ref()
            .expect("Realm slot empty")
    }
}

impl HeapMarkAndSweep for Realm {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.realms.push(self.0);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        compactions.realms.shift_index(&mut self.0);
    }
}

impl HeapMarkAndSweep for RealmHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        let Intrinsics {
            promise,
            promise_prototype,
        } = &self.intrinsics;
        promise.mark_values(queues);
        promise_prototype.mark_values(queues);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        let Intrinsics {
            promise,
            promise_prototype,
        } = &mut self.intrinsics;
        promise.sweep_values(compactions);
        promise_prototype.sweep_values(compactions);
    }
}
