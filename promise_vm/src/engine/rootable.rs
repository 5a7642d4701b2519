// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::marker::PhantomData;

use crate::{
    ecmascript::{
        builtins::{
            promise::Promise,
            promise_objects::promise_abstract_operations::promise_reaction_records::PromiseReaction,
        },
        execution::Agent,
        types::{Function, Object, Value},
    },
    heap::{CompactionLists, HeapMarkAndSweep, WorkQueues},
};

pub mod private {
    use super::HeapRootData;

    /// Marker trait to make Rootable not implementable outside of promise_vm.
    pub trait RootableSealed: Copy {
        /// Convert a rootable value to a root representation.
        fn to_root_repr(self) -> HeapRootData;

        /// Convert a root representation back to the rooted type.
        ///
        /// ## Panics
        ///
        /// If the root data does not match the type.
        fn from_root_repr(value: &HeapRootData) -> Self;
    }
}

/// A heap handle that can be held in a [`Global`] root.
pub trait Rootable: private::RootableSealed {}

impl<T: private::RootableSealed> Rootable for T {}

/// Data stored in a root slot of the heap.
#[doc(hidden)]
#[derive(Debug, Clone, Copy)]
pub enum HeapRootData {
    Value(Value),
    PromiseReaction(PromiseReaction),
}

impl private::RootableSealed for Value {
    fn to_root_repr(self) -> HeapRootData {
        HeapRootData::Value(self)
    }

    fn from_root_repr(value: &HeapRootData) -> Self {
        match value {
            HeapRootData::Value(value) => *value,
            _ => unreachable!("Root is not a Value"),
        }
    }
}

impl private::RootableSealed for Object {
    fn to_root_repr(self) -> HeapRootData {
        HeapRootData::Value(self.into_value())
    }

    fn from_root_repr(value: &HeapRootData) -> Self {
        match value {
            HeapRootData::Value(value) => match Object::try_from(*value) {
                Ok(object) => object,
                Err(_) => unreachable!("Root is not an Object"),
            },
            _ => unreachable!("Root is not an Object"),
        }
    }
}

impl private::RootableSealed for Function {
    fn to_root_repr(self) -> HeapRootData {
        HeapRootData::Value(self.into_value())
    }

    fn from_root_repr(value: &HeapRootData) -> Self {
        match value {
            HeapRootData::Value(value) => match Function::try_from(*value) {
                Ok(function) => function,
                Err(_) => unreachable!("Root is not a Function"),
            },
            _ => unreachable!("Root is not a Function"),
        }
    }
}

impl private::RootableSealed for Promise {
    fn to_root_repr(self) -> HeapRootData {
        HeapRootData::Value(self.into_value())
    }

    fn from_root_repr(value: &HeapRootData) -> Self {
        match value {
            HeapRootData::Value(Value::Promise(promise)) => *promise,
            _ => unreachable!("Root is not a Promise"),
        }
    }
}

impl private::RootableSealed for PromiseReaction {
    fn to_root_repr(self) -> HeapRootData {
        HeapRootData::PromiseReaction(self)
    }

    fn from_root_repr(value: &HeapRootData) -> Self {
        match value {
            HeapRootData::PromiseReaction(reaction) => *reaction,
            _ => unreachable!("Root is not a PromiseReaction"),
        }
    }
}

impl HeapMarkAndSweep for HeapRootData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            HeapRootData::Value(value) => value.mark_values(queues),
            HeapRootData::PromiseReaction(reaction) => reaction.mark_values(queues),
        }
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        match self {
            HeapRootData::Value(value) => value.sweep_values(compactions),
            HeapRootData::PromiseReaction(reaction) => reaction.sweep_values(compactions),
        }
    }
}

/// A root that keeps a heap value alive, and its handle valid, across
/// garbage collections until it is taken.
///
/// A `Global` that is dropped without being taken keeps its value alive
/// for the lifetime of the agent.
#[derive(Debug)]
#[repr(transparent)]
pub struct Global<T: Rootable>(u32, PhantomData<T>);

impl<T: Rootable> Global<T> {
    /// Roots `value` in the first free global slot.
    #[must_use]
    pub fn new(agent: &mut Agent, value: T) -> Self {
        let root = Some(value.to_root_repr());
        let globals = &mut agent.heap.globals;
        let index = match globals.iter().position(Option::is_none) {
            Some(index) => {
                globals[index] = root;
                index
            }
            None => {
                globals.push(root);
                globals.len() - 1
            }
        };
        Self(u32::try_from(index).expect("Globals overflowed"), PhantomData)
    }

    /// Reads the rooted value without releasing the root.
    pub fn get(&self, agent: &Agent) -> T {
        let root = agent
            .heap
            .globals
            .get(self.0 as usize)
            .and_then(Option::as_ref)
            .expect("Global slot empty");
        T::from_root_repr(root)
    }

    /// Releases the root and returns the value.
    pub fn take(self, agent: &mut Agent) -> T {
        let root = agent
            .heap
            .globals
            .get_mut(self.0 as usize)
            .and_then(Option::take)
            .expect("Global slot empty");
        T::from_root_repr(&root)
    }
}
