// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::{
        execution::{Agent, ExceptionType},
        types::{Object, String, Value},
    },
    heap::{
        CompactionLists, CreateHeapData, Heap, HeapMarkAndSweep, WorkQueues, indexes::ErrorIndex,
    },
};

#[derive(Debug, Clone)]
pub struct ErrorHeapData {
    pub(crate) kind: ExceptionType,
    pub(crate) message: Option<String>,
}

impl ErrorHeapData {
    pub(crate) fn new(kind: ExceptionType, message: Option<String>) -> Self {
        Self { kind, message }
    }
}

/// ### [20.5 Error Objects](https://tc39.es/ecma262/#sec-error-objects)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Error(pub(crate) ErrorIndex);

impl Error {
    pub(crate) const fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub fn kind(self, agent: &Agent) -> ExceptionType {
        agent[self].kind
    }

    pub fn message(self, agent: &Agent) -> Option<String> {
        agent[self].message
    }

    /// Renders the error the way `Error.prototype.toString` would.
    pub fn string_repr(self, agent: &Agent) -> std::string::String {
        let name = agent[self].kind.name();
        match agent[self].message {
            Some(message) if !message.is_empty(agent) => {
                format!("{}: {}", name, message.to_string_lossy(agent))
            }
            _ => name.to_string(),
        }
    }
}

impl From<Error> for Value {
    fn from(value: Error) -> Self {
        Value::Error(value)
    }
}

impl From<Error> for Object {
    fn from(value: Error) -> Self {
        Object::Error(value)
    }
}

impl TryFrom<Value> for Error {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, ()> {
        match value {
            Value::Error(idx) => Ok(idx),
            _ => Err(()),
        }
    }
}

impl Index<Error> for Agent {
    type Output = ErrorHeapData;

    fn index(&self, index: Error) -> &Self::Output {
        self.heap
            .errors
            .get(index.get_index())
            .expect("Error out of bounds")
            .as_ref()
            .expect("Error slot empty")
    }
}

impl IndexMut<Error> for Agent {
    fn index_mut(&mut self, index: Error) -> &mut Self::Output {
        self.heap
            .errors
            .get_mut(index.get_index())
            .expect("Error out of bounds")
            .as_mut()
            .expect("Error slot empty")
    }
}

impl CreateHeapData<ErrorHeapData, Error> for Heap {
    fn create(&mut self, data: ErrorHeapData) -> Error {
        self.errors.push(Some(data));
        self.alloc_counter += core::mem::size_of::<Option<ErrorHeapData>>();
        Error(ErrorIndex::last(&self.errors))
    }
}

impl HeapMarkAndSweep for Error {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.errors.push(self.0);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        compactions.errors.shift_index(&mut self.0);
    }
}

impl HeapMarkAndSweep for ErrorHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.message.mark_values(queues);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        self.message.sweep_values(compactions);
    }
}
