// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{
    borrow::Cow,
    ops::{Index, IndexMut},
};

use wtf8::Wtf8Buf;

use super::Value;
use crate::{
    ecmascript::execution::Agent,
    heap::{
        CompactionLists, CreateHeapData, Heap, HeapMarkAndSweep, WorkQueues, indexes::StringIndex,
    },
};

#[derive(Debug, Clone)]
pub struct StringHeapData {
    pub(crate) data: Wtf8Buf,
}

impl StringHeapData {
    pub(crate) fn from_str(str: &str) -> Self {
        Self {
            data: Wtf8Buf::from_str(str),
        }
    }
}

/// ### [6.1.4 The String Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-string-type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct String(pub(crate) StringIndex);

impl String {
    pub(crate) const fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub fn from_str(agent: &mut Agent, str: &str) -> Self {
        agent.heap.create(StringHeapData::from_str(str))
    }

    /// Returns the string's contents if they are valid UTF-8.
    pub fn as_str(self, agent: &Agent) -> Option<&str> {
        agent[self].data.as_str()
    }

    pub fn to_string_lossy(self, agent: &Agent) -> Cow<'_, str> {
        agent[self].data.to_string_lossy()
    }

    pub fn len(self, agent: &Agent) -> usize {
        agent[self].data.len()
    }

    pub fn is_empty(self, agent: &Agent) -> bool {
        agent[self].data.len() == 0
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl TryFrom<Value> for String {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(data) => Ok(data),
            _ => Err(()),
        }
    }
}

impl Index<String> for Agent {
    type Output = StringHeapData;

    fn index(&self, index: String) -> &Self::Output {
        self.heap
            .strings
            .get(index.get_index())
            .expect("String out of bounds")
            .as_ref()
            .expect("String slot empty")
    }
}

impl IndexMut<String> for Agent {
    fn index_mut(&mut self, index: String) -> &mut Self::Output {
        self.heap
            .strings
            .get_mut(index.get_index())
            .expect("String out of bounds")
            .as_mut()
            .expect("String slot empty")
    }
}

impl CreateHeapData<StringHeapData, String> for Heap {
    fn create(&mut self, data: StringHeapData) -> String {
        self.alloc_counter += core::mem::size_of::<Option<StringHeapData>>() + data.data.len();
        self.strings.push(Some(data));
        String(StringIndex::last(&self.strings))
    }
}

impl HeapMarkAndSweep for String {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.strings.push(self.0);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        compactions.strings.shift_index(&mut self.0);
    }
}

impl HeapMarkAndSweep for StringHeapData {
    fn mark_values(&self, _queues: &mut WorkQueues) {}

    fn sweep_values(&mut self, _compactions: &CompactionLists) {}
}
