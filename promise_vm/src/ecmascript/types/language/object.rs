// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Index, IndexMut};

use ahash::AHashMap;

use super::{Function, Value};
use crate::{
    ecmascript::{
        builtins::{
            builtin_function::BuiltinFunction, error::Error, promise::Promise,
            promise_objects::promise_abstract_operations::promise_resolving_functions::BuiltinPromiseResolvingFunction,
        },
        execution::Agent,
    },
    heap::{
        CompactionLists, CreateHeapData, Heap, HeapMarkAndSweep, WorkQueues, indexes::ObjectIndex,
    },
};

/// Key of an own property. Keys are plain host strings: they are never
/// handed back to script code and so never need to be heap values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyKey(Box<str>);

impl PropertyKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PropertyKey {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

/// An own property: either a plain data value or an accessor whose getter
/// is called with the receiver of the lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Property {
    Data(Value),
    Getter(Function),
}

#[derive(Debug, Clone, Default)]
pub struct ObjectHeapData {
    pub(crate) prototype: Option<Object>,
    pub(crate) properties: AHashMap<PropertyKey, Property>,
}

/// ### [10.1 Ordinary Object Internal Methods and Internal Slots](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct OrdinaryObject(pub(crate) ObjectIndex);

impl OrdinaryObject {
    pub(crate) const fn get_index(self) -> usize {
        self.0.into_index()
    }

    /// ### [10.1.12 OrdinaryObjectCreate ( proto )](https://tc39.es/ecma262/#sec-ordinaryobjectcreate)
    pub fn create(agent: &mut Agent, prototype: Option<Object>) -> Self {
        agent.heap.create(ObjectHeapData {
            prototype,
            properties: AHashMap::default(),
        })
    }

    /// Defines or overwrites a data property.
    pub fn set(self, agent: &mut Agent, key: &str, value: Value) {
        agent[self]
            .properties
            .insert(key.into(), Property::Data(value));
    }

    /// Defines or overwrites an accessor property with only a getter.
    pub fn define_getter(self, agent: &mut Agent, key: &str, getter: Function) {
        agent[self]
            .properties
            .insert(key.into(), Property::Getter(getter));
    }

    pub fn prototype(self, agent: &Agent) -> Option<Object> {
        agent[self].prototype
    }
}

/// The object subset of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Object {
    Object(OrdinaryObject),
    Error(Error),
    Promise(Promise),
    BuiltinFunction(BuiltinFunction),
    BuiltinPromiseResolvingFunction(BuiltinPromiseResolvingFunction),
}

impl Object {
    pub fn into_value(self) -> Value {
        self.into()
    }

    /// Object holding the own properties of `self`, if any exist yet.
    fn backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        match self {
            Object::Object(object) => Some(object),
            Object::Promise(promise) => agent[promise].object_index,
            Object::BuiltinFunction(function) => agent[function].object_index,
            Object::Error(_) | Object::BuiltinPromiseResolvingFunction(_) => None,
        }
    }

    pub fn get_own_property(self, agent: &Agent, key: &PropertyKey) -> Option<Property> {
        let backing_object = self.backing_object(agent)?;
        agent[backing_object].properties.get(key).copied()
    }

    /// ### [\[\[GetPrototypeOf\]\] ( )](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-getprototypeof)
    pub fn internal_prototype(self, agent: &Agent) -> Option<Object> {
        match self {
            Object::Object(object) => agent[object].prototype,
            Object::Promise(promise) => match agent[promise].object_index {
                Some(backing_object) => agent[backing_object].prototype,
                None => Some(Object::Object(
                    agent[promise].realm.intrinsics(agent).promise_prototype(),
                )),
            },
            Object::BuiltinFunction(function) => agent[function]
                .object_index
                .and_then(|backing_object| agent[backing_object].prototype),
            Object::Error(_) | Object::BuiltinPromiseResolvingFunction(_) => None,
        }
    }

    /// Defines an own property, creating the backing object of exotic
    /// objects on first use. Returns false if the object cannot hold own
    /// properties.
    pub fn define_own_property(self, agent: &mut Agent, key: &str, property: Property) -> bool {
        let backing_object = match self {
            Object::Object(object) => object,
            Object::Promise(promise) => match agent[promise].object_index {
                Some(backing_object) => backing_object,
                None => {
                    let prototype = agent[promise].realm.intrinsics(agent).promise_prototype();
                    let backing_object =
                        OrdinaryObject::create(agent, Some(Object::Object(prototype)));
                    agent[promise].object_index = Some(backing_object);
                    backing_object
                }
            },
            Object::BuiltinFunction(function) => match agent[function].object_index {
                Some(backing_object) => backing_object,
                None => {
                    let backing_object = OrdinaryObject::create(agent, None);
                    agent[function].object_index = Some(backing_object);
                    backing_object
                }
            },
            Object::Error(_) | Object::BuiltinPromiseResolvingFunction(_) => return false,
        };
        agent[backing_object]
            .properties
            .insert(key.into(), property);
        true
    }
}

impl From<OrdinaryObject> for Object {
    fn from(value: OrdinaryObject) -> Self {
        Object::Object(value)
    }
}

impl From<OrdinaryObject> for Value {
    fn from(value: OrdinaryObject) -> Self {
        Value::Object(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        match value {
            Object::Object(data) => Value::Object(data),
            Object::Error(data) => Value::Error(data),
            Object::Promise(data) => Value::Promise(data),
            Object::BuiltinFunction(data) => Value::BuiltinFunction(data),
            Object::BuiltinPromiseResolvingFunction(data) => {
                Value::BuiltinPromiseResolvingFunction(data)
            }
        }
    }
}

impl TryFrom<Value> for Object {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, ()> {
        match value {
            Value::Undefined
            | Value::Null
            | Value::Boolean(_)
            | Value::Number(_)
            | Value::String(_) => Err(()),
            Value::Object(data) => Ok(Object::Object(data)),
            Value::Error(data) => Ok(Object::Error(data)),
            Value::Promise(data) => Ok(Object::Promise(data)),
            Value::BuiltinFunction(data) => Ok(Object::BuiltinFunction(data)),
            Value::BuiltinPromiseResolvingFunction(data) => {
                Ok(Object::BuiltinPromiseResolvingFunction(data))
            }
        }
    }
}

impl TryFrom<Value> for OrdinaryObject {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, ()> {
        match value {
            Value::Object(data) => Ok(data),
            _ => Err(()),
        }
    }
}

impl Index<OrdinaryObject> for Agent {
    type Output = ObjectHeapData;

    fn index(&self, index: OrdinaryObject) -> &Self::Output {
        self.heap
            .objects
            .get(index.get_index())
            .expect("Object out of bounds")
            .as_ref()
            .expect("Object slot empty")
    }
}

impl IndexMut<OrdinaryObject> for Agent {
    fn index_mut(&mut self, index: OrdinaryObject) -> &mut Self::Output {
        self.heap
            .objects
            .get_mut(index.get_index())
            .expect("Object out of bounds")
            .as_mut()
            .expect("Object slot empty")
    }
}

impl CreateHeapData<ObjectHeapData, OrdinaryObject> for Heap {
    fn create(&mut self, data: ObjectHeapData) -> OrdinaryObject {
        self.objects.push(Some(data));
        self.alloc_counter += core::mem::size_of::<Option<ObjectHeapData>>();
        OrdinaryObject(ObjectIndex::last(&self.objects))
    }
}

impl HeapMarkAndSweep for OrdinaryObject {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.objects.push(self.0);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        compactions.objects.shift_index(&mut self.0);
    }
}

impl HeapMarkAndSweep for Object {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.push_value((*self).into());
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        match self {
            Object::Object(data) => data.sweep_values(compactions),
            Object::Error(data) => data.sweep_values(compactions),
            Object::Promise(data) => data.sweep_values(compactions),
            Object::BuiltinFunction(data) => data.sweep_values(compactions),
            Object::BuiltinPromiseResolvingFunction(data) => data.sweep_values(compactions),
        }
    }
}

impl HeapMarkAndSweep for Property {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            Property::Data(value) => value.mark_values(queues),
            Property::Getter(getter) => getter.mark_values(queues),
        }
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        match self {
            Property::Data(value) => value.sweep_values(compactions),
            Property::Getter(getter) => getter.sweep_values(compactions),
        }
    }
}

impl HeapMarkAndSweep for ObjectHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        let Self {
            prototype,
            properties,
        } = self;
        prototype.mark_values(queues);
        properties
            .values()
            .for_each(|property| property.mark_values(queues));
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        let Self {
            prototype,
            properties,
        } = self;
        prototype.sweep_values(compactions);
        properties
            .values_mut()
            .for_each(|property| property.sweep_values(compactions));
    }
}
