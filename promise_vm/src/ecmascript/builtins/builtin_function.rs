// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Deref, Index, IndexMut};

use crate::{
    ecmascript::{
        execution::{Agent, ExceptionType, JsResult, Realm},
        types::{Function, Object, OrdinaryObject, Value},
    },
    heap::{
        CompactionLists, CreateHeapData, Heap, HeapMarkAndSweep, WorkQueues,
        indexes::BuiltinFunctionIndex,
    },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentsList<'a>(pub(crate) &'a [Value]);

impl<'a> ArgumentsList<'a> {
    pub fn new(arguments: &'a [Value]) -> Self {
        Self(arguments)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Value {
        *self.0.get(index).unwrap_or(&Value::Undefined)
    }
}

impl<'a> Deref for ArgumentsList<'a> {
    type Target = &'a [Value];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub type RegularFn = fn(&mut Agent, Value, ArgumentsList<'_>) -> JsResult<Value>;
/// Native behaviour with access to the values captured at creation time.
pub type ClosureFn = fn(&mut Agent, Value, ArgumentsList<'_>, &[Value]) -> JsResult<Value>;
pub type ConstructorFn =
    fn(&mut Agent, Value, ArgumentsList<'_>, Option<Object>) -> JsResult<Value>;

#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    Regular(RegularFn),
    Closure(ClosureFn),
    Constructor(ConstructorFn),
}

impl Behaviour {
    pub(crate) fn is_constructor(&self) -> bool {
        matches!(self, Behaviour::Constructor(_))
    }
}

#[derive(Debug, Default)]
pub struct BuiltinFunctionArgs {
    pub length: u32,
    pub name: &'static str,
    pub realm: Option<Realm>,
    pub captures: Vec<Value>,
}

impl BuiltinFunctionArgs {
    pub fn new(length: u32, name: &'static str) -> Self {
        Self {
            length,
            name,
            ..Default::default()
        }
    }

    pub fn in_realm(mut self, realm: Realm) -> Self {
        self.realm = Some(realm);
        self
    }

    pub fn with_captures(mut self, captures: Vec<Value>) -> Self {
        self.captures = captures;
        self
    }
}

#[derive(Debug, Clone)]
pub struct BuiltinFunctionHeapData {
    pub(crate) behaviour: Behaviour,
    pub(crate) length: u8,
    pub(crate) name: &'static str,
    pub(crate) realm: Realm,
    /// Holds own properties once any are defined.
    pub(crate) object_index: Option<OrdinaryObject>,
    pub(crate) captures: Box<[Value]>,
}

/// ### [10.3 Built-in Function Objects](https://tc39.es/ecma262/#sec-built-in-function-objects)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct BuiltinFunction(pub(crate) BuiltinFunctionIndex);

impl BuiltinFunction {
    pub(crate) const fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub fn is_constructor(self, agent: &Agent) -> bool {
        agent[self].behaviour.is_constructor()
    }

    pub fn name(self, agent: &Agent) -> &'static str {
        agent[self].name
    }

    pub fn length(self, agent: &Agent) -> u8 {
        agent[self].length
    }

    /// ### [10.3.1 \[\[Call\]\] ( thisArgument, argumentsList )](https://tc39.es/ecma262/#sec-built-in-function-objects-call-thisargument-argumentslist)
    pub(crate) fn internal_call(
        self,
        agent: &mut Agent,
        this_argument: Value,
        arguments_list: ArgumentsList,
    ) -> JsResult<Value> {
        builtin_call_or_construct(agent, self, Some(this_argument), arguments_list, None)
    }

    /// ### [10.3.2 \[\[Construct\]\] ( argumentsList, newTarget )](https://tc39.es/ecma262/#sec-built-in-function-objects-construct-argumentslist-newtarget)
    pub(crate) fn internal_construct(
        self,
        agent: &mut Agent,
        arguments_list: ArgumentsList,
        new_target: Function,
    ) -> JsResult<Object> {
        let result =
            builtin_call_or_construct(agent, self, None, arguments_list, Some(new_target))?;
        Object::try_from(result).map_err(|_| {
            agent.throw_exception(
                ExceptionType::TypeError,
                "Constructor did not return an object",
            )
        })
    }
}

/// ### [10.3.3 BuiltinCallOrConstruct ( F, thisArgument, argumentsList, newTarget )](https://tc39.es/ecma262/#sec-builtincallorconstruct)
pub(crate) fn builtin_call_or_construct(
    agent: &mut Agent,
    f: BuiltinFunction,
    this_argument: Option<Value>,
    arguments_list: ArgumentsList,
    new_target: Option<Function>,
) -> JsResult<Value> {
    let heap_data = &agent[f];
    let behaviour = heap_data.behaviour;
    let callee_realm = heap_data.realm;
    agent.enter_function(callee_realm, f.into())?;
    let this_argument = this_argument.unwrap_or(Value::Undefined);
    let result = match behaviour {
        Behaviour::Regular(func) => {
            if new_target.is_some() {
                Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    "Not a constructor",
                ))
            } else {
                func(agent, this_argument, arguments_list)
            }
        }
        Behaviour::Closure(func) => {
            if new_target.is_some() {
                Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    "Not a constructor",
                ))
            } else {
                let captures = agent[f].captures.clone();
                func(agent, this_argument, arguments_list, &captures)
            }
        }
        Behaviour::Constructor(func) => func(
            agent,
            this_argument,
            arguments_list,
            new_target.map(Function::into_object),
        ),
    };
    agent.leave_function();
    result
}

/// ### [10.3.4 CreateBuiltinFunction ( behaviour, length, name, additionalInternalSlotsList \[ , realm \[ , prototype \[ , prefix \] \] \] )](https://tc39.es/ecma262/#sec-createbuiltinfunction)
pub fn create_builtin_function(
    agent: &mut Agent,
    behaviour: Behaviour,
    args: BuiltinFunctionArgs,
) -> BuiltinFunction {
    // 1. If realm is not present, set realm to the current Realm Record.
    let realm = args.realm.unwrap_or_else(|| agent.current_realm());
    agent.heap.create(BuiltinFunctionHeapData {
        behaviour,
        length: args.length as u8,
        name: args.name,
        realm,
        object_index: None,
        captures: args.captures.into_boxed_slice(),
    })
}

impl From<BuiltinFunctionIndex> for BuiltinFunction {
    fn from(value: BuiltinFunctionIndex) -> Self {
        Self(value)
    }
}

impl From<BuiltinFunction> for Value {
    fn from(value: BuiltinFunction) -> Self {
        Value::BuiltinFunction(value)
    }
}

impl From<BuiltinFunction> for Object {
    fn from(value: BuiltinFunction) -> Self {
        Object::BuiltinFunction(value)
    }
}

impl Index<BuiltinFunction> for Agent {
    type Output = BuiltinFunctionHeapData;

    fn index(&self, index: BuiltinFunction) -> &Self::Output {
        &self.heap.builtin_functions[index]
    }
}

impl IndexMut<BuiltinFunction> for Agent {
    fn index_mut(&mut self, index: BuiltinFunction) -> &mut Self::Output {
        &mut self.heap.builtin_functions[index]
    }
}

impl Index<BuiltinFunction> for Vec<Option<BuiltinFunctionHeapData>> {
    type Output = BuiltinFunctionHeapData;

    fn index(&self, index: BuiltinFunction) -> &Self::Output {
        self.get(index.get_index())
            .expect("BuiltinFunction out of bounds")
            .as_ref()
            .expect("BuiltinFunction slot empty")
    }
}

impl IndexMut<BuiltinFunction> for Vec<Option<BuiltinFunctionHeapData>> {
    fn index_mut(&mut self, index: BuiltinFunction) -> &mut Self::Output {
        self.get_mut(index.get_index())
            .expect("BuiltinFunction out of bounds")
            .as_mut()
            .expect("BuiltinFunction slot empty")
    }
}

impl CreateHeapData<BuiltinFunctionHeapData, BuiltinFunction> for Heap {
    fn create(&mut self, data: BuiltinFunctionHeapData) -> BuiltinFunction {
        self.builtin_functions.push(Some(data));
        self.alloc_counter += core::mem::size_of::<Option<BuiltinFunctionHeapData>>();
        BuiltinFunction(BuiltinFunctionIndex::last(&self.builtin_functions))
    }
}

impl HeapMarkAndSweep for BuiltinFunction {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.builtin_functions.push(self.0);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        compactions.builtin_functions.shift_index(&mut self.0);
    }
}

impl HeapMarkAndSweep for BuiltinFunctionHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        let Self {
            behaviour: _,
            length: _,
            name: _,
            realm,
            object_index,
            captures,
        } = self;
        realm.mark_values(queues);
        object_index.mark_values(queues);
        captures.mark_values(queues);
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        let Self {
            behaviour: _,
            length: _,
            name: _,
            realm,
            object_index,
            captures,
        } = self;
        realm.sweep_values(compactions);
        object_index.sweep_values(compactions);
        captures.sweep_values(compactions);
    }
}
