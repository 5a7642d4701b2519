// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt::Debug;
use std::{
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem::size_of,
    num::NonZeroU32,
};

use crate::ecmascript::{
    builtins::{
        builtin_function::BuiltinFunctionHeapData,
        error::ErrorHeapData,
        promise::data::PromiseHeapData,
        promise_objects::promise_abstract_operations::{
            promise_reaction_records::PromiseReactionRecord,
            promise_resolving_functions::PromiseResolvingFunctionsHeapData,
        },
    },
    execution::RealmHeapData,
    types::{ObjectHeapData, StringHeapData},
};

/// A struct containing a non-zero index into an array or
/// vector of `T`s. Due to the non-zero value, the offset
/// in the vector is offset by one.
///
/// This index implies a tracing reference count from this
/// struct to T at the given index.
pub struct BaseIndex<T: ?Sized>(NonZeroU32, PhantomData<T>);

const _INDEX_SIZE_IS_U32: () = assert!(size_of::<BaseIndex<()>>() == size_of::<u32>());
const _OPTION_INDEX_SIZE_IS_U32: () =
    assert!(size_of::<Option<BaseIndex<()>>>() == size_of::<u32>());

impl<T: ?Sized> Debug for BaseIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        assert!(self.0.get() != 0);
        (&self.0.get() - 1).fmt(f)
    }
}

impl<T: ?Sized> Clone for BaseIndex<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for BaseIndex<T> {}

impl<T: ?Sized> PartialEq for BaseIndex<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: ?Sized> Eq for BaseIndex<T> {}

impl<T: ?Sized> PartialOrd for BaseIndex<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ?Sized> Ord for BaseIndex<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T: ?Sized> Hash for BaseIndex<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T: ?Sized> BaseIndex<T> {
    pub const fn into_index(self) -> usize {
        self.0.get() as usize - 1
    }

    pub const fn from_index(value: usize) -> Self {
        let value = value as u32;
        assert!(value != u32::MAX);
        // SAFETY: Number is not max value and will not overflow to zero.
        // This check is done manually to allow const context.
        Self(unsafe { NonZeroU32::new_unchecked(value + 1) }, PhantomData)
    }

    pub const fn from_u32_index(value: u32) -> Self {
        assert!(value != u32::MAX);
        // SAFETY: Number is not max value and will not overflow to zero.
        // This check is done manually to allow const context.
        Self(unsafe { NonZeroU32::new_unchecked(value + 1) }, PhantomData)
    }

    pub fn last(vec: &[Option<T>]) -> Self
    where
        T: Sized,
    {
        assert!(!vec.is_empty());
        Self::from_index(vec.len() - 1)
    }
}

pub type BuiltinFunctionIndex = BaseIndex<BuiltinFunctionHeapData>;
pub type ErrorIndex = BaseIndex<ErrorHeapData>;
pub type ObjectIndex = BaseIndex<ObjectHeapData>;
pub type PromiseIndex = BaseIndex<PromiseHeapData>;
pub type PromiseReactionIndex = BaseIndex<PromiseReactionRecord>;
pub type PromiseResolvingFunctionsIndex = BaseIndex<PromiseResolvingFunctionsHeapData>;
pub type RealmIndex = BaseIndex<RealmHeapData>;
pub type StringIndex = BaseIndex<StringHeapData>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_offset_by_one() {
        let index = BaseIndex::<()>::from_index(0);
        assert_eq!(index.into_index(), 0);
        assert_eq!(format!("{index:?}"), "0");
    }

    #[test]
    fn last_points_at_final_slot() {
        let vec: Vec<Option<u8>> = vec![Some(1), None, Some(3)];
        assert_eq!(BaseIndex::last(&vec).into_index(), 2);
    }
}
