// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{
        builtins::promise_objects::promise_abstract_operations::promise_reaction_records::PromiseReaction,
        execution::Realm,
        types::{OrdinaryObject, Value},
    },
    heap::{CompactionLists, HeapMarkAndSweep, WorkQueues},
};

#[derive(Debug, Clone)]
pub struct PromiseHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    /// Realm whose `%Promise.prototype%` this promise inherits from.
    pub(crate) realm: Realm,
    pub(crate) promise_state: PromiseState,
    /// \[\[PromiseIsHandled\]\]
    pub(crate) is_handled: bool,
}

impl PromiseHeapData {
    pub(crate) fn new(realm: Realm) -> Self {
        Self {
            object_index: None,
            realm,
            promise_state: PromiseState::default(),
            is_handled: false,
        }
    }
}

/// \[\[PromiseState\]\] together with the slots that are only meaningful in
/// a given state.
#[derive(Debug, Clone)]
pub(crate) enum PromiseState {
    Pending {
        /// \[\[PromiseFulfillReactions\]\]
        fulfill_reactions: Option<PromiseReactions>,
        /// \[\[PromiseRejectReactions\]\]
        reject_reactions: Option<PromiseReactions>,
    },
    Fulfilled {
        /// \[\[PromiseResult\]\]
        promise_result: Value,
    },
    Rejected {
        /// \[\[PromiseResult\]\]
        promise_result: Value,
    },
}

impl Default for PromiseState {
    fn default() -> Self {
        Self::Pending {
            fulfill_reactions: None,
            reject_reactions: None,
        }
    }
}

/// Reaction list of a pending promise. A single reaction is by far the most
/// common case and is stored inline.
#[derive(Debug, Clone)]
pub(crate) enum PromiseReactions {
    One(PromiseReaction),
    Many(Vec<PromiseReaction>),
}

impl PromiseReactions {
    pub(crate) fn push(reactions: &mut Option<Self>, reaction: PromiseReaction) {
        match reactions {
            None => *reactions = Some(Self::One(reaction)),
            Some(Self::One(first)) => *reactions = Some(Self::Many(vec![*first, reaction])),
            Some(Self::Many(list)) => list.push(reaction),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(list) => list.len(),
        }
    }

    /// Reactions in registration order.
    pub(crate) fn into_vec(self) -> Vec<PromiseReaction> {
        match self {
            Self::One(reaction) => vec![reaction],
            Self::Many(list) => list,
        }
    }
}

impl HeapMarkAndSweep for PromiseReactions {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            Self::One(reaction) => reaction.mark_values(queues),
            Self::Many(list) => list.mark_values(queues),
        }
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        match self {
            Self::One(reaction) => reaction.sweep_values(compactions),
            Self::Many(list) => list.sweep_values(compactions),
        }
    }
}

impl HeapMarkAndSweep for PromiseHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        let Self {
            object_index,
            realm,
            promise_state,
            is_handled: _,
        } = self;
        object_index.mark_values(queues);
        realm.mark_values(queues);
        match promise_state {
            PromiseState::Pending {
                fulfill_reactions,
                reject_reactions,
            } => {
                fulfill_reactions.mark_values(queues);
                reject_reactions.mark_values(queues);
            }
            PromiseState::Fulfilled { promise_result }
            | PromiseState::Rejected { promise_result } => {
                promise_result.mark_values(queues);
            }
        }
    }

    fn sweep_values(&mut self, compactions: &CompactionLists) {
        let Self {
            object_index,
            realm,
            promise_state,
            is_handled: _,
        } = self;
        object_index.sweep_values(compactions);
        realm.sweep_values(compactions);
        match promise_state {
            PromiseState::Pending {
                fulfill_reactions,
                reject_reactions,
            } => {
                fulfill_reactions.sweep_values(compactions);
                reject_reactions.sweep_values(compactions);
            }
            PromiseState::Fulfilled { promise_result }
            | PromiseState::Rejected { promise_result } => {
                promise_result.sweep_values(compactions);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PromiseReactions;
    use crate::{
        ecmascript::builtins::promise_objects::promise_abstract_operations::promise_reaction_records::PromiseReaction,
        heap::indexes::PromiseReactionIndex,
    };

    fn reaction(index: u32) -> PromiseReaction {
        PromiseReaction(PromiseReactionIndex::from_u32_index(index))
    }

    #[test]
    fn reactions_keep_registration_order() {
        let mut reactions = None;
        PromiseReactions::push(&mut reactions, reaction(0));
        assert!(matches!(reactions, Some(PromiseReactions::One(_))));
        PromiseReactions::push(&mut reactions, reaction(1));
        PromiseReactions::push(&mut reactions, reaction(2));
        let reactions = reactions.unwrap();
        assert_eq!(reactions.len(), 3);
        assert_eq!(
            reactions.into_vec(),
            vec![reaction(0), reaction(1), reaction(2)]
        );
    }
}
