//! Sets of automaton states backed by a bit vector with one bit per state.

use bitvec::prelude::*;

/// A set of state indices of an automaton with a known number of states.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateSet {
    bits: BitVec<u8>,
}

impl StateSet {
    /// Create an empty set able to hold the states `0..num_states`.
    pub fn with_capacity(num_states: usize) -> Self {
        StateSet {
            bits: BitVec::repeat(false, num_states),
        }
    }

    /// Create a set holding only `state`.
    pub fn singleton(state: usize, num_states: usize) -> Self {
        let mut set = StateSet::with_capacity(num_states);
        set.insert(state);
        set
    }

    /// Create a set from a list of states.
    pub fn from_states<I: IntoIterator<Item = usize>>(states: I, num_states: usize) -> Self {
        let mut set = StateSet::with_capacity(num_states);
        for state in states {
            set.insert(state);
        }
        set
    }

    /// Insert a state, growing the set if needed. Returns true if the state was not present.
    pub fn insert(&mut self, state: usize) -> bool {
        if state >= self.bits.len() {
            self.bits.resize(state + 1, false);
        }
        let present = self.bits[state];
        self.bits.set(state, true);
        !present
    }

    pub fn contains(&self, state: usize) -> bool {
        self.bits.get(state).map(|bit| *bit).unwrap_or(false)
    }

    /// Number of states in the set
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Iterate over the states in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Add every state of `other` to this set.
    pub fn union_with(&mut self, other: &StateSet) {
        for state in other.iter() {
            self.insert(state);
        }
    }

    /// Check whether any state of the set is marked in `marks`.
    pub fn intersects(&self, marks: &BitVec<u8>) -> bool {
        self.iter()
            .any(|state| marks.get(state).map(|bit| *bit).unwrap_or(false))
    }
}
