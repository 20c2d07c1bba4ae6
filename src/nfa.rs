/* Nondeterministic finite automaton with epsilon transitions. The simulation keeps the set of
 * states the automaton can be in and closes it under epsilon moves after every symbol, so only
 * the state sets actually reached by an input are ever computed. */

use bitvec::prelude::*;
use std::collections::{BTreeSet, HashMap};

use crate::fa::{self, FAError, Symbol, FA};
use crate::state_set::StateSet;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NFAState {
    id: usize,
    transitions: HashMap<Symbol, BTreeSet<usize>>,
}

#[derive(Debug, Clone)]
pub struct NFA {
    states: Vec<NFAState>,
    start_state: usize,
    accept_states: BitVec<u8>,
    alphabet_size: usize,
}

/// Collects the rules of an NFA. Rules for the same (state, symbol) pair accumulate.
#[derive(Debug, Clone)]
pub struct NFABuilder {
    nfa: NFA,
}

impl NFAState {
    fn new(id: usize) -> Self {
        NFAState {
            id,
            transitions: HashMap::new(),
        }
    }

    fn add_transition(&mut self, symbol: Symbol, to: usize) {
        self.transitions.entry(symbol).or_default().insert(to);
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    /// Get all outgoing transitions of the state, grouped by symbol
    pub fn get_transitions(&self) -> &HashMap<Symbol, BTreeSet<usize>> {
        &self.transitions
    }
}

impl NFABuilder {
    /// Create a builder for an NFA without rules or accept states.
    pub fn new(
        alphabet_size: usize,
        num_states: usize,
        start_state: usize,
    ) -> Result<Self, FAError> {
        fa::check_header(alphabet_size, num_states, start_state)?;

        let mut states: Vec<NFAState> = Vec::new();
        states
            .try_reserve_exact(num_states)
            .map_err(|_| FAError::TableTooLarge {
                num_states,
                alphabet_size,
            })?;
        states.extend((0..num_states).map(NFAState::new));

        let accept_states = fa::state_bits(num_states, alphabet_size)?;

        Ok(NFABuilder {
            nfa: NFA {
                states,
                start_state,
                accept_states,
                alphabet_size,
            },
        })
    }

    /// Add the rule `from --symbol--> to`. Epsilon rules are always allowed, letters must be in
    /// the alphabet.
    pub fn add_transition(
        &mut self,
        from: usize,
        symbol: Symbol,
        to: usize,
    ) -> Result<(), FAError> {
        let num_states = self.nfa.get_num_states();
        fa::check_state(from, num_states)?;
        fa::check_state(to, num_states)?;
        if let Symbol::Letter(letter) = symbol {
            fa::check_symbol(letter, self.nfa.alphabet_size)?;
        }

        self.nfa.states[from].add_transition(symbol, to);
        Ok(())
    }

    /// Mark a state as an accept state
    pub fn set_accept_state(&mut self, state: usize) -> Result<(), FAError> {
        fa::check_state(state, self.nfa.get_num_states())?;
        self.nfa.accept_states.set(state, true);
        Ok(())
    }

    pub fn build(self) -> NFA {
        self.nfa
    }
}

impl NFA {
    pub fn get_state(&self, id: usize) -> Option<&NFAState> {
        self.states.get(id)
    }

    /// Returns the direct targets of `state` on `symbol`.
    pub fn targets(&self, state: usize, symbol: Symbol) -> Option<&BTreeSet<usize>> {
        self.states.get(state)?.transitions.get(&symbol)
    }

    /// One epsilon step: the set itself together with every state one epsilon rule away from it.
    pub fn closure_step(&self, states: &StateSet) -> StateSet {
        let mut result = states.clone();

        for state in states.iter() {
            if let Some(targets) = self.targets(state, Symbol::Epsilon) {
                for target in targets {
                    result.insert(*target);
                }
            }
        }

        result
    }

    /// Epsilon closure of a set of states. Steps are repeated until a step adds nothing; since a
    /// step only ever grows the set, equal sizes mean equal sets.
    pub fn closure(&self, states: &StateSet) -> StateSet {
        let mut current = states.clone();

        loop {
            let next = self.closure_step(&current);
            if next.len() == current.len() {
                return next;
            }
            current = next;
        }
    }

    /// States reachable from the set by a single rule on `symbol`, without any epsilon moves.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: usize) -> StateSet {
        let mut result = StateSet::with_capacity(self.states.len());

        for state in states.iter() {
            if let Some(targets) = self.targets(state, Symbol::Letter(symbol)) {
                for target in targets {
                    result.insert(*target);
                }
            }
        }

        result
    }

    /// Returns the set of states the automaton is in after consuming `input`. The set is empty
    /// when the input contains a character outside the alphabet or no state survives.
    pub fn run(&self, input: &str) -> StateSet {
        let num_states = self.states.len();
        let mut current_states = self.closure(&StateSet::singleton(self.start_state, num_states));

        for symbol in fa::input_symbols(input, self.alphabet_size) {
            let symbol = match symbol {
                Some(symbol) => symbol,
                None => return StateSet::with_capacity(num_states),
            };

            current_states = self.closure(&self.move_on_symbol(&current_states, symbol));

            if current_states.is_empty() {
                break;
            }
        }

        current_states
    }
}

impl FA for NFA {
    fn kind(&self) -> &'static str {
        "NFA"
    }

    fn get_num_states(&self) -> usize {
        self.states.len()
    }

    fn get_start_state(&self) -> usize {
        self.start_state
    }

    fn get_alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    fn get_acceptor_states(&self) -> &BitVec<u8> {
        &self.accept_states
    }

    fn get_state_transitions(&self, state_id: usize) -> Vec<(Symbol, usize)> {
        let mut transition_list: Vec<(Symbol, usize)> = Vec::new();

        if let Some(state) = self.states.get(state_id) {
            for (symbol, targets) in state.transitions.iter() {
                for target in targets {
                    transition_list.push((*symbol, *target));
                }
            }
        }

        transition_list.sort();
        transition_list
    }

    fn accept(&self, input: &str) -> bool {
        self.run(input).intersects(&self.accept_states)
    }
}
