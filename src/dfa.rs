/* Deterministic finite automaton over a dense transition table. Rules are inserted through a
 * DFABuilder which enforces determinism; the built DFA is read only and runs each input with
 * a single table lookup per symbol. */

use crate::fa::{self, FAError, Symbol, FA};
use bitvec::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DFA {
    alphabet_size: usize,
    num_states: usize,
    start_state: usize,
    accept_states: BitVec<u8>,
    transitions: Vec<Option<usize>>, // Row major, num_states rows of alphabet_size cells
}

/// Collects the rules of a DFA. Every cell of the table can be set at most once.
#[derive(Debug, Clone)]
pub struct DFABuilder {
    dfa: DFA,
}

impl DFABuilder {
    /// Create a builder for a DFA with an empty transition table and no accept states.
    pub fn new(
        alphabet_size: usize,
        num_states: usize,
        start_state: usize,
    ) -> Result<Self, FAError> {
        fa::check_header(alphabet_size, num_states, start_state)?;

        let table_too_large = FAError::TableTooLarge {
            num_states,
            alphabet_size,
        };

        let num_cells = num_states
            .checked_mul(alphabet_size)
            .ok_or_else(|| table_too_large.clone())?;

        let mut transitions: Vec<Option<usize>> = Vec::new();
        transitions
            .try_reserve_exact(num_cells)
            .map_err(|_| table_too_large)?;
        transitions.resize(num_cells, None);

        let accept_states = fa::state_bits(num_states, alphabet_size)?;

        Ok(DFABuilder {
            dfa: DFA {
                alphabet_size,
                num_states,
                start_state,
                accept_states,
                transitions,
            },
        })
    }

    /// Add the rule `from --symbol--> to`. Fails without touching the table if a state or the
    /// symbol is out of range or the pair (from, symbol) already has a rule.
    pub fn add_transition(&mut self, from: usize, symbol: usize, to: usize) -> Result<(), FAError> {
        let dfa = &mut self.dfa;
        fa::check_state(from, dfa.num_states)?;
        fa::check_state(to, dfa.num_states)?;
        fa::check_symbol(symbol, dfa.alphabet_size)?;

        let cell = &mut dfa.transitions[from * dfa.alphabet_size + symbol];

        if let Some(existing) = *cell {
            return Err(FAError::DuplicateTransition {
                from,
                symbol,
                existing,
            });
        }

        *cell = Some(to);
        Ok(())
    }

    /// Mark a state as an accept state
    pub fn set_accept_state(&mut self, state: usize) -> Result<(), FAError> {
        fa::check_state(state, self.dfa.num_states)?;
        self.dfa.accept_states.set(state, true);
        Ok(())
    }

    pub fn build(self) -> DFA {
        self.dfa
    }
}

impl DFA {
    /// Returns the target of the rule for (state, symbol), if there is one.
    pub fn transition(&self, state: usize, symbol: usize) -> Option<usize> {
        if state >= self.num_states || symbol >= self.alphabet_size {
            return None;
        }
        self.transitions[state * self.alphabet_size + symbol]
    }

    /// Returns the state reached after consuming `input`, or `None` when the run dies on a
    /// character outside the alphabet or a missing rule.
    pub fn run(&self, input: &str) -> Option<usize> {
        let mut current_state = self.start_state;

        for symbol in fa::input_symbols(input, self.alphabet_size) {
            current_state = self.transition(current_state, symbol?)?;
        }

        Some(current_state)
    }
}

impl FA for DFA {
    fn kind(&self) -> &'static str {
        "DFA"
    }

    fn get_num_states(&self) -> usize {
        self.num_states
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
        (0..self.alphabet_size)
            .filter_map(|symbol| {
                self.transition(state_id, symbol)
                    .map(|target| (Symbol::Letter(symbol), target))
            })
            .collect()
    }

    fn accept(&self, input: &str) -> bool {
        match self.run(input) {
            Some(state) => self.accept_states[state],
            None => false,
        }
    }
}
