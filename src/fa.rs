/* Shared vocabulary of both automata: the symbol alphabet, the construction errors and the FA
 * trait through which the loader, the checker and the visualizer talk to an automaton. */

use bitvec::prelude::{BitVec, Lsb0};
use color_eyre::eyre::{eyre, Result};
use petgraph::dot::Dot;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::prelude::StableGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::process::Command;

/// Character of the symbol with index 0. Symbol `i` is the character `FIRST_SYMBOL + i`.
pub const FIRST_SYMBOL: char = 'a';

/// Character used for epsilon transitions in the description files.
pub const EPSILON_CHAR: char = '-';

/// Label of epsilon transitions in drawings.
pub const EPSILON_LABEL: &str = "𝛆";

/// Largest alphabet whose symbols all map to characters below the surrogate block.
pub const MAX_ALPHABET_SIZE: usize = 0xD800 - FIRST_SYMBOL as usize;

/// An input symbol of a transition rule.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    Epsilon,
    Letter(usize),
}

impl Symbol {
    /// Edge label used when drawing a rule on this symbol.
    pub fn label(&self) -> String {
        match self {
            Symbol::Epsilon => EPSILON_LABEL.to_string(),
            Symbol::Letter(_) => self.to_string(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "{}", EPSILON_CHAR),
            Symbol::Letter(index) => match symbol_char(*index) {
                Some(ch) => write!(f, "{}", ch),
                None => write!(f, "#{}", index),
            },
        }
    }
}

/// Returns the symbol index of `ch` if it belongs to an alphabet of `alphabet_size` symbols.
pub fn symbol_index(ch: char, alphabet_size: usize) -> Option<usize> {
    let offset = (ch as u32).checked_sub(FIRST_SYMBOL as u32)? as usize;
    if offset < alphabet_size {
        Some(offset)
    } else {
        None
    }
}

/// Returns the character written for the symbol with the given index.
pub fn symbol_char(index: usize) -> Option<char> {
    if index >= MAX_ALPHABET_SIZE {
        return None;
    }
    char::from_u32(FIRST_SYMBOL as u32 + index as u32)
}

/// Maps every character of `input` to its symbol index, or `None` when the character lies
/// outside the alphabet. A line terminator ends the input.
pub(crate) fn input_symbols(
    input: &str,
    alphabet_size: usize,
) -> impl Iterator<Item = Option<usize>> + '_ {
    input
        .chars()
        .take_while(|ch| *ch != '\n')
        .map(move |ch| symbol_index(ch, alphabet_size))
}

/// List of possible errors while constructing an automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FAError {
    /// The start state is not one of the states of the automaton
    InvalidStartState { state: usize, num_states: usize },
    /// The alphabet cannot be mapped onto single characters
    AlphabetTooLarge(usize),
    /// The states or the transition table do not fit in memory
    TableTooLarge {
        num_states: usize,
        alphabet_size: usize,
    },
    /// A rule or an accept state refers to a state that does not exist
    StateOutOfRange { state: usize, num_states: usize },
    /// A rule refers to a symbol outside the alphabet
    SymbolOutOfRange { symbol: usize, alphabet_size: usize },
    /// A second rule for an already defined (state, symbol) pair of a DFA
    DuplicateTransition {
        from: usize,
        symbol: usize,
        existing: usize,
    },
    /// An epsilon rule given to a DFA
    EpsilonInDFA { from: usize, to: usize },
}

impl fmt::Display for FAError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FAError::InvalidStartState { state, num_states } => write!(
                f,
                "Error: Start state {} is not valid for an automaton with {} states!",
                state, num_states
            ),
            FAError::AlphabetTooLarge(size) => write!(
                f,
                "Error: Alphabet of {} symbols is larger than the supported {}!",
                size, MAX_ALPHABET_SIZE
            ),
            FAError::TableTooLarge {
                num_states,
                alphabet_size,
            } => write!(
                f,
                "Error: Failed to allocate an automaton of {} states and {} symbols!",
                num_states, alphabet_size
            ),
            FAError::StateOutOfRange { state, num_states } => write!(
                f,
                "Error: State {} is out of range, the automaton has {} states!",
                state, num_states
            ),
            FAError::SymbolOutOfRange {
                symbol,
                alphabet_size,
            } => write!(
                f,
                "Error: Symbol {} is out of range, the alphabet has {} symbols!",
                Symbol::Letter(*symbol),
                alphabet_size
            ),
            FAError::DuplicateTransition {
                from,
                symbol,
                existing,
            } => write!(
                f,
                "Error: State {} already moves to {} on {}, a DFA allows one rule per symbol!",
                from,
                existing,
                Symbol::Letter(*symbol)
            ),
            FAError::EpsilonInDFA { from, to } => write!(
                f,
                "Error: Found an epsilon transition from {} to {} in a DFA!",
                from, to
            ),
        }
    }
}

impl std::error::Error for FAError {}

pub(crate) fn check_header(
    alphabet_size: usize,
    num_states: usize,
    start_state: usize,
) -> Result<(), FAError> {
    if alphabet_size > MAX_ALPHABET_SIZE {
        return Err(FAError::AlphabetTooLarge(alphabet_size));
    }
    if num_states > bitvec::slice::BitSlice::<u8, Lsb0>::MAX_BITS {
        return Err(FAError::TableTooLarge {
            num_states,
            alphabet_size,
        });
    }
    if start_state >= num_states {
        return Err(FAError::InvalidStartState {
            state: start_state,
            num_states,
        });
    }
    Ok(())
}

/// All clear bit vector with one bit per state, allocated without aborting on failure.
pub(crate) fn state_bits(num_states: usize, alphabet_size: usize) -> Result<BitVec<u8>, FAError> {
    let too_large = || FAError::TableTooLarge {
        num_states,
        alphabet_size,
    };

    let num_bytes = num_states.div_ceil(u8::BITS as usize);
    let mut bytes: Vec<u8> = Vec::new();
    bytes.try_reserve_exact(num_bytes).map_err(|_| too_large())?;
    bytes.resize(num_bytes, 0);

    let mut bits = BitVec::try_from_vec(bytes).map_err(|_| too_large())?;
    bits.truncate(num_states);
    Ok(bits)
}

pub(crate) fn check_state(state: usize, num_states: usize) -> Result<(), FAError> {
    if state >= num_states {
        return Err(FAError::StateOutOfRange { state, num_states });
    }
    Ok(())
}

pub(crate) fn check_symbol(symbol: usize, alphabet_size: usize) -> Result<(), FAError> {
    if symbol >= alphabet_size {
        return Err(FAError::SymbolOutOfRange {
            symbol,
            alphabet_size,
        });
    }
    Ok(())
}

pub trait FA {
    /// Short name of the automaton kind, "DFA" or "NFA".
    fn kind(&self) -> &'static str;
    fn get_num_states(&self) -> usize;
    fn get_start_state(&self) -> usize;
    fn get_alphabet_size(&self) -> usize;
    fn get_acceptor_states(&self) -> &BitVec<u8>;
    /// All outgoing rules of a state as (symbol, target) pairs, ordered by symbol.
    fn get_state_transitions(&self, state_id: usize) -> Vec<(Symbol, usize)>;
    /// Runs the automaton on `input` and reports whether it ends in an accept state.
    fn accept(&self, input: &str) -> bool;

    /// Renders the automaton in Graphviz dot syntax. Parallel rules between two states share
    /// one edge with a comma separated label.
    fn to_dot(&self) -> String {
        let mut stable_graph: StableGraph<String, String> = StableGraph::new();

        let num_states = self.get_num_states();

        let mut edge_map: HashMap<(NodeIndex, NodeIndex), EdgeIndex> = HashMap::new();

        for state_idx in 0..num_states {
            let mut node_label = format!("State {}", state_idx);
            if state_idx == self.get_start_state() {
                node_label = format!("Start\n{}", node_label);
            }
            if self.get_acceptor_states()[state_idx] {
                node_label = format!("Accept\n{}", node_label);
            }
            stable_graph.add_node(node_label);
        }

        for state_idx in 0..num_states {
            for (symbol, target) in self.get_state_transitions(state_idx) {
                let edge_label = symbol.label();

                let key = (NodeIndex::new(state_idx), NodeIndex::new(target));

                match edge_map.get(&key) {
                    Some(edge_idx) => {
                        let merged = format!("{}, {}", stable_graph[*edge_idx], edge_label);
                        stable_graph[*edge_idx] = merged;
                    }
                    None => {
                        let edge_idx = stable_graph.add_edge(key.0, key.1, edge_label);
                        edge_map.insert(key, edge_idx);
                    }
                }
            }
        }

        Dot::new(&stable_graph).to_string()
    }

    /// Writes `<filename>.dot` and renders it to `<filename>.jpg` with Graphviz.
    fn show_fa(&self, filename: &str) -> Result<()> {
        let dot_filename = format!("{}.dot", filename);
        let mut dot_file = File::create(&dot_filename)?;

        dot_file.write_all(self.to_dot().as_bytes())?;

        let output = Command::new("dot")
            .args(["-Tjpg", &dot_filename, "-o", &format!("{}.jpg", filename)])
            .output()
            .map_err(|err| eyre!("Error: Failed to execute Graphviz: {}", err))?;

        if !output.status.success() {
            return Err(eyre!(
                "Error: Graphviz failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        println!("{} vizualization saved as {}.jpg", self.kind(), filename);
        Ok(())
    }
}
