//! # fasim
//!
//! Finite automata built from transition tables.
//!
//! This library provides functionality to:
//! - Build deterministic finite automata with strict determinism checks
//! - Build nondeterministic finite automata with epsilon transitions and simulate them on
//!   state sets, computing epsilon closures on demand
//! - Load automata from text descriptions and save or load them as JSON
//! - Check whether an automaton accepts every string of a given length
//! - Visualize the automata state machine

// Re-export the modules
pub mod checker;
pub mod dfa;
pub mod fa;
pub mod loader;
pub mod nfa;
pub mod state_set;
pub mod visualizer;

// Re-export commonly used items for convenience
pub use checker::{check_all, CheckReport};
pub use dfa::{DFABuilder, DFA};
pub use fa::{FAError, Symbol, FA};
pub use loader::{load_automaton, parse_description, read_description_file, AutomatonKind};
pub use nfa::{NFABuilder, NFA};
pub use state_set::StateSet;
pub use visualizer::visualize;
