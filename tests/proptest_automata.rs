// Property based tests of the acceptance engines.

use fasim::checker::KStrings;
use fasim::dfa::DFABuilder;
use fasim::fa::{Symbol, FA};
use fasim::nfa::{NFABuilder, NFA};
use fasim::state_set::StateSet;
use proptest::collection;
use proptest::prelude::*;

const MAX_STATES: usize = 6;
const MAX_ALPHABET: usize = 3;

/// (alphabet size, number of states, start state, accept states, rules) where a rule symbol of
/// `None` is an epsilon rule.
type RawAutomaton = (
    usize,
    usize,
    usize,
    Vec<usize>,
    Vec<(usize, Option<usize>, usize)>,
);

fn raw_automaton() -> impl Strategy<Value = RawAutomaton> {
    (1..=MAX_ALPHABET, 1..=MAX_STATES).prop_flat_map(|(alphabet_size, num_states)| {
        (
            Just(alphabet_size),
            Just(num_states),
            0..num_states,
            collection::vec(0..num_states, 0..=num_states),
            collection::vec(
                (
                    0..num_states,
                    proptest::option::of(0..alphabet_size),
                    0..num_states,
                ),
                0..20,
            ),
        )
    })
}

fn build_nfa(raw: &RawAutomaton) -> NFA {
    let (alphabet_size, num_states, start_state, accept_states, rules) = raw;
    let mut builder = NFABuilder::new(*alphabet_size, *num_states, *start_state).unwrap();
    for state in accept_states {
        builder.set_accept_state(*state).unwrap();
    }
    for (from, symbol, to) in rules {
        let symbol = match symbol {
            Some(letter) => Symbol::Letter(*letter),
            None => Symbol::Epsilon,
        };
        builder.add_transition(*from, symbol, *to).unwrap();
    }
    builder.build()
}

fn input_string(alphabet_size: usize) -> impl Strategy<Value = String> {
    collection::vec(0..alphabet_size, 0..8).prop_map(|symbols| {
        symbols
            .into_iter()
            .map(|symbol| (b'a' + symbol as u8) as char)
            .collect()
    })
}

proptest! {
    #[test]
    fn closure_is_a_fixed_point(
        (raw, seed) in raw_automaton().prop_flat_map(|raw| {
            let num_states = raw.1;
            (Just(raw), collection::vec(0..num_states, 0..=num_states))
        })
    ) {
        let nfa = build_nfa(&raw);
        let states = StateSet::from_states(seed, nfa.get_num_states());

        let closure = nfa.closure(&states);
        prop_assert_eq!(nfa.closure(&closure), closure.clone());
        prop_assert_eq!(nfa.closure_step(&closure), closure.clone());

        // The closure contains the set it was started from
        for state in states.iter() {
            prop_assert!(closure.contains(state));
        }
    }

    #[test]
    fn accept_is_repeatable(
        (raw, input) in raw_automaton().prop_flat_map(|raw| {
            let alphabet_size = raw.0;
            (Just(raw), input_string(alphabet_size))
        })
    ) {
        let nfa = build_nfa(&raw);
        let first = nfa.accept(&input);
        prop_assert_eq!(nfa.accept(&input), first);
    }

    #[test]
    fn empty_string_depends_on_start_closure(raw in raw_automaton()) {
        let nfa = build_nfa(&raw);
        let start = StateSet::singleton(nfa.get_start_state(), nfa.get_num_states());
        let expected = nfa.closure(&start).intersects(nfa.get_acceptor_states());
        prop_assert_eq!(nfa.accept(""), expected);
    }

    #[test]
    fn dfa_and_nfa_agree_on_deterministic_rules(raw in raw_automaton()) {
        let (alphabet_size, num_states, start_state, accept_states, rules) = &raw;

        let mut dfa_builder = DFABuilder::new(*alphabet_size, *num_states, *start_state).unwrap();
        let mut nfa_builder = NFABuilder::new(*alphabet_size, *num_states, *start_state).unwrap();
        for state in accept_states {
            dfa_builder.set_accept_state(*state).unwrap();
            nfa_builder.set_accept_state(*state).unwrap();
        }
        // Keep the first rule of every (state, symbol) pair, as the DFA does
        for (from, symbol, to) in rules {
            if let Some(symbol) = symbol {
                if dfa_builder.add_transition(*from, *symbol, *to).is_ok() {
                    nfa_builder.add_transition(*from, Symbol::Letter(*symbol), *to).unwrap();
                }
            }
        }
        let dfa = dfa_builder.build();
        let nfa = nfa_builder.build();

        for k in 0..=3 {
            for string in KStrings::new(*alphabet_size, k).unwrap() {
                prop_assert_eq!(dfa.accept(&string), nfa.accept(&string), "on {:?}", string);
            }
        }
    }
}
