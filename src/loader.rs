/* Reading and writing automaton descriptions.
 *
 * The text format is
 *
 *     <alphabet size> <number of states> <start state>
 *     <number of accept states> <accept state>...
 *     <from> <symbol> <to>
 *     ...
 *
 * where a symbol is a letter counted from 'a' or '-' for an epsilon rule. The two header
 * records may be spread over several lines, the rules are one per line and blank lines are
 * skipped. A description can also be stored as JSON. */

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::dfa::{DFABuilder, DFA};
use crate::fa::{self, FAError, Symbol, FA};
use crate::nfa::{NFABuilder, NFA};

/// List of possible errors while loading an automaton description
#[derive(Debug)]
pub enum LoadError {
    /// The description file could not be opened
    FileOpenError(String),
    /// The description file could not be read
    FileReadError(String),
    /// The output file could not be written
    FileWriteError(String),
    /// The first record is not three non negative integers
    MalformedHeader(String),
    /// The accept state record is missing, short or not numeric
    MalformedAcceptStates(String),
    /// A rule line is not of the form `<from> <symbol> <to>`
    MalformedRule { line: usize, text: String },
    /// A rule uses a character that is neither a letter of the alphabet range nor '-'
    UnknownSymbol { line: usize, symbol: char },
    /// The header describes an automaton that cannot be built
    InvalidAutomaton(FAError),
    /// An accept state is out of range
    InvalidAcceptState(FAError),
    /// A rule was refused by the automaton
    InvalidRule {
        line: Option<usize>,
        rule: String,
        source: FAError,
    },
    /// The JSON form could not be read or written
    JsonError(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::FileOpenError(err_line) => write!(f, "{}", err_line),
            LoadError::FileReadError(err_line) => write!(f, "{}", err_line),
            LoadError::FileWriteError(err_line) => write!(f, "{}", err_line),
            LoadError::MalformedHeader(header) => write!(
                f,
                "Error: Malformed header {:?}, expected alphabet size, number of states and start state!",
                header
            ),
            LoadError::MalformedAcceptStates(record) => {
                write!(f, "Error: Malformed accept state list {:?}!", record)
            }
            LoadError::MalformedRule { line, text } => write!(
                f,
                "Error: Malformed transition rule {:?} on line {}!",
                text, line
            ),
            LoadError::UnknownSymbol { line, symbol } => {
                write!(f, "Error: Unknown symbol {:?} on line {}!", symbol, line)
            }
            LoadError::InvalidAutomaton(err) => write!(f, "{}", err),
            LoadError::InvalidAcceptState(err) => write!(f, "{}", err),
            LoadError::InvalidRule { line, rule, source } => match line {
                Some(line) => write!(
                    f,
                    "Error: Wrong transition rule {:?} on line {}: {}",
                    rule, line, source
                ),
                None => write!(f, "Error: Wrong transition rule {:?}: {}", rule, source),
            },
            LoadError::JsonError(err_line) => write!(f, "{}", err_line),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::InvalidAutomaton(err) | LoadError::InvalidAcceptState(err) => Some(err),
            LoadError::InvalidRule { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Which engine a description should be built into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatonKind {
    DFA,
    NFA,
}

/// A single transition rule of a description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub from: usize,
    pub symbol: Symbol,
    pub to: usize,
    /// Line of the rule in the text it was parsed from
    #[serde(skip)]
    pub line: Option<usize>,
}

impl Rule {
    pub fn new(from: usize, symbol: Symbol, to: usize) -> Self {
        Rule {
            from,
            symbol,
            to,
            line: None,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.symbol, self.to)
    }
}

/// An automaton as a plain list of rules, before it is validated by one of the builders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub alphabet_size: usize,
    pub num_states: usize,
    pub start_state: usize,
    pub accept_states: Vec<usize>,
    pub transitions: Vec<Rule>,
}

/// Pulls whitespace separated numbers out of the header records, line by line.
struct NumberReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    tokens: VecDeque<&'a str>,
}

impl<'a> NumberReader<'a> {
    fn new(text: &'a str) -> Self {
        NumberReader {
            lines: text.lines().enumerate(),
            tokens: VecDeque::new(),
        }
    }

    /// Returns the next number, `Err` with the offending token if it is not a number and
    /// `None` at the end of the text.
    fn next_number(&mut self) -> Option<Result<usize, String>> {
        while self.tokens.is_empty() {
            let (_, line) = self.lines.next()?;
            self.tokens.extend(line.split_whitespace());
        }

        let token = self.tokens.pop_front()?;
        Some(token.parse::<usize>().map_err(|_| token.to_string()))
    }
}

fn parse_symbol(ch: char, line: usize) -> Result<Symbol, LoadError> {
    if ch == fa::EPSILON_CHAR {
        return Ok(Symbol::Epsilon);
    }
    // Range against the alphabet is checked by the builders
    match (ch as u32).checked_sub(fa::FIRST_SYMBOL as u32) {
        Some(offset) => Ok(Symbol::Letter(offset as usize)),
        None => Err(LoadError::UnknownSymbol { line, symbol: ch }),
    }
}

fn parse_rule(text: &str, line: usize) -> Result<Rule, LoadError> {
    let malformed = || LoadError::MalformedRule {
        line,
        text: text.to_string(),
    };

    let content: Vec<&str> = text.split_whitespace().collect();

    if content.len() != 3 {
        return Err(malformed());
    }

    let from = content[0].parse::<usize>().map_err(|_| malformed())?;
    let to = content[2].parse::<usize>().map_err(|_| malformed())?;

    let mut symbol_chars = content[1].chars();
    let symbol = match (symbol_chars.next(), symbol_chars.next()) {
        (Some(ch), None) => parse_symbol(ch, line)?,
        _ => return Err(malformed()),
    };

    Ok(Rule {
        from,
        symbol,
        to,
        line: Some(line),
    })
}

/// Parse the text form of an automaton description
pub fn parse_description(text: &str) -> Result<Description, LoadError> {
    let mut reader = NumberReader::new(text);

    let mut header = [0usize; 3];
    for value in header.iter_mut() {
        *value = match reader.next_number() {
            Some(Ok(number)) => number,
            Some(Err(token)) => return Err(LoadError::MalformedHeader(token)),
            None => return Err(LoadError::MalformedHeader(String::new())),
        };
    }
    let [alphabet_size, num_states, start_state] = header;

    let num_accept_states = match reader.next_number() {
        Some(Ok(number)) => number,
        Some(Err(token)) => return Err(LoadError::MalformedAcceptStates(token)),
        None => return Err(LoadError::MalformedAcceptStates(String::new())),
    };

    let mut accept_states = Vec::new();
    for _ in 0..num_accept_states {
        match reader.next_number() {
            Some(Ok(state)) => accept_states.push(state),
            Some(Err(token)) => return Err(LoadError::MalformedAcceptStates(token)),
            None => {
                return Err(LoadError::MalformedAcceptStates(format!(
                    "expected {} accept states, found {}",
                    num_accept_states,
                    accept_states.len()
                )))
            }
        }
    }

    // The accept state record has to end its line
    if !reader.tokens.is_empty() {
        let rest: Vec<&str> = reader.tokens.drain(..).collect();
        return Err(LoadError::MalformedAcceptStates(rest.join(" ")));
    }

    let mut transitions = Vec::new();

    for (line_number, line) in reader.lines {
        if line.trim().is_empty() {
            continue;
        }
        transitions.push(parse_rule(line, line_number + 1)?);
    }

    Ok(Description {
        alphabet_size,
        num_states,
        start_state,
        accept_states,
        transitions,
    })
}

/// Read and parse a description file in the text format
pub fn read_description_file<P: AsRef<Path>>(file_path: P) -> Result<Description, LoadError> {
    let file_path = file_path.as_ref();

    let mut file = File::open(file_path).map_err(|error| {
        LoadError::FileOpenError(format!(
            "Error: Failed to open the description file {}: {}",
            file_path.display(),
            error
        ))
    })?;

    let mut text = String::new();
    file.read_to_string(&mut text).map_err(|error| {
        LoadError::FileReadError(format!(
            "Error: Failed to read the description file {}: {}",
            file_path.display(),
            error
        ))
    })?;

    parse_description(&text)
}

impl Description {
    /// Capture the rules of an existing automaton
    pub fn from_fa<T: FA + ?Sized>(fa: &T) -> Self {
        let mut transitions = Vec::new();

        for state in 0..fa.get_num_states() {
            for (symbol, target) in fa.get_state_transitions(state) {
                transitions.push(Rule::new(state, symbol, target));
            }
        }

        Description {
            alphabet_size: fa.get_alphabet_size(),
            num_states: fa.get_num_states(),
            start_state: fa.get_start_state(),
            accept_states: fa.get_acceptor_states().iter_ones().collect(),
            transitions,
        }
    }

    fn invalid_rule(rule: &Rule, source: FAError) -> LoadError {
        LoadError::InvalidRule {
            line: rule.line,
            rule: rule.to_string(),
            source,
        }
    }

    /// Build a DFA, failing on the first rule the DFA refuses
    pub fn build_dfa(&self) -> Result<DFA, LoadError> {
        let mut builder = DFABuilder::new(self.alphabet_size, self.num_states, self.start_state)
            .map_err(LoadError::InvalidAutomaton)?;

        for state in &self.accept_states {
            builder
                .set_accept_state(*state)
                .map_err(LoadError::InvalidAcceptState)?;
        }

        for rule in &self.transitions {
            let symbol = match rule.symbol {
                Symbol::Letter(symbol) => symbol,
                Symbol::Epsilon => {
                    let err = FAError::EpsilonInDFA {
                        from: rule.from,
                        to: rule.to,
                    };
                    return Err(Self::invalid_rule(rule, err));
                }
            };

            builder
                .add_transition(rule.from, symbol, rule.to)
                .map_err(|err| Self::invalid_rule(rule, err))?;
        }

        Ok(builder.build())
    }

    /// Build an NFA, failing on the first rule the NFA refuses
    pub fn build_nfa(&self) -> Result<NFA, LoadError> {
        let mut builder = NFABuilder::new(self.alphabet_size, self.num_states, self.start_state)
            .map_err(LoadError::InvalidAutomaton)?;

        for state in &self.accept_states {
            builder
                .set_accept_state(*state)
                .map_err(LoadError::InvalidAcceptState)?;
        }

        for rule in &self.transitions {
            builder
                .add_transition(rule.from, rule.symbol, rule.to)
                .map_err(|err| Self::invalid_rule(rule, err))?;
        }

        Ok(builder.build())
    }

    pub fn build(&self, kind: AutomatonKind) -> Result<Box<dyn FA>, LoadError> {
        let fa: Box<dyn FA> = match kind {
            AutomatonKind::DFA => Box::new(self.build_dfa()?),
            AutomatonKind::NFA => Box::new(self.build_nfa()?),
        };
        Ok(fa)
    }

    /// Render the description in the text format
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "{} {} {}\n{}",
            self.alphabet_size,
            self.num_states,
            self.start_state,
            self.accept_states.len()
        );
        for state in &self.accept_states {
            text.push_str(&format!(" {}", state));
        }
        text.push('\n');
        for rule in &self.transitions {
            text.push_str(&format!("{}\n", rule));
        }
        text
    }

    /// Save the description as pretty printed JSON
    pub fn save_json<P: AsRef<Path>>(&self, file_path: P) -> Result<(), LoadError> {
        let file_path = file_path.as_ref();
        let file = File::create(file_path).map_err(|error| {
            LoadError::FileWriteError(format!(
                "Error: Failed to create {}: {}",
                file_path.display(),
                error
            ))
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|error| LoadError::JsonError(format!("Error: {}", error)))?;
        writeln!(writer).map_err(|error| {
            LoadError::FileWriteError(format!(
                "Error: Failed to write {}: {}",
                file_path.display(),
                error
            ))
        })?;
        Ok(())
    }

    /// Load a description saved with `save_json`
    pub fn load_json<P: AsRef<Path>>(file_path: P) -> Result<Self, LoadError> {
        let file_path = file_path.as_ref();
        let file = File::open(file_path).map_err(|error| {
            LoadError::FileOpenError(format!(
                "Error: Failed to open {}: {}",
                file_path.display(),
                error
            ))
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|error| {
            LoadError::JsonError(format!(
                "Error: Invalid automaton JSON in {}: {}",
                file_path.display(),
                error
            ))
        })
    }
}

/// Load an automaton of the given kind. Files ending in `.json` are read as JSON, everything
/// else as the text format.
pub fn load_automaton<P: AsRef<Path>>(
    file_path: P,
    kind: AutomatonKind,
) -> Result<Box<dyn FA>, LoadError> {
    let file_path = file_path.as_ref();

    let is_json = file_path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let description = if is_json {
        Description::load_json(file_path)?
    } else {
        read_description_file(file_path)?
    };

    description.build(kind)
}

#[cfg(test)]
mod loader_tests {
    use super::*;

    const ENDS_IN_A: &str = "2 2 0\n1 1\n0 a 1\n1 a 1\n1 b 0\n0 b 0\n";

    #[test]
    fn test_parse_description() {
        let description = parse_description(ENDS_IN_A).unwrap();

        assert_eq!(description.alphabet_size, 2);
        assert_eq!(description.num_states, 2);
        assert_eq!(description.start_state, 0);
        assert_eq!(description.accept_states, vec![1]);
        assert_eq!(description.transitions.len(), 4);
        assert_eq!(
            description.transitions[2],
            Rule {
                from: 1,
                symbol: Symbol::Letter(1),
                to: 0,
                line: Some(5)
            }
        );
    }

    #[test]
    fn test_header_may_span_lines() {
        let text = "1\n3 0\n1\n2\n\n0 - 1\n\n1 a 2\n";
        let description = parse_description(text).unwrap();

        assert_eq!(description.num_states, 3);
        assert_eq!(description.accept_states, vec![2]);
        assert_eq!(description.transitions[0].symbol, Symbol::Epsilon);
        assert_eq!(description.transitions[1].line, Some(8));
    }

    #[test]
    fn test_no_rules_and_no_accept_states() {
        let description = parse_description("2 1 0\n0\n").unwrap();
        assert!(description.accept_states.is_empty());
        assert!(description.transitions.is_empty());

        let dfa = description.build_dfa().unwrap();
        assert!(!dfa.accept(""));
    }

    #[test]
    fn test_malformed_header() {
        match parse_description("2 x 0\n0\n") {
            Err(LoadError::MalformedHeader(token)) => assert_eq!(token, "x"),
            other => panic!("Expected a header error, got {:?}", other),
        }
        assert!(matches!(
            parse_description("2 2"),
            Err(LoadError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_description("-1 2 0\n0\n"),
            Err(LoadError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_malformed_accept_states() {
        assert!(matches!(
            parse_description("2 2 0\n"),
            Err(LoadError::MalformedAcceptStates(_))
        ));
        assert!(matches!(
            parse_description("2 2 0\n2 1\n"),
            Err(LoadError::MalformedAcceptStates(_))
        ));
        assert!(matches!(
            parse_description("2 2 0\n1 1 0 a 1\n"),
            Err(LoadError::MalformedAcceptStates(_))
        ));
    }

    #[test]
    fn test_malformed_rules() {
        for rule in ["0 a", "0 a 1 1", "x a 1", "0 ab 1", "0 a -1"] {
            let text = format!("2 2 0\n1 1\n{}\n", rule);
            match parse_description(&text) {
                Err(LoadError::MalformedRule { line, text }) => {
                    assert_eq!(line, 3);
                    assert_eq!(text, rule);
                }
                other => panic!("Expected a malformed rule for {:?}, got {:?}", rule, other),
            }
        }

        match parse_description("2 2 0\n1 1\n0 A 1\n") {
            Err(LoadError::UnknownSymbol { line, symbol }) => {
                assert_eq!(line, 3);
                assert_eq!(symbol, 'A');
            }
            other => panic!("Expected an unknown symbol, got {:?}", other),
        }
    }

    #[test]
    fn test_build_dfa_reports_range_and_duplicates() {
        let description = parse_description("2 2 0\n1 1\n0 a 1\n0 c 1\n").unwrap();
        match description.build_dfa() {
            Err(LoadError::InvalidRule { line, rule, source }) => {
                assert_eq!(line, Some(4));
                assert_eq!(rule, "0 c 1");
                assert_eq!(
                    source,
                    FAError::SymbolOutOfRange {
                        symbol: 2,
                        alphabet_size: 2
                    }
                );
            }
            other => panic!("Expected an invalid rule, got {:?}", other),
        }

        let description = parse_description("2 2 0\n1 1\n0 a 1\n0 a 0\n").unwrap();
        match description.build_dfa() {
            Err(LoadError::InvalidRule { source, .. }) => assert_eq!(
                source,
                FAError::DuplicateTransition {
                    from: 0,
                    symbol: 0,
                    existing: 1
                }
            ),
            other => panic!("Expected a duplicate rule, got {:?}", other),
        }

        // The same rules are fine for an NFA
        let nfa = description.build_nfa().unwrap();
        assert!(nfa.accept("a"));
        assert!(!nfa.accept("aa"));
    }

    #[test]
    fn test_build_dfa_refuses_epsilon() {
        let description = parse_description("1 2 0\n1 1\n0 - 1\n").unwrap();
        match description.build_dfa() {
            Err(LoadError::InvalidRule { source, .. }) => {
                assert_eq!(source, FAError::EpsilonInDFA { from: 0, to: 1 })
            }
            other => panic!("Expected an epsilon error, got {:?}", other),
        }
        assert!(description.build_nfa().unwrap().accept(""));
    }

    #[test]
    fn test_build_reports_header_and_accept_errors() {
        let description = parse_description("2 2 2\n0\n").unwrap();
        assert!(matches!(
            description.build_dfa(),
            Err(LoadError::InvalidAutomaton(FAError::InvalidStartState { .. }))
        ));
        assert!(matches!(
            description.build_nfa(),
            Err(LoadError::InvalidAutomaton(FAError::InvalidStartState { .. }))
        ));

        let description = parse_description("2 2 0\n1 5\n").unwrap();
        assert!(matches!(
            description.build_nfa(),
            Err(LoadError::InvalidAcceptState(FAError::StateOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_from_fa_and_text_form() {
        let description = parse_description(ENDS_IN_A).unwrap();
        let dfa = description.build_dfa().unwrap();

        let captured = Description::from_fa(&dfa);
        assert_eq!(captured.accept_states, vec![1]);
        assert_eq!(captured.transitions.len(), 4);

        let reparsed = parse_description(&captured.to_text()).unwrap();
        let rebuilt = reparsed.build_dfa().unwrap();
        assert_eq!(rebuilt, dfa);
    }

    #[test]
    fn test_error_display_names_the_line() {
        let description = parse_description("2 2 0\n1 1\n\n0 a 1\n0 a 0\n").unwrap();
        let err = description.build_dfa().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 5"), "found {message}");
        assert!(message.contains("0 a 0"));
    }

    #[test]
    fn test_huge_state_count_is_reported() {
        let num_states = usize::MAX / 4 + 1;

        let description = parse_description(&format!("0 {} 0\n0\n", num_states)).unwrap();
        assert!(matches!(
            description.build_dfa(),
            Err(LoadError::InvalidAutomaton(FAError::TableTooLarge { .. }))
        ));

        let description = parse_description(&format!("1 {} 0\n0\n", num_states)).unwrap();
        assert!(matches!(
            description.build_nfa(),
            Err(LoadError::InvalidAutomaton(FAError::TableTooLarge { .. }))
        ));
    }
}
