/* Brute force check of "does the automaton accept every string of length k". Strings are
 * enumerated as base N numerals, N being the alphabet size, with the least significant digit
 * first: the string number i has the character 'a' + (i / N^j) % N at position j. */

use std::fmt;
use std::io::{BufRead, Write};

use crate::fa::{self, FA};

/// List of possible errors of the exhaustive check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// alphabet_size^k does not fit in a usize
    TooManyStrings { alphabet_size: usize, k: usize },
    /// The alphabet cannot be written with single characters
    AlphabetTooLarge(usize),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::TooManyStrings { alphabet_size, k } => write!(
                f,
                "Error: Too many strings to check, {}^{} does not fit in {} bits!",
                alphabet_size,
                k,
                usize::BITS
            ),
            CheckError::AlphabetTooLarge(size) => write!(
                f,
                "Error: Alphabet of {} symbols cannot be enumerated!",
                size
            ),
        }
    }
}

impl std::error::Error for CheckError {}

/// Iterator over all strings of length k in enumeration order
#[derive(Debug, Clone)]
pub struct KStrings {
    symbols: Vec<char>,
    k: usize,
    index: usize,
    total: usize,
}

impl KStrings {
    pub fn new(alphabet_size: usize, k: usize) -> Result<Self, CheckError> {
        let total = u32::try_from(k)
            .ok()
            .and_then(|exp| alphabet_size.checked_pow(exp))
            .ok_or(CheckError::TooManyStrings { alphabet_size, k })?;

        let symbols = (0..alphabet_size)
            .map(fa::symbol_char)
            .collect::<Option<Vec<char>>>()
            .ok_or(CheckError::AlphabetTooLarge(alphabet_size))?;

        Ok(KStrings {
            symbols,
            k,
            index: 0,
            total,
        })
    }

    /// Number of strings the iterator yields in total
    pub fn total(&self) -> usize {
        self.total
    }

    /// The string with the given enumeration index
    pub fn nth_string(&self, index: usize) -> String {
        let base = self.symbols.len();
        let mut remainder = index;
        let mut string = String::with_capacity(self.k);

        for _ in 0..self.k {
            string.push(self.symbols[remainder % base]);
            remainder /= base;
        }

        string
    }
}

impl Iterator for KStrings {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.index >= self.total {
            return None;
        }
        let string = self.nth_string(self.index);
        self.index += 1;
        Some(string)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for KStrings {}

/// Outcome of checking all strings of one length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub k: usize,
    /// Number of strings of length k
    pub total: usize,
    /// Number of strings run through the automaton, including the rejected one
    pub visited: usize,
    /// First string that was rejected, if any
    pub rejected: Option<String>,
}

impl CheckReport {
    pub fn all_accepted(&self) -> bool {
        self.rejected.is_none()
    }

    /// Human readable verdict naming the automaton kind
    pub fn verdict(&self, kind: &str) -> String {
        if self.all_accepted() {
            format!("Yes, {} accepted all {}-symbol strings", kind, self.k)
        } else {
            format!("Sorry, {} not accepted all {}-symbol strings", kind, self.k)
        }
    }
}

/// Check whether the automaton accepts every string of length `k`, stopping at the first
/// rejected string.
pub fn check_all<T: FA + ?Sized>(fa: &T, k: usize) -> Result<CheckReport, CheckError> {
    let strings = KStrings::new(fa.get_alphabet_size(), k)?;
    let total = strings.total();

    let mut visited = 0;
    let mut rejected = None;

    for string in strings {
        visited += 1;
        if !fa.accept(&string) {
            rejected = Some(string);
            break;
        }
    }

    Ok(CheckReport {
        k,
        total,
        visited,
        rejected,
    })
}

/// Prompt for k until 0 or the end of the input, answering each with the verdict for all
/// k-symbol strings. A line may hold several values of k separated by whitespace; words that are
/// not a number are skipped.
pub fn run_interactive<T, R, W>(fa: &T, input: R, output: &mut W) -> std::io::Result<()>
where
    T: FA + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(output, "Please, enter k (0 for quit): ")?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        for k in line.split_whitespace().filter_map(|word| word.parse::<usize>().ok()) {
            if k == 0 {
                return Ok(());
            }

            match check_all(fa, k) {
                Ok(report) => writeln!(output, "{}", report.verdict(fa.kind()))?,
                Err(err) => writeln!(output, "{}", err)?,
            }
        }
    }

    Ok(())
}
