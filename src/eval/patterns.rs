//! Line patterns and their weights
//!
//! A pattern is a short sequence over three symbols, written with `O` for an
//! own stone, `.` for an empty cell and anything else for "not mine, not
//! empty". The table keys are fixed when it is built; only weights change.

/// One cell of a line window, seen from the side being scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Own,
    Empty,
    Other,
}

impl Symbol {
    /// Decode pattern notation. Anything but `O` and `.` is `Other`.
    #[inline]
    pub fn from_notation(ch: char) -> Symbol {
        match ch {
            'O' => Symbol::Own,
            '.' => Symbol::Empty,
            _ => Symbol::Other,
        }
    }

    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Symbol::Own => 'O',
            Symbol::Empty => '.',
            Symbol::Other => 'X',
        }
    }
}

/// Base weights, strongest first. Found empirically; only the order of
/// magnitude between groups matters.
pub const BASE_WEIGHTS: [(&str, f64); 11] = [
    ("OOOOO", 1_000_000.0), // five
    (".OOOO.", 50_000.0),   // open four
    ("OOO.O", 10_000.0),    // gapped four
    ("O.OOO", 10_000.0),    // gapped four
    (".OOO.", 5_000.0),     // open three
    (".OO.", 1_000.0),      // open two
    ("O.O.O", 500.0),
    (".O.", 100.0),
    ("OO...", 50.0),
    ("...OO", 50.0),
    ("O....O", 30.0),
];

/// A fixed symbol sequence searched for inside line windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    notation: &'static str,
    symbols: Vec<Symbol>,
}

impl Pattern {
    pub fn new(notation: &'static str) -> Self {
        Self {
            notation,
            symbols: notation.chars().map(Symbol::from_notation).collect(),
        }
    }

    #[inline]
    pub fn notation(&self) -> &'static str {
        self.notation
    }

    /// Number of non-overlapping occurrences in `line`, scanning left to
    /// right and resuming after each match.
    pub fn count_in(&self, line: &[Symbol]) -> usize {
        let n = self.symbols.len();
        if n == 0 || line.len() < n {
            return 0;
        }
        let mut count = 0;
        let mut i = 0;
        while i + n <= line.len() {
            if line[i..i + n] == self.symbols[..] {
                count += 1;
                i += n;
            } else {
                i += 1;
            }
        }
        count
    }
}

/// Pattern → weight mapping read by the evaluator and tuned after each game.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternWeightTable {
    entries: Vec<(Pattern, f64)>,
}

impl PatternWeightTable {
    /// Build a table from notation/weight pairs. Key order is kept.
    pub fn from_weights(weights: &[(&'static str, f64)]) -> Self {
        Self {
            entries: weights
                .iter()
                .map(|&(notation, w)| (Pattern::new(notation), w))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weight for a pattern by notation
    pub fn get(&self, notation: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(p, _)| p.notation() == notation)
            .map(|&(_, w)| w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pattern, f64)> {
        self.entries.iter().map(|(p, w)| (p, *w))
    }

    /// Multiply every weight by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for (_, w) in &mut self.entries {
            *w *= factor;
        }
    }

    /// Sum of `occurrences × weight` over all patterns.
    pub fn line_score(&self, line: &[Symbol]) -> f64 {
        self.entries
            .iter()
            .map(|(p, w)| p.count_in(line) as f64 * w)
            .sum()
    }
}

impl Default for PatternWeightTable {
    fn default() -> Self {
        Self::from_weights(&BASE_WEIGHTS)
    }
}
