//! Morse symbols, in-progress sequences and decoded text.
//!
//! The lookup table covers the 26 letters A–Z. Anything else resolves to
//! `None` and is shown as an empty value.

use std::fmt;
use std::str::FromStr;


use crate::error::{Error, Result};

/// Morse code for the letters A–Z.
const MORSE_TABLE: [(&str, char); 26] = [
    (".-", 'A'),
    ("-...", 'B'),
    ("-.-.", 'C'),
    ("-..", 'D'),
    (".", 'E'),
    ("..-.", 'F'),
    ("--.", 'G'),
    ("....", 'H'),
    ("..", 'I'),
    (".---", 'J'),
    ("-.-", 'K'),
    (".-..", 'L'),
    ("--", 'M'),
    ("-.", 'N'),
    ("---", 'O'),
    (".--.", 'P'),
    ("--.-", 'Q'),
    (".-.", 'R'),
    ("...", 'S'),
    ("-", 'T'),
    ("..-", 'U'),
    ("...-", 'V'),
    (".--", 'W'),
    ("-..-", 'X'),
    ("-.--", 'Y'),
    ("--..", 'Z'),
];

/// Resolve a Morse string such as `".-"` to its letter.
#[must_use]
pub fn lookup(code: &str) -> Option<char> {
    MORSE_TABLE
        .iter()
        .find(|(pattern, _)| *pattern == code)
        .map(|(_, letter)| *letter)
}

/// All table entries, in alphabetical order.
#[must_use]
pub fn table() -> &'static [(&'static str, char)] {
    &MORSE_TABLE
}

/// A single Morse unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Short blink.
    Dot,
    /// Long blink.
    Dash,
}

impl Symbol {
    /// The character used to render this symbol.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Dot => '.',
            Self::Dash => '-',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Symbol {
    type Error = char;

    fn try_from(c: char) -> std::result::Result<Self, char> {
        match c {
            '.' => Ok(Self::Dot),
            '-' => Ok(Self::Dash),
            other => Err(other),
        }
    }
}

/// The symbols of the letter currently being blinked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SymbolSequence {
    symbols: Vec<Symbol>,
}

impl SymbolSequence {
    /// Create an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol.
    pub fn push(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    /// Remove all symbols.
    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    /// Number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the sequence has no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The symbols in order.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Resolve the whole sequence against the letter table.
    ///
    /// Empty and unmapped sequences return `None`.
    #[must_use]
    pub fn resolve(&self) -> Option<char> {
        if self.is_empty() {
            return None;
        }
        lookup(&self.to_string())
    }
}

impl fmt::Display for SymbolSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

impl FromStr for SymbolSequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let symbols = s
            .chars()
            .map(|c| {
                Symbol::try_from(c).map_err(|symbol| Error::InvalidSymbol {
                    symbol,
                    input: s.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { symbols })
    }
}

impl FromIterator<Symbol> for SymbolSequence {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

/// One committed unit of decoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// A letter resolved from the table.
    Letter(char),
    /// A sequence the table has no entry for. Renders as nothing.
    Unrecognized,
    /// A pause long enough to separate words. Renders as a space.
    WordBreak,
}

impl Glyph {
    /// Build a glyph from a resolution result.
    #[must_use]
    pub fn from_resolved(letter: Option<char>) -> Self {
        letter.map_or(Self::Unrecognized, Self::Letter)
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Letter(c) => write!(f, "{c}"),
            Self::Unrecognized => Ok(()),
            Self::WordBreak => write!(f, " "),
        }
    }
}

/// Append-only decoded output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedText {
    glyphs: Vec<Glyph>,
}

impl DecodedText {
    /// Create empty decoded text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a glyph.
    pub fn push(&mut self, glyph: Glyph) {
        self.glyphs.push(glyph);
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.glyphs.clear();
    }

    /// The committed glyphs in order.
    #[must_use]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// The most recently committed glyph.
    #[must_use]
    pub fn last(&self) -> Option<Glyph> {
        self.glyphs.last().copied()
    }

    /// Whether nothing has been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl fmt::Display for DecodedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for glyph in &self.glyphs {
            write!(f, "{glyph}")?;
        }
        Ok(())
    }
}
