//! Letter-repetition patterns.
//!
//! Two words can only be substitution images of each other when they repeat
//! letters in exactly the same places. "LETTER" and "BOSSOM" both reduce to
//! `0,1,2,2,1,3`; "ABBA" (`0,1,1,0`) and "XYYZ" (`0,1,1,2`) do not agree.
//!
//! Comparing first-occurrence signatures checks the correspondence in both
//! directions at once: equal signatures mean `a[i] == a[j]` exactly when
//! `b[i] == b[j]`, for every pair of positions.

use std::fmt;

/// A word reduced to the first-occurrence index of each of its letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternSignature(Vec<u8>);

impl PatternSignature {
    /// Build the signature of `word`, case-folded.
    ///
    /// Characters are compared as written (after ASCII lowercasing), so
    /// non-letters take part in the pattern like any other symbol.
    #[must_use]
    pub fn of(word: &str) -> Self {
        let mut seen: Vec<char> = Vec::with_capacity(word.len());
        let symbols = word
            .chars()
            .map(|ch| {
                let ch = ch.to_ascii_lowercase();
                let idx = seen.iter().position(|&s| s == ch).unwrap_or_else(|| {
                    seen.push(ch);
                    seen.len() - 1
                });
                // a word has at most 26 distinct letters; anything longer is still
                // compared faithfully up to 255 distinct symbols
                u8::try_from(idx).unwrap_or(u8::MAX)
            })
            .collect();
        PatternSignature(symbols)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct symbols in the word.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.0.iter().max().map_or(0, |&m| m as usize + 1)
    }
}

impl fmt::Display for PatternSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u8::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// True iff `a` and `b` have the same length and repeat letters in the same positions.
#[must_use]
pub fn is_compatible(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count() && PatternSignature::of(a) == PatternSignature::of(b)
}
