use std::ops::RangeInclusive;

// Character-set constants
pub const ALPHABET_SIZE: usize = 26;
pub(crate) const LOWERCASE_ALPHABET: RangeInclusive<char> = 'a'..='z';
#[cfg(test)]
pub(crate) const UPPERCASE_ALPHABET: RangeInclusive<char> = 'A'..='Z';

/// English letters from most to least frequent.
pub const ENGLISH_FREQUENCY_ORDER: &str = "etaoinshrdlcumwfgypbvkjxqz";

/// Rendered in place of a letter whose image under a partial key is unknown.
pub const PLACEHOLDER: char = '_';

/// Alphabet position (0-25) of an ASCII letter, case-folded.
#[inline]
#[must_use]
pub fn letter_to_pos(c: char) -> Option<u8> {
    if c.is_ascii_alphabetic() {
        Some(c.to_ascii_lowercase() as u8 - b'a')
    } else {
        None
    }
}

/// Lowercase letter for an alphabet position.
///
/// # Panics
/// Panics if `pos` is not in `0..26`. Positions only come from `letter_to_pos` or
/// loops over `0..ALPHABET_SIZE`, so an out-of-range value is a programming error.
#[inline]
#[must_use]
pub fn pos_to_letter(pos: u8) -> char {
    assert!((pos as usize) < ALPHABET_SIZE, "alphabet position out of range: {pos}");
    (b'a' + pos) as char
}

pub(crate) trait CipherChar {
    fn alphabet_pos(&self) -> Option<u8>;
    /// Give `letter` the same case as `self`.
    fn with_case_of_self(&self, letter: char) -> char;
}

impl CipherChar for char {
    fn alphabet_pos(&self) -> Option<u8> {
        letter_to_pos(*self)
    }

    fn with_case_of_self(&self, letter: char) -> char {
        if self.is_ascii_uppercase() {
            letter.to_ascii_uppercase()
        } else {
            letter.to_ascii_lowercase()
        }
    }
}

/// Split text into maximal runs of ASCII letters.
pub(crate) fn letter_runs(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|run| !run.is_empty())
}
