//! Partial keys forced by a known plaintext word.
//!
//! If the clue "brawlio" appears in the message, its ciphertext image is one of
//! the seven-letter tokens that repeat letters the same way "brawlio" does. Each
//! such token, aligned letter by letter with the clue, forces part of the key.
//! Every distinct token becomes one [`ClueCandidate`], and each candidate is an
//! independent branch of the search.

use std::collections::HashSet;

use log::{debug, warn};

use crate::alphabet::letter_runs;
use crate::errors::CrackError;
use crate::key_map::KeyMap;
use crate::pattern::is_compatible;

/// One way of placing the clue in the ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueCandidate {
    /// The ciphertext token assumed to encrypt the clue (lowercase).
    pub token: String,
    /// The key forced by aligning the clue with `token`.
    pub key: KeyMap,
    /// Plain letters the clue leaves undecided.
    pub remaining_plain: Vec<char>,
    /// Cipher letters the clue leaves unused.
    pub remaining_cipher: Vec<char>,
}

/// Lowercase alphabetic tokens of `text`, in order of appearance, duplicates kept.
#[must_use]
pub fn tokens(text: &str) -> Vec<String> {
    letter_runs(text).map(str::to_ascii_lowercase).collect()
}

/// The key forced by reading `token` as the encryption of `clue`.
///
/// # Errors
///
/// `KeyConflict` if the two words do not align one-to-one, `InvalidLetter` if
/// either contains a non-letter.
pub fn align(clue: &str, token: &str) -> Result<KeyMap, CrackError> {
    let mut key = KeyMap::new();
    for (plain, cipher) in clue.chars().zip(token.chars()) {
        key.set(cipher, plain)?;
    }
    Ok(key)
}

/// Every distinct ciphertext token that could encrypt `clue`, with its forced key.
///
/// Tokens of the wrong length or letter pattern are dropped, repeated tokens are
/// tried once (first occurrence wins the ordering), and any token whose
/// alignment breaks the bijection is skipped. An empty or non-alphabetic clue
/// matches nothing.
#[must_use]
pub fn clue_candidates(ciphertext: &str, clue: &str) -> Vec<ClueCandidate> {
    let clue = clue.trim().to_ascii_lowercase();
    if clue.is_empty() || !clue.chars().all(|c| c.is_ascii_alphabetic()) {
        warn!("clue {clue:?} is not a single alphabetic word; no candidates");
        return Vec::new();
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for token in tokens(ciphertext) {
        if token.len() != clue.len() || !is_compatible(&clue, &token) {
            continue;
        }
        if !seen.insert(token.clone()) {
            continue;
        }

        match align(&clue, &token) {
            Ok(key) => {
                debug!("clue candidate '{token}' forces {key}");
                candidates.push(ClueCandidate {
                    remaining_plain: key.unmapped_plain(),
                    remaining_cipher: key.unused_cipher(),
                    token,
                    key,
                });
            }
            Err(e) => {
                // compatible patterns always align
                debug!("skipping clue candidate '{token}': {e}");
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    const CIPHERTEXT: &str = "VIRFW EIXYW VD UUAVW JWVDU QJAMUSW";

    #[test]
    fn test_tokens() {
        assert_eq!(tokens("Ab, cD! e"), ["ab", "cd", "e"]);
        assert!(tokens("123 ...").is_empty());
    }

    #[test]
    fn test_align_forces_key() {
        let key = align("brawlio", "qjamusw").unwrap();
        assert_eq!(key.len(), 7);
        assert_eq!(key.plain_for('q'), Some('b'));
        assert_eq!(key.cipher_for('o'), Some('w'));
    }

    #[test]
    fn test_align_detects_conflict() {
        // the clue repeats 'l' where the token does not repeat
        assert!(matches!(align("all", "xyz"), Err(CrackError::KeyConflict { .. })));
    }

    #[test]
    fn test_single_candidate() {
        let candidates = clue_candidates(CIPHERTEXT, "BRAWLIO");
        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.token, "qjamusw");
        assert_eq!(candidate.remaining_plain.len(), 19);
        assert_eq!(candidate.remaining_cipher.len(), 19);
        assert!(!candidate.remaining_plain.contains(&'b'));
        assert!(!candidate.remaining_cipher.contains(&'q'));
    }

    #[test]
    fn test_pattern_filters_tokens() {
        // "llamo" only fits UUAVW among the five-letter tokens
        let candidates = clue_candidates(CIPHERTEXT, "llamo");
        let found: Vec<&str> = candidates.iter().map(|c| c.token.as_str()).collect();
        assert_eq!(found, ["uuavw"]);
    }

    #[test]
    fn test_repeated_tokens_deduplicated() {
        let candidates = clue_candidates("abc XYZ abc Abc xyz", "the");
        let found: Vec<&str> = candidates.iter().map(|c| c.token.as_str()).collect();
        assert_eq!(found, ["abc", "xyz"]);
    }

    #[test]
    fn test_clue_longer_than_any_word() {
        assert!(clue_candidates(CIPHERTEXT, "extraordinarily").is_empty());
    }

    #[test]
    fn test_degenerate_clues() {
        assert!(clue_candidates(CIPHERTEXT, "").is_empty());
        assert!(clue_candidates(CIPHERTEXT, "   ").is_empty());
        assert!(clue_candidates(CIPHERTEXT, "me2").is_empty());
    }
}
