//! Letter-frequency analysis.
//!
//! [`rank`] orders the letters of a ciphertext by how often they occur;
//! [`seed_key_by_frequency`] lines that ranking up against a reference order
//! (by default [`ENGLISH_FREQUENCY_ORDER`]) to guess a key.
//!
//! The guess is a starting point only. Short texts rarely follow the reference
//! distribution, so callers must validate anything built on it.

use std::fmt;

use crate::alphabet::{letter_to_pos, pos_to_letter, ALPHABET_SIZE, ENGLISH_FREQUENCY_ORDER};
use crate::key_map::KeyMap;

/// Letters of a text with their counts, most frequent first.
///
/// Only letters that occur are listed. Equal counts are ordered alphabetically,
/// so ranking the same text twice always gives the same result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrequencyRanking(Vec<(char, usize)>);

impl FrequencyRanking {
    #[must_use]
    pub fn entries(&self) -> &[(char, usize)] {
        &self.0
    }

    /// The ranked letters without their counts.
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().map(|&(letter, _)| letter)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().map(|&(_, n)| n).sum()
    }
}

impl fmt::Display for FrequencyRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(letter, n)| format!("{letter}:{n}")).collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Count case-folded letters in `text`, ignoring everything else.
#[must_use]
pub fn rank(text: &str) -> FrequencyRanking {
    let mut counts = [0usize; ALPHABET_SIZE];
    for pos in text.chars().filter_map(letter_to_pos) {
        counts[pos as usize] += 1;
    }

    let mut ranked: Vec<(char, usize)> = (0u8..)
        .zip(counts)
        .filter(|&(_, n)| n > 0)
        .map(|(pos, n)| (pos_to_letter(pos), n))
        .collect();

    // stable sort keeps alphabetical order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    FrequencyRanking(ranked)
}

/// Extend `base` by pairing ranked cipher letters with `reference` plain letters.
///
/// Walks the ranking from most to least frequent. Cipher letters `base` already
/// decides are skipped, and so are reference letters `base` already uses as a
/// plain letter. At most `letter_budget` new pairs are added (`None` means no
/// limit). Reference characters that are not letters are ignored.
#[must_use]
pub fn seed_key_by_frequency(
    ranking: &FrequencyRanking,
    reference: &str,
    base: &KeyMap,
    letter_budget: Option<usize>,
) -> KeyMap {
    let mut key = *base;
    let budget = letter_budget.unwrap_or(ALPHABET_SIZE);
    let mut plain_letters = reference.chars().filter_map(letter_to_pos);
    let mut added = 0;

    for cipher in ranking.letters() {
        if added >= budget {
            break;
        }
        if key.plain_for(cipher).is_some() {
            continue;
        }
        let Some(c) = letter_to_pos(cipher) else { continue };

        // next reference letter that is still free
        let Some(p) = plain_letters.by_ref().find(|&p| !key.is_plain_mapped(p)) else {
            break;
        };
        if key.set_pos(c, p).is_ok() {
            added += 1;
        }
    }

    log::debug!("frequency seeding added {added} pair(s) to a key of {}", base.len());
    key
}

/// [`seed_key_by_frequency`] against English with no base key and no budget.
#[must_use]
pub fn english_seed(text: &str) -> KeyMap {
    seed_key_by_frequency(&rank(text), ENGLISH_FREQUENCY_ORDER, &KeyMap::new(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_counts_case_folded_letters() {
        let ranking = rank("Hello, World!");
        assert_eq!(ranking.entries()[0], ('l', 3));
        assert_eq!(ranking.entries()[1], ('o', 2));
        assert_eq!(ranking.total(), 10);
        assert!(ranking.letters().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_rank_breaks_ties_alphabetically() {
        let ranking = rank("cba abc zz");
        assert_eq!(ranking.entries(), [('a', 2), ('b', 2), ('c', 2), ('z', 2)]);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let text = "Gsv jfrxp yildm ulc qfnkh levi gsv ozab wlt";
        assert_eq!(rank(text), rank(text));
        assert_eq!(rank(text).to_string(), rank(text).to_string());
    }

    #[test]
    fn test_rank_ignores_non_letters() {
        assert!(rank("123 !?").is_empty());
        assert_eq!(rank("a1a").entries(), [('a', 2)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(rank("abb").to_string(), "b:2 a:1");
    }

    #[test]
    fn test_seed_pairs_by_rank() {
        let key = english_seed("xxx yy z");
        assert_eq!(key.plain_for('x'), Some('e'));
        assert_eq!(key.plain_for('y'), Some('t'));
        assert_eq!(key.plain_for('z'), Some('a'));
        assert_eq!(key.len(), 3);
    }

    #[test]
    fn test_seed_skips_letters_fixed_by_base() {
        let mut base = KeyMap::new();
        // the clue says cipher y is plain e
        base.set('y', 'e').unwrap();
        let key = seed_key_by_frequency(&rank("xxx yy z"), ENGLISH_FREQUENCY_ORDER, &base, None);
        assert_eq!(key.plain_for('y'), Some('e'));
        // 'e' is taken, so the most frequent letter gets the next reference letter
        assert_eq!(key.plain_for('x'), Some('t'));
        assert_eq!(key.plain_for('z'), Some('a'));
    }

    #[test]
    fn test_seed_respects_budget() {
        let key = seed_key_by_frequency(&rank("xxx yy z"), ENGLISH_FREQUENCY_ORDER, &KeyMap::new(), Some(2));
        assert_eq!(key.len(), 2);
        assert_eq!(key.plain_for('z'), None);
    }

    #[test]
    fn test_seed_with_zero_budget_returns_base() {
        let mut base = KeyMap::new();
        base.set('q', 'a').unwrap();
        let key = seed_key_by_frequency(&rank("xyz"), ENGLISH_FREQUENCY_ORDER, &base, Some(0));
        assert_eq!(key, base);
    }

    #[test]
    fn test_seed_runs_out_of_reference_letters() {
        let key = seed_key_by_frequency(&rank("xxx yy z"), "e", &KeyMap::new(), None);
        assert_eq!(key.len(), 1);
        assert_eq!(key.plain_for('x'), Some('e'));
    }
}
