//! The word list used to validate candidate decodes.
//!
//! The dictionary can be built from an in-memory string (needed for WebAssembly,
//! where there is no filesystem) or loaded from a path on native builds.
//!
//! Parsing rules:
//! - One word per line; surrounding whitespace is trimmed.
//! - Empty lines are skipped.
//! - Words are normalized to lowercase.
//! - Words containing anything other than ASCII letters and digits are skipped,
//!   because text is tokenized on alphanumeric runs and such a word could never
//!   be looked up.
//! - Duplicates collapse.
//!
//! A `Dictionary` is immutable once built. A cracking session loads it once and
//! every search branch borrows it read-only.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::alphabet::letter_to_pos;
use crate::errors::CrackError;
use crate::key_map::KeyMap;
use crate::pattern::PatternSignature;

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
    /// Words grouped by length, each group sorted alphabetically.
    by_len: HashMap<usize, Vec<String>>,
}

impl Dictionary {
    /// Parse a newline-delimited word list.
    ///
    /// This is **WASM-safe** because it doesn't touch the filesystem.
    #[must_use]
    pub fn parse_from_str(contents: &str) -> Dictionary {
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| line.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(str::to_ascii_lowercase)
            .collect()
    }

    /// Native-only convenience method: read from a file path and parse.
    ///
    /// # Errors
    ///
    /// `DictionaryUnavailable` if the file cannot be read. Callers must abandon the
    /// dictionary-backed attempt; reading again will not help.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Dictionary, CrackError> {
        let path_ref = path.as_ref();
        let data = std::fs::read_to_string(path_ref).map_err(|source| CrackError::DictionaryUnavailable {
            path: path_ref.to_path_buf(),
            source,
        })?;

        let dictionary = Self::parse_from_str(&data);
        log::debug!("loaded {} words from '{}'", dictionary.len(), path_ref.display());
        Ok(dictionary)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All words, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }

    /// Case-insensitive membership.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        if word.bytes().any(|b| b.is_ascii_uppercase()) {
            self.words.contains(&word.to_ascii_lowercase())
        } else {
            self.words.contains(word)
        }
    }

    /// All words of length `len`, sorted.
    #[must_use]
    pub fn words_of_len(&self, len: usize) -> &[String] {
        self.by_len.get(&len).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether every alphanumeric token of `text` is a dictionary word.
    ///
    /// Stops at the first unknown token.
    #[must_use]
    pub fn all_words_known(&self, text: &str) -> bool {
        text.split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|token| !token.is_empty())
            .all(|token| self.contains(token))
    }

    /// Dictionary words that `ciphered_word` could decrypt to under `key`.
    ///
    /// A word qualifies when it has the same length and letter pattern, every
    /// cipher letter the key already decides decrypts to exactly the word's letter
    /// at that position, and every undecided position holds a plain letter the key
    /// has not already claimed.
    ///
    /// A single survivor pins down all of the word's letters, which lets callers
    /// extend the key without enumerating permutations.
    #[must_use]
    pub fn candidates_for_pattern(&self, ciphered_word: &str, key: &KeyMap) -> Vec<&str> {
        let cipher: Option<Vec<u8>> = ciphered_word.chars().map(letter_to_pos).collect();
        let Some(cipher) = cipher else {
            // non-letters in a ciphered word can't be constrained by a key
            return Vec::new();
        };

        let inverse = key.inverse();
        let signature = PatternSignature::of(ciphered_word);

        self.words_of_len(cipher.len())
            .iter()
            .filter(|word| {
                word.bytes().zip(&cipher).all(|(w, &c)| {
                    let Some(p) = letter_to_pos(w as char) else {
                        return false;
                    };
                    match inverse[c as usize] {
                        Some(known) => known == p,
                        None => !key.is_plain_mapped(p),
                    }
                })
            })
            .filter(|word| PatternSignature::of(word) == signature)
            .map(String::as_str)
            .collect()
    }
}

impl FromIterator<String> for Dictionary {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let words: HashSet<String> = iter.into_iter().collect();

        let mut by_len: HashMap<usize, Vec<String>> = HashMap::new();
        for word in &words {
            by_len.entry(word.len()).or_default().push(word.clone());
        }
        for group in by_len.values_mut() {
            group.sort_unstable();
        }

        Dictionary { words, by_len }
    }
}

impl<'a> FromIterator<&'a str> for Dictionary {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_ascii_lowercase).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_basic() {
        let dictionary = Dictionary::parse_from_str("cat\ndog\nbird");
        assert_eq!(dictionary.len(), 3);
        assert!(dictionary.contains("dog"));
    }

    #[test]
    fn test_parse_normalizes_to_lowercase() {
        let dictionary = Dictionary::parse_from_str("CAT\nDog\nbIRD");
        assert!(dictionary.contains("cat"));
        assert!(dictionary.contains("dog"));
        assert!(dictionary.contains("bird"));
        assert!(dictionary.contains("BIRD"));
    }

    #[test]
    fn test_parse_deduplicates() {
        let dictionary = Dictionary::parse_from_str("cat\nCat\ncat\ndog");
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.words_of_len(3), ["cat", "dog"]);

        let mut all: Vec<&str> = dictionary.iter().collect();
        all.sort_unstable();
        assert_eq!(all, ["cat", "dog"]);
    }

    #[test]
    fn test_parse_skips_empty_and_whitespace() {
        let dictionary = Dictionary::parse_from_str("  cat  \n\n\n  dog\n\n");
        assert_eq!(dictionary.len(), 2);
    }

    #[test]
    fn test_parse_skips_non_alphanumeric_words() {
        let dictionary = Dictionary::parse_from_str("don't\nco-op\nfine\nr2d2");
        assert_eq!(dictionary.len(), 2);
        assert!(dictionary.contains("fine"));
        assert!(dictionary.contains("r2d2"));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(Dictionary::parse_from_str("").is_empty());
    }

    #[test]
    fn test_words_of_len_sorted() {
        let dictionary = Dictionary::parse_from_str("zebra\napple\nmango\nab");
        assert_eq!(dictionary.words_of_len(5), ["apple", "mango", "zebra"]);
        assert!(dictionary.words_of_len(9).is_empty());
    }

    #[test]
    fn test_all_words_known() {
        let dictionary = Dictionary::parse_from_str("hola\nmundo");
        assert!(dictionary.all_words_known("Hola, mundo!"));
        assert!(dictionary.all_words_known("   "));
        assert!(!dictionary.all_words_known("hola amigo"));
        assert!(!dictionary.all_words_known("hola 42"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha\nbeta\ngamma").unwrap();
        let dictionary = Dictionary::load_from_path(file.path()).unwrap();
        assert_eq!(dictionary.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Dictionary::load_from_path("/definitely/not/here/words.txt").unwrap_err();
        assert!(matches!(err, CrackError::DictionaryUnavailable { .. }));
        assert_eq!(err.code(), "C001");
    }

    #[test]
    fn test_candidates_for_pattern_without_key() {
        let dictionary = Dictionary::parse_from_str("llamo\nllave\nllama\nhello\nmucho\nallow");
        // UUAVW has pattern 0,0,1,2,3; "llama" is 0,0,1,2,1
        assert_eq!(dictionary.candidates_for_pattern("UUAVW", &KeyMap::new()), ["llamo", "llave"]);
    }

    #[test]
    fn test_candidates_for_pattern_respects_known_letters() {
        let dictionary = Dictionary::parse_from_str("llamo\nllave\nllama\nhello\nmucho\nallow");
        let mut key = KeyMap::new();
        key.set('w', 'o').unwrap();
        assert_eq!(dictionary.candidates_for_pattern("UUAVW", &key), ["llamo"]);
    }

    #[test]
    fn test_candidates_for_pattern_excludes_claimed_letters() {
        let dictionary = Dictionary::parse_from_str("llamo\nllave\nllama");
        let mut key = KeyMap::new();
        // 'o' is already the plain letter of some other cipher letter
        key.set('q', 'o').unwrap();
        assert_eq!(dictionary.candidates_for_pattern("UUAVW", &key), ["llave"]);
    }

    #[test]
    fn test_candidates_for_pattern_rejects_non_letters() {
        let dictionary = Dictionary::parse_from_str("r2d2");
        assert!(dictionary.candidates_for_pattern("x2y2", &KeyMap::new()).is_empty());
    }
}
