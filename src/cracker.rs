//! Cracking entry points.
//!
//! Three ways to attack a ciphertext:
//!
//! - [`crack_with_clue_brute_force`]: a known word fixes part of the key and the
//!   rest is searched exhaustively. Exact, and the only mode that can report
//!   every valid decode.
//! - [`crack_with_clue_and_frequency_seed`]: the clue's partial key is extended
//!   with words only one dictionary entry fits, then with a letter-frequency
//!   guess. Fast but heuristic.
//! - [`crack_with_frequency`]: the same heuristic without a clue.
//!
//! # Examples
//!
//! ```
//! use monocrack::cracker;
//! use monocrack::dictionary::Dictionary;
//! use monocrack::search::SearchConfig;
//!
//! let dictionary = Dictionary::parse_from_str("mucho\ngusto\nme\nllamo\nromel\nbrawlio");
//! let outcome = cracker::crack_with_clue_brute_force(
//!     "VIRFW EIXYW VD UUAVW JWVDU QJAMUSW",
//!     "BRAWLIO",
//!     &dictionary,
//!     &SearchConfig::default(),
//! )?;
//!
//! let cracked = outcome.best().expect("the clue pins down a decode");
//! assert_eq!(cracked.plaintext, "MUCHO GUSTO ME LLAMO ROMEL BRAWLIO");
//! assert_eq!(cracker::encrypt(&cracked.key, "mucho"), "virfw");
//! # Ok::<(), monocrack::errors::CrackError>(())
//! ```
//!
//! A frequency attempt always returns something; `validated` says whether to
//! trust it:
//!
//! ```
//! use monocrack::cracker;
//! use monocrack::dictionary::Dictionary;
//!
//! let dictionary = Dictionary::parse_from_str("hello");
//! let guess = cracker::crack_with_frequency("abc def", None, &dictionary);
//! assert!(!guess.validated);
//! assert_eq!(guess.plaintext, "eta oin");
//! ```

use log::{debug, info};

use crate::alphabet::ENGLISH_FREQUENCY_ORDER;
use crate::clue::clue_candidates;
use crate::dictionary::Dictionary;
use crate::errors::CrackError;
use crate::frequency::{rank, seed_key_by_frequency, FrequencyRanking};
use crate::key_map::KeyMap;
use crate::search::{refine_with_dictionary, SearchConfig, SearchCoordinator, SearchOutcome};

/// Result of a brute-force crack. See [`SearchOutcome::best`].
pub type CrackOutcome = SearchOutcome;

/// Best guess of a frequency-seeded attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyCrack {
    /// Decryption under `key`; undecided letters are shown as `_`.
    pub plaintext: String,
    /// Possibly partial key.
    pub key: KeyMap,
    /// True iff every word of `plaintext` is in the dictionary.
    pub validated: bool,
    /// Ciphertext token read as the clue, if a clue placement was used.
    pub token: Option<String>,
}

/// Encrypt `text` under `key`, preserving case and non-letters.
#[must_use]
pub fn encrypt(key: &KeyMap, text: &str) -> String {
    key.encrypt(text)
}

/// Decrypt `text` under `key`, preserving case and non-letters.
#[must_use]
pub fn decrypt(key: &KeyMap, text: &str) -> String {
    key.decrypt(text)
}

/// Crack `ciphertext` given a word known to occur in its plaintext.
///
/// Every ciphertext token that could encrypt `clue` is tried as its own branch.
/// A clue that fits no token, or that is not a single alphabetic word, gives an
/// `Exhausted` outcome.
///
/// # Errors
///
/// `WorkerPool` if `config` asks for a thread pool that cannot be built.
pub fn crack_with_clue_brute_force(
    ciphertext: &str,
    clue: &str,
    dictionary: &Dictionary,
    config: &SearchConfig,
) -> Result<CrackOutcome, CrackError> {
    let candidates = clue_candidates(ciphertext, clue);
    info!("clue '{}' fits {} ciphertext token(s)", clue.trim(), candidates.len());

    SearchCoordinator::new(ciphertext, dictionary, config.clone()).run(&candidates)
}

/// Guess a key from a clue, unique dictionary fits and letter frequencies.
///
/// For each placement of the clue: extend its key with every ciphertext word
/// that only one dictionary word fits (repeating until nothing changes), then
/// add at most `letter_budget` pairs from English letter frequencies. A
/// validated guess wins; otherwise the guess whose dictionary pass decided the
/// most letters, earliest placement first. Without any placement this is
/// [`crack_with_frequency`].
#[must_use]
pub fn crack_with_clue_and_frequency_seed(
    ciphertext: &str,
    clue: &str,
    letter_budget: Option<usize>,
    dictionary: &Dictionary,
) -> FrequencyCrack {
    let candidates = clue_candidates(ciphertext, clue);
    if candidates.is_empty() {
        info!("clue '{}' fits no token; falling back to frequencies alone", clue.trim());
        return crack_with_frequency(ciphertext, letter_budget, dictionary);
    }

    let ranking = rank(ciphertext);
    let mut best: Option<(usize, FrequencyCrack)> = None;
    for candidate in candidates {
        let (decided, guess) = seeded_guess(
            ciphertext,
            &candidate.key,
            Some(candidate.token),
            &ranking,
            letter_budget,
            dictionary,
        );
        if guess.validated {
            return guess;
        }
        if best.as_ref().map_or(true, |(most, _)| decided > *most) {
            best = Some((decided, guess));
        }
    }

    // candidates was non-empty, so best is set
    best.map(|(_, guess)| guess)
        .unwrap_or_else(|| crack_with_frequency(ciphertext, letter_budget, dictionary))
}

/// Guess a key from unique dictionary fits and letter frequencies alone.
#[must_use]
pub fn crack_with_frequency(ciphertext: &str, letter_budget: Option<usize>, dictionary: &Dictionary) -> FrequencyCrack {
    let ranking = rank(ciphertext);
    debug!("ciphertext frequencies: {ranking}");
    seeded_guess(ciphertext, &KeyMap::new(), None, &ranking, letter_budget, dictionary).1
}

/// Returns how many pairs the dictionary pass had decided, and the guess.
fn seeded_guess(
    ciphertext: &str,
    base: &KeyMap,
    token: Option<String>,
    ranking: &FrequencyRanking,
    letter_budget: Option<usize>,
    dictionary: &Dictionary,
) -> (usize, FrequencyCrack) {
    let refined = refine_with_dictionary(ciphertext, base, dictionary);
    let key = seed_key_by_frequency(ranking, ENGLISH_FREQUENCY_ORDER, &refined, letter_budget);
    let plaintext = key.decrypt(ciphertext);
    let validated = dictionary.all_words_known(&plaintext);

    debug!(
        "placement {:?}: {} pair(s) from clue, {} after dictionary, {} after frequencies; validated={validated}",
        token,
        base.len(),
        refined.len(),
        key.len()
    );

    (
        refined.len(),
        FrequencyCrack {
            plaintext,
            key,
            validated,
            token,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchStatus;

    const CIPHERTEXT: &str = "VIRFW EIXYW VD UUAVW JWVDU QJAMUSW";
    const PLAINTEXT: &str = "MUCHO GUSTO ME LLAMO ROMEL BRAWLIO";

    fn plaintext_words() -> Dictionary {
        Dictionary::parse_from_str("mucho\ngusto\nme\nllamo\nromel\nbrawlio")
    }

    #[test]
    fn test_brute_force_recovers_plaintext() {
        let dictionary = plaintext_words();
        let config = SearchConfig { parallel: false, ..SearchConfig::default() };
        let outcome = crack_with_clue_brute_force(CIPHERTEXT, "BRAWLIO", &dictionary, &config).unwrap();
        assert_eq!(outcome.status, SearchStatus::Found);
        let cracked = outcome.best().unwrap();
        assert_eq!(cracked.plaintext, PLAINTEXT);
        assert_eq!(encrypt(&cracked.key, PLAINTEXT), CIPHERTEXT);
    }

    #[test]
    fn test_brute_force_with_unplaceable_clue_is_exhausted() {
        let dictionary = plaintext_words();
        let outcome =
            crack_with_clue_brute_force(CIPHERTEXT, "extraordinary", &dictionary, &SearchConfig::default()).unwrap();
        assert_eq!(outcome.status, SearchStatus::Exhausted);
        assert_eq!(outcome.branches, 0);
        assert!(outcome.best().is_none());
    }

    #[test]
    fn test_frequency_seed_with_clue_validates() {
        let dictionary = plaintext_words();
        let guess = crack_with_clue_and_frequency_seed(CIPHERTEXT, "brawlio", None, &dictionary);
        assert!(guess.validated);
        assert_eq!(guess.plaintext, PLAINTEXT);
        assert_eq!(guess.token.as_deref(), Some("qjamusw"));
    }

    #[test]
    fn test_frequency_without_clue_uses_unique_fits() {
        // every word has exactly one dictionary fit once its neighbours are known
        let dictionary = plaintext_words();
        let guess = crack_with_frequency(CIPHERTEXT, None, &dictionary);
        assert!(guess.validated);
        assert_eq!(guess.plaintext, PLAINTEXT);
        assert!(guess.token.is_none());
    }

    #[test]
    fn test_frequency_guess_not_validated() {
        let dictionary = Dictionary::parse_from_str("hello");
        let guess = crack_with_frequency("abc def", None, &dictionary);
        assert!(!guess.validated);
        assert_eq!(guess.plaintext, "eta oin");
        assert_eq!(guess.key.len(), 6);
    }

    #[test]
    fn test_frequency_budget_leaves_placeholders() {
        let dictionary = Dictionary::parse_from_str("hello");
        let guess = crack_with_frequency("abc def", Some(2), &dictionary);
        assert_eq!(guess.plaintext, "et_ ___");
        assert!(!guess.validated);
    }

    #[test]
    fn test_frequency_seed_falls_back_without_placement() {
        let dictionary = Dictionary::parse_from_str("hello");
        let with_clue = crack_with_clue_and_frequency_seed("abc def", "zebra", None, &dictionary);
        assert_eq!(with_clue, crack_with_frequency("abc def", None, &dictionary));
    }

    #[test]
    fn test_encrypt_decrypt_wrappers() {
        let key = KeyMap::from_cipher_alphabet("qwertyuiopasdfghjklzxcvbnm").unwrap();
        assert_eq!(decrypt(&key, &encrypt(&key, "Attack at Dawn!")), "Attack at Dawn!");
    }
}
