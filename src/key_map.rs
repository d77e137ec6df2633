use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::alphabet::{letter_to_pos, pos_to_letter, CipherChar, ALPHABET_SIZE, PLACEHOLDER};
use crate::errors::CrackError;

/// A full or partial monoalphabetic substitution key.
///
/// The canonical direction is plain → cipher: `slots[p]` holds the cipher letter
/// that plain letter `p` encrypts to. The cipher → plain direction is derived by
/// [`KeyMap::inverse`] whenever it is needed.
///
/// `used` is a bitset of the cipher letters already taken, so the bijection check
/// in [`KeyMap::set`] does not have to scan the slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyMap {
    slots: [Option<u8>; ALPHABET_SIZE],
    used: u32,
}

#[inline]
fn pos_of(letter: char) -> Result<u8, CrackError> {
    letter_to_pos(letter).ok_or(CrackError::InvalidLetter { letter })
}

impl KeyMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `cipher` is the encryption of `plain`.
    ///
    /// Setting a pair that is already present is a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidLetter` if either argument is not an ASCII letter, `KeyConflict` if
    /// `plain` already encrypts to another letter or `cipher` is already the image
    /// of another plain letter.
    pub fn set(&mut self, cipher: char, plain: char) -> Result<(), CrackError> {
        let c = pos_of(cipher)?;
        let p = pos_of(plain)?;
        self.set_pos(c, p)
    }

    pub(crate) fn set_pos(&mut self, c: u8, p: u8) -> Result<(), CrackError> {
        match self.slots[p as usize] {
            Some(existing) if existing == c => return Ok(()),
            Some(existing) => {
                return Err(CrackError::KeyConflict {
                    cipher: pos_to_letter(c),
                    plain: pos_to_letter(p),
                    existing: format!(
                        "'{}' already encrypts to '{}'",
                        pos_to_letter(p),
                        pos_to_letter(existing)
                    ),
                });
            }
            None => {}
        }

        if self.used & (1 << c) != 0 {
            let owner = self.plain_pos_for(c).map_or(PLACEHOLDER, pos_to_letter);
            return Err(CrackError::KeyConflict {
                cipher: pos_to_letter(c),
                plain: pos_to_letter(p),
                existing: format!("'{}' is already the image of '{owner}'", pos_to_letter(c)),
            });
        }

        self.slots[p as usize] = Some(c);
        self.used |= 1 << c;
        Ok(())
    }

    /// Pair `plain[i]` with `cipher[i]` for every `i` and return the extended key.
    ///
    /// The caller chooses the permutation; this is how one point of the search
    /// space is materialized.
    ///
    /// # Errors
    ///
    /// Propagates the first `InvalidLetter` or `KeyConflict`.
    pub fn complete_with(&self, plain: &[char], cipher: &[char]) -> Result<KeyMap, CrackError> {
        debug_assert_eq!(plain.len(), cipher.len(), "letter lists must pair up");
        let mut key = *self;
        for (&p, &c) in plain.iter().zip(cipher) {
            key.set(c, p)?;
        }
        Ok(key)
    }

    /// Pair every unmapped plain letter with every unused cipher letter, both in
    /// ascending order, so the result is a complete bijection.
    #[must_use]
    pub fn fill_remaining(&self) -> KeyMap {
        let mut key = *self;
        let free_cipher = self.unused_cipher_pos();
        for (p, c) in self.unmapped_plain_pos().into_iter().zip(free_cipher) {
            key.slots[p as usize] = Some(c);
            key.used |= 1 << c;
        }
        debug_assert!(key.is_complete());
        key
    }

    /// Parse a 26-slot cipher alphabet: slot `i` is the cipher letter for plain letter `i`.
    /// `_` leaves a slot unset.
    ///
    /// # Errors
    ///
    /// `InvalidKeyAlphabet` if the input does not have 26 slots, `InvalidLetter` for
    /// any other character, `KeyConflict` if a cipher letter repeats.
    pub fn from_cipher_alphabet(alphabet: &str) -> Result<KeyMap, CrackError> {
        let trimmed = alphabet.trim();
        if trimmed.chars().count() != ALPHABET_SIZE {
            return Err(CrackError::InvalidKeyAlphabet { input: trimmed.to_string() });
        }

        let mut key = KeyMap::new();
        for (p, ch) in (0u8..).zip(trimmed.chars()) {
            if ch == PLACEHOLDER {
                continue;
            }
            key.set_pos(pos_of(ch)?, p)?;
        }
        Ok(key)
    }

    /// The 26-slot cipher alphabet, `_` for unset slots.
    #[must_use]
    pub fn cipher_alphabet(&self) -> String {
        self.slots
            .iter()
            .map(|slot| slot.map_or(PLACEHOLDER, pos_to_letter))
            .collect()
    }

    #[must_use]
    pub fn cipher_for(&self, plain: char) -> Option<char> {
        let p = letter_to_pos(plain)?;
        self.slots[p as usize].map(pos_to_letter)
    }

    #[must_use]
    pub fn plain_for(&self, cipher: char) -> Option<char> {
        let c = letter_to_pos(cipher)?;
        self.plain_pos_for(c).map(pos_to_letter)
    }

    fn plain_pos_for(&self, c: u8) -> Option<u8> {
        if self.used & (1 << c) == 0 {
            return None;
        }
        (0u8..).zip(self.slots.iter()).find_map(|(p, slot)| (*slot == Some(c)).then_some(p))
    }

    /// Cipher → plain table derived from the canonical slots.
    #[must_use]
    pub fn inverse(&self) -> [Option<u8>; ALPHABET_SIZE] {
        let mut inverse = [None; ALPHABET_SIZE];
        for (p, slot) in (0u8..).zip(self.slots.iter()) {
            if let Some(c) = slot {
                inverse[*c as usize] = Some(p);
            }
        }
        inverse
    }

    pub(crate) fn is_cipher_used(&self, c: u8) -> bool {
        self.used & (1 << c) != 0
    }

    pub(crate) fn is_plain_mapped(&self, p: u8) -> bool {
        self.slots[p as usize].is_some()
    }

    pub(crate) fn unmapped_plain_pos(&self) -> Vec<u8> {
        (0u8..).zip(self.slots.iter()).filter(|(_, s)| s.is_none()).map(|(p, _)| p).collect()
    }

    pub(crate) fn unused_cipher_pos(&self) -> Vec<u8> {
        (0..ALPHABET_SIZE as u8).filter(|&c| !self.is_cipher_used(c)).collect()
    }

    /// Plain letters that have no cipher letter yet.
    #[must_use]
    pub fn unmapped_plain(&self) -> Vec<char> {
        self.unmapped_plain_pos().into_iter().map(pos_to_letter).collect()
    }

    /// Cipher letters that are not yet the image of any plain letter.
    #[must_use]
    pub fn unused_cipher(&self) -> Vec<char> {
        self.unused_cipher_pos().into_iter().map(pos_to_letter).collect()
    }

    /// Number of mapped pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.used.count_ones() as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.len() == ALPHABET_SIZE
    }

    /// Encrypt `text`, preserving case and passing non-letters through.
    /// Letters with no cipher image become [`PLACEHOLDER`].
    #[must_use]
    pub fn encrypt(&self, text: &str) -> String {
        transform(text, &self.slots)
    }

    /// Decrypt `text`, preserving case and passing non-letters through.
    /// Letters with no plain preimage become [`PLACEHOLDER`].
    #[must_use]
    pub fn decrypt(&self, text: &str) -> String {
        transform(text, &self.inverse())
    }
}

fn transform(text: &str, table: &[Option<u8>; ALPHABET_SIZE]) -> String {
    text.chars()
        .map(|ch| match ch.alphabet_pos() {
            Some(pos) => match table[pos as usize] {
                Some(mapped) => ch.with_case_of_self(pos_to_letter(mapped)),
                None => PLACEHOLDER,
            },
            None => ch,
        })
        .collect()
}

impl Display for KeyMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = (0u8..)
            .zip(self.slots.iter())
            .filter_map(|(p, slot)| slot.map(|c| format!("{}→{}", pos_to_letter(p), pos_to_letter(c))))
            .collect();
        write!(f, "[{}]", pairs.join(", "))
    }
}

impl FromStr for KeyMap {
    type Err = CrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyMap::from_cipher_alphabet(s)
    }
}
