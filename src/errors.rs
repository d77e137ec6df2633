//! Error types for key construction, dictionary loading and search setup.
//!
//! # Error Codes
//!
//! Each error variant has a unique code (C001-C007) for documentation lookup:
//!
//! - C001: `DictionaryUnavailable` (Dictionary file missing or unreadable)
//! - C002: `KeyConflict` (Key assignment contradicts an existing one)
//! - C003: `InvalidLetter` (Character is not an ASCII letter)
//! - C004: `InvalidKeyAlphabet` (Key alphabet is not 26 slots)
//! - C005: `KeyFileUnavailable` (Key file missing or unreadable)
//! - C006: `InvalidKeyFile` (Key file contradicts itself (wraps another error))
//! - C007: `WorkerPool` (Search worker pool could not be started)
//!
//! Not everything that goes wrong during a crack is an error. A search that runs
//! out of candidates reports [`crate::search::SearchStatus::Exhausted`], and a letter
//! whose image is unknown decodes to [`crate::alphabet::PLACEHOLDER`].
//!
//! # Examples
//!
//! ```
//! use monocrack::errors::CrackError;
//! use monocrack::key_map::KeyMap;
//!
//! let mut key = KeyMap::new();
//! key.set('x', 'a').unwrap();
//!
//! match key.set('y', 'a') {
//!     Err(e) => {
//!         println!("Error: {}", e);
//!         println!("Code: {}", e.code());
//!         if let Some(help) = e.help() {
//!             println!("Help: {}", help);
//!         }
//!     }
//!     Ok(()) => unreachable!(),
//! }
//! ```

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CrackError {
    #[error("dictionary unavailable at '{}': {source}", path.display())]
    DictionaryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot map cipher '{cipher}' to plain '{plain}': {existing}")]
    KeyConflict {
        cipher: char,
        plain: char,
        existing: String,
    },

    #[error("invalid letter '{letter}' (only A-Z / a-z allowed)")]
    InvalidLetter { letter: char },

    #[error("invalid key alphabet \"{input}\" (expected 26 letters or '_')")]
    InvalidKeyAlphabet { input: String },

    #[error("key file unavailable at '{}': {source}", path.display())]
    KeyFileUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("key file line {line}: {source}")]
    InvalidKeyFile {
        line: usize,
        #[source]
        source: Box<CrackError>,
    },

    #[error("could not start search workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl CrackError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            CrackError::DictionaryUnavailable { .. } => "C001",
            CrackError::KeyConflict { .. } => "C002",
            CrackError::InvalidLetter { .. } => "C003",
            CrackError::InvalidKeyAlphabet { .. } => "C004",
            CrackError::KeyFileUnavailable { .. } => "C005",
            CrackError::InvalidKeyFile { .. } => "C006",
            CrackError::WorkerPool(_) => "C007",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            CrackError::DictionaryUnavailable { .. } => "Dictionary file missing or unreadable",
            CrackError::KeyConflict { .. } => "Key assignment contradicts an existing one",
            CrackError::InvalidLetter { .. } => "Character is not an ASCII letter",
            CrackError::InvalidKeyAlphabet { .. } => "Key alphabet is not 26 slots",
            CrackError::KeyFileUnavailable { .. } => "Key file missing or unreadable",
            CrackError::InvalidKeyFile { .. } => "Key file contradicts itself",
            CrackError::WorkerPool(_) => "Search worker pool could not be started",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            CrackError::DictionaryUnavailable { .. } => "Every dictionary-backed cracking mode needs the word list. The file could not be opened or read, so the attempt was aborted without retrying.",
            CrackError::KeyConflict { .. } => "A substitution key must be one-to-one. The requested pair would give a plain letter two cipher images, or a cipher letter two plain preimages.",
            CrackError::InvalidLetter { .. } => "Keys only relate the 26 letters of the English alphabet. Digits, punctuation and accented letters cannot be mapped.",
            CrackError::InvalidKeyAlphabet { .. } => "A key alphabet lists the cipher letter for a, b, c, ... z in order. Use '_' for a plain letter whose cipher letter is unknown.",
            CrackError::KeyFileUnavailable { .. } => "The key file could not be opened or read.",
            CrackError::InvalidKeyFile { .. } => "A line of the key file maps a letter that an earlier line already mapped differently. Lines that do not look like \"x\": \"y\" are skipped, but contradictions are rejected.",
            CrackError::WorkerPool(_) => "The thread pool used for parallel search could not be created. Retry with --sequential or a smaller --threads value.",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            CrackError::DictionaryUnavailable { .. } => Some("Pass an existing newline-delimited word list with --dictionary <PATH>"),
            CrackError::KeyConflict { .. } => Some("Each plain letter must map to a different cipher letter"),
            CrackError::InvalidLetter { .. } => Some("Only letters A-Z (either case) can appear in a key"),
            CrackError::InvalidKeyAlphabet { .. } => Some("Example: 'qwertyuiopasdfghjklzxcvbnm' or 'q_e_______________________'"),
            CrackError::KeyFileUnavailable { .. } => Some("Check the path passed to --key-file"),
            CrackError::InvalidKeyFile { .. } => Some("Remove the duplicated or contradictory \"x\": \"y\" line"),
            CrackError::WorkerPool(_) => Some("Run the search with --sequential"),
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self {
            CrackError::InvalidKeyFile { source, .. } => {
                // show the outer context, then delegate to the wrapped error
                format!("{} ({})\n  caused by: {}", self, self.code(), source.display_detailed())
            }
            _ => format_error_with_code_and_help(&self.to_string(), self.code(), self.help()),
        }
    }
}

impl From<CrackError> for io::Error {
    fn from(ce: CrackError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, ce.to_string())
    }
}

/// Helper function to format error messages with code and optional help text
pub(crate) fn format_error_with_code_and_help(base_msg: &str, code: &str, help: Option<&str>) -> String {
    if let Some(help_text) = help {
        format!("{base_msg} ({code})\n{help_text}")
    } else {
        format!("{base_msg} ({code})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_errors() -> Vec<CrackError> {
        vec![
            CrackError::DictionaryUnavailable {
                path: PathBuf::from("missing.txt"),
                source: io::Error::new(io::ErrorKind::NotFound, "not found"),
            },
            CrackError::KeyConflict { cipher: 'x', plain: 'a', existing: "a already maps to q".to_string() },
            CrackError::InvalidLetter { letter: '7' },
            CrackError::InvalidKeyAlphabet { input: "abc".to_string() },
            CrackError::KeyFileUnavailable {
                path: PathBuf::from("key.json"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            },
            CrackError::InvalidKeyFile {
                line: 3,
                source: Box::new(CrackError::InvalidLetter { letter: '7' }),
            },
        ]
    }

    #[test]
    fn test_error_codes_and_help() {
        let err = CrackError::InvalidKeyAlphabet { input: "abc".to_string() };
        assert_eq!(err.code(), "C004");
        assert!(err.help().is_some());
        let detailed = err.display_detailed();
        assert!(detailed.contains("C004"));
        assert!(detailed.contains("Example"));
    }

    /// Test that all `CrackError` variants have unique error codes
    #[test]
    fn test_all_error_codes_are_unique() {
        let mut codes = std::collections::HashSet::new();
        for err in sample_errors() {
            let code = err.code();
            assert!(codes.insert(code), "Duplicate error code found: {}", code);
        }
        assert_eq!(codes.len(), 6);
    }

    /// Test that all error codes follow the format C0XX
    #[test]
    fn test_error_code_format() {
        for err in sample_errors() {
            let code = err.code();
            assert_eq!(code.len(), 4, "Error code '{}' should be 4 characters (C0XX)", code);
            assert!(code.starts_with("C0"), "Error code '{}' should start with 'C0'", code);
            assert!(code[1..].parse::<u16>().is_ok(), "Error code '{}' should end with a number", code);
        }
    }

    #[test]
    fn test_help_adds_information() {
        for err in sample_errors() {
            if let Some(help_text) = err.help() {
                assert!(help_text.len() > 10, "Help text for {:?} should be substantial", err);
                assert_ne!(help_text, err.to_string());
            }
            assert!(!err.description().is_empty());
            assert!(err.details().len() > err.description().len());
        }
    }

    #[test]
    fn test_display_detailed_includes_code_and_message() {
        for err in sample_errors() {
            let detailed = err.display_detailed();
            assert!(detailed.contains(err.code()));
            assert!(detailed.contains(&err.to_string()));
        }
    }

    #[test]
    fn test_dictionary_error_names_the_path() {
        let err = CrackError::DictionaryUnavailable {
            path: PathBuf::from("/nope/words.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/words.txt"));
        assert!(msg.contains("No such file"));
    }

    /// Test error chain construction for `InvalidKeyFile`
    #[test]
    fn test_key_file_error_chain() {
        let err = CrackError::InvalidKeyFile {
            line: 4,
            source: Box::new(CrackError::KeyConflict {
                cipher: 'q',
                plain: 'b',
                existing: "q is already the image of a".to_string(),
            }),
        };
        let detailed = err.display_detailed();
        assert!(detailed.contains("line 4"));
        assert!(detailed.contains("C006"));
        assert!(detailed.contains("caused by"));
        assert!(detailed.contains("C002"));
    }

    #[test]
    fn test_into_io_error() {
        let io_err: io::Error = CrackError::InvalidLetter { letter: '#' }.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
        assert!(io_err.to_string().contains('#'));
    }
}
