//! Reading and writing keys as `"plain": "cipher"` lines.
//!
//! ```text
//! {
//!   "a": "q",
//!   "b": "w",
//!   "c": "e"
//! }
//! ```
//!
//! Each line holding a quoted letter, a colon and another quoted letter maps the
//! first (plain) to the second (cipher). Case and surrounding whitespace are
//! ignored and a trailing comma is optional. Every other line (braces, blanks,
//! comments) is skipped, so a JSON object written one pair per line is read
//! as-is.

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;
use std::sync::LazyLock;

use fancy_regex::Regex;
use log::debug;

use crate::alphabet::LOWERCASE_ALPHABET;
use crate::errors::CrackError;
use crate::key_map::KeyMap;

/// Matches a `"x": "y"` pair anywhere in a line.
///
/// If a new `LazyLock<Regex>` is added, add it to `wasm::validate_internal_regexes` too.
pub(crate) static KEY_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""\s*([a-zA-Z])\s*"\s*:\s*"\s*([a-zA-Z])\s*"\s*,?"#).unwrap()
});

/// Parse key-file contents.
///
/// This is **WASM-safe** because it doesn't touch the filesystem.
///
/// # Errors
///
/// `InvalidKeyFile` with the 1-based line number if a pair contradicts an
/// earlier one.
pub fn parse_key_file_str(contents: &str) -> Result<KeyMap, CrackError> {
    let mut key = KeyMap::new();

    for (idx, line) in contents.lines().enumerate() {
        let captures = match KEY_PAIR_RE.captures(line) {
            Ok(Some(captures)) => captures,
            Ok(None) => {
                if !is_structural(line) {
                    debug!("key file line {}: no pair in {:?}", idx + 1, line.trim());
                }
                continue;
            }
            Err(e) => {
                debug!("key file line {}: skipped ({e})", idx + 1);
                continue;
            }
        };

        let letter = |group: usize| captures.get(group).and_then(|m| m.as_str().chars().next());
        let (Some(plain), Some(cipher)) = (letter(1), letter(2)) else {
            continue;
        };

        key.set(cipher, plain).map_err(|source| CrackError::InvalidKeyFile {
            line: idx + 1,
            source: Box::new(source),
        })?;
    }

    Ok(key)
}

fn is_structural(line: &str) -> bool {
    matches!(line.trim(), "" | "{" | "}" | "{}")
}

/// Native-only convenience method: read a key file from disk and parse it.
///
/// # Errors
///
/// `KeyFileUnavailable` if the file cannot be read, otherwise as
/// [`parse_key_file_str`].
#[cfg(not(target_arch = "wasm32"))]
pub fn load_key_file<P: AsRef<Path>>(path: P) -> Result<KeyMap, CrackError> {
    let path_ref = path.as_ref();
    let data = std::fs::read_to_string(path_ref).map_err(|source| CrackError::KeyFileUnavailable {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let key = parse_key_file_str(&data)?;
    debug!("loaded {} pair(s) from '{}'", key.len(), path_ref.display());
    Ok(key)
}

/// Render `key` as a JSON object of its mapped pairs, in plain-letter order.
///
/// The output parses back to the same key with [`parse_key_file_str`].
#[must_use]
pub fn render_key_file(key: &KeyMap) -> String {
    let pairs: Vec<String> = LOWERCASE_ALPHABET
        .filter_map(|plain| key.cipher_for(plain).map(|cipher| format!("  \"{plain}\": \"{cipher}\"")))
        .collect();

    if pairs.is_empty() {
        return "{}\n".to_string();
    }
    format!("{{\n{}\n}}\n", pairs.join(",\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_json_style() {
        let key = parse_key_file_str("{\n  \"a\": \"q\",\n  \"b\": \"w\"\n}\n").unwrap();
        assert_eq!(key.len(), 2);
        assert_eq!(key.cipher_for('a'), Some('q'));
        assert_eq!(key.plain_for('w'), Some('b'));
    }

    #[test]
    fn test_parse_tolerates_case_and_spacing() {
        let key = parse_key_file_str("\" H \" :   \" X \"\n\"i\":\"y\",").unwrap();
        assert_eq!(key.cipher_for('h'), Some('x'));
        assert_eq!(key.cipher_for('i'), Some('y'));
    }

    #[test]
    fn test_parse_skips_junk_lines() {
        let contents = "# my key\n\"a\": \"q\"\nnot a pair\n\"b\" = \"w\"\n\"cc\": \"e\"\n";
        let key = parse_key_file_str(contents).unwrap();
        assert_eq!(key.len(), 1);
        assert_eq!(key.cipher_for('a'), Some('q'));
    }

    #[test]
    fn test_parse_rejects_contradiction() {
        let err = parse_key_file_str("\"a\": \"q\"\n\"b\": \"q\"\n").unwrap_err();
        match &err {
            CrackError::InvalidKeyFile { line, source } => {
                assert_eq!(*line, 2);
                assert!(matches!(**source, CrackError::KeyConflict { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.code(), "C006");
    }

    #[test]
    fn test_repeated_identical_pair_is_fine() {
        let key = parse_key_file_str("\"a\": \"q\"\n\"A\": \"Q\"\n").unwrap();
        assert_eq!(key.len(), 1);
    }

    #[test]
    fn test_render_parses_back() {
        let key = KeyMap::from_cipher_alphabet("qwertyuiopasdfghjklzxcvbnm").unwrap();
        let rendered = render_key_file(&key);
        assert!(rendered.starts_with("{\n  \"a\": \"q\",\n"));
        assert!(rendered.ends_with("  \"z\": \"m\"\n}\n"));
        assert_eq!(parse_key_file_str(&rendered).unwrap(), key);
    }

    #[test]
    fn test_render_empty_key() {
        assert_eq!(render_key_file(&KeyMap::new()), "{}\n");
    }

    #[test]
    fn test_load_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\n  \"h\": \"x\"\n}}\n").unwrap();
        let key = load_key_file(file.path()).unwrap();
        assert_eq!(key.cipher_for('h'), Some('x'));
    }

    #[test]
    fn test_load_missing_key_file() {
        let err = load_key_file("/definitely/not/here/key.json").unwrap_err();
        assert!(matches!(err, CrackError::KeyFileUnavailable { .. }));
        assert_eq!(err.code(), "C005");
    }
}
