//! Generate error code documentation from `CrackError` itself.
//!
//! Codes, descriptions, details and help text come straight from the
//! `code()`, `description()`, `details()` and `help()` methods, so the
//! reference cannot drift from the code.
//!
//! Run with:
//! ```bash
//! cargo run --bin generate_error_docs > docs/ERROR_CODES.md
//! ```

use std::fmt::Write;
use std::io;
use std::path::PathBuf;

use monocrack::errors::CrackError;

/// One example of every `CrackError` variant.
fn all_error_variants() -> Vec<CrackError> {
    let mut errors = vec![
        CrackError::DictionaryUnavailable {
            path: PathBuf::from("data/words.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        },
        CrackError::KeyConflict {
            cipher: 'q',
            plain: 'e',
            existing: "'q' is already the image of 'a'".to_string(),
        },
        CrackError::InvalidLetter { letter: '7' },
        CrackError::InvalidKeyAlphabet { input: "qwerty".to_string() },
        CrackError::KeyFileUnavailable {
            path: PathBuf::from("key.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        },
        CrackError::InvalidKeyFile {
            line: 4,
            source: Box::new(CrackError::KeyConflict {
                cipher: 'q',
                plain: 'e',
                existing: "'q' is already the image of 'a'".to_string(),
            }),
        },
    ];

    // rayon only hands out this error from a failed build, e.g. a second global pool
    let _ = rayon::ThreadPoolBuilder::new().num_threads(1).build_global();
    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(1).build_global() {
        errors.push(CrackError::WorkerPool(e));
    }

    errors
}

fn render_error(out: &mut String, error: &CrackError) -> std::fmt::Result {
    writeln!(out, "### {}: {}\n", error.code(), error.description())?;
    writeln!(out, "**Details:** {}\n", error.details())?;

    if let Some(help_text) = error.help() {
        writeln!(out, "**How to fix:**")?;
        writeln!(out, "```\n{help_text}\n```\n")?;
    }

    writeln!(out, "**Example error message:**")?;
    writeln!(out, "```\n{error}\n```\n")?;
    writeln!(out, "**Detailed format:**")?;
    writeln!(out, "```\n{}\n```\n", error.display_detailed())?;
    writeln!(out, "---\n")
}

fn render_docs() -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# Error Code Reference\n")?;
    writeln!(out, "**⚠️ This document is auto-generated from the source code. Do not edit manually.**\n")?;

    writeln!(out, "## Errors\n")?;
    writeln!(
        out,
        "Errors from key construction, file loading and search setup. A search that finds nothing is not an error.\n"
    )?;
    for error in all_error_variants() {
        render_error(&mut out, &error)?;
    }

    writeln!(out, "## How to Use Error Codes\n")?;
    writeln!(out, "When you see an error like:\n")?;
    writeln!(out, "```")?;
    writeln!(out, "Error: invalid letter '7' (only A-Z / a-z allowed) (C003)")?;
    writeln!(out, "Only letters A-Z (either case) can appear in a key")?;
    writeln!(out, "```\n")?;
    writeln!(out, "1. Note the error code (e.g., `C003`)")?;
    writeln!(out, "2. Look it up in this document for detailed explanation")?;
    writeln!(out, "3. Follow the suggested resolution steps")?;
    Ok(out)
}

fn main() {
    match render_docs() {
        Ok(docs) => print!("{docs}"),
        Err(e) => {
            eprintln!("Error: could not render error docs: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_documented_once() {
        let docs = render_docs().unwrap();
        for code in ["C001", "C002", "C003", "C004", "C005", "C006"] {
            assert_eq!(
                docs.matches(&format!("### {code}:")).count(),
                1,
                "{code} should have exactly one section"
            );
        }
    }

    #[test]
    fn test_sections_have_help() {
        let docs = render_docs().unwrap();
        let sections = docs.matches("### C0").count();
        assert_eq!(docs.matches("**How to fix:**").count(), sections);
        assert!(sections >= 6);
    }
}
