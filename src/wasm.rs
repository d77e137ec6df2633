use crate::cracker::{crack_with_clue_and_frequency_seed, crack_with_clue_brute_force, crack_with_frequency, FrequencyCrack};
use crate::dictionary::Dictionary;
use crate::errors::CrackError;
use crate::key_map::KeyMap;
use crate::log::init_logger;
use crate::search::{Cracked, SearchConfig, SearchStatus};
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// Structured error information for JavaScript consumers
#[derive(serde::Serialize)]
struct WasmError {
    /// Error code (e.g., "C002", "WASM001")
    code: String,
    message: String,
    description: String,
    details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
}

impl From<CrackError> for WasmError {
    fn from(e: CrackError) -> Self {
        // key-file errors are reported by their underlying cause
        let shown = match &e {
            CrackError::InvalidKeyFile { source, .. } => source.as_ref(),
            other => other,
        };
        WasmError {
            code: shown.code().to_string(),
            message: e.to_string(),
            description: shown.description().to_string(),
            details: shown.details().to_string(),
            help: shown.help().map(str::to_string),
        }
    }
}

impl From<WasmError> for JsValue {
    fn from(e: WasmError) -> Self {
        let mut msg = format!("Error {}: {}", e.code, e.message);
        if !e.details.is_empty() {
            msg.push_str(&format!("\n\n{}", e.details));
        }
        if let Some(help) = e.help {
            msg.push_str(&format!("\n\nSuggestion: {help}"));
        }
        js_sys::Error::new(&msg).into()
    }
}

fn serialization_error(what: &str, e: &serde_wasm_bindgen::Error) -> JsValue {
    WasmError {
        code: "WASM002".to_string(),
        message: format!("serialization failed: {e}"),
        description: format!("Failed to serialize {what}"),
        details: format!("The {what} could not be converted to JavaScript format."),
        help: Some("This is an internal error. Please report this issue.".to_string()),
    }
    .into()
}

/// Accepts a `string[]` of words.
fn dictionary_from_js(words: JsValue) -> Result<Dictionary, JsValue> {
    let words: Vec<String> = serde_wasm_bindgen::from_value(words).map_err(|e| WasmError {
        code: "WASM001".to_string(),
        message: format!("dictionary must be string[]: {e}"),
        description: "Invalid dictionary format".to_string(),
        details: "The dictionary parameter must be a JavaScript array of strings.".to_string(),
        help: Some("Pass the result of parse_dictionary(), or an array such as ['hola', 'mundo']".to_string()),
    })?;
    Ok(Dictionary::parse_from_str(&words.join("\n")))
}

/// Force compilation of every `LazyLock<Regex>` so a bad pattern fails at startup.
///
/// If you add a new `LazyLock<Regex>` anywhere in the crate, add it here.
fn validate_internal_regexes() {
    let _ = &*crate::key_file::KEY_PAIR_RE;
    log::debug!("internal regex patterns validated");
}

/// Set up panic reporting, regex validation and logging.
///
/// Must be called from JavaScript after the module loads.
#[wasm_bindgen]
pub fn initialize(debug_enabled: bool) {
    console_error_panic_hook::set_once();
    validate_internal_regexes();
    init_logger(debug_enabled);
    log::info!("monocrack WASM module initialized");
}

#[derive(serde::Serialize)]
struct WasmCracked {
    plaintext: String,
    /// 26-letter cipher alphabet
    key: String,
    token: String,
}

impl From<&Cracked> for WasmCracked {
    fn from(c: &Cracked) -> Self {
        WasmCracked {
            plaintext: c.plaintext.clone(),
            key: c.key.cipher_alphabet(),
            token: c.token.clone(),
        }
    }
}

#[derive(serde::Serialize)]
struct WasmCrackResult {
    results: Vec<WasmCracked>,
    status: String,
    keys_checked: u64,
}

#[derive(serde::Serialize)]
struct WasmFrequencyResult {
    plaintext: String,
    key: String,
    validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl From<FrequencyCrack> for WasmFrequencyResult {
    fn from(f: FrequencyCrack) -> Self {
        WasmFrequencyResult {
            key: f.key.cipher_alphabet(),
            plaintext: f.plaintext,
            validated: f.validated,
            token: f.token,
        }
    }
}

/// JS entry: brute-force crack with a clue word.
///
/// Runs single-threaded. Returns `{ results, status, keys_checked }` where
/// `status` is `"found"`, `"exhausted"` or `"timed_out"`.
#[wasm_bindgen]
pub fn crack_wasm(
    ciphertext: &str,
    clue: &str,
    dictionary: JsValue,
    collect_all: bool,
    time_limit_ms: Option<u32>,
) -> Result<JsValue, JsValue> {
    let dictionary = dictionary_from_js(dictionary)?;
    let config = SearchConfig {
        parallel: false,
        threads: None,
        time_limit: time_limit_ms.map(|ms| Duration::from_millis(u64::from(ms))),
        collect_all,
    };

    let outcome = crack_with_clue_brute_force(ciphertext, clue, &dictionary, &config).map_err(WasmError::from)?;

    let status = match outcome.status {
        SearchStatus::Found => "found",
        SearchStatus::Exhausted => "exhausted",
        SearchStatus::TimedOut { .. } => "timed_out",
    };
    let result = WasmCrackResult {
        results: outcome.results.iter().map(WasmCracked::from).collect(),
        status: status.to_string(),
        keys_checked: outcome.keys_checked,
    };

    serde_wasm_bindgen::to_value(&result).map_err(|e| serialization_error("crack result", &e))
}

/// JS entry: frequency-seeded guess, with or without a clue.
#[wasm_bindgen]
pub fn frequency_crack_wasm(
    ciphertext: &str,
    clue: Option<String>,
    letter_budget: Option<usize>,
    dictionary: JsValue,
) -> Result<JsValue, JsValue> {
    let dictionary = dictionary_from_js(dictionary)?;
    let guess = match clue.as_deref() {
        Some(clue) => crack_with_clue_and_frequency_seed(ciphertext, clue, letter_budget, &dictionary),
        None => crack_with_frequency(ciphertext, letter_budget, &dictionary),
    };
    serde_wasm_bindgen::to_value(&WasmFrequencyResult::from(guess))
        .map_err(|e| serialization_error("frequency result", &e))
}

/// JS entry: encrypt `text` with a 26-slot cipher alphabet (`_` = unset).
#[wasm_bindgen]
pub fn encrypt_wasm(key_alphabet: &str, text: &str) -> Result<String, JsValue> {
    let key = KeyMap::from_cipher_alphabet(key_alphabet).map_err(WasmError::from)?;
    Ok(key.encrypt(text))
}

/// JS entry: decrypt `text` with a 26-slot cipher alphabet (`_` = unset).
#[wasm_bindgen]
pub fn decrypt_wasm(key_alphabet: &str, text: &str) -> Result<String, JsValue> {
    let key = KeyMap::from_cipher_alphabet(key_alphabet).map_err(WasmError::from)?;
    Ok(key.decrypt(text))
}

/// Normalize a newline-separated word list and return it as a sorted `string[]`.
#[wasm_bindgen]
pub fn parse_dictionary(text: &str) -> Result<JsValue, JsValue> {
    let dictionary = Dictionary::parse_from_str(text);
    let mut words: Vec<&str> = dictionary.iter().collect();
    words.sort_unstable();
    serde_wasm_bindgen::to_value(&words).map_err(|e| serialization_error("dictionary", &e))
}

/// Generate a debug report users can paste into an issue.
#[wasm_bindgen]
pub fn get_debug_info(ciphertext: &str, clue: &str, error_message: &str, dictionary_size: usize) -> String {
    use std::fmt::Write;
    let mut report = String::new();

    // writing to a String never fails
    let _ = writeln!(&mut report, "=== MONOCRACK DEBUG REPORT ===");
    let _ = writeln!(&mut report, "Version: {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));
    let _ = writeln!(
        &mut report,
        "Generated: {}",
        js_sys::Date::new_0().to_iso_string().as_string().unwrap_or_else(|| "unknown".to_string())
    );
    let _ = writeln!(&mut report);

    let _ = writeln!(&mut report, "## Error");
    let _ = writeln!(&mut report, "{error_message}");
    let _ = writeln!(&mut report);

    let _ = writeln!(&mut report, "## Input");
    let _ = writeln!(&mut report, "Ciphertext: {ciphertext}");
    let _ = writeln!(&mut report, "Clue: {clue}");
    let _ = writeln!(&mut report, "Dictionary Size: {dictionary_size}");
    let _ = writeln!(&mut report);

    let _ = writeln!(&mut report, "## Environment");
    if let Some(window) = web_sys::window() {
        if let Ok(user_agent) = window.navigator().user_agent() {
            let _ = writeln!(&mut report, "User Agent: {user_agent}");
        }
        let _ = writeln!(
            &mut report,
            "Location: {}",
            window.location().href().unwrap_or_else(|_| "unknown".to_string())
        );
    }
    let _ = writeln!(&mut report);
    let _ = writeln!(&mut report, "=== END DEBUG REPORT ===");

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_debug_info_structure() {
        let report = get_debug_info("VD UUAVW", "llamo", "something broke", 42);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "=== MONOCRACK DEBUG REPORT ===");
        assert!(lines[1].starts_with(&format!("Version: {}", env!("CARGO_PKG_VERSION"))));
        assert!(lines[2].starts_with("Generated: "));
        assert_eq!(lines[4], "## Error");
        assert_eq!(lines[5], "something broke");
        let input_idx = lines.iter().position(|&l| l == "## Input").unwrap();
        assert_eq!(lines[input_idx + 1], "Ciphertext: VD UUAVW");
        assert_eq!(lines[input_idx + 2], "Clue: llamo");
        assert_eq!(lines[input_idx + 3], "Dictionary Size: 42");
        assert_eq!(lines.last(), Some(&"=== END DEBUG REPORT ==="));
    }

    #[test]
    fn test_wasm_error_unwraps_key_file_cause() {
        let inner = CrackError::KeyConflict { cipher: 'q', plain: 'b', existing: "taken".to_string() };
        let err = WasmError::from(CrackError::InvalidKeyFile { line: 3, source: Box::new(inner) });
        assert_eq!(err.code, "C002");
        assert!(err.message.contains("line 3"));
    }

    #[test]
    fn test_all_regexes_validated() {
        // crate::key_file::KEY_PAIR_RE is the only static regex
        validate_internal_regexes();
    }
}
