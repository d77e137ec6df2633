//! Monoalphabetic substitution cipher cracking.
//!
//! Start with [`cracker`] for the cracking modes; [`key_map::KeyMap`] is the key
//! type everything else passes around.

// Library API shared by the CLI and WASM builds
pub mod alphabet;
pub mod clue;
pub mod cracker;
pub mod dictionary;
pub mod errors;
pub mod frequency;
pub mod key_file;
pub mod key_map;
pub mod log;
pub mod pattern;
pub mod search;

// Compile the wasm glue only when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;
