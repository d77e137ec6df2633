//! Logger setup shared by the CLI and the WebAssembly build.

#[cfg(not(target_arch = "wasm32"))]
use log::LevelFilter;

/// Install the global logger.
///
/// - **Native:** `env_logger` writing to stderr at `Debug` when `debug_enabled`,
///   otherwise `Info`. `RUST_LOG`, if set, overrides the level.
/// - **WASM:** `console_log` at `Debug` or `Info` likewise.
///
/// Calling this twice is harmless; the second call keeps the first logger.
pub fn init_logger(debug_enabled: bool) {
    #[cfg(target_arch = "wasm32")]
    {
        let level = if debug_enabled { log::Level::Debug } else { log::Level::Info };

        if let Err(e) = console_log::init_with_level(level) {
            // keep running without logs rather than failing the module
            let msg = format!("monocrack: console logger unavailable ({e})");
            web_sys::console::error_1(&msg.into());
            return;
        }
        log::debug!("console logger at {level:?}");
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let level = if debug_enabled { LevelFilter::Debug } else { LevelFilter::Info };

        let mut builder = env_logger::Builder::new();
        builder
            .filter(None, level)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false);

        if let Ok(filters) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }

        if builder.try_init().is_ok() {
            log::debug!("logger at {level:?}");
        }
    }
}
