//! WASM bindings for normalize-editable.
//!
//! Exposes [`Normalize`] for keeping a contenteditable region in a
//! consistent block structure from JavaScript/TypeScript apps.

mod normalize;
mod types;

pub use normalize::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Route `tracing` output to the browser console.
///
/// `level` is one of `trace`, `debug`, `info`, `warn` or `error`, defaulting
/// to `debug` in debug builds and `info` otherwise. Calling this more than
/// once keeps the first subscriber.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) -> Result<(), JsError> {
    let level = match level.as_deref() {
        Some(s) => s
            .parse::<tracing::Level>()
            .map_err(|e| JsError::new(&format!("Invalid log level {s:?}: {}", e)))?,
        None if cfg!(debug_assertions) => tracing::Level::DEBUG,
        None => tracing::Level::INFO,
    };
    install_subscriber(level);
    Ok(())
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
fn install_subscriber(level: tracing::Level) {
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(level)
            .build(),
    );

    let reg = Registry::default().with(wasm_layer);

    let _ = set_global_default(reg);
}

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
fn install_subscriber(_level: tracing::Level) {}
