use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod dispatcher;
mod dom;
mod local_shell;
mod remote;
mod utils;
mod xterm;

pub use local_shell::LocalShell;
pub use remote::RemoteTerminal;

/// Initialize the WASM module
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("webterm WASM initialized");
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
