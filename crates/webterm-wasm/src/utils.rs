use wasm_bindgen::JsValue;

/// Get the current protocol (ws or wss) based on the page protocol
pub fn get_ws_protocol() -> String {
    let location = web_sys::window()
        .and_then(|w| w.location().protocol().ok())
        .unwrap_or_else(|| "http:".to_string());

    ws_protocol_for(&location).to_string()
}

fn ws_protocol_for(page_protocol: &str) -> &'static str {
    if page_protocol == "https:" {
        "wss:"
    } else {
        "ws:"
    }
}

/// Get the current host
pub fn get_host() -> Result<String, JsValue> {
    web_sys::window()
        .and_then(|w| w.location().host().ok())
        .ok_or_else(|| JsValue::from_str("Failed to get host"))
}

/// Build the WebSocket URL for a channel path on the page's host
pub fn build_ws_url(path: &str) -> Result<String, JsValue> {
    let protocol = get_ws_protocol();
    let host = get_host()?;
    Ok(format_ws_url(&protocol, &host, path))
}

fn format_ws_url(protocol: &str, host: &str, path: &str) -> String {
    format!("{}//{}{}", protocol, host, path)
}
