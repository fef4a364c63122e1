use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;
use webterm_shell::{DisplaySurface, FitSurface, TerminalSize};

// xterm.js and its fit addon, loaded by the page as UMD globals
#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    pub type Terminal;

    #[wasm_bindgen(constructor, catch)]
    fn new(options: &JsValue) -> Result<Terminal, JsValue>;

    #[wasm_bindgen(method)]
    fn open(this: &Terminal, parent: &HtmlElement);

    #[wasm_bindgen(method)]
    fn write(this: &Terminal, data: &str);

    #[wasm_bindgen(method)]
    fn writeln(this: &Terminal, data: &str);

    #[wasm_bindgen(method)]
    fn clear(this: &Terminal);

    #[wasm_bindgen(method)]
    fn focus(this: &Terminal);

    #[wasm_bindgen(method)]
    fn dispose(this: &Terminal);

    #[wasm_bindgen(method, js_name = onData)]
    pub fn on_data(this: &Terminal, listener: &Closure<dyn FnMut(String)>) -> Disposable;

    #[wasm_bindgen(method, js_name = loadAddon)]
    fn load_addon(this: &Terminal, addon: &FitAddon);

    #[wasm_bindgen(method, getter)]
    fn cols(this: &Terminal) -> u16;

    #[wasm_bindgen(method, getter)]
    fn rows(this: &Terminal) -> u16;
}

#[wasm_bindgen]
extern "C" {
    /// Handle returned by xterm.js event registrations
    pub type Disposable;

    #[wasm_bindgen(method, js_name = dispose)]
    pub fn unsubscribe(this: &Disposable);
}

#[wasm_bindgen]
extern "C" {
    /// Instance of the fit addon, see `new_fit_addon`
    #[derive(Clone)]
    type FitAddon;

    #[wasm_bindgen(method, catch)]
    fn fit(this: &FitAddon) -> Result<(), JsValue>;
}

/// The UMD bundle exposes the addon class as `FitAddon.FitAddon`
fn new_fit_addon() -> Result<FitAddon, JsValue> {
    let global = js_sys::global();
    let namespace = js_sys::Reflect::get(&global, &JsValue::from_str("FitAddon"))?;
    let class = js_sys::Reflect::get(&namespace, &JsValue::from_str("FitAddon"))?;
    let class = class
        .dyn_into::<js_sys::Function>()
        .map_err(|_| JsValue::from_str("FitAddon.FitAddon is not loaded"))?;
    let addon = js_sys::Reflect::construct(&class, &js_sys::Array::new())?;
    Ok(addon.unchecked_into())
}

/// Display surface backed by an xterm.js terminal
#[derive(Clone)]
pub struct XtermSurface {
    terminal: Terminal,
    fit_addon: FitAddon,
}

impl XtermSurface {
    /// Create a terminal inside `container` and fit it once
    pub fn open(container: &HtmlElement, options: &serde_json::Value) -> Result<Self, JsValue> {
        let options = js_sys::JSON::parse(&options.to_string())?;
        let terminal = Terminal::new(&options)
            .map_err(|e| JsValue::from_str(&format!("Failed to create xterm.js terminal: {:?}", e)))?;
        let fit_addon = new_fit_addon()
            .map_err(|e| JsValue::from_str(&format!("Failed to create fit addon: {:?}", e)))?;

        terminal.load_addon(&fit_addon);
        terminal.open(container);

        let mut surface = Self {
            terminal,
            fit_addon,
        };
        surface.fit();
        Ok(surface)
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }
}

impl DisplaySurface for XtermSurface {
    fn write(&mut self, data: &str) {
        self.terminal.write(data);
    }

    fn write_line(&mut self, data: &str) {
        self.terminal.writeln(data);
    }

    fn clear(&mut self) {
        // xterm.js keeps the cursor row on clear(), wipe it as well
        self.terminal.clear();
        self.terminal.write("\x1b[2K\r");
    }

    fn columns(&self) -> usize {
        self.terminal.cols() as usize
    }

    fn focus(&mut self) {
        self.terminal.focus();
    }

    fn dispose(&mut self) {
        self.terminal.dispose();
    }
}

impl FitSurface for XtermSurface {
    fn fit(&mut self) -> Option<TerminalSize> {
        if let Err(e) = self.fit_addon.fit() {
            log::warn!("Terminal fit failed: {:?}", e);
            return None;
        }
        let size = TerminalSize {
            cols: self.terminal.cols(),
            rows: self.terminal.rows(),
        };
        // Container not laid out yet
        if size.cols == 0 || size.rows == 0 {
            return None;
        }
        Some(size)
    }
}
