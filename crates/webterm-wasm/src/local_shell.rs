use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use webterm_shell::{Dispatcher, Shell, ShellConfig};

use crate::dispatcher::JsDispatcher;
use crate::dom;
use crate::xterm::{Disposable, XtermSurface};

/// Line-editing shell mounted in a page element
#[wasm_bindgen]
pub struct LocalShell {
    shell: Rc<Shell>,
    subscription: Option<(Disposable, Closure<dyn FnMut(String)>)>,
}

#[wasm_bindgen]
impl LocalShell {
    /// Mount a shell inside the element with id `container_id`
    ///
    /// `config_json` is an optional JSON `ShellConfig`. Commands go to
    /// `dispatch` when given, otherwise they are accepted and ignored.
    pub fn mount(
        container_id: &str,
        config_json: Option<String>,
        dispatch: Option<js_sys::Function>,
    ) -> Result<LocalShell, JsValue> {
        let config = ShellConfig::from_json(config_json.as_deref())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let document = crate::document()?;
        let container = dom::get_html_element_by_id(&document, container_id)?;
        let surface = XtermSurface::open(&container, &config.terminal)?;

        let dispatcher = dispatch.map(|f| Rc::new(JsDispatcher::new(f)) as Rc<dyn Dispatcher>);
        let shell = Rc::new(Shell::mount(Box::new(surface.clone()), &config, dispatcher));

        let weak = Rc::downgrade(&shell);
        let on_data = Closure::wrap(Box::new(move |data: String| {
            if let Some(shell) = weak.upgrade() {
                shell.handle_input(&data);
            }
        }) as Box<dyn FnMut(String)>);
        let disposable = surface.terminal().on_data(&on_data);

        log::info!("Local shell mounted in #{}", container_id);

        Ok(LocalShell {
            shell,
            subscription: Some((disposable, on_data)),
        })
    }

    /// Stop listening for input and dispose the terminal
    pub fn unmount(&mut self) {
        if let Some((disposable, _closure)) = self.subscription.take() {
            disposable.unsubscribe();
        }
        self.shell.unmount();
    }

    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool {
        self.shell.is_mounted()
    }

    /// Submitted commands, oldest first
    pub fn history(&self) -> js_sys::Array {
        self.shell
            .history()
            .into_iter()
            .map(|entry| JsValue::from_str(&entry))
            .collect()
    }
}

impl Drop for LocalShell {
    fn drop(&mut self) {
        self.unmount();
    }
}
