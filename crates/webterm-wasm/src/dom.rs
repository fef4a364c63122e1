use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, EventTarget, HtmlElement};

/// Get element by ID
pub fn get_element_by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Element not found: {}", id)))
}

/// Get HTML element by ID
pub fn get_html_element_by_id(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    let element = get_element_by_id(document, id)?;
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("Element is not HtmlElement: {}", id)))
}

/// Event listener that stays registered for as long as the guard lives
///
/// Dropping the guard removes the listener from its target.
pub struct ListenerGuard {
    target: EventTarget,
    event_type: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl ListenerGuard {
    pub fn new<F>(target: &EventTarget, event_type: &'static str, callback: F) -> Result<Self, JsValue>
    where
        F: FnMut(web_sys::Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(web_sys::Event)>);
        target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;

        Ok(Self {
            target: target.clone(),
            event_type,
            closure,
        })
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.event_type, self.closure.as_ref().unchecked_ref())
        {
            log::warn!("Failed to remove '{}' listener: {:?}", self.event_type, e);
        }
    }
}
