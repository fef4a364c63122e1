use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use webterm_shell::{DispatchCallback, DispatchError, DispatchRequest, DispatchResponse, Dispatcher};

type CallbackSlot = Rc<RefCell<Option<DispatchCallback>>>;

/// Dispatcher that calls a JavaScript function
///
/// The function receives `{ type, payload, callback }` and answers by calling
/// `callback(response)`. A throw, or a rejected promise when the function is
/// async, counts as a failed call.
pub struct JsDispatcher {
    function: js_sys::Function,
}

impl JsDispatcher {
    pub fn new(function: js_sys::Function) -> Self {
        Self { function }
    }

    fn invoke(&self, request: &DispatchRequest, slot: CallbackSlot) -> Result<(), JsValue> {
        let json = serde_json::to_string(request)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize: {}", e)))?;
        let message = js_sys::JSON::parse(&json)?;

        let callback_slot = slot.clone();
        let callback = Closure::once_into_js(move |response: JsValue| {
            complete(&callback_slot, parse_response(&response));
        });
        js_sys::Reflect::set(&message, &JsValue::from_str("callback"), &callback)?;

        let returned = self.function.call1(&JsValue::NULL, &message)?;

        if let Ok(promise) = returned.dyn_into::<js_sys::Promise>() {
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    complete(&slot, Err(DispatchError::Invocation(describe(&e))));
                }
            });
        }

        Ok(())
    }
}

impl Dispatcher for JsDispatcher {
    fn dispatch(&self, request: DispatchRequest, on_complete: DispatchCallback) {
        let slot: CallbackSlot = Rc::new(RefCell::new(Some(on_complete)));
        if let Err(e) = self.invoke(&request, slot.clone()) {
            complete(&slot, Err(DispatchError::Invocation(describe(&e))));
        }
    }
}

/// Hand the result to the shell, first caller wins
fn complete(slot: &CallbackSlot, result: Result<DispatchResponse, DispatchError>) {
    let callback = slot.borrow_mut().take();
    match callback {
        Some(callback) => callback(result),
        None => log::warn!("Ignoring extra dispatcher completion: {:?}", result),
    }
}

fn parse_response(response: &JsValue) -> Result<DispatchResponse, DispatchError> {
    if response.is_undefined() || response.is_null() {
        return Ok(DispatchResponse::default());
    }
    let json: String = js_sys::JSON::stringify(response)
        .map_err(|e| DispatchError::Invocation(format!("unserializable response: {}", describe(&e))))?
        .into();
    DispatchResponse::from_json(&json)
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
