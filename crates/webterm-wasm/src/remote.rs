use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::future::{AbortHandle, Abortable};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use gloo_net::websocket::futures::WebSocket;
use gloo_net::websocket::{Message, WebSocketError};
use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use webterm_shell::protocol::{ClientEvent, ServerEvent};
use webterm_shell::{BridgeConfig, ChannelEvent, RemoteBridge};

use crate::dom::{self, ListenerGuard};
use crate::utils;
use crate::xterm::{Disposable, XtermSurface};

type SharedBridge = Rc<RefCell<RemoteBridge>>;

/// Live websocket: outbound queue plus the reader task
struct Connection {
    tx: UnboundedSender<ClientEvent>,
    reader: AbortHandle,
}

/// Terminal view attached to a remote PTY over a websocket
#[wasm_bindgen]
pub struct RemoteTerminal {
    bridge: SharedBridge,
    connection: Option<Connection>,
    subscription: Option<(Disposable, Closure<dyn FnMut(String)>)>,
    resize_listener: Option<ListenerGuard>,
    pending_fit: Rc<RefCell<Option<Timeout>>>,
}

#[wasm_bindgen]
impl RemoteTerminal {
    /// Mount a terminal inside `container_id` and connect it
    ///
    /// `config_json` is an optional JSON `BridgeConfig`. A connection that
    /// cannot be opened is reported on the terminal itself.
    pub fn mount(container_id: &str, config_json: Option<String>) -> Result<RemoteTerminal, JsValue> {
        let config = BridgeConfig::from_json(config_json.as_deref())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let window = crate::window()?;
        let document = crate::document()?;
        let container = dom::get_html_element_by_id(&document, container_id)?;
        let surface = XtermSurface::open(&container, &config.terminal)?;
        let bridge: SharedBridge = Rc::new(RefCell::new(RemoteBridge::new(Box::new(surface.clone()))));

        let connection = connect(&bridge, &config.path);
        let tx = connection.as_ref().map(|c| c.tx.clone());

        // Keystrokes go straight to the remote side
        let weak = Rc::downgrade(&bridge);
        let input_tx = tx.clone();
        let on_data = Closure::wrap(Box::new(move |data: String| {
            let Some(bridge) = weak.upgrade() else { return };
            let event = bridge.borrow().key_data(&data);
            send(input_tx.as_ref(), event);
        }) as Box<dyn FnMut(String)>);
        let disposable = surface.terminal().on_data(&on_data);

        let pending_fit: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
        let resize_listener = ListenerGuard::new(
            window.as_ref(),
            "resize",
            debounced_refit(Rc::downgrade(&bridge), pending_fit.clone(), tx, config.fit_debounce_ms),
        )?;

        bridge.borrow_mut().focus();
        log::info!("Remote terminal mounted in #{}", container_id);

        Ok(RemoteTerminal {
            bridge,
            connection,
            subscription: Some((disposable, on_data)),
            resize_listener: Some(resize_listener),
            pending_fit,
        })
    }

    /// Disconnect and dispose the terminal, idempotent
    pub fn unmount(&mut self) {
        self.resize_listener = None;
        self.pending_fit.borrow_mut().take();

        if let Some((disposable, _closure)) = self.subscription.take() {
            disposable.unsubscribe();
        }

        // Dropping the sender lets the writer close the socket
        if let Some(connection) = self.connection.take() {
            connection.reader.abort();
        }

        let mut bridge = self.bridge.borrow_mut();
        if !bridge.is_disposed() {
            bridge.dispose();
            log::info!("Remote terminal unmounted");
        }
    }

    #[wasm_bindgen(getter)]
    pub fn connected(&self) -> bool {
        self.bridge.borrow().is_connected()
    }
}

impl Drop for RemoteTerminal {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Open the websocket and start its reader and writer tasks
fn connect(bridge: &SharedBridge, path: &str) -> Option<Connection> {
    let opened = utils::build_ws_url(path)
        .map_err(|e| format!("{:?}", e))
        .and_then(|url| {
            log::info!("Connecting to: {}", url);
            WebSocket::open(&url).map_err(|e| e.to_string())
        });

    let ws = match opened {
        Ok(ws) => ws,
        Err(e) => {
            log::error!("Failed to connect: {}", e);
            bridge.borrow_mut().handle_channel_event(ChannelEvent::Error(e));
            return None;
        }
    };

    let (sink, stream) = ws.split();
    let (tx, rx) = mpsc::unbounded();
    let closed = Rc::new(Cell::new(false));

    wasm_bindgen_futures::spawn_local(write_loop(Rc::downgrade(bridge), sink, rx, closed.clone()));

    let (reader, registration) = AbortHandle::new_pair();
    let read = Abortable::new(read_loop(Rc::downgrade(bridge), stream, tx.clone(), closed), registration);
    wasm_bindgen_futures::spawn_local(async move {
        if read.await.is_err() {
            log::debug!("Terminal reader stopped");
        }
    });

    Some(Connection { tx, reader })
}

/// Announce the connection once the socket is open, then drain the queue
async fn write_loop(
    bridge: Weak<RefCell<RemoteBridge>>,
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: UnboundedReceiver<ClientEvent>,
    closed: Rc<Cell<bool>>,
) {
    if let Err(e) = futures::future::poll_fn(|cx| sink.poll_ready_unpin(cx)).await {
        log::warn!("Terminal channel never opened: {}", e);
        return;
    }

    if !closed.get() {
        let Some(bridge) = bridge.upgrade() else { return };
        let announce = bridge.borrow_mut().handle_channel_event(ChannelEvent::Connected);
        if let Some(event) = announce {
            if !write_event(&mut sink, &event).await {
                return;
            }
        }
    }

    while let Some(event) = rx.next().await {
        if !write_event(&mut sink, &event).await {
            return;
        }
    }

    if let Err(e) = sink.close().await {
        log::debug!("Closing terminal channel: {}", e);
    }
}

async fn write_event(sink: &mut SplitSink<WebSocket, Message>, event: &ClientEvent) -> bool {
    let json = match event.to_json() {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to serialize {:?}: {}", event, e);
            return true;
        }
    };
    match sink.send(Message::Text(json)).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to send on terminal channel: {}", e);
            false
        }
    }
}

async fn read_loop(
    bridge: Weak<RefCell<RemoteBridge>>,
    mut stream: SplitStream<WebSocket>,
    tx: UnboundedSender<ClientEvent>,
    closed: Rc<Cell<bool>>,
) {
    loop {
        let event = match stream.next().await {
            Some(Ok(Message::Text(text))) => match ServerEvent::from_json(&text) {
                Ok(event) => ChannelEvent::from(event),
                Err(e) => {
                    log::warn!("Ignoring channel frame: {}", e);
                    continue;
                }
            },
            Some(Ok(Message::Bytes(bytes))) => {
                ChannelEvent::Output(String::from_utf8_lossy(&bytes).into_owned())
            }
            Some(Err(WebSocketError::ConnectionClose(close))) => {
                let reason = Some(close.reason).filter(|r| !r.is_empty());
                ChannelEvent::Disconnected(reason)
            }
            Some(Err(e)) => ChannelEvent::Error(e.to_string()),
            None => ChannelEvent::Disconnected(None),
        };

        let terminal = matches!(event, ChannelEvent::Disconnected(_) | ChannelEvent::Error(_));
        if terminal {
            closed.set(true);
        }

        let Some(bridge) = bridge.upgrade() else { return };
        let reply = bridge.borrow_mut().handle_channel_event(event);
        send(Some(&tx), reply);

        if terminal {
            return;
        }
    }
}

/// Window resize handler that refits once resizing settles
fn debounced_refit(
    bridge: Weak<RefCell<RemoteBridge>>,
    pending: Rc<RefCell<Option<Timeout>>>,
    tx: Option<UnboundedSender<ClientEvent>>,
    delay_ms: u32,
) -> impl FnMut(web_sys::Event) + 'static {
    move |_event| {
        let bridge = bridge.clone();
        let tx = tx.clone();
        // Replacing the previous timeout cancels it
        let timeout = Timeout::new(delay_ms, move || {
            let Some(bridge) = bridge.upgrade() else { return };
            let event = bridge.borrow_mut().refit();
            send(tx.as_ref(), event);
        });
        *pending.borrow_mut() = Some(timeout);
    }
}

fn send(tx: Option<&UnboundedSender<ClientEvent>>, event: Option<ClientEvent>) {
    let (Some(tx), Some(event)) = (tx, event) else { return };
    if let Err(e) = tx.unbounded_send(event) {
        log::debug!("Terminal channel gone, dropping {:?}", e.into_inner());
    }
}
