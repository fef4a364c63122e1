use super::protocol::{ClientEvent, ServerEvent};
use super::surface::{FitSurface, TerminalSize};

const ANSI_DIM: &str = "\x1b[2m";
const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

/// Something that happened on the duplex channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Connected,
    Output(String),
    Disconnected(Option<String>),
    Error(String),
}

impl From<ServerEvent> for ChannelEvent {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::Output(data) => ChannelEvent::Output(data),
        }
    }
}

/// State of a terminal view backed by a remote PTY
///
/// Transport-agnostic: callers feed channel events and keystrokes in, and
/// send whatever `ClientEvent`s come back out over their channel.
pub struct RemoteBridge {
    surface: Box<dyn FitSurface>,
    last_size: Option<TerminalSize>,
    connected: bool,
    disposed: bool,
}

impl RemoteBridge {
    pub fn new(surface: Box<dyn FitSurface>) -> Self {
        Self {
            surface,
            last_size: None,
            connected: false,
            disposed: false,
        }
    }

    /// Keystrokes from the terminal widget, to be forwarded as-is
    pub fn key_data(&self, data: &str) -> Option<ClientEvent> {
        if self.disposed || data.is_empty() {
            return None;
        }
        Some(ClientEvent::Input(data.to_string()))
    }

    /// Apply a channel event to the display
    /// Returns an event to send back, if any.
    pub fn handle_channel_event(&mut self, event: ChannelEvent) -> Option<ClientEvent> {
        if self.disposed {
            log::debug!("Dropping {:?} for disposed terminal", event);
            return None;
        }

        match event {
            ChannelEvent::Connected => {
                log::info!("Terminal channel connected");
                self.connected = true;
                // Always announce the size to a fresh peer
                self.last_size = None;
                self.refit()
            }
            ChannelEvent::Output(data) => {
                self.surface.write(&data);
                None
            }
            ChannelEvent::Disconnected(reason) => {
                log::info!("Terminal channel closed: {:?}", reason);
                self.connected = false;
                let text = match reason.as_deref() {
                    Some(reason) if !reason.is_empty() => format!("[connection closed: {}]", reason),
                    _ => "[connection closed]".to_string(),
                };
                self.annotate(ANSI_DIM, &text);
                None
            }
            ChannelEvent::Error(message) => {
                log::error!("Terminal channel error: {}", message);
                self.annotate(ANSI_RED, &format!("[connection error: {}]", message));
                None
            }
        }
    }

    /// Fit the surface to its container
    /// Returns a resize event when the size changed and the channel is up.
    pub fn refit(&mut self) -> Option<ClientEvent> {
        if self.disposed {
            return None;
        }
        let size = self.surface.fit()?;
        if self.last_size == Some(size) {
            return None;
        }
        log::debug!("Terminal fitted to {}x{}", size.cols, size.rows);
        if !self.connected {
            return None;
        }
        self.last_size = Some(size);
        Some(size.into())
    }

    pub fn focus(&mut self) {
        if !self.disposed {
            self.surface.focus();
        }
    }

    /// Release the display, idempotent
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.connected = false;
        self.surface.dispose();
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn annotate(&mut self, color: &str, text: &str) {
        self.surface.write(&format!("\r\n{}{}{}\r\n", color, text, ANSI_RESET));
    }
}

impl Drop for RemoteBridge {
    fn drop(&mut self) {
        self.dispose();
    }
}
