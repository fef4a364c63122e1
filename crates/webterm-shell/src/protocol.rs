use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::surface::TerminalSize;

/// Events sent from the browser to the PTY host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "lowercase")]
pub enum ClientEvent {
    /// Raw keystrokes, forwarded as typed
    Input(String),
    Resize { cols: u16, rows: u16 },
}

impl From<TerminalSize> for ClientEvent {
    fn from(size: TerminalSize) -> Self {
        ClientEvent::Resize {
            cols: size.cols,
            rows: size.rows,
        }
    }
}

impl ClientEvent {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Events sent from the PTY host to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "lowercase")]
pub enum ServerEvent {
    /// Raw terminal output, rendered verbatim
    Output(String),
}

impl ServerEvent {
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }
}
