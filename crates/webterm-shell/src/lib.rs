// Line-editing shell and remote terminal bridge
//
// This crate holds everything that does not need a browser: decoding raw
// terminal input, the line editor and its command history, the shell
// component with its dispatch contract, the state behind the remote PTY
// view and the JSON wire protocol it speaks. Rendering goes through the
// `DisplaySurface` trait so the same code drives xterm.js in the browser and
// a vt100 screen in tests.

mod bridge;
mod config;
mod dispatch;
mod editor;
mod error;
#[cfg(feature = "headless")]
mod headless;
mod history;
mod key;
pub mod protocol;
mod shell;
mod surface;

// Re-export public API
pub use bridge::{ChannelEvent, RemoteBridge};
pub use config::{BridgeConfig, ShellConfig};
pub use dispatch::{
    DispatchCallback, DispatchRequest, DispatchResponse, Dispatcher, ResponseData, ShellAction,
};
pub use editor::{LineEditor, LineOutcome};
pub use error::{ConfigError, DispatchError, ProtocolError};
#[cfg(feature = "headless")]
pub use headless::{HeadlessSurface, SurfaceOp};
pub use history::History;
pub use key::KeyEvent;
pub use shell::Shell;
pub use surface::{DisplaySurface, FitSurface, TerminalSize};

// Constants
pub const DEFAULT_PROMPT: &str = "$ ";
pub const DEFAULT_CLEAR_COMMAND: &str = "clear";
pub const DEFAULT_CHANNEL_PATH: &str = "/terminal";
pub const DEFAULT_FIT_DEBOUNCE_MS: u32 = 100;
pub const DEFAULT_COLS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 24;
