use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ConfigError;
use super::{DEFAULT_CHANNEL_PATH, DEFAULT_CLEAR_COMMAND, DEFAULT_FIT_DEBOUNCE_MS, DEFAULT_PROMPT};

/// Configuration for a local shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Command handled locally by clearing the display
    #[serde(default = "default_clear_command")]
    pub clear_command: String,
    /// Passed untouched to the terminal widget constructor
    #[serde(default = "default_terminal_options")]
    pub terminal: Value,
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_clear_command() -> String {
    DEFAULT_CLEAR_COMMAND.to_string()
}

fn default_terminal_options() -> Value {
    Value::Object(Default::default())
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            clear_command: default_clear_command(),
            terminal: default_terminal_options(),
        }
    }
}

impl ShellConfig {
    /// Load from optional JSON, missing fields take their defaults
    pub fn from_json(json: Option<&str>) -> Result<Self, ConfigError> {
        let config: Self = match json {
            Some(json) if !json.trim().is_empty() => serde_json::from_str(json)?,
            _ => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Backspace and recall count prompt characters as cells
        if self.prompt.chars().any(char::is_control) {
            return Err(ConfigError::Invalid {
                field: "prompt",
                reason: "must not contain control characters".to_string(),
            });
        }
        if self.clear_command.trim().is_empty() || self.clear_command.trim() != self.clear_command {
            return Err(ConfigError::Invalid {
                field: "clear_command",
                reason: "must be a non-empty word without surrounding whitespace".to_string(),
            });
        }
        validate_terminal_options(&self.terminal)
    }
}

/// Configuration for a remote-backed terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Websocket path on the page's host
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_fit_debounce_ms")]
    pub fit_debounce_ms: u32,
    #[serde(default = "default_terminal_options")]
    pub terminal: Value,
}

fn default_path() -> String {
    DEFAULT_CHANNEL_PATH.to_string()
}

fn default_fit_debounce_ms() -> u32 {
    DEFAULT_FIT_DEBOUNCE_MS
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            fit_debounce_ms: default_fit_debounce_ms(),
            terminal: default_terminal_options(),
        }
    }
}

impl BridgeConfig {
    pub fn from_json(json: Option<&str>) -> Result<Self, ConfigError> {
        let config: Self = match json {
            Some(json) if !json.trim().is_empty() => serde_json::from_str(json)?,
            _ => Self::default(),
        };
        if !config.path.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "path",
                reason: format!("'{}' must start with '/'", config.path),
            });
        }
        validate_terminal_options(&config.terminal)?;
        Ok(config)
    }
}

fn validate_terminal_options(value: &Value) -> Result<(), ConfigError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: "terminal",
            reason: "must be an object".to_string(),
        })
    }
}
