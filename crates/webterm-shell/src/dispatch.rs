use serde::{Deserialize, Serialize};

use super::error::DispatchError;

/// Actions the shell can route to an external handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ShellAction {
    RunCommand { command: String },
}

/// Request handed to a dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchRequest {
    pub action: ShellAction,
}

impl DispatchRequest {
    pub fn run_command(command: impl Into<String>) -> Self {
        Self {
            action: ShellAction::RunCommand {
                command: command.into(),
            },
        }
    }
}

/// Response payload as produced by the handler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_of_text: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl DispatchResponse {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data: Some(ResponseData {
                lines_of_text: Some(lines.into_iter().map(Into::into).collect()),
                error_text: None,
            }),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            data: Some(ResponseData {
                lines_of_text: None,
                error_text: Some(text.into()),
            }),
        }
    }

    /// Parse a response from its JSON form
    pub fn from_json(json: &str) -> Result<Self, DispatchError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lines to render: the error text when present, otherwise the returned lines
    pub fn rendered_lines(&self) -> Vec<&str> {
        let Some(data) = &self.data else {
            return Vec::new();
        };
        if let Some(error) = &data.error_text {
            return vec![error.as_str()];
        }
        data.lines_of_text
            .iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

/// Completion callback, invoked at most once
pub type DispatchCallback = Box<dyn FnOnce(Result<DispatchResponse, DispatchError>)>;

/// External command handler
///
/// Implementations must call `on_complete` exactly once, either right away
/// or later from the event loop. Failures of the call itself are reported as
/// `Err`, application errors travel inside the response.
pub trait Dispatcher {
    fn dispatch(&self, request: DispatchRequest, on_complete: DispatchCallback);
}
