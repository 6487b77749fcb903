//! Uniform response envelope and terminal task error taxonomy.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Uniform envelope for one logical API call, whether the server answered
/// immediately or deferred the work to a background task. Constructed exactly
/// once per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(body: Value, status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body,
        }
    }

    /// True for 2xx status codes.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes the body into a concrete type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone()).context("Failed to parse API response body")
    }

    /// Digs a human-readable message out of an error body.
    /// Falls back to the HTTP status text when the body carries none.
    pub fn error_message(&self) -> String {
        self.body
            .pointer("/data/message")
            .and_then(Value::as_str)
            .or_else(|| self.body.get("message").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| self.status_text.clone())
    }
}

/// Terminal failure of a deferred background task.
///
/// An explicit tagged type, so callers can tell a task that completed with an
/// error apart from one that never completed at all.
#[derive(Debug)]
pub enum TaskError {
    /// The task reached `completed` with a non-200 embedded status code, or a
    /// status poll returned a non-success HTTP response.
    Failed { status: u16, detail: Value },
    /// The attempt budget was exhausted while the task stayed non-terminal.
    TimedOut,
}

impl TaskError {
    /// Status code callers should surface for this failure.
    pub fn status(&self) -> u16 {
        match self {
            TaskError::Failed { status, .. } => *status,
            TaskError::TimedOut => 408,
        }
    }
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::Failed { status, detail } => match detail.as_str() {
                Some(message) => write!(f, "Task failed with status {}: {}", status, message),
                None => write!(f, "Task failed with status {}: {}", status, detail),
            },
            TaskError::TimedOut => write!(f, "Task polling timed out"),
        }
    }
}

impl std::error::Error for TaskError {}
