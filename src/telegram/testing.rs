//! In-process `TelegramApi` doubles for handler and server tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::api::{ApiError, Params, TelegramApi};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Params,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Succeed,
    Reject,
    Panic,
}

/// Records every call. Depending on construction it answers `true`,
/// rejects like the Bot API would, or panics.
pub struct RecordingApi {
    calls: Mutex<Vec<RecordedCall>>,
    mode: Mode,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::with_mode(Mode::Succeed)
    }

    pub fn rejecting() -> Self {
        Self::with_mode(Mode::Reject)
    }

    pub fn panicking() -> Self {
        Self::with_mode(Mode::Panic)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            mode,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelegramApi for RecordingApi {
    async fn call(&self, method: &str, params: Params) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            params,
        });

        match self.mode {
            Mode::Succeed => Ok(json!(true)),
            Mode::Reject => Err(ApiError::Rejected {
                method: method.to_string(),
                error_code: Some(403),
                description: Some("Forbidden: bot was blocked by the user".to_string()),
                envelope: json!({
                    "ok": false,
                    "error_code": 403,
                    "description": "Forbidden: bot was blocked by the user"
                }),
            }),
            Mode::Panic => panic!("simulated failure in {}", method),
        }
    }
}
