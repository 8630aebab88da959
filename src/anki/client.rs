use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SyncError;

pub const ANKI_CONNECT_VERSION: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteFields {
    #[serde(rename = "Front")]
    pub front: String,
    #[serde(rename = "Back")]
    pub back: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptions {
    pub allow_duplicate: bool,
}

/// The `note` parameter of an `addNote` action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    pub deck_name: String,
    pub model_name: String,
    pub fields: NoteFields,
    pub options: NoteOptions,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, SyncError> {
        if let Some(error) = self.error {
            return Err(SyncError::Rejected(error));
        }
        self.result
            .ok_or_else(|| SyncError::Rejected("empty result from control API".to_string()))
    }
}

/// The flashcard application's control API, one call per note.
#[async_trait]
pub trait ControlApi: Send + Sync {
    /// Creates a note and returns its id.
    async fn add_note(&self, port: u16, note: &NoteRequest) -> Result<u64, SyncError>;
}

pub fn control_api_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}

pub fn request_body(action: &str, params: Option<serde_json::Value>) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert("action".to_string(), serde_json::Value::String(action.to_string()));
    body.insert(
        "version".to_string(),
        serde_json::Value::Number(ANKI_CONNECT_VERSION.into()),
    );
    if let Some(params) = params {
        body.insert("params".to_string(), params);
    }
    serde_json::Value::Object(body)
}

#[derive(Debug, Clone)]
pub struct AnkiConnectClient {
    http: Client,
}

impl AnkiConnectClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    async fn make_request<T: for<'de> Deserialize<'de>>(
        &self,
        port: u16,
        action: &str,
        params: Option<serde_json::Value>,
    ) -> Result<ApiResponse<T>, SyncError> {
        let response = self
            .http
            .post(control_api_url(port))
            .json(&request_body(action, params))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    SyncError::Unreachable(e.to_string())
                } else {
                    SyncError::Rejected(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Rejected(format!(
                "control API returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| SyncError::Rejected(format!("unreadable control API response: {}", e)))
    }

    /// Used to check that the control API is online.
    pub async fn version(&self, port: u16) -> Result<u32, SyncError> {
        self.make_request::<u32>(port, "version", None)
            .await?
            .into_result()
    }
}

#[async_trait]
impl ControlApi for AnkiConnectClient {
    async fn add_note(&self, port: u16, note: &NoteRequest) -> Result<u64, SyncError> {
        let params = serde_json::json!({ "note": note });
        self.make_request::<u64>(port, "addNote", Some(params))
            .await?
            .into_result()
    }
}

#[cfg(test)]
use std::sync::Mutex;

/// Mock control API for testing - replays scripted results and records every note it receives
#[cfg(test)]
pub struct MockControlApi {
    script: Mutex<Vec<Result<u64, SyncError>>>,
    pub received: Mutex<Vec<NoteRequest>>,
}

#[cfg(test)]
impl MockControlApi {
    pub fn accepting() -> Self {
        Self::scripted(vec![])
    }

    /// Results are consumed in call order; once exhausted every call succeeds.
    pub fn scripted(script: Vec<Result<u64, SyncError>>) -> Self {
        Self {
            script: Mutex::new(script),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl ControlApi for MockControlApi {
    async fn add_note(&self, _port: u16, note: &NoteRequest) -> Result<u64, SyncError> {
        let mut received = self.received.lock().unwrap();
        received.push(note.clone());
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            Ok(1_000 + received.len() as u64)
        } else {
            script.remove(0)
        }
    }
}
