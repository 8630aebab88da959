use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::ai::prompt::GenerationRequest;
use crate::error::ExportError;
use crate::logger;

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Sends one generation request and returns the model's raw text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ExportError>;
}

#[derive(Debug)]
pub struct OpenRouterClient {
    http: Client,
    endpoint: String,
}

impl OpenRouterClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ExportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExportError::Transport(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Generator for OpenRouterClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ExportError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(request.api_key.expose())
            .json(&request.body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        logger::log(&format!(
            "Provider responded with HTTP {} ({} bytes)",
            status,
            body.len()
        ));

        classify_response(status, &body)
    }
}

fn transport_error(error: reqwest::Error) -> ExportError {
    if error.is_timeout() {
        ExportError::Transport(format!("request timed out: {}", error))
    } else {
        ExportError::Transport(error.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<MessageText>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageText {
    Text(String),
    Parts(Vec<TextPart>),
}

#[derive(Debug, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    code: Option<serde_json::Value>,
    message: Option<String>,
}

impl ProviderErrorBody {
    fn status(&self) -> Option<u16> {
        match &self.code {
            Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|c| u16::try_from(c).ok()),
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }
}

fn is_auth_status(status: u16) -> bool {
    status == 401 || status == 403
}

/// Maps an HTTP status and body to the model text or a typed failure.
pub fn classify_response(status: u16, body: &str) -> Result<String, ExportError> {
    if is_auth_status(status) {
        return Err(ExportError::Authentication(format!(
            "HTTP {}: {}",
            status,
            body.trim()
        )));
    }
    if !(200..300).contains(&status) {
        return Err(ExportError::Provider {
            status,
            body: body.to_string(),
        });
    }

    let envelope: CompletionEnvelope =
        serde_json::from_str(body).map_err(|e| ExportError::Provider {
            status,
            body: format!("unreadable response ({}): {}", e, body),
        })?;

    if let Some(error) = envelope.error {
        let code = error.status().unwrap_or(status);
        let message = error.message.unwrap_or_else(|| body.to_string());
        if is_auth_status(code) {
            return Err(ExportError::Authentication(message));
        }
        return Err(ExportError::Provider {
            status: code,
            body: message,
        });
    }

    let content = envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content);

    match content {
        Some(MessageText::Text(text)) => Ok(text),
        Some(MessageText::Parts(parts)) => Ok(parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n")),
        None => Err(ExportError::Provider {
            status,
            body: format!("response contained no message: {}", body),
        }),
    }
}

#[cfg(test)]
use std::sync::Mutex;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock generator for testing - returns canned results and counts calls
#[cfg(test)]
pub struct MockGenerator {
    responses: Mutex<Vec<Result<String, ExportError>>>,
    calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockGenerator {
    pub fn replying(text: &str) -> Self {
        Self::with_responses(vec![Ok(text.to_string())])
    }

    pub fn failing(error: ExportError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, ExportError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ExportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(ExportError::Transport("no canned response left".to_string()))
        } else {
            responses.remove(0)
        }
    }
}
