use thiserror::Error;

use crate::models::BlockRejection;

/// Failures that end an export run.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: {0}")]
    EmptyInput(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Provider error {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("No valid flashcards in provider response ({} blocks rejected)", rejected.len())]
    NoValidRecords {
        raw: String,
        rejected: Vec<BlockRejection>,
    },

    #[error("An export is already running")]
    RunInProgress,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl ExportError {
    /// Whether the status indicator should switch to `Error` for this failure.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ExportError::RunInProgress)
    }

    /// Message shown to the operator when a run ends with this error.
    pub fn notice(&self) -> String {
        match self {
            ExportError::EmptyInput(reason) => format!("Nothing to export: {}", reason),
            ExportError::Authentication(_) => {
                "Authentication failed, check your API key.".to_string()
            }
            ExportError::Provider { status, .. } => {
                format!("The question provider returned an error (HTTP {}).", status)
            }
            ExportError::Transport(reason) => {
                format!("Could not reach the question provider: {}", reason)
            }
            ExportError::NoValidRecords { .. } => {
                "No usable questions were generated, try again.".to_string()
            }
            ExportError::RunInProgress => {
                "An export is already running, wait for it to finish.".to_string()
            }
            ExportError::InvalidConfig(reason) => format!("Invalid settings: {}", reason),
            ExportError::Settings(reason) => format!("Could not load settings: {}", reason),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(error: std::io::Error) -> Self {
        ExportError::Settings(error.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(error: serde_json::Error) -> Self {
        ExportError::Settings(error.to_string())
    }
}

/// Failure of a single call to the flashcard application's control API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("control API unreachable: {0}")]
    Unreachable(String),

    #[error("{0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_in_progress_is_not_fatal() {
        assert!(!ExportError::RunInProgress.is_fatal());
        assert!(ExportError::Transport("timeout".to_string()).is_fatal());
        assert!(ExportError::EmptyInput("no text".to_string()).is_fatal());
    }

    #[test]
    fn test_authentication_notice_mentions_api_key() {
        let err = ExportError::Authentication("401 Unauthorized".to_string());
        assert!(err.notice().contains("API key"));
    }

    #[test]
    fn test_provider_notice_carries_status() {
        let err = ExportError::Provider {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert!(err.notice().contains("503"));
        assert_eq!(err.to_string(), "Provider error 503: overloaded");
    }

    #[test]
    fn test_no_valid_records_display_counts_rejections() {
        let err = ExportError::NoValidRecords {
            raw: "garbage".to_string(),
            rejected: vec![BlockRejection {
                index: 0,
                reason: "missing answer".to_string(),
            }],
        };
        assert!(err.to_string().contains("1 blocks rejected"));
        assert!(err.notice().contains("try again"));
    }
}
