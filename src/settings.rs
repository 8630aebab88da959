use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::config::{
    ApiKey, ConfigSnapshot, SamplingOptions, DEFAULT_CONTROL_API_PORT, DEFAULT_DECK,
};
use crate::error::ExportError;

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

fn get_config_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".config\\auto-flashcards")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".config/auto-flashcards")
    }
}

pub fn get_settings_path() -> PathBuf {
    get_config_dir().join("settings.json")
}

pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok()
}

/// What part of a note is being exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    File,
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCounts {
    pub num_questions: u32,
    pub num_alternatives: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionDefaults {
    pub file: QuestionCounts,
    pub text_selection: QuestionCounts,
}

impl Default for QuestionDefaults {
    fn default() -> Self {
        Self {
            file: QuestionCounts {
                num_questions: 5,
                num_alternatives: 3,
            },
            text_selection: QuestionCounts {
                num_questions: 2,
                num_alternatives: 3,
            },
        }
    }
}

/// Persisted user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub control_api_port: u16,
    pub api_key: Option<ApiKey>,
    pub api_key_identifier: Option<String>,
    pub destination_deck: String,
    pub question_defaults: QuestionDefaults,
    pub sampling: SamplingOptions,
    pub model: String,
    pub endpoint: String,
    pub request_timeout_secs: u64,
    pub note_type: String,
    pub tags: Vec<String>,
    pub notes_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            control_api_port: DEFAULT_CONTROL_API_PORT,
            api_key: None,
            api_key_identifier: None,
            destination_deck: DEFAULT_DECK.to_string(),
            question_defaults: QuestionDefaults::default(),
            sampling: SamplingOptions::default(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 120,
            note_type: "Basic".to_string(),
            tags: vec!["auto-flashcards".to_string()],
            notes_dir: PathBuf::from("notes"),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn set_api_key(&mut self, key: &str) {
        let key = ApiKey::new(key);
        self.api_key_identifier = Some(key.identifier());
        self.api_key = Some(key);
    }

    pub fn counts(&self, scope: ExportScope) -> QuestionCounts {
        match scope {
            ExportScope::File => self.question_defaults.file,
            ExportScope::Selection => self.question_defaults.text_selection,
        }
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        self.sampling.validate()?;
        if self.control_api_port == 0 {
            return Err(ExportError::InvalidConfig(
                "control_api_port must be positive".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ExportError::InvalidConfig(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves the credential, preferring the stored key over `env_key`.
    pub fn resolve_api_key(&self, env_key: Option<String>) -> Result<ApiKey, ExportError> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| env_key.map(ApiKey::new).filter(|key| !key.is_empty()))
            .ok_or_else(|| {
                ExportError::Authentication(format!(
                    "no API key configured (set one in settings or {})",
                    API_KEY_ENV
                ))
            })
    }

    /// Builds the immutable parameters for one run.
    pub fn snapshot(
        &self,
        deck_name: &str,
        counts: QuestionCounts,
        env_key: Option<String>,
    ) -> Result<ConfigSnapshot, ExportError> {
        self.validate()?;
        let deck_name = if deck_name.trim().is_empty() {
            self.destination_deck.clone()
        } else {
            deck_name.trim().to_string()
        };
        let snapshot = ConfigSnapshot {
            num_questions: counts.num_questions,
            num_alternatives: counts.num_alternatives,
            sampling: self.sampling.clone(),
            api_key: self.resolve_api_key(env_key)?,
            model: self.model.clone(),
            deck_name,
            control_api_port: self.control_api_port,
            note_type: self.note_type.clone(),
            tags: self.tags.clone(),
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}
