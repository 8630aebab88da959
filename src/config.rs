use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ExportError;

pub const DEFAULT_CONTROL_API_PORT: u16 = 8765;
pub const DEFAULT_DECK: &str = "Default";

/// API credential for the generation provider. Never printed in full.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short masked form for display, e.g. `sk-...abcd`.
    pub fn identifier(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() >= 7 {
            let head: String = chars[..3].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        } else {
            "xxxx".to_string()
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.identifier())
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub max_tokens_per_question: u32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            max_tokens_per_question: 100,
        }
    }
}

impl SamplingOptions {
    pub fn validate(&self) -> Result<(), ExportError> {
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("frequency_penalty", self.frequency_penalty, -2.0, 2.0)?;
        check_range("presence_penalty", self.presence_penalty, -2.0, 2.0)?;
        if self.max_tokens_per_question == 0 {
            return Err(ExportError::InvalidConfig(
                "max_tokens_per_question must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<(), ExportError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ExportError::InvalidConfig(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )))
    }
}

/// Parameters for one export run. Built once, never mutated during the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    pub num_questions: u32,
    pub num_alternatives: u32,
    pub sampling: SamplingOptions,
    pub api_key: ApiKey,
    pub model: String,
    pub deck_name: String,
    pub control_api_port: u16,
    pub note_type: String,
    pub tags: Vec<String>,
}

impl ConfigSnapshot {
    pub fn validate(&self) -> Result<(), ExportError> {
        self.sampling.validate()?;
        if self.control_api_port == 0 {
            return Err(ExportError::InvalidConfig(
                "control API port must be positive".to_string(),
            ));
        }
        if self.deck_name.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "deck name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_snapshot() -> ConfigSnapshot {
    ConfigSnapshot {
        num_questions: 1,
        num_alternatives: 3,
        sampling: SamplingOptions::default(),
        api_key: ApiKey::new("sk-test-1234567890"),
        model: "openai/gpt-oss-120b".to_string(),
        deck_name: DEFAULT_DECK.to_string(),
        control_api_port: DEFAULT_CONTROL_API_PORT,
        note_type: "Basic".to_string(),
        tags: vec!["auto-flashcards".to_string()],
    }
}
