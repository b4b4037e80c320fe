//! Generative content adapter
//!
//! Produces text for a prompt at a given tone level. The tone level is a
//! validated newtype, so an out-of-range value is rejected before any
//! request can be built.

use crate::config::GeneratorConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Tone intensity on a 1-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ToneLevel(u8);

impl ToneLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(level: i64) -> Result<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(AppError::invalid_parameter(
                "tone_level",
                format!(
                    "tone level must be between {} and {}, got {}",
                    Self::MIN,
                    Self::MAX,
                    level
                ),
            ))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn descriptor(self) -> &'static str {
        match self.0 {
            1 => "barely perceptible wit",
            2 => "gentle, understated wit",
            3 => "light, friendly humour",
            4 => "noticeable playful humour",
            5 => "balanced wit and commentary",
            6 => "pointed, confident wit",
            7 => "sharp sarcasm",
            8 => "heavy sarcasm",
            9 => "biting, relentless sarcasm",
            _ => "extreme, all-out sarcasm",
        }
    }
}

impl fmt::Display for ToneLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for ToneLevel {
    type Error = AppError;

    fn try_from(level: i64) -> Result<Self> {
        Self::new(level)
    }
}

/// System instruction for a tone level; distinct for every level
pub fn system_prompt(tone: ToneLevel) -> String {
    format!(
        "You are a tech commentator writing social media content. \
         On a scale of 1-10, your tone level is set to {} ({}). \
         1 is subtle wit, 10 is extreme sarcasm. \
         Maintain the factual accuracy while adding humor.",
        tone.get(),
        tone.descriptor()
    )
}

/// Capability: produce text for a prompt
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Returns a non-empty string on success
    async fn generate(&self, prompt: &str, tone: ToneLevel) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// OpenAI chat completions client
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

const SOURCE_NAME: &str = "openai";

impl OpenAiGenerator {
    /// Create a new generator; the API key is mandatory
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let api_key = super::required(&config.api_key, "generator.api_key (OPENAI_API_KEY)")?;

        Ok(Self {
            client: super::http_client(config.timeout())?,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    async fn complete(&self, prompt: &str, tone: ToneLevel) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let system = system_prompt(tone);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| super::transport_error(SOURCE_NAME, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| super::transport_error(SOURCE_NAME, e))?;

        if !status.is_success() {
            return Err(super::status_error(SOURCE_NAME, status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::format(SOURCE_NAME, format!("Failed to parse response: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::format(SOURCE_NAME, "response contained no choices"))?
            .message
            .content
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Generation {
                message: "model returned empty content".to_string(),
            });
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model, tone_level = tone.get()))]
    async fn generate(&self, prompt: &str, tone: ToneLevel) -> Result<String> {
        let start = Instant::now();
        let result = self.complete(prompt, tone).await;
        metrics::record_source_call(
            SOURCE_NAME,
            "generate",
            start.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        match &result {
            Ok(text) => tracing::debug!(chars = text.len(), "Generation complete"),
            Err(e) => tracing::warn!(error = %e, "Generation request failed"),
        }
        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Offline generator producing deterministic text from the prompt
pub struct TemplateGenerator;

impl TemplateGenerator {
    pub fn new() -> Self {
        Self
    }

    fn closing_line(tone: ToneLevel) -> &'static str {
        match tone.get() {
            1..=3 => "Worth keeping an eye on as the details settle.",
            4..=7 => "Another day, another innovation that promises to change everything.",
            _ => "Oh great, another breakthrough that will mostly change how many notifications we ignore.",
        }
    }
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for TemplateGenerator {
    async fn generate(&self, prompt: &str, tone: ToneLevel) -> Result<String> {
        let body = prompt.trim();
        let body = if body.is_empty() { "(no material supplied)" } else { body };

        Ok(format!(
            "Commentary at tone {}/10:\n\n{}\n\n{}",
            tone.get(),
            body,
            Self::closing_line(tone)
        ))
    }

    fn model_name(&self) -> &str {
        "template"
    }
}

/// Create a generator based on configuration
pub fn create_generator(config: &GeneratorConfig) -> Result<Arc<dyn ContentGenerator>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiGenerator::new(config)?)),
        "template" => Ok(Arc::new(TemplateGenerator::new())),
        other => Err(AppError::Configuration {
            message: format!("unknown generator provider: {}", other),
        }),
    }
}
