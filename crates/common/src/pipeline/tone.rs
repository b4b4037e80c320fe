//! Tone enhancement

use super::stage_failure;
use crate::errors::{AppError, Result};
use crate::sources::{ContentGenerator, ToneLevel};

pub(crate) const STAGE: &str = "tone_enhancement";

pub fn build_prompt(text: &str) -> String {
    format!(
        "Enhance the following tech commentary with witty and sarcastic elements:\n\n{}",
        text
    )
}

/// Prefix that records which intensity produced the text
pub fn tone_marker(tone: ToneLevel) -> String {
    format!("[Tone Level {}]", tone.get())
}

/// Validates the level before the generator is touched
pub async fn enhance(generator: &dyn ContentGenerator, text: &str, tone_level: i64) -> Result<String> {
    let tone = ToneLevel::new(tone_level)?;
    if text.trim().is_empty() {
        return Err(AppError::invalid_parameter("content", "content must not be empty"));
    }

    let enhanced = generator
        .generate(&build_prompt(text), tone)
        .await
        .map_err(|e| stage_failure(STAGE, e))?;
    let enhanced = enhanced.trim();
    if enhanced.is_empty() {
        return Err(AppError::Generation {
            message: "generator returned no enhanced text".to_string(),
        });
    }

    Ok(format!("{} {}", tone_marker(tone), enhanced))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Replies with whitespace only
    struct BlankGenerator;

    #[async_trait]
    impl ContentGenerator for BlankGenerator {
        async fn generate(&self, _prompt: &str, _tone: ToneLevel) -> Result<String> {
            Ok("   ".to_string())
        }

        fn model_name(&self) -> &str {
            "blank"
        }
    }

    #[tokio::test]
    async fn test_blank_reply_is_generation_error() {
        let result = enhance(&BlankGenerator, "Chips are fast", 5).await;
        assert!(matches!(result, Err(AppError::Generation { .. })), "got {result:?}");
    }

    #[test]
    fn test_marker_names_level() {
        let tone = ToneLevel::new(7).unwrap();
        assert_eq!(tone_marker(tone), "[Tone Level 7]");
        assert!(build_prompt("Chips").ends_with("\n\nChips"));
    }
}
