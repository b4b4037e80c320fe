//! Idea synthesis
//!
//! One generator call per idea. Talking points and hashtags come from fixed
//! heuristics over the headlines, so they are populated even when the
//! generator returns free text or there are no headlines at all.

use super::stage_failure;
use crate::db::models::NewContentIdea;
use crate::errors::{AppError, Result};
use crate::sources::{ContentGenerator, NewsItem, ToneLevel};
use std::collections::HashSet;

pub(crate) const STAGE: &str = "idea_synthesis";

/// Tone used for idea drafts
pub const IDEA_TONE: u8 = 3;

const MAX_HASHTAGS: usize = 10;

const BASE_HASHTAGS: &[&str] = &["#tech", "#technews", "#innovation"];

const FALLBACK_HEADLINE: &str = "Today's Tech Trends";

const FALLBACK_TALKING_POINTS: &[&str] = &[
    "What actually changed in tech this week",
    "Who wins and who loses from the latest announcements",
    "What to watch for next",
];

const HASHTAG_STOPWORDS: &[&str] = &[
    "The", "And", "For", "With", "New", "How", "Why", "What", "Its", "From", "Into", "Over",
];

/// Order-preserving prompt from headline titles and descriptions
pub fn build_prompt(items: &[NewsItem]) -> String {
    let mut prompt =
        String::from("Generate social media content ideas based on these tech headlines:\n\n");
    if items.is_empty() {
        prompt.push_str("(no headlines available today, write about general tech trends)\n");
    }
    for item in items {
        prompt.push_str(&format!("Title: {}\nDescription: {}\n\n", item.title, item.content));
    }
    prompt
}

pub fn talking_points(items: &[NewsItem]) -> Vec<String> {
    if items.is_empty() {
        return FALLBACK_TALKING_POINTS.iter().map(|p| p.to_string()).collect();
    }
    items
        .iter()
        .map(|item| match item.source.as_str() {
            "" => format!("Why \"{}\" matters", item.title),
            source => format!("Why \"{}\" matters ({})", item.title, source),
        })
        .collect()
}

/// Base tags first, then capitalised words from the titles, deduplicated
pub fn hashtags(items: &[NewsItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();

    let candidates = items
        .iter()
        .flat_map(|item| item.title.split_whitespace())
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| {
            word.chars().count() >= 3
                && word.chars().next().is_some_and(char::is_uppercase)
                && !HASHTAG_STOPWORDS.contains(&word.as_str())
        })
        .map(|word| format!("#{}", word));

    for tag in BASE_HASHTAGS.iter().map(|t| t.to_string()).chain(candidates) {
        if tags.len() == MAX_HASHTAGS {
            break;
        }
        if seen.insert(tag.to_lowercase()) {
            tags.push(tag);
        }
    }
    tags
}

/// Build a content idea from already-extracted trends
pub async fn synthesize(
    generator: &dyn ContentGenerator,
    items: &[NewsItem],
) -> Result<NewContentIdea> {
    let tone = ToneLevel::new(IDEA_TONE as i64)?;
    let prompt = build_prompt(items);

    let text = generator
        .generate(&prompt, tone)
        .await
        .map_err(|e| stage_failure(STAGE, e))?;
    if text.trim().is_empty() {
        return Err(AppError::Generation {
            message: "generator returned no idea text".to_string(),
        });
    }

    let headline = items
        .first()
        .map(|item| item.title.clone())
        .unwrap_or_else(|| FALLBACK_HEADLINE.to_string());

    let mut content = text.trim().to_string();
    if !items.is_empty() {
        content.push_str("\n\nBased on:");
        for item in items {
            content.push_str(&format!("\n- {}", item.title));
        }
    }

    Ok(NewContentIdea {
        headline,
        content,
        talking_points: talking_points(items),
        hashtags: hashtags(items),
    })
}
