//! Speculative topic generation
//!
//! The allow-list is a static table of company -> ordered topics. Companies
//! with an empty topic list fall back to [`DEFAULT_TOPICS`].

use super::stage_failure;
use crate::db::models::NewSpeculation;
use crate::errors::{AppError, Result};
use crate::sources::{ContentGenerator, ToneLevel};
use serde::{Deserialize, Serialize};

pub(crate) const STAGE: &str = "speculation";

/// Tone used for speculative pieces
pub const SPECULATION_TONE: u8 = 5;

pub const DISCLAIMER: &str = "DISCLAIMER: This content is speculative and based on rumors and analysis. It should not be taken as confirmed fact or used for investment decisions.";

pub const SOURCES: &[&str] = &[
    "Anonymous industry insiders",
    "Pattern analysis of recent job postings",
    "Supply chain observations",
    "Recent patent filings",
];

pub const DEFAULT_TOPICS: &[&str] = &[
    "New Products",
    "R&D Initiatives",
    "Leadership Changes",
    "Strategic Pivots",
];

/// Canonical company name and its topics, in display order
pub const COMPANY_TOPICS: &[(&str, &[&str])] = &[
    ("Apple", &["AR/VR Headset", "Electric Vehicle", "AI Strategy", "Next iPhone"]),
    ("Google", &["Quantum Computing", "Search Algorithm", "Android Future", "AI Ethics"]),
    ("Microsoft", &["Windows Next Gen", "Azure Strategy", "Gaming Division", "OpenAI Partnership"]),
    ("Meta", &["Metaverse Plans", "AI Research", "Content Moderation", "VR Hardware"]),
    ("Amazon", &["AWS Expansion", "Retail Strategy", "Logistics Innovation", "Space Ventures"]),
    ("Tesla", &["Full Self-Driving", "Battery Technology", "Robotics Division", "Mars Plans"]),
    ("Twitter", &["Algorithm Changes", "Monetization Strategy", "Content Policies", "User Growth"]),
    ("Netflix", &["Content Strategy", "Gaming Expansion", "AI Recommendations", "Ad-Supported Tier"]),
    ("Spotify", &["Podcast Strategy", "Creator Tools", "AI Music Generation", "Subscription Models"]),
    ("Uber", &["Autonomous Vehicles", "Delivery Expansion", "Labor Relations", "Urban Mobility"]),
    ("Nvidia", &[]),
    ("Samsung", &[]),
];

/// Speculative piece returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeculationResult {
    pub company: String,
    pub topic: String,
    pub headline: String,
    pub content: String,
    pub disclaimer: String,
    pub sources: Vec<String>,
}

impl SpeculationResult {
    pub fn to_new_speculation(&self) -> NewSpeculation {
        NewSpeculation {
            company: self.company.clone(),
            topic: self.topic.clone(),
            headline: self.headline.clone(),
            content: self.content.clone(),
        }
    }
}

/// Case-insensitive lookup returning the table entry
fn lookup(company: &str) -> Result<&'static (&'static str, &'static [&'static str])> {
    let wanted = company.trim();
    COMPANY_TOPICS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| AppError::UnknownCompany {
            company: company.to_string(),
        })
}

/// Canonical spelling of an allow-listed company
pub fn resolve_company(company: &str) -> Result<&'static str> {
    lookup(company).map(|(name, _)| *name)
}

pub fn list_companies() -> Vec<&'static str> {
    COMPANY_TOPICS.iter().map(|(name, _)| *name).collect()
}

pub fn list_topics(company: &str) -> Result<Vec<&'static str>> {
    let (_, topics) = lookup(company)?;
    let topics = if topics.is_empty() { DEFAULT_TOPICS } else { topics };
    Ok(topics.to_vec())
}

pub fn headline(company: &str, topic: &str) -> String {
    format!("What's Really Happening Inside {}'s {} Division", company, topic)
}

pub fn build_prompt(company: &str, topic: &str) -> String {
    format!(
        "Write a speculative behind-the-scenes piece about what {company} might be doing \
         in its {topic} efforts. Use markdown sections for what insiders are hearing, \
         why it matters and a plausible timeline. Present it as rumor and analysis, \
         never as confirmed fact."
    )
}

/// Company is checked against the allow-list before the generator is called
pub async fn speculate(
    generator: &dyn ContentGenerator,
    company: &str,
    topic: &str,
) -> Result<SpeculationResult> {
    let company = resolve_company(company)?;
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(AppError::invalid_parameter("topic", "topic must not be empty"));
    }

    let tone = ToneLevel::new(SPECULATION_TONE as i64)?;
    let content = generator
        .generate(&build_prompt(company, topic), tone)
        .await
        .map_err(|e| stage_failure(STAGE, e))?;
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Generation {
            message: "generator returned no speculation text".to_string(),
        });
    }

    Ok(SpeculationResult {
        company: company.to_string(),
        topic: topic.to_string(),
        headline: headline(company, topic),
        content: content.to_string(),
        disclaimer: DISCLAIMER.to_string(),
        sources: SOURCES.iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(resolve_company("aPPLE").unwrap(), "Apple");
        assert_eq!(resolve_company(" tesla ").unwrap(), "Tesla");
        assert!(matches!(
            resolve_company("Initech"),
            Err(AppError::UnknownCompany { .. })
        ));
    }

    #[test]
    fn test_every_company_has_topics() {
        for company in list_companies() {
            assert!(!list_topics(company).unwrap().is_empty(), "{company}");
        }
        assert_eq!(list_topics("nvidia").unwrap(), DEFAULT_TOPICS);
        assert_eq!(list_topics("Apple").unwrap()[2], "AI Strategy");
    }

    #[test]
    fn test_unknown_company_topics() {
        for company in ["", "Initech", "Apple Inc", "appl"] {
            assert!(matches!(
                list_topics(company),
                Err(AppError::UnknownCompany { .. })
            ));
        }
    }
}
