//! Content pipeline
//!
//! Four stages over the source adapters:
//! 1. trend extraction (no network)
//! 2. idea synthesis (one generator call)
//! 3. tone enhancement (independent entry point)
//! 4. speculative topic generation (independent entry point)
//!
//! Stages hold no state and persist nothing; saving is an explicit,
//! separate call on the store once a stage has fully succeeded.

pub mod ideas;
pub mod speculation;
pub mod tone;
pub mod trends;

pub use speculation::SpeculationResult;
pub use trends::{extract_trends, TREND_CAP};

use crate::db::models::NewContentIdea;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::sources::{ContentGenerator, NewsItem, NewsSource};
use std::sync::Arc;

/// Map an adapter failure inside a generating stage.
///
/// Caller-side validation errors keep their kind; anything else means the
/// stage produced no usable output.
pub(crate) fn stage_failure(stage: &str, err: AppError) -> AppError {
    match err {
        AppError::InvalidParameter { .. }
        | AppError::UnknownCompany { .. }
        | AppError::Generation { .. } => err,
        other => AppError::Generation {
            message: format!("{} failed: {}", stage, other),
        },
    }
}

fn observed<T>(stage: &str, result: Result<T>) -> Result<T> {
    metrics::record_stage(stage, result.is_ok());
    if let Err(e) = &result {
        tracing::warn!(stage, error = %e, "Pipeline stage failed");
    }
    result
}

/// Orchestrates the news and generator adapters
#[derive(Clone)]
pub struct ContentPipeline {
    news: Arc<dyn NewsSource>,
    generator: Arc<dyn ContentGenerator>,
}

impl ContentPipeline {
    pub fn new(news: Arc<dyn NewsSource>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { news, generator }
    }

    /// Fetch headlines and keep the leading [`TREND_CAP`]
    pub async fn trends(&self) -> Result<Vec<NewsItem>> {
        let result = self.news.fetch_tech_news().await.map(|items| {
            let fetched = items.len();
            let trends = extract_trends(items);
            tracing::debug!(source = self.news.source_name(), fetched, kept = trends.len(), "Trends extracted");
            trends
        });
        observed(trends::STAGE, result)
    }

    /// Fetch, extract and synthesise in sequence
    pub async fn generate_ideas(&self) -> Result<NewContentIdea> {
        let trends = self.trends().await?;
        self.synthesize_idea(&trends).await
    }

    pub async fn synthesize_idea(&self, items: &[NewsItem]) -> Result<NewContentIdea> {
        let result = ideas::synthesize(self.generator.as_ref(), items).await;
        if let Ok(idea) = &result {
            tracing::info!(
                headline = %idea.headline,
                hashtags = idea.hashtags.len(),
                "Content idea synthesised"
            );
        }
        observed(ideas::STAGE, result)
    }

    pub async fn enhance_tone(&self, text: &str, tone_level: i64) -> Result<String> {
        observed(
            tone::STAGE,
            tone::enhance(self.generator.as_ref(), text, tone_level).await,
        )
    }

    pub async fn speculate(&self, company: &str, topic: &str) -> Result<SpeculationResult> {
        observed(
            speculation::STAGE,
            speculation::speculate(self.generator.as_ref(), company, topic).await,
        )
    }

    pub fn list_companies(&self) -> Vec<&'static str> {
        speculation::list_companies()
    }

    pub fn list_topics(&self, company: &str) -> Result<Vec<&'static str>> {
        speculation::list_topics(company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ContentStore, MemoryStore};
    use crate::sources::{StaticNewsSource, TemplateGenerator, ToneLevel};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator that counts calls and replies with a fixed text
    struct CountingGenerator {
        calls: AtomicUsize,
        reply: String,
    }

    impl CountingGenerator {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: reply.to_string(),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentGenerator for CountingGenerator {
        async fn generate(&self, _prompt: &str, _tone: ToneLevel) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl ContentGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str, _tone: ToneLevel) -> Result<String> {
            Err(AppError::unavailable("openai", "connection refused"))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    struct DownNewsSource;

    #[async_trait]
    impl NewsSource for DownNewsSource {
        async fn fetch_tech_news(&self) -> Result<Vec<NewsItem>> {
            Err(AppError::unavailable("newsapi", "connection refused"))
        }

        fn source_name(&self) -> &str {
            "down"
        }
    }

    fn pipeline_with(generator: Arc<dyn ContentGenerator>, items: Vec<NewsItem>) -> ContentPipeline {
        ContentPipeline::new(Arc::new(StaticNewsSource::with_items(items)), generator)
    }

    fn headlines(n: usize) -> Vec<NewsItem> {
        (0..n)
            .map(|i| NewsItem::new(format!("Story {i}"), "Wire", "", format!("desc {i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_out_of_range_tone_never_calls_generator() {
        let generator = CountingGenerator::replying("witty");
        let pipeline = pipeline_with(generator.clone(), Vec::new());

        for level in [-1, 0, 11, 42] {
            let err = pipeline.enhance_tone("Chips are fast", level).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidParameter { .. }));
        }
        assert_eq!(generator.calls(), 0);

        let text = pipeline.enhance_tone("Chips are fast", 8).await.unwrap();
        assert!(text.starts_with("[Tone Level 8]"));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_trends_cap_at_five() {
        let pipeline = pipeline_with(Arc::new(TemplateGenerator::new()), headlines(8));
        let trends = pipeline.trends().await.unwrap();
        assert_eq!(trends, headlines(5));
    }

    #[tokio::test]
    async fn test_news_outage_keeps_error_kind() {
        let generator = CountingGenerator::replying("unused");
        let pipeline = ContentPipeline::new(Arc::new(DownNewsSource), generator.clone());

        let err = pipeline.trends().await.unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable { .. }), "got {err:?}");
        let err = pipeline.generate_ideas().await.unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable { .. }), "got {err:?}");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_enhancement_is_rejected() {
        let pipeline = pipeline_with(CountingGenerator::replying("  \n "), Vec::new());
        let err = pipeline.enhance_tone("Chips are fast", 5).await.unwrap_err();
        assert!(matches!(err, AppError::Generation { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_idea_from_empty_input_has_heuristic_fields() {
        let pipeline = pipeline_with(CountingGenerator::replying("free text"), Vec::new());
        let idea = pipeline.synthesize_idea(&[]).await.unwrap();
        assert!(!idea.talking_points.is_empty());
        assert!(!idea.hashtags.is_empty());
        assert!(!idea.headline.is_empty());
    }

    #[tokio::test]
    async fn test_generator_failure_is_generation_error() {
        let pipeline = pipeline_with(Arc::new(FailingGenerator), headlines(2));
        assert!(matches!(
            pipeline.generate_ideas().await,
            Err(AppError::Generation { .. })
        ));
        assert!(matches!(
            pipeline.enhance_tone("text", 5).await,
            Err(AppError::Generation { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_generation_is_generation_error() {
        let pipeline = pipeline_with(CountingGenerator::replying("   "), headlines(1));
        assert!(matches!(
            pipeline.generate_ideas().await,
            Err(AppError::Generation { .. })
        ));
    }

    #[tokio::test]
    async fn test_apple_headline_end_to_end() {
        let items = vec![NewsItem::new(
            "Apple Announces New AR Glasses",
            "TechCrunch",
            "https://techcrunch.com/apple-ar-glasses",
            "Glasses for everyone",
        )];
        let pipeline = pipeline_with(Arc::new(TemplateGenerator::new()), items.clone());
        let store = MemoryStore::new();

        let trends = pipeline.trends().await.unwrap();
        let idea = pipeline.synthesize_idea(&trends).await.unwrap();
        assert!(idea.content.contains("Apple Announces New AR Glasses"));

        let saved = store.save_content_idea(idea.clone()).await.unwrap();
        let listed = store.list_content_ideas().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(listed[0].content, idea.content);
    }

    #[tokio::test]
    async fn test_speculation_structure_is_fixed() {
        for reply in ["short", "a much longer and different body"] {
            let pipeline = pipeline_with(CountingGenerator::replying(reply), Vec::new());
            let result = pipeline.speculate("apple", "AI Strategy").await.unwrap();

            assert_eq!(result.company, "Apple");
            assert!(result.headline.contains("Apple"));
            assert!(result.headline.contains("AI Strategy"));
            assert_eq!(result.disclaimer, speculation::DISCLAIMER);
            assert!(!result.sources.is_empty());
            assert_eq!(result.content, reply);
        }
    }

    #[tokio::test]
    async fn test_unknown_company_never_calls_generator() {
        let generator = CountingGenerator::replying("rumours");
        let pipeline = pipeline_with(generator.clone(), Vec::new());

        let err = pipeline.speculate("Initech", "TPS Reports").await.unwrap_err();
        assert!(matches!(err, AppError::UnknownCompany { .. }));
        assert!(pipeline.list_topics("Initech").is_err());
        assert_eq!(generator.calls(), 0);
    }
}
