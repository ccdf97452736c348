//! services/scraper/src/adapters/fixture_scraper.rs
//!
//! A `WebScraper` adapter that serves articles from a JSON fixture document instead of
//! the network. Records are deserialized with `serde` and converted into domain entities,
//! so every served article has passed the domain's validation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use news_scraper_core::ports::{PortResult, WebScraper};
use news_scraper_core::{
    AnalysisResult, Article, DomainResult, SentimentBounds, SentimentScore, Source, Tag, Url,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Average adult reading speed used to estimate reading time.
const WORDS_PER_MINUTE: f64 = 200.0;

//=========================================================================================
// "Impure" Fixture Record Structs
//=========================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureFeed {
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
    #[serde(default)]
    pub articles: Vec<ArticleRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceRecord {
    pub name: String,
    pub base_url: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub scraping_config: HashMap<String, String>,
    pub reliability_score: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl SourceRecord {
    pub fn to_domain(&self) -> DomainResult<Source> {
        let mut source = Source::parse(self.name.as_str(), &self.base_url)?
            .with_active(self.is_active)
            .with_config(self.scraping_config.clone());
        if let Some(description) = &self.description {
            source = source.with_description(description.as_str());
        }
        if let Some(score) = self.reliability_score {
            source = source.with_reliability_score(score)?;
        }
        Ok(source)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentRecord {
    pub score: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleRecord {
    pub source: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub sentiment: Option<SentimentRecord>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl ArticleRecord {
    /// Builds the article. Records carrying sentiment, keywords or topics come back analyzed.
    pub fn to_domain(&self, bounds: SentimentBounds) -> DomainResult<Article> {
        let url = Url::parse(self.url.as_str())?;
        let mut article = Article::new(
            self.title.as_str(),
            self.content.as_str(),
            url,
            self.source.as_str(),
        )?;
        if let Some(published) = self.published_date {
            article = article.with_published_date(published);
        }
        for name in &self.tags {
            article.add_tag(Tag::new(name)?);
        }

        if self.sentiment.is_some() || !self.keywords.is_empty() || !self.topics.is_empty() {
            let sentiment = self
                .sentiment
                .as_ref()
                .map(|s| SentimentScore::with_bounds(s.score, s.confidence, bounds))
                .transpose()?;
            let word_count = self.content.split_whitespace().count();
            let analysis = AnalysisResult::new(
                sentiment,
                self.keywords.clone(),
                self.topics.clone(),
                word_count,
                word_count as f64 / WORDS_PER_MINUTE,
            )?;
            article.attach_analysis(analysis);
        }
        Ok(article)
    }
}

//=========================================================================================
// The Adapter
//=========================================================================================

pub struct FixtureScraper {
    feed: FixtureFeed,
    required_config: Vec<String>,
    sentiment_bounds: SentimentBounds,
}

impl FixtureScraper {
    pub fn new(
        feed: FixtureFeed,
        required_config: Vec<String>,
        sentiment_bounds: SentimentBounds,
    ) -> Self {
        Self {
            feed,
            required_config,
            sentiment_bounds,
        }
    }

    pub fn parse_feed(json: &str) -> Result<FixtureFeed, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub async fn load_feed(path: &Path) -> Result<FixtureFeed, crate::error::ServiceError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(Self::parse_feed(&raw)?)
    }

    /// The sources declared by the feed, validated.
    pub fn sources(&self) -> DomainResult<Vec<Source>> {
        self.feed.sources.iter().map(SourceRecord::to_domain).collect()
    }

    fn records_for<'a>(&'a self, source: &'a Source) -> impl Iterator<Item = &'a ArticleRecord> {
        self.feed
            .articles
            .iter()
            .filter(move |record| record.source == source.name())
    }
}

#[async_trait]
impl WebScraper for FixtureScraper {
    async fn scrape_articles(
        &self,
        source: &Source,
        tags: &[String],
        max_articles: usize,
    ) -> PortResult<Vec<Article>> {
        let mut articles = Vec::new();
        for record in self.records_for(source) {
            if articles.len() >= max_articles {
                break;
            }
            match record.to_domain(self.sentiment_bounds) {
                Ok(article) if article.matches_any_tag(tags) => articles.push(article),
                Ok(article) => debug!(article_id = article.id(), "Skipping article without requested tags."),
                Err(e) => warn!(source = source.name(), url = %record.url, "Skipping invalid record: {}", e),
            }
        }
        debug!(source = source.name(), count = articles.len(), "Fixture scrape finished.");
        Ok(articles)
    }

    async fn is_source_available(&self, source: &Source) -> bool {
        source.is_active() && self.records_for(source).next().is_some()
    }

    async fn validate_source_config(&self, source: &Source) -> PortResult<()> {
        source.requires_config(self.required_config.as_slice())?;
        Ok(())
    }
}
