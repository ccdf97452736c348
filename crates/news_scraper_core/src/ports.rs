//! crates/news_scraper_core/src/ports.rs
//!
//! Defines the service contracts (traits) around the domain core.
//! These traits form the boundary of the hexagonal architecture: the scraper and the
//! repositories are driven by the core's orchestrator, while the dashboard and control
//! services are how a presentation layer reaches in.

use crate::entities::{Article, Source};
use crate::error::NewsScrapeError;
use crate::job::{ScrapingJob, ScrapingStatus};
use crate::value_objects::SentimentType;
use async_trait::async_trait;
use std::collections::HashMap;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// Domain failures pass through unchanged so callers can still match on them.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Domain(#[from] NewsScrapeError),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Read Models
//=========================================================================================

/// Filters for a dashboard article search. Empty filter lists match everything.
#[derive(Debug, Clone)]
pub struct ArticleQuery {
    pub text: String,
    pub tags: Vec<String>,
    pub sources: Vec<String>,
    pub limit: usize,
}

impl ArticleQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: Vec::new(),
            sources: Vec::new(),
            limit: 50,
        }
    }
}

/// How often a tag appears across stored articles.
#[derive(Debug, Clone, PartialEq)]
pub struct TagTrend {
    pub name: String,
    pub article_count: usize,
    pub average_relevance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_articles: usize,
    pub analyzed_articles: usize,
    pub total_sources: usize,
    pub active_sources: usize,
    pub total_jobs: usize,
    pub running_jobs: usize,
    pub latest_job_status: Option<ScrapingStatus>,
    pub sentiment_distribution: HashMap<SentimentType, usize>,
}

//=========================================================================================
// Capability Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait WebScraper: Send + Sync {
    /// Scrapes up to `max_articles` articles from `source`, keeping those that carry any
    /// of `tags` (all of them when `tags` is empty).
    async fn scrape_articles(
        &self,
        source: &Source,
        tags: &[String],
        max_articles: usize,
    ) -> PortResult<Vec<Article>>;

    async fn is_source_available(&self, source: &Source) -> bool;

    /// Fails with `NewsScrapeError::SourceConfiguration` when a required key is missing.
    async fn validate_source_config(&self, source: &Source) -> PortResult<()>;
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Stores a new article. Fails with `NewsScrapeError::DuplicateArticle` when the id
    /// is already taken.
    async fn save(&self, article: &Article) -> PortResult<()>;
    async fn get_by_id(&self, article_id: &str) -> PortResult<Article>;
    async fn exists(&self, article_id: &str) -> PortResult<bool>;
    /// Newest first, by `scraped_at`.
    async fn list_latest(&self, limit: usize) -> PortResult<Vec<Article>>;
    async fn list_all(&self) -> PortResult<Vec<Article>>;
    async fn delete(&self, article_id: &str) -> PortResult<()>;
    async fn count(&self) -> PortResult<usize>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Inserts or replaces the job under its id.
    async fn save(&self, job: &ScrapingJob) -> PortResult<()>;
    async fn get_by_id(&self, job_id: &str) -> PortResult<ScrapingJob>;
    /// Newest first, by `created_at`.
    async fn list_recent(&self, limit: usize) -> PortResult<Vec<ScrapingJob>>;
    async fn count(&self) -> PortResult<usize>;
}

#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Inserts or replaces the source under its name.
    async fn save(&self, source: &Source) -> PortResult<()>;
    async fn get_by_name(&self, name: &str) -> PortResult<Source>;
    async fn list_all(&self) -> PortResult<Vec<Source>>;
    async fn list_active(&self) -> PortResult<Vec<Source>>;
    async fn delete(&self, name: &str) -> PortResult<()>;
}

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn get_dashboard_summary(&self) -> PortResult<DashboardSummary>;
    async fn get_latest_articles(&self, limit: usize) -> PortResult<Vec<Article>>;
    async fn get_articles_by_sentiment(
        &self,
        sentiment: SentimentType,
        limit: usize,
    ) -> PortResult<Vec<Article>>;
    async fn search_articles(&self, query: &ArticleQuery) -> PortResult<Vec<Article>>;
    async fn get_trending_tags(&self, limit: usize) -> PortResult<Vec<TagTrend>>;
    async fn get_sentiment_distribution(&self) -> PortResult<HashMap<SentimentType, usize>>;
}

#[async_trait]
pub trait ScrapingControlService: Send + Sync {
    /// Creates and launches a job, returning its id.
    async fn start_scraping_job(
        &self,
        source_names: &[String],
        tags: &[String],
        max_articles_per_source: usize,
    ) -> PortResult<String>;
    async fn get_job_status(&self, job_id: &str) -> PortResult<Option<ScrapingJob>>;
    async fn get_recent_jobs(&self, limit: usize) -> PortResult<Vec<ScrapingJob>>;
    async fn get_available_sources(&self) -> PortResult<Vec<Source>>;
}
