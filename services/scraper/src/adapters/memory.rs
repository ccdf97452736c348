//! services/scraper/src/adapters/memory.rs
//!
//! In-memory implementations of the storage ports. Each repository keeps its records
//! behind a `tokio::sync::RwLock`, so the adapters can be shared across tasks.

use async_trait::async_trait;
use news_scraper_core::{Article, NewsScrapeError, ScrapingJob, Source};
use news_scraper_core::ports::{
    ArticleRepository, JobRepository, PortError, PortResult, SourceRepository,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

//=========================================================================================
// Articles
//=========================================================================================

#[derive(Default)]
pub struct InMemoryArticleRepository {
    articles: RwLock<HashMap<String, Article>>,
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn save(&self, article: &Article) -> PortResult<()> {
        let mut articles = self.articles.write().await;
        if let Some(existing) = articles.get(article.id()) {
            return Err(NewsScrapeError::DuplicateArticle {
                article_id: article.id().to_string(),
                existing_source: Some(existing.source_name().to_string()),
            }
            .into());
        }
        articles.insert(article.id().to_string(), article.clone());
        Ok(())
    }

    async fn get_by_id(&self, article_id: &str) -> PortResult<Article> {
        self.articles
            .read()
            .await
            .get(article_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("article {article_id}")))
    }

    async fn exists(&self, article_id: &str) -> PortResult<bool> {
        Ok(self.articles.read().await.contains_key(article_id))
    }

    async fn list_latest(&self, limit: usize) -> PortResult<Vec<Article>> {
        let mut articles = self.list_all().await?;
        articles.truncate(limit);
        Ok(articles)
    }

    async fn list_all(&self) -> PortResult<Vec<Article>> {
        let mut articles: Vec<Article> = self.articles.read().await.values().cloned().collect();
        articles.sort_by(|a, b| {
            b.scraped_at()
                .cmp(&a.scraped_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(articles)
    }

    async fn delete(&self, article_id: &str) -> PortResult<()> {
        self.articles
            .write()
            .await
            .remove(article_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("article {article_id}")))
    }

    async fn count(&self) -> PortResult<usize> {
        Ok(self.articles.read().await.len())
    }
}

//=========================================================================================
// Jobs
//=========================================================================================

#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<String, ScrapingJob>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn save(&self, job: &ScrapingJob) -> PortResult<()> {
        self.jobs
            .write()
            .await
            .insert(job.job_id().to_string(), job.clone());
        Ok(())
    }

    async fn get_by_id(&self, job_id: &str) -> PortResult<ScrapingJob> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("job {job_id}")))
    }

    async fn list_recent(&self, limit: usize) -> PortResult<Vec<ScrapingJob>> {
        let mut jobs: Vec<ScrapingJob> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.job_id().cmp(b.job_id()))
        });
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn count(&self) -> PortResult<usize> {
        Ok(self.jobs.read().await.len())
    }
}

//=========================================================================================
// Sources
//=========================================================================================

#[derive(Default)]
pub struct InMemorySourceRepository {
    sources: RwLock<HashMap<String, Source>>,
}

impl InMemorySourceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SourceRepository for InMemorySourceRepository {
    async fn save(&self, source: &Source) -> PortResult<()> {
        self.sources
            .write()
            .await
            .insert(source.name().to_string(), source.clone());
        Ok(())
    }

    async fn get_by_name(&self, name: &str) -> PortResult<Source> {
        self.sources
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("source {name}")))
    }

    async fn list_all(&self) -> PortResult<Vec<Source>> {
        let mut sources: Vec<Source> = self.sources.read().await.values().cloned().collect();
        sources.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(sources)
    }

    async fn list_active(&self) -> PortResult<Vec<Source>> {
        let mut sources = self.list_all().await?;
        sources.retain(Source::is_active);
        Ok(sources)
    }

    async fn delete(&self, name: &str) -> PortResult<()> {
        self.sources
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("source {name}")))
    }
}
