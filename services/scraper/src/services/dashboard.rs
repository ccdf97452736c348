//! services/scraper/src/services/dashboard.rs
//!
//! Read-side aggregation over the repositories, implementing the `DashboardService` port.

use async_trait::async_trait;
use news_scraper_core::ports::{
    ArticleQuery, ArticleRepository, DashboardService, DashboardSummary, JobRepository,
    PortResult, SourceRepository, TagTrend,
};
use news_scraper_core::{Article, ScrapingJob, SentimentType};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct Dashboard {
    articles: Arc<dyn ArticleRepository>,
    jobs: Arc<dyn JobRepository>,
    sources: Arc<dyn SourceRepository>,
}

impl Dashboard {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        jobs: Arc<dyn JobRepository>,
        sources: Arc<dyn SourceRepository>,
    ) -> Self {
        Self {
            articles,
            jobs,
            sources,
        }
    }
}

fn sentiment_distribution(articles: &[Article]) -> HashMap<SentimentType, usize> {
    let mut distribution: HashMap<SentimentType, usize> =
        SentimentType::ALL.iter().map(|kind| (*kind, 0)).collect();
    for article in articles {
        *distribution.entry(article.sentiment_type()).or_default() += 1;
    }
    distribution
}

fn matches_query(article: &Article, query: &ArticleQuery, needle: &str) -> bool {
    let text_matches = needle.is_empty()
        || article.title().to_lowercase().contains(needle)
        || article.content().to_lowercase().contains(needle);
    let source_matches =
        query.sources.is_empty() || query.sources.iter().any(|s| s == article.source_name());
    text_matches && source_matches && article.matches_any_tag(query.tags.as_slice())
}

#[async_trait]
impl DashboardService for Dashboard {
    async fn get_dashboard_summary(&self) -> PortResult<DashboardSummary> {
        let articles = self.articles.list_all().await?;
        let sources = self.sources.list_all().await?;
        let jobs = self.jobs.list_recent(usize::MAX).await?;

        Ok(DashboardSummary {
            total_articles: articles.len(),
            analyzed_articles: articles.iter().filter(|a| a.is_analyzed()).count(),
            total_sources: sources.len(),
            active_sources: sources.iter().filter(|s| s.is_active()).count(),
            total_jobs: jobs.len(),
            running_jobs: jobs.iter().filter(|j| j.is_running()).count(),
            latest_job_status: jobs.first().map(ScrapingJob::status),
            sentiment_distribution: sentiment_distribution(&articles),
        })
    }

    async fn get_latest_articles(&self, limit: usize) -> PortResult<Vec<Article>> {
        self.articles.list_latest(limit).await
    }

    async fn get_articles_by_sentiment(
        &self,
        sentiment: SentimentType,
        limit: usize,
    ) -> PortResult<Vec<Article>> {
        Ok(self
            .articles
            .list_all()
            .await?
            .into_iter()
            .filter(|a| a.sentiment_type() == sentiment)
            .take(limit)
            .collect())
    }

    async fn search_articles(&self, query: &ArticleQuery) -> PortResult<Vec<Article>> {
        let needle = query.text.trim().to_lowercase();
        Ok(self
            .articles
            .list_all()
            .await?
            .into_iter()
            .filter(|a| matches_query(a, query, &needle))
            .take(query.limit)
            .collect())
    }

    async fn get_trending_tags(&self, limit: usize) -> PortResult<Vec<TagTrend>> {
        let mut tallies: HashMap<String, (usize, f64)> = HashMap::new();
        for article in self.articles.list_all().await? {
            for tag in article.tags() {
                let entry = tallies.entry(tag.name().to_string()).or_default();
                entry.0 += 1;
                entry.1 += tag.relevance_score();
            }
        }

        let mut trends: Vec<TagTrend> = tallies
            .into_iter()
            .map(|(name, (article_count, relevance_sum))| TagTrend {
                name,
                article_count,
                average_relevance: relevance_sum / article_count as f64,
            })
            .collect();
        trends.sort_by(|a, b| {
            b.article_count
                .cmp(&a.article_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        trends.truncate(limit);
        Ok(trends)
    }

    async fn get_sentiment_distribution(&self) -> PortResult<HashMap<SentimentType, usize>> {
        let articles = self.articles.list_all().await?;
        Ok(sentiment_distribution(&articles))
    }
}
