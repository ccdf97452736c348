//! services/scraper/src/bin/news_scraper.rs

use news_scraper_core::ports::{
    DashboardService, ScrapingControlService, SourceRepository, TagTrend,
};
use news_scraper_core::{DashboardSummary, ScrapingJob};
use scraper_lib::{
    adapters::{
        FixtureScraper, InMemoryArticleRepository, InMemoryJobRepository,
        InMemorySourceRepository,
    },
    config::Config,
    error::ServiceError,
    services::{Dashboard, JobOrchestrator},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn job_json(job: &ScrapingJob) -> Value {
    json!({
        "job_id": job.job_id(),
        "status": job.status().to_string(),
        "sources": job.sources().iter().map(|s| s.name()).collect::<Vec<_>>(),
        "requested_tags": job.requested_tags(),
        "articles_found": job.articles_found(),
        "errors": job.errors(),
        "created_at": job.created_at(),
        "start_time": job.start_time(),
        "end_time": job.end_time(),
        "duration_seconds": job.duration(),
    })
}

fn summary_json(summary: &DashboardSummary, trending: &[TagTrend]) -> Value {
    let distribution: serde_json::Map<String, Value> = summary
        .sentiment_distribution
        .iter()
        .map(|(kind, count)| (kind.to_string(), json!(count)))
        .collect();
    json!({
        "total_articles": summary.total_articles,
        "analyzed_articles": summary.analyzed_articles,
        "total_sources": summary.total_sources,
        "active_sources": summary.active_sources,
        "total_jobs": summary.total_jobs,
        "running_jobs": summary.running_jobs,
        "latest_job_status": summary.latest_job_status.map(|s| s.to_string()),
        "sentiment_distribution": distribution,
        "trending_tags": trending
            .iter()
            .map(|t| json!({ "name": t.name, "articles": t.article_count, "average_relevance": t.average_relevance }))
            .collect::<Vec<_>>(),
    })
}

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Loading fixtures from {}", config.fixtures_path.display());

    // --- 2. Initialize Adapters ---
    let feed = FixtureScraper::load_feed(&config.fixtures_path).await?;
    let scraper = Arc::new(FixtureScraper::new(
        feed,
        config.required_source_config.clone(),
        config.sentiment_bounds,
    ));
    let articles = Arc::new(InMemoryArticleRepository::new());
    let jobs = Arc::new(InMemoryJobRepository::new());
    let sources = Arc::new(InMemorySourceRepository::new());

    // --- 3. Seed Sources ---
    for source in scraper
        .sources()
        .map_err(news_scraper_core::PortError::from)?
    {
        sources.save(&source).await?;
    }
    info!("Seeded {} sources.", sources.list_all().await?.len());

    // --- 4. Build the Services ---
    let orchestrator = JobOrchestrator::new(
        scraper,
        articles.clone(),
        jobs.clone(),
        sources.clone(),
        config.max_concurrent_sources,
    );
    let dashboard = Dashboard::new(articles, jobs, sources);

    // --- 5. Run One Job Across All Active Sources ---
    let job_id = orchestrator
        .start_scraping_job(&[], &[], config.max_articles_per_source)
        .await?;
    let job = orchestrator.join(&job_id).await?;
    info!(job_id = %job_id, status = %job.status(), "Job finished.");

    // --- 6. Report ---
    let summary = dashboard.get_dashboard_summary().await?;
    let trending = dashboard.get_trending_tags(10).await?;
    let report = json!({
        "job": job_json(&job),
        "dashboard": summary_json(&summary, &trending),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
