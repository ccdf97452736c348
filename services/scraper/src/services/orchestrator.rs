//! services/scraper/src/services/orchestrator.rs
//!
//! The job orchestrator: the concrete `ScrapingControlService`.
//!
//! Every job being run lives behind an `Arc<Mutex<ScrapingJob>>`, and only the task
//! driving that job mutates it. Sources inside a job are scraped concurrently, bounded
//! by `max_concurrent_sources`, and their results are folded into the job one at a time.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use news_scraper_core::ports::{
    ArticleRepository, JobRepository, PortError, PortResult, ScrapingControlService,
    SourceRepository, WebScraper,
};
use news_scraper_core::{NewsScrapeError, ScrapingJob, Source};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Shared handle to a job that is being run.
pub type JobHandle = Arc<Mutex<ScrapingJob>>;

/// Error message recorded when a running job is cancelled.
pub const CANCELLED_MESSAGE: &str = "cancelled";

/// What happened to one source during a job.
#[derive(Debug, Default)]
struct SourceReport {
    source_name: String,
    stored: usize,
    duplicates: usize,
    errors: Vec<String>,
    failed: bool,
}

impl SourceReport {
    fn failed(source_name: &str, message: String) -> Self {
        Self {
            source_name: source_name.to_string(),
            errors: vec![message],
            failed: true,
            ..Self::default()
        }
    }
}

//=========================================================================================
// JobRunner (cloned into each spawned job task)
//=========================================================================================

#[derive(Clone)]
struct JobRunner {
    scraper: Arc<dyn WebScraper>,
    articles: Arc<dyn ArticleRepository>,
    jobs: Arc<dyn JobRepository>,
    sources: Arc<dyn SourceRepository>,
    max_concurrent_sources: usize,
}

impl JobRunner {
    /// Runs the job. If the run aborts midway, the job is failed with the abort reason
    /// and persisted before the error is returned.
    async fn execute(
        &self,
        job: JobHandle,
        max_articles_per_source: usize,
        cancellation_token: CancellationToken,
    ) -> PortResult<()> {
        let result = self
            .run(job.clone(), max_articles_per_source, cancellation_token)
            .await;
        if let Err(e) = &result {
            self.abort(&job, e).await;
        }
        result
    }

    async fn abort(&self, job: &JobHandle, reason: &PortError) {
        let mut job = job.lock().await;
        error!(job_id = job.job_id(), "Scraping job aborted: {}", reason);
        if job.is_running() && job.fail(reason.to_string()).is_ok() {
            if let Err(e) = self.jobs.save(&job).await {
                error!(job_id = job.job_id(), "Failed to persist aborted job: {}", e);
            }
        }
    }

    /// Drives a pending job to a terminal state.
    async fn run(
        &self,
        job: JobHandle,
        max_articles_per_source: usize,
        cancellation_token: CancellationToken,
    ) -> PortResult<()> {
        let (job_id, sources, tags) = {
            let mut job = job.lock().await;
            job.start()?;
            self.jobs.save(&job).await?;
            (
                job.job_id().to_string(),
                job.sources().to_vec(),
                job.requested_tags().to_vec(),
            )
        };
        info!(job_id = %job_id, sources = sources.len(), "Scraping job started.");

        let total_sources = sources.len();
        let reports = tokio::select! {
            _ = cancellation_token.cancelled() => None,
            reports = self.scrape_sources(sources, &tags, max_articles_per_source) => Some(reports),
        };

        let mut job = job.lock().await;
        match reports {
            None => {
                warn!(job_id = %job_id, "Scraping job cancelled.");
                job.fail(CANCELLED_MESSAGE)?;
            }
            Some(reports) => {
                let mut stored = 0;
                let mut failed_sources = 0;
                for report in reports {
                    debug!(
                        job_id = %job_id,
                        source = %report.source_name,
                        stored = report.stored,
                        duplicates = report.duplicates,
                        "Source finished."
                    );
                    stored += report.stored;
                    if report.failed {
                        failed_sources += 1;
                    }
                    for message in report.errors {
                        job.add_error(message);
                    }
                }

                if total_sources > 0 && failed_sources == total_sources {
                    error!(job_id = %job_id, "Every source failed.");
                    job.fail(format!("All {total_sources} sources failed"))?;
                } else {
                    info!(job_id = %job_id, articles = stored, "Scraping job completed.");
                    job.complete(stored)?;
                }
            }
        }
        self.jobs.save(&job).await
    }

    async fn scrape_sources(
        &self,
        sources: Vec<Source>,
        tags: &[String],
        max_articles: usize,
    ) -> Vec<SourceReport> {
        stream::iter(sources)
            .map(|source| self.scrape_source(source, tags, max_articles))
            .buffer_unordered(self.max_concurrent_sources.max(1))
            .collect()
            .await
    }

    async fn scrape_source(
        &self,
        source: Source,
        tags: &[String],
        max_articles: usize,
    ) -> SourceReport {
        if let Err(e) = self.scraper.validate_source_config(&source).await {
            warn!(source = source.name(), "Source configuration rejected: {}", e);
            return SourceReport::failed(source.name(), e.to_string());
        }
        if !self.scraper.is_source_available(&source).await {
            warn!(source = source.name(), "Source is unavailable.");
            return SourceReport::failed(
                source.name(),
                format!("Source '{}' is unavailable", source.name()),
            );
        }

        let scraped = self.scraper.scrape_articles(&source, tags, max_articles).await;
        let mut report = SourceReport {
            source_name: source.name().to_string(),
            ..SourceReport::default()
        };
        if let Err(e) = self.stamp_last_scraped(source.name()).await {
            report.errors.push(e.to_string());
        }

        let articles = match scraped {
            Ok(articles) => articles,
            Err(e) => {
                warn!(source = source.name(), "Scrape failed: {}", e);
                report.errors.push(e.to_string());
                report.failed = true;
                return report;
            }
        };

        for article in articles {
            match self.articles.save(&article).await {
                Ok(()) => report.stored += 1,
                Err(PortError::Domain(NewsScrapeError::DuplicateArticle { article_id, .. })) => {
                    debug!(article_id = %article_id, "Skipping duplicate article.");
                    report.duplicates += 1;
                }
                Err(e) => report.errors.push(e.to_string()),
            }
        }
        report
    }

    /// Stamps the stored copy of the source, so changes made while the job ran survive.
    async fn stamp_last_scraped(&self, source_name: &str) -> PortResult<()> {
        let mut stored = match self.sources.get_by_name(source_name).await {
            Ok(source) => source,
            Err(PortError::NotFound(_)) => {
                debug!(source = source_name, "Source is not stored; nothing to stamp.");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        stored.update_last_scraped();
        self.sources.save(&stored).await
    }
}

//=========================================================================================
// JobOrchestrator
//=========================================================================================

struct RunningJob {
    job: JobHandle,
    handle: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

/// Jobs whose tasks have not finished yet. Each task removes its own entry.
type RunningJobs = Arc<Mutex<HashMap<String, RunningJob>>>;

pub struct JobOrchestrator {
    runner: JobRunner,
    running: RunningJobs,
}

impl JobOrchestrator {
    pub fn new(
        scraper: Arc<dyn WebScraper>,
        articles: Arc<dyn ArticleRepository>,
        jobs: Arc<dyn JobRepository>,
        sources: Arc<dyn SourceRepository>,
        max_concurrent_sources: usize,
    ) -> Self {
        Self {
            runner: JobRunner {
                scraper,
                articles,
                jobs,
                sources,
                max_concurrent_sources,
            },
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runs a pending job on the current task and returns it in its terminal state.
    pub async fn run_job(
        &self,
        job: ScrapingJob,
        max_articles_per_source: usize,
    ) -> PortResult<ScrapingJob> {
        let handle: JobHandle = Arc::new(Mutex::new(job));
        self.runner
            .execute(handle.clone(), max_articles_per_source, CancellationToken::new())
            .await?;
        let job = handle.lock().await.clone();
        Ok(job)
    }

    /// Requests cancellation of a running job. Returns false if no such job is running.
    pub async fn cancel_job(&self, job_id: &str) -> bool {
        let tracked = self
            .running
            .lock()
            .await
            .get(job_id)
            .map(|running| (running.job.clone(), running.cancellation_token.clone()));
        let Some((job, cancellation_token)) = tracked else {
            return false;
        };
        if job.lock().await.is_terminal() {
            return false;
        }
        info!(job_id, "Cancelling scraping job.");
        cancellation_token.cancel();
        true
    }

    /// Number of jobs whose tasks are still tracked.
    pub async fn tracked_jobs(&self) -> usize {
        self.running.lock().await.len()
    }

    /// Waits for a spawned job to finish and returns its final state.
    pub async fn join(&self, job_id: &str) -> PortResult<ScrapingJob> {
        let running = self.running.lock().await.remove(job_id);
        if let Some(running) = running {
            running
                .handle
                .await
                .map_err(|e| PortError::Unexpected(format!("job task failed: {e}")))?;
        }
        self.runner.jobs.get_by_id(job_id).await
    }

    async fn resolve_sources(&self, source_names: &[String]) -> PortResult<Vec<Source>> {
        if source_names.is_empty() {
            return self.runner.sources.list_active().await;
        }
        let mut sources = Vec::with_capacity(source_names.len());
        for name in source_names {
            sources.push(self.runner.sources.get_by_name(name).await?);
        }
        Ok(sources)
    }
}

#[async_trait]
impl ScrapingControlService for JobOrchestrator {
    /// Launches a job over the named sources (every active source when none are named).
    async fn start_scraping_job(
        &self,
        source_names: &[String],
        tags: &[String],
        max_articles_per_source: usize,
    ) -> PortResult<String> {
        let sources = self.resolve_sources(source_names).await?;
        let job_id = Uuid::new_v4().to_string();
        let job = ScrapingJob::new(job_id.as_str(), sources, tags.to_vec())?;
        self.runner.jobs.save(&job).await?;

        let job: JobHandle = Arc::new(Mutex::new(job));
        let cancellation_token = CancellationToken::new();
        let runner = self.runner.clone();
        let running = self.running.clone();
        let task_job = job.clone();
        let task_token = cancellation_token.clone();
        let task_id = job_id.clone();

        // Spawn while holding the map, so the task's own removal always follows the insert.
        let mut tracked = self.running.lock().await;
        let handle = tokio::spawn(async move {
            // `execute` already logged and recorded any abort on the job.
            let _ = runner
                .execute(task_job, max_articles_per_source, task_token)
                .await;
            running.lock().await.remove(&task_id);
        });
        tracked.insert(
            job_id.clone(),
            RunningJob {
                job,
                handle,
                cancellation_token,
            },
        );
        drop(tracked);
        info!(job_id = %job_id, "Scraping job queued.");
        Ok(job_id)
    }

    /// Live state for jobs still tracked by this orchestrator, stored state otherwise.
    async fn get_job_status(&self, job_id: &str) -> PortResult<Option<ScrapingJob>> {
        let live = self
            .running
            .lock()
            .await
            .get(job_id)
            .map(|running| running.job.clone());
        if let Some(job) = live {
            return Ok(Some(job.lock().await.clone()));
        }
        match self.runner.jobs.get_by_id(job_id).await {
            Ok(job) => Ok(Some(job)),
            Err(PortError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_recent_jobs(&self, limit: usize) -> PortResult<Vec<ScrapingJob>> {
        self.runner.jobs.list_recent(limit).await
    }

    async fn get_available_sources(&self) -> PortResult<Vec<Source>> {
        self.runner.sources.list_active().await
    }
}
