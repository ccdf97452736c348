//! crates/news_scraper_core/src/job.rs
//!
//! The scraping job aggregate and its lifecycle state machine.
//!
//! A job moves forward only:
//! Pending → InProgress → Completed/Failed
//!
//! Every transition goes through [`JobTransition::target`], so `start_time` is set exactly
//! when the job has left `Pending` and `end_time` exactly when it is terminal.

use crate::entities::Source;
use crate::error::{DomainResult, NewsScrapeError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrapingStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ScrapingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScrapingStatus::Completed | ScrapingStatus::Failed)
    }
}

impl fmt::Display for ScrapingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScrapingStatus::Pending => write!(f, "pending"),
            ScrapingStatus::InProgress => write!(f, "in_progress"),
            ScrapingStatus::Completed => write!(f, "completed"),
            ScrapingStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for ScrapingStatus {
    type Err = NewsScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScrapingStatus::Pending),
            "in_progress" => Ok(ScrapingStatus::InProgress),
            "completed" => Ok(ScrapingStatus::Completed),
            "failed" => Ok(ScrapingStatus::Failed),
            other => Err(NewsScrapeError::UnknownVariant {
                kind: "scraping status",
                value: other.to_string(),
            }),
        }
    }
}

/// The status-changing operations on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobTransition {
    Start,
    Complete,
    Fail,
}

impl JobTransition {
    /// The transition table. `None` means the move is illegal from `from`.
    pub fn target(self, from: ScrapingStatus) -> Option<ScrapingStatus> {
        use JobTransition::*;
        use ScrapingStatus::*;

        match (from, self) {
            (Pending, Start) => Some(InProgress),
            (InProgress, Complete) => Some(Completed),
            (InProgress, Fail) => Some(Failed),
            _ => None,
        }
    }
}

impl fmt::Display for JobTransition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobTransition::Start => write!(f, "start"),
            JobTransition::Complete => write!(f, "complete"),
            JobTransition::Fail => write!(f, "fail"),
        }
    }
}

/// A batch scrape over a set of sources.
#[derive(Debug, Clone)]
pub struct ScrapingJob {
    job_id: String,
    sources: Vec<Source>,
    requested_tags: Vec<String>,
    status: ScrapingStatus,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    articles_found: usize,
    errors: Vec<String>,
    created_at: DateTime<Utc>,
}

impl ScrapingJob {
    pub fn new(
        job_id: impl Into<String>,
        sources: Vec<Source>,
        requested_tags: Vec<String>,
    ) -> DomainResult<Self> {
        let job_id = job_id.into();
        if job_id.trim().is_empty() {
            return Err(NewsScrapeError::job(job_id, "Job id cannot be empty"));
        }
        Ok(Self {
            job_id,
            sources,
            requested_tags,
            status: ScrapingStatus::Pending,
            start_time: None,
            end_time: None,
            articles_found: 0,
            errors: Vec::new(),
            created_at: Utc::now(),
        })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn requested_tags(&self) -> &[String] {
        &self.requested_tags
    }

    pub fn status(&self) -> ScrapingStatus {
        self.status
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn articles_found(&self) -> usize {
        self.articles_found
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether `transition` is legal from the current status.
    pub fn can(&self, transition: JobTransition) -> bool {
        transition.target(self.status).is_some()
    }

    fn advance(&mut self, transition: JobTransition) -> DomainResult<DateTime<Utc>> {
        let next = transition
            .target(self.status)
            .ok_or_else(|| NewsScrapeError::InvalidTransition {
                job_id: self.job_id.clone(),
                current: self.status,
                attempted: transition,
            })?;
        self.status = next;
        Ok(Utc::now())
    }

    pub fn start(&mut self) -> DomainResult<()> {
        let now = self.advance(JobTransition::Start)?;
        self.start_time = Some(now);
        Ok(())
    }

    pub fn complete(&mut self, articles_count: usize) -> DomainResult<()> {
        let now = self.advance(JobTransition::Complete)?;
        self.end_time = Some(now);
        self.articles_found = articles_count;
        Ok(())
    }

    pub fn fail(&mut self, error_message: impl Into<String>) -> DomainResult<()> {
        let now = self.advance(JobTransition::Fail)?;
        self.end_time = Some(now);
        self.errors.push(error_message.into());
        Ok(())
    }

    /// Records a non-fatal error. Allowed in every state.
    pub fn add_error(&mut self, error_message: impl Into<String>) {
        self.errors.push(error_message.into());
    }

    /// Elapsed seconds between start and end, once both are known.
    pub fn duration(&self) -> Option<f64> {
        let (start, end) = (self.start_time?, self.end_time?);
        let elapsed = end - start;
        Some(
            elapsed
                .num_microseconds()
                .map_or(elapsed.num_milliseconds() as f64 / 1_000.0, |us| {
                    us as f64 / 1_000_000.0
                }),
        )
    }

    pub fn is_running(&self) -> bool {
        self.status == ScrapingStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.status == ScrapingStatus::Completed
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
