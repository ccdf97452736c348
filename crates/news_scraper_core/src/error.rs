//! crates/news_scraper_core/src/error.rs
//!
//! The domain error taxonomy. Every failure raised by the value objects, the entities
//! and the job aggregate is one of these variants.
//!
//! Each error renders as `"{message}. {details}"` when details are present, otherwise
//! just `{message}`.

use std::fmt;

/// A human-readable message plus optional details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub message: String,
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            message: message.into(),
            details: (!details.is_empty()).then_some(details),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}. {}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NewsScrapeError {
    #[error("{0}")]
    InvalidArticle(ErrorContext),

    #[error("{0}")]
    InvalidSource(ErrorContext),

    #[error("{0}")]
    InvalidTag(ErrorContext),

    /// An analysis payload was rejected (negative reading time, future timestamp).
    #[error("{0}")]
    InvalidAnalysis(ErrorContext),

    /// A string that does not parse into a URL with both a scheme and an authority.
    #[error("Invalid URL format: {value}")]
    InvalidUrl { value: String },

    /// A numeric field fell outside its inclusive bounds.
    #[error("{label} must be between {min:?} and {max:?}, got {actual:?}")]
    OutOfRange {
        label: &'static str,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Article with ID '{article_id}' already exists{}", existing_source_suffix(.existing_source))]
    DuplicateArticle {
        article_id: String,
        existing_source: Option<String>,
    },

    #[error("Job {job_id}: {context}")]
    Job {
        job_id: String,
        context: ErrorContext,
    },

    /// A lifecycle call that the job's current state does not permit.
    #[error("Job {job_id}: cannot {attempted} while {current}")]
    InvalidTransition {
        job_id: String,
        current: crate::job::ScrapingStatus,
        attempted: crate::job::JobTransition,
    },

    /// A string that names no variant of a domain enum.
    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Source '{source_name}' is missing required configuration. Missing: {missing_config}")]
    SourceConfiguration {
        source_name: String,
        missing_config: String,
    },
}

fn existing_source_suffix(existing_source: &Option<String>) -> String {
    existing_source
        .as_deref()
        .map(|source| format!(". from source: {source}"))
        .unwrap_or_default()
}

impl NewsScrapeError {
    pub fn invalid_article(message: impl Into<String>) -> Self {
        Self::InvalidArticle(ErrorContext::new(message))
    }

    pub fn invalid_source(message: impl Into<String>) -> Self {
        Self::InvalidSource(ErrorContext::new(message))
    }

    pub fn invalid_tag(message: impl Into<String>) -> Self {
        Self::InvalidTag(ErrorContext::new(message))
    }

    pub fn invalid_analysis(message: impl Into<String>) -> Self {
        Self::InvalidAnalysis(ErrorContext::new(message))
    }

    pub fn job(job_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Job {
            job_id: job_id.into(),
            context: ErrorContext::new(message),
        }
    }

    /// The headline message, without details.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidArticle(ctx)
            | Self::InvalidSource(ctx)
            | Self::InvalidTag(ctx)
            | Self::InvalidAnalysis(ctx) => ctx.message.clone(),
            Self::DuplicateArticle { article_id, .. } => {
                format!("Article with ID '{article_id}' already exists")
            }
            Self::Job { job_id, context } => format!("Job {job_id}: {}", context.message),
            Self::SourceConfiguration { source_name, .. } => {
                format!("Source '{source_name}' is missing required configuration")
            }
            Self::InvalidUrl { .. }
            | Self::OutOfRange { .. }
            | Self::InvalidTransition { .. }
            | Self::UnknownVariant { .. } => self.to_string(),
        }
    }

    /// The optional details appended to the message in the display form.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::InvalidArticle(ctx)
            | Self::InvalidSource(ctx)
            | Self::InvalidTag(ctx)
            | Self::InvalidAnalysis(ctx) => ctx.details.clone(),
            Self::DuplicateArticle {
                existing_source, ..
            } => existing_source
                .as_ref()
                .map(|source| format!("from source: {source}")),
            Self::Job { context, .. } => context.details.clone(),
            Self::SourceConfiguration { missing_config, .. } => {
                Some(format!("Missing: {missing_config}"))
            }
            Self::InvalidUrl { .. }
            | Self::OutOfRange { .. }
            | Self::InvalidTransition { .. }
            | Self::UnknownVariant { .. } => None,
        }
    }

    /// True for the invalid-source family, which includes configuration errors.
    pub fn is_invalid_source(&self) -> bool {
        matches!(
            self,
            Self::InvalidSource(_) | Self::SourceConfiguration { .. }
        )
    }

    /// True for the job-error family, which includes illegal transitions.
    pub fn is_job_error(&self) -> bool {
        matches!(self, Self::Job { .. } | Self::InvalidTransition { .. })
    }
}

pub type DomainResult<T> = Result<T, NewsScrapeError>;
