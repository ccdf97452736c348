pub mod entities;
pub mod error;
pub mod job;
pub mod ports;
pub mod value_objects;

pub use entities::{article_id, Article, Source};
pub use error::{DomainResult, ErrorContext, NewsScrapeError};
pub use job::{JobTransition, ScrapingJob, ScrapingStatus};
pub use ports::{
    ArticleQuery, ArticleRepository, DashboardService, DashboardSummary, JobRepository,
    PortError, PortResult, ScrapingControlService, SourceRepository, TagTrend, WebScraper,
};
pub use value_objects::{
    AnalysisResult, SentimentBounds, SentimentScore, SentimentType, Tag, Url,
};
