//! crates/news_scraper_core/src/entities.rs
//!
//! The mutable entities of the domain: scraped articles and the sources they come from.
//! Both are fully validated when constructed and only expose narrow mutations afterwards.

use crate::error::{DomainResult, NewsScrapeError};
use crate::value_objects::{normalize_tag_name, AnalysisResult, SentimentType, Tag, Url};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

pub const RELIABILITY_MIN_SCORE: f64 = 0.0;
pub const RELIABILITY_MAX_SCORE: f64 = 1.0;

/// Hex characters of the URL digest kept in an article id.
const ARTICLE_ID_HASH_LEN: usize = 16;

/// Derives the deduplication key for an article: `"{source_name}_{hash}"`.
///
/// The hash is a truncated SHA-256 of the URL string, so the id is the same across
/// processes and restarts.
pub fn article_id(source_name: &str, url: &Url) -> String {
    let digest = format!("{:x}", Sha256::digest(url.value().as_bytes()));
    format!("{}_{}", source_name, &digest[..ARTICLE_ID_HASH_LEN])
}

fn require_text(value: &str, message: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        Err(NewsScrapeError::invalid_article(message))
    } else {
        Ok(())
    }
}

//=========================================================================================
// Article
//=========================================================================================

/// A single scraped page.
#[derive(Debug, Clone)]
pub struct Article {
    id: String,
    title: String,
    content: String,
    url: Url,
    source_name: String,
    published_date: Option<DateTime<Utc>>,
    tags: Vec<Tag>,
    analysis: Option<AnalysisResult>,
    scraped_at: DateTime<Utc>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: Url,
        source_name: impl Into<String>,
    ) -> DomainResult<Self> {
        let title = title.into();
        let content = content.into();
        let source_name = source_name.into();

        require_text(&title, "Title cannot be empty")?;
        require_text(&content, "Content cannot be empty")?;
        require_text(&source_name, "Source name cannot be empty")?;

        Ok(Self {
            id: article_id(&source_name, &url),
            title,
            content,
            url,
            source_name,
            published_date: None,
            tags: Vec::new(),
            analysis: None,
            scraped_at: Utc::now(),
        })
    }

    /// Replaces the derived id with one assigned elsewhere (e.g. loaded from storage).
    pub fn with_id(mut self, id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        require_text(&id, "Article id cannot be empty")?;
        self.id = id;
        Ok(self)
    }

    pub fn with_published_date(mut self, published_date: DateTime<Utc>) -> Self {
        self.published_date = Some(published_date);
        self
    }

    pub fn with_scraped_at(mut self, scraped_at: DateTime<Utc>) -> Self {
        self.scraped_at = scraped_at;
        self
    }

    pub fn with_analysis(mut self, analysis: AnalysisResult) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        for tag in tags {
            self.add_tag(tag);
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        self.published_date
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }

    /// Appends the tag unless one with the same normalized name is already present.
    /// Returns whether the tag was added.
    pub fn add_tag(&mut self, tag: Tag) -> bool {
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Case and whitespace insensitive.
    pub fn has_tag(&self, tag_name: &str) -> bool {
        let wanted = normalize_tag_name(tag_name);
        self.tags.iter().any(|tag| tag.name() == wanted)
    }

    /// True when `tag_names` is empty or the article carries at least one of them.
    pub fn matches_any_tag<S: AsRef<str>>(&self, tag_names: &[S]) -> bool {
        tag_names.is_empty() || tag_names.iter().any(|name| self.has_tag(name.as_ref()))
    }

    pub fn attach_analysis(&mut self, analysis: AnalysisResult) {
        self.analysis = Some(analysis);
    }

    pub fn is_analyzed(&self) -> bool {
        self.analysis.is_some()
    }

    pub fn sentiment_type(&self) -> SentimentType {
        self.analysis
            .as_ref()
            .and_then(AnalysisResult::sentiment)
            .map_or(SentimentType::Unknown, |sentiment| sentiment.sentiment_type())
    }
}

//=========================================================================================
// Source
//=========================================================================================

/// A site that articles are scraped from. The name is its identity and never changes.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    base_url: Url,
    description: Option<String>,
    is_active: bool,
    scraping_config: HashMap<String, String>,
    reliability_score: f64,
    last_scraped: Option<DateTime<Utc>>,
}

impl Source {
    /// Creates an active source with full reliability and no scraping config.
    pub fn new(name: impl Into<String>, base_url: Url) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(NewsScrapeError::invalid_source("Source name cannot be empty"));
        }
        Ok(Self {
            name,
            base_url,
            description: None,
            is_active: true,
            scraping_config: HashMap::new(),
            reliability_score: RELIABILITY_MAX_SCORE,
            last_scraped: None,
        })
    }

    /// Like [`Source::new`] but from a raw URL string. A malformed URL is reported as an
    /// invalid source.
    pub fn parse(name: impl Into<String>, raw_base_url: &str) -> DomainResult<Self> {
        let base_url = Url::parse(raw_base_url).map_err(|err| {
            NewsScrapeError::InvalidSource(crate::error::ErrorContext::with_details(
                "Invalid base URL",
                err.to_string(),
            ))
        })?;
        Self::new(name, base_url)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn with_config(mut self, scraping_config: HashMap<String, String>) -> Self {
        self.scraping_config = scraping_config;
        self
    }

    pub fn with_reliability_score(mut self, reliability_score: f64) -> DomainResult<Self> {
        crate::value_objects::check_range(
            "Reliability score",
            reliability_score,
            RELIABILITY_MIN_SCORE,
            RELIABILITY_MAX_SCORE,
        )?;
        self.reliability_score = reliability_score;
        Ok(self)
    }

    pub fn with_last_scraped(mut self, last_scraped: DateTime<Utc>) -> Self {
        self.last_scraped = Some(last_scraped);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn scraping_config(&self) -> &HashMap<String, String> {
        &self.scraping_config
    }

    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.scraping_config.get(key).map(String::as_str)
    }

    pub fn reliability_score(&self) -> f64 {
        self.reliability_score
    }

    pub fn last_scraped(&self) -> Option<DateTime<Utc>> {
        self.last_scraped
    }

    pub fn domain(&self) -> &str {
        self.base_url.domain()
    }

    /// Stamps the end of a scrape attempt. Each call overwrites the previous timestamp.
    pub fn update_last_scraped(&mut self) {
        self.last_scraped = Some(Utc::now());
    }

    /// Fails with the first of `keys` missing from the scraping config.
    pub fn requires_config<S: AsRef<str>>(&self, keys: &[S]) -> DomainResult<()> {
        match keys
            .iter()
            .map(AsRef::as_ref)
            .find(|key| !self.scraping_config.contains_key(*key))
        {
            Some(missing) => Err(NewsScrapeError::SourceConfiguration {
                source_name: self.name.clone(),
                missing_config: missing.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::SentimentScore;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    fn article(source: &str, raw_url: &str) -> Article {
        Article::new("Rates rise", "The central bank raised rates.", url(raw_url), source).unwrap()
    }

    #[test]
    fn empty_required_fields_are_rejected() {
        let err = Article::new("", "x", url("https://a.com"), "s").unwrap_err();
        assert_eq!(err, NewsScrapeError::invalid_article("Title cannot be empty"));

        let err = Article::new("t", "  ", url("https://a.com"), "s").unwrap_err();
        assert_eq!(err.to_string(), "Content cannot be empty");

        let err = Article::new("t", "x", url("https://a.com"), "\t").unwrap_err();
        assert_eq!(err.to_string(), "Source name cannot be empty");
    }

    #[test]
    fn id_is_derived_from_source_and_url() {
        let a = article("bbc", "https://bbc.co.uk/news/1");
        let b = article("bbc", "https://bbc.co.uk/news/1");
        assert_eq!(a.id(), b.id());
        assert!(a.id().starts_with("bbc_"));
        assert_eq!(a.id().len(), "bbc_".len() + ARTICLE_ID_HASH_LEN);

        let other_url = article("bbc", "https://bbc.co.uk/news/2");
        let other_source = article("reuters", "https://bbc.co.uk/news/1");
        assert_ne!(a.id(), other_url.id());
        assert_ne!(a.id(), other_source.id());
    }

    #[test]
    fn id_hash_is_stable() {
        // SHA-256("https://a.com") truncated to 16 hex characters.
        assert_eq!(article_id("s", &url("https://a.com")), "s_4b59642f5a13d013");
    }

    #[test]
    fn explicit_id_overrides_derived_one() {
        let a = article("bbc", "https://bbc.co.uk/news/1").with_id("stored-42").unwrap();
        assert_eq!(a.id(), "stored-42");
        assert!(article("bbc", "https://bbc.co.uk/news/1").with_id(" ").is_err());
    }

    #[test]
    fn add_tag_is_idempotent_by_normalized_name() {
        let mut a = article("bbc", "https://bbc.co.uk/news/1");
        assert!(a.add_tag(Tag::new("Economy").unwrap()));
        assert!(!a.add_tag(Tag::new("  economy ").unwrap()));
        assert!(a.add_tag(Tag::new("politics").unwrap()));

        let names: Vec<_> = a.tags().iter().map(Tag::name).collect();
        assert_eq!(names, ["economy", "politics"]);
        assert!(a.has_tag(" ECONOMY"));
        assert!(!a.has_tag("sport"));
        assert!(a.matches_any_tag(&["sport", "Politics"]));
        assert!(a.matches_any_tag::<&str>(&[]));
        assert!(!a.matches_any_tag(&["sport"]));
    }

    #[test]
    fn sentiment_type_delegates_to_analysis() {
        let mut a = article("bbc", "https://bbc.co.uk/news/1");
        assert!(!a.is_analyzed());
        assert_eq!(a.sentiment_type(), SentimentType::Unknown);

        a.attach_analysis(AnalysisResult::new(None, vec![], vec![], 5, 0.1).unwrap());
        assert!(a.is_analyzed());
        assert_eq!(a.sentiment_type(), SentimentType::Unknown);

        let scored = AnalysisResult::new(
            Some(SentimentScore::new(0.02, 0.7).unwrap()),
            vec![],
            vec![],
            5,
            0.1,
        )
        .unwrap();
        a.attach_analysis(scored);
        assert_eq!(a.sentiment_type(), SentimentType::Neutral);
    }

    #[test]
    fn source_validates_name_url_and_reliability() {
        assert!(Source::new(" ", url("https://a.com")).unwrap_err().is_invalid_source());

        let err = Source::parse("a", "not a url").unwrap_err();
        assert!(err.is_invalid_source());
        assert_eq!(err.message(), "Invalid base URL");
        assert_eq!(err.details().as_deref(), Some("Invalid URL format: not a url"));

        let err = Source::new("a", url("https://a.com"))
            .unwrap()
            .with_reliability_score(1.5)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Reliability score must be between 0.0 and 1.0, got 1.5"
        );
    }

    #[test]
    fn source_exposes_domain_and_stamps_last_scraped() {
        let mut source = Source::parse("guardian", "https://www.theguardian.com/uk").unwrap();
        assert_eq!(source.domain(), "www.theguardian.com");
        assert!(source.is_active());
        assert_eq!(source.reliability_score(), 1.0);
        assert_eq!(source.last_scraped(), None);

        source.update_last_scraped();
        let first = source.last_scraped().unwrap();
        source.update_last_scraped();
        let second = source.last_scraped().unwrap();
        assert!(second >= first);
        assert_eq!(source.name(), "guardian");
    }

    #[test]
    fn requires_config_reports_first_missing_key() {
        let config = HashMap::from([("article_selector".to_string(), "article".to_string())]);
        let source = Source::parse("ap", "https://apnews.com")
            .unwrap()
            .with_config(config);

        assert!(source.requires_config(&["article_selector"]).is_ok());
        assert_eq!(source.config_value("article_selector"), Some("article"));

        let err = source
            .requires_config(&["article_selector", "title_selector"])
            .unwrap_err();
        assert_eq!(
            err,
            NewsScrapeError::SourceConfiguration {
                source_name: "ap".to_string(),
                missing_config: "title_selector".to_string(),
            }
        );
    }
}
