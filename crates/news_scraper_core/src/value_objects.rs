//! crates/news_scraper_core/src/value_objects.rs
//!
//! Self-validating primitives: URLs, sentiment scores, tags and analysis results.
//! Construction is the only validation gate; a value that exists is a valid value.

use crate::error::{DomainResult, NewsScrapeError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

pub const SENTIMENT_MIN_SCORE: f64 = -0.1;
pub const SENTIMENT_MAX_SCORE: f64 = 0.1;
pub const SENTIMENT_MIN_CONFIDENCE: f64 = 0.0;
pub const SENTIMENT_MAX_CONFIDENCE: f64 = 1.0;

pub const TAG_MIN_RELEVANCE_SCORE: f64 = 0.0;
pub const TAG_MAX_RELEVANCE_SCORE: f64 = 1.0;

/// Rejects `actual` unless `min <= actual <= max`. NaN is always rejected.
pub(crate) fn check_range(label: &'static str, actual: f64, min: f64, max: f64) -> DomainResult<()> {
    if (min..=max).contains(&actual) {
        Ok(())
    } else {
        Err(NewsScrapeError::OutOfRange {
            label,
            min,
            max,
            actual,
        })
    }
}

//=========================================================================================
// Url
//=========================================================================================

/// An absolute URL with a non-empty scheme and authority.
///
/// Equality and hashing use the string the URL was built from, not its normalized form.
#[derive(Debug, Clone)]
pub struct Url {
    value: String,
    scheme: String,
    authority: String,
}

impl Url {
    pub fn parse(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        let invalid = || NewsScrapeError::InvalidUrl {
            value: value.clone(),
        };

        let trimmed = value.trim();
        let parsed = url::Url::parse(trimmed).map_err(|_| invalid())?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(invalid());
        }
        let authority = written_authority(trimmed).ok_or_else(invalid)?.to_string();

        Ok(Self {
            scheme: parsed.scheme().to_string(),
            authority,
            value,
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The authority component, e.g. `news.example.com:8080`.
    pub fn domain(&self) -> &str {
        &self.authority
    }

    /// Scheme plus authority, e.g. `https://news.example.com`.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }
}

/// The authority exactly as written: the text between `scheme://` and the next `/`, `?`
/// or `#`. `None` when the `//` marker is missing or nothing follows it.
fn written_authority(text: &str) -> Option<&str> {
    let (scheme, rest) = text.split_once(':')?;
    let rest = rest.strip_prefix("//")?;
    let end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let authority = &rest[..end];
    (!scheme.is_empty() && !authority.is_empty()).then_some(authority)
}

impl PartialEq for Url {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Url {}

impl Hash for Url {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl FromStr for Url {
    type Err = NewsScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

//=========================================================================================
// Sentiment
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentType {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

impl SentimentType {
    pub const ALL: [SentimentType; 4] = [
        SentimentType::Positive,
        SentimentType::Negative,
        SentimentType::Neutral,
        SentimentType::Unknown,
    ];
}

impl fmt::Display for SentimentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SentimentType::Positive => write!(f, "positive"),
            SentimentType::Negative => write!(f, "negative"),
            SentimentType::Neutral => write!(f, "neutral"),
            SentimentType::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for SentimentType {
    type Err = NewsScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentType::Positive),
            "negative" => Ok(SentimentType::Negative),
            "neutral" => Ok(SentimentType::Neutral),
            "unknown" => Ok(SentimentType::Unknown),
            other => Err(NewsScrapeError::UnknownVariant {
                kind: "sentiment type",
                value: other.to_string(),
            }),
        }
    }
}

/// The configured constants that bound a sentiment score.
///
/// The score bounds do double duty: they are the legal construction range and the
/// positive/negative classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentBounds {
    pub min_score: f64,
    pub max_score: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl Default for SentimentBounds {
    fn default() -> Self {
        Self {
            min_score: SENTIMENT_MIN_SCORE,
            max_score: SENTIMENT_MAX_SCORE,
            min_confidence: SENTIMENT_MIN_CONFIDENCE,
            max_confidence: SENTIMENT_MAX_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    score: f64,
    confidence: f64,
    bounds: SentimentBounds,
}

impl SentimentScore {
    pub fn new(score: f64, confidence: f64) -> DomainResult<Self> {
        Self::with_bounds(score, confidence, SentimentBounds::default())
    }

    pub fn with_bounds(score: f64, confidence: f64, bounds: SentimentBounds) -> DomainResult<Self> {
        check_range("Score", score, bounds.min_score, bounds.max_score)?;
        check_range(
            "Confidence",
            confidence,
            bounds.min_confidence,
            bounds.max_confidence,
        )?;
        Ok(Self {
            score,
            confidence,
            bounds,
        })
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn bounds(&self) -> SentimentBounds {
        self.bounds
    }

    /// Classifies the score. Low confidence wins over any score; scores strictly beyond
    /// the configured bounds are positive or negative; everything else is neutral.
    pub fn sentiment_type(&self) -> SentimentType {
        if self.confidence < self.bounds.min_confidence {
            SentimentType::Unknown
        } else if self.score > self.bounds.max_score {
            SentimentType::Positive
        } else if self.score < self.bounds.min_score {
            SentimentType::Negative
        } else {
            SentimentType::Neutral
        }
    }
}

//=========================================================================================
// Tag
//=========================================================================================

/// A label attached to articles. Tags are the same tag when their normalized names match.
#[derive(Debug, Clone)]
pub struct Tag {
    name: String,
    category: Option<String>,
    relevance_score: f64,
}

impl Tag {
    /// Creates a tag with full relevance and no category.
    pub fn new(name: &str) -> DomainResult<Self> {
        Self::with_details(name, None, TAG_MAX_RELEVANCE_SCORE)
    }

    pub fn with_details(
        name: &str,
        category: Option<String>,
        relevance_score: f64,
    ) -> DomainResult<Self> {
        let normalized = normalize_tag_name(name);
        if normalized.is_empty() {
            return Err(NewsScrapeError::invalid_tag("Tag name cannot be empty"));
        }
        check_range(
            "Relevance score",
            relevance_score,
            TAG_MIN_RELEVANCE_SCORE,
            TAG_MAX_RELEVANCE_SCORE,
        )?;
        Ok(Self {
            name: normalized,
            category,
            relevance_score,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn relevance_score(&self) -> f64 {
        self.relevance_score
    }

    pub fn set_relevance_score(&mut self, relevance_score: f64) -> DomainResult<()> {
        check_range(
            "Relevance score",
            relevance_score,
            TAG_MIN_RELEVANCE_SCORE,
            TAG_MAX_RELEVANCE_SCORE,
        )?;
        self.relevance_score = relevance_score;
        Ok(())
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

pub(crate) fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

//=========================================================================================
// AnalysisResult
//=========================================================================================

/// The outcome of analysing an article's text.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    sentiment: Option<SentimentScore>,
    keywords: Vec<String>,
    topics: Vec<String>,
    word_count: usize,
    reading_time_in_minutes: f64,
    analysis_timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Builds a result stamped with the current time.
    pub fn new(
        sentiment: Option<SentimentScore>,
        keywords: Vec<String>,
        topics: Vec<String>,
        word_count: usize,
        reading_time_in_minutes: f64,
    ) -> DomainResult<Self> {
        Self::at(
            sentiment,
            keywords,
            topics,
            word_count,
            reading_time_in_minutes,
            Utc::now(),
        )
    }

    /// Builds a result with an explicit timestamp, which must not lie in the future.
    pub fn at(
        sentiment: Option<SentimentScore>,
        keywords: Vec<String>,
        topics: Vec<String>,
        word_count: usize,
        reading_time_in_minutes: f64,
        analysis_timestamp: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if reading_time_in_minutes.is_nan() || reading_time_in_minutes < 0.0 {
            return Err(NewsScrapeError::invalid_analysis(
                "Reading time cannot be negative",
            ));
        }
        if analysis_timestamp > Utc::now() {
            return Err(NewsScrapeError::invalid_analysis(
                "Analysis timestamp cannot be in the future",
            ));
        }
        Ok(Self {
            sentiment,
            keywords,
            topics,
            word_count,
            reading_time_in_minutes,
            analysis_timestamp,
        })
    }

    pub fn sentiment(&self) -> Option<&SentimentScore> {
        self.sentiment.as_ref()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn reading_time_in_minutes(&self) -> f64 {
        self.reading_time_in_minutes
    }

    pub fn analysis_timestamp(&self) -> DateTime<Utc> {
        self.analysis_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn url_derives_domain_and_base_url() {
        let url = Url::parse("https://news.example.com/world/2024/story?id=3").unwrap();
        assert_eq!(url.domain(), "news.example.com");
        assert_eq!(url.base_url(), "https://news.example.com");
        assert_eq!(url.value(), "https://news.example.com/world/2024/story?id=3");
    }

    #[test]
    fn url_keeps_explicit_port_in_domain() {
        let url = Url::parse("http://localhost:8080/feed").unwrap();
        assert_eq!(url.domain(), "localhost:8080");
        assert_eq!(url.base_url(), "http://localhost:8080");
    }

    #[test]
    fn url_domain_is_the_authority_as_written() {
        let url = Url::parse("https://News.Example.com:443/x").unwrap();
        assert_eq!(url.domain(), "News.Example.com:443");
        assert_eq!(url.base_url(), "https://News.Example.com:443");

        let url = Url::parse("  https://desk@wire.example.com?page=2 ").unwrap();
        assert_eq!(url.domain(), "desk@wire.example.com");
    }

    #[test]
    fn url_rejects_missing_scheme_or_authority() {
        for raw in [
            "",
            "example.com/path",
            "/relative/path",
            "mailto:desk@example.com",
            "https://",
            "https:example.com",
            "http:/example.com",
        ] {
            let err = Url::parse(raw).unwrap_err();
            assert_eq!(err, NewsScrapeError::InvalidUrl { value: raw.to_string() }, "{raw}");
        }
    }

    #[test]
    fn url_equality_uses_the_original_string() {
        let a = Url::parse("https://a.com/x").unwrap();
        let b: Url = "https://a.com/x".parse().unwrap();
        let c = Url::parse("https://a.com/y").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn sentiment_score_within_bounds() {
        let score = SentimentScore::new(0.05, 0.9).unwrap();
        assert_eq!(score.score(), 0.05);
        assert_eq!(score.confidence(), 0.9);
        assert_eq!(score.sentiment_type(), SentimentType::Neutral);
    }

    #[test]
    fn sentiment_score_out_of_bounds_names_bounds_and_value() {
        let err = SentimentScore::new(0.5, 0.9).unwrap_err();
        assert_eq!(err.to_string(), "Score must be between -0.1 and 0.1, got 0.5");

        let err = SentimentScore::new(0.0, 1.5).unwrap_err();
        assert_eq!(err.to_string(), "Confidence must be between 0.0 and 1.0, got 1.5");

        assert!(SentimentScore::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn sentiment_bounds_are_inclusive_and_classify_as_neutral() {
        let high = SentimentScore::new(SENTIMENT_MAX_SCORE, 0.0).unwrap();
        let low = SentimentScore::new(SENTIMENT_MIN_SCORE, 1.0).unwrap();
        assert_eq!(high.sentiment_type(), SentimentType::Neutral);
        assert_eq!(low.sentiment_type(), SentimentType::Neutral);
    }

    #[test]
    fn custom_bounds_drive_validation_and_classification() {
        let bounds = SentimentBounds {
            min_confidence: 0.3,
            ..SentimentBounds::default()
        };
        let err = SentimentScore::with_bounds(0.0, 0.2, bounds).unwrap_err();
        assert_eq!(err.to_string(), "Confidence must be between 0.3 and 1.0, got 0.2");

        let score = SentimentScore::with_bounds(-0.02, 0.3, bounds).unwrap();
        assert_eq!(score.sentiment_type(), SentimentType::Neutral);
        assert_eq!(score.bounds(), bounds);
    }

    #[test]
    fn sentiment_type_round_trips_through_strings() {
        for kind in SentimentType::ALL {
            assert_eq!(kind.to_string().parse::<SentimentType>(), Ok(kind));
        }
        let err = "sad".parse::<SentimentType>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown sentiment type: 'sad'");
    }

    #[test]
    fn tag_names_are_normalized() {
        let tag = Tag::with_details("  Politics ", None, 0.5).unwrap();
        assert_eq!(tag.name(), "politics");
        assert_eq!(tag.relevance_score(), 0.5);
        assert_eq!(tag, Tag::new("POLITICS").unwrap());
    }

    #[test]
    fn tag_rejects_empty_name_and_bad_relevance() {
        let err = Tag::new("").unwrap_err();
        assert_eq!(err, NewsScrapeError::invalid_tag("Tag name cannot be empty"));
        assert!(Tag::new("   ").is_err());

        let err = Tag::with_details("economy", None, 1.2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Relevance score must be between 0.0 and 1.0, got 1.2"
        );
    }

    #[test]
    fn tag_relevance_can_be_updated_within_bounds() {
        let mut tag = Tag::new("climate").unwrap();
        tag.set_relevance_score(0.25).unwrap();
        assert_eq!(tag.relevance_score(), 0.25);
        assert!(tag.set_relevance_score(-0.5).is_err());
        assert_eq!(tag.relevance_score(), 0.25);
    }

    #[test]
    fn analysis_result_keeps_keyword_order() {
        let analysis = AnalysisResult::new(
            Some(SentimentScore::new(0.0, 0.8).unwrap()),
            vec!["rates".into(), "inflation".into(), "bank".into()],
            vec!["economy".into()],
            420,
            2.1,
        )
        .unwrap();
        assert_eq!(analysis.keywords(), ["rates", "inflation", "bank"]);
        assert_eq!(analysis.word_count(), 420);
    }

    #[test]
    fn analysis_result_rejects_negative_reading_time_and_future_timestamp() {
        let err = AnalysisResult::new(None, vec![], vec![], 0, -1.0).unwrap_err();
        assert_eq!(err.to_string(), "Reading time cannot be negative");

        let future = Utc::now() + Duration::hours(1);
        let err = AnalysisResult::at(None, vec![], vec![], 0, 0.0, future).unwrap_err();
        assert_eq!(err.to_string(), "Analysis timestamp cannot be in the future");

        let past = Utc::now() - Duration::minutes(5);
        assert!(AnalysisResult::at(None, vec![], vec![], 10, 0.1, past).is_ok());
    }
}
