pub mod fixture_scraper;
pub mod memory;

pub use fixture_scraper::{FixtureFeed, FixtureScraper};
pub use memory::{InMemoryArticleRepository, InMemoryJobRepository, InMemorySourceRepository};
