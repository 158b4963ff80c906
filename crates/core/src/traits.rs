use crate::{ContentAnalysis, ScrapedPage, SearchHit, ServiceError};
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait WebSearch {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>, ServiceError>;
}

#[async_trait]
pub trait NewsSearch {
    async fn get_news(&self, topic: &str, max_results: usize)
        -> Result<Vec<SearchHit>, ServiceError>;
}

/// Fetch failures surface as a page with empty `content`.
#[async_trait]
pub trait Scraper {
    async fn scrape(&self, url: &str) -> ScrapedPage;
}

/// Scoring failures surface as a zero score with empty content.
#[async_trait]
pub trait RelevanceScorer {
    async fn analyze(&self, content: &str, query: &str) -> ContentAnalysis;
}
