pub mod gemini;
pub mod html_scraper;
pub mod relevance;
pub mod retry;
pub mod serpapi;

pub use gemini::GeminiClient;
pub use html_scraper::HtmlScraper;
pub use relevance::LlmRelevanceScorer;
pub use retry::{with_retries, RetryPolicy};
pub use serpapi::SerpApiClient;

pub use reqwest::Client as HttpClient;
