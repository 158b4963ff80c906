pub mod budget;
pub mod clients;
pub mod error;
pub mod extractor;
pub mod intent;
pub mod llm_json;
pub mod models;
pub mod orchestrator;
pub mod rate_limit;
pub mod retriever;
pub mod synthesizer;
pub mod text;
pub mod traits;

pub use budget::BudgetPolicy;
pub use clients::{GeminiClient, HtmlScraper, LlmRelevanceScorer, RetryPolicy, SerpApiClient};
pub use error::{ResearchError, ServiceError};
pub use extractor::{Extractor, RELEVANCE_THRESHOLD};
pub use intent::IntentAnalyzer;
pub use models::{
    ContentAnalysis, ExtractedItem, Intent, Report, ResearchOutcome, ScrapedPage, SearchHit,
    SourceRef, NO_RESULTS_MESSAGE, SYNTHESIS_FAILED_MESSAGE,
};
pub use orchestrator::{RateLimits, ResearchPipeline, ERROR_PREFIX};
pub use rate_limit::RateLimiter;
pub use retriever::Retriever;
pub use synthesizer::Synthesizer;
pub use traits::{NewsSearch, RelevanceScorer, Scraper, TextGenerator, WebSearch};
