use crate::budget::BudgetPolicy;
use crate::rate_limit::RateLimiter;
use crate::text::truncate_chars;
use crate::traits::{RelevanceScorer, Scraper};
use crate::{ContentAnalysis, ExtractedItem, ScrapedPage, SearchHit};
use std::sync::Arc;
use tracing::debug;

pub const RELEVANCE_THRESHOLD: f64 = 5.0;

pub struct Extractor<S, R> {
    scraper: S,
    scorer: R,
    budget: BudgetPolicy,
    fetch_limiter: Arc<RateLimiter>,
    scoring_limiter: Arc<RateLimiter>,
}

impl<S, R> Extractor<S, R>
where
    S: Scraper + Send + Sync,
    R: RelevanceScorer + Send + Sync,
{
    pub fn new(
        scraper: S,
        scorer: R,
        budget: BudgetPolicy,
        fetch_limiter: Arc<RateLimiter>,
        scoring_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            scraper,
            scorer,
            budget,
            fetch_limiter,
            scoring_limiter,
        }
    }

    pub async fn extract(&self, hits: &[SearchHit], query: &str) -> Vec<ExtractedItem> {
        let mut kept = Vec::new();

        for hit in hits.iter().take(self.budget.max_total_results) {
            if let Some(item) = self.extract_one(hit, query).await {
                kept.push(item);
            }
        }

        rank_items(kept, self.budget.max_extracted_sources)
    }

    async fn extract_one(&self, hit: &SearchHit, query: &str) -> Option<ExtractedItem> {
        if hit.link.trim().is_empty() {
            return None;
        }

        self.fetch_limiter.acquire().await;
        let page = self.scraper.scrape(&hit.link).await;
        if page.content.trim().is_empty() {
            debug!(url = %hit.link, "no content scraped, skipping");
            return None;
        }

        self.scoring_limiter.acquire().await;
        let analysis = self.scorer.analyze(&page.content, query).await;
        if analysis.relevance_score < RELEVANCE_THRESHOLD {
            debug!(url = %hit.link, score = analysis.relevance_score, "below relevance threshold");
            return None;
        }

        Some(build_item(hit, page, analysis, self.budget.max_item_content_length))
    }
}

fn build_item(
    hit: &SearchHit,
    page: ScrapedPage,
    analysis: ContentAnalysis,
    max_content_length: usize,
) -> ExtractedItem {
    let title = if page.title.trim().is_empty() {
        hit.title.clone()
    } else {
        page.title
    };

    let content = if analysis.relevant_content.trim().is_empty() {
        page.content
    } else {
        analysis.relevant_content
    };

    ExtractedItem {
        title,
        url: hit.link.clone(),
        content: truncate_chars(&content, max_content_length).to_string(),
        relevance_score: analysis.relevance_score,
        source_quality: analysis.source_quality,
    }
}

pub fn rank_items(mut items: Vec<ExtractedItem>, max_sources: usize) -> Vec<ExtractedItem> {
    items.sort_by(|left, right| right.relevance_score.total_cmp(&left.relevance_score));
    items.truncate(max_sources);
    items
}
