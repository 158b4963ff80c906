use crate::budget::BudgetPolicy;
use crate::extractor::Extractor;
use crate::intent::IntentAnalyzer;
use crate::rate_limit::RateLimiter;
use crate::retriever::{Retriever, UniqueHits};
use crate::synthesizer::Synthesizer;
use crate::traits::{NewsSearch, RelevanceScorer, Scraper, TextGenerator, WebSearch};
use crate::{Intent, ResearchError, ResearchOutcome, SearchHit};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub const ERROR_PREFIX: &str = "An error occurred during the research process: ";

#[derive(Debug, Clone)]
pub struct RateLimits {
    pub generation: Arc<RateLimiter>,
    pub search: Arc<RateLimiter>,
    pub fetch: Arc<RateLimiter>,
}

impl RateLimits {
    pub fn from_budget(budget: &BudgetPolicy) -> Self {
        Self {
            generation: Arc::new(RateLimiter::new(budget.generation_interval)),
            search: Arc::new(RateLimiter::new(budget.search_interval)),
            fetch: Arc::new(RateLimiter::new(budget.fetch_interval)),
        }
    }
}

pub struct ResearchPipeline<G, W, N, S, R> {
    analyzer: IntentAnalyzer<G>,
    retriever: Retriever<W, N>,
    extractor: Extractor<S, R>,
    synthesizer: Synthesizer<G>,
    budget: BudgetPolicy,
}

impl<G, W, N, S, R> ResearchPipeline<G, W, N, S, R>
where
    G: TextGenerator + Send + Sync,
    W: WebSearch + Send + Sync,
    N: NewsSearch + Send + Sync,
    S: Scraper + Send + Sync,
    R: RelevanceScorer + Send + Sync,
{
    pub fn new(generator: G, web: W, news: N, scraper: S, scorer: R, budget: BudgetPolicy) -> Self {
        let limits = RateLimits::from_budget(&budget);
        Self::with_rate_limits(generator, web, news, scraper, scorer, budget, limits)
    }

    pub fn with_rate_limits(
        generator: G,
        web: W,
        news: N,
        scraper: S,
        scorer: R,
        budget: BudgetPolicy,
        limits: RateLimits,
    ) -> Self {
        let generator = Arc::new(generator);
        Self {
            analyzer: IntentAnalyzer::new(Arc::clone(&generator), Arc::clone(&limits.generation)),
            retriever: Retriever::new(web, news, budget.clone(), Arc::clone(&limits.search)),
            extractor: Extractor::new(
                scraper,
                scorer,
                budget.clone(),
                Arc::clone(&limits.fetch),
                Arc::clone(&limits.generation),
            ),
            synthesizer: Synthesizer::new(generator, budget.clone(), limits.generation),
            budget,
        }
    }

    pub fn budget(&self) -> &BudgetPolicy {
        &self.budget
    }

    pub async fn analyze(&self, query: &str) -> Intent {
        let mut intent = self.analyzer.analyze(query).await;
        intent.normalize_terms(query);
        intent
    }

    pub async fn research(&self, query: &str) -> String {
        match self.run(query).await {
            Ok(outcome) => outcome.to_string(),
            Err(error) => format_error(&error),
        }
    }

    pub async fn run(&self, query: &str) -> Result<ResearchOutcome, ResearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResearchError::InvalidQuery("query is empty".to_string()));
        }

        let run_id = Uuid::new_v4();
        info!(%run_id, query, "research started");

        let intent = self.analyze(query).await;
        info!(
            %run_id,
            main_topic = %intent.main_topic,
            content_type = %intent.content_type,
            term_count = intent.search_terms.len(),
            "intent analyzed"
        );

        let terms: Vec<String> = intent
            .search_terms
            .iter()
            .take(self.budget.request_term_cap)
            .cloned()
            .collect();

        let mut hits = self.retriever.search(&terms, false).await;
        if intent.wants_news() {
            hits = self.merge_news(hits, &terms).await;
        }
        info!(%run_id, hit_count = hits.len(), "search complete");

        let items = self.extractor.extract(&hits, query).await;
        info!(%run_id, item_count = items.len(), "extraction complete");

        if items.is_empty() {
            return Ok(ResearchOutcome::NoResults);
        }

        let report = self.synthesizer.synthesize(&items, query).await;
        info!(%run_id, "research finished");
        Ok(ResearchOutcome::Report(report))
    }

    // News gets its own slots inside the total budget; web overflow backfills unused ones.
    async fn merge_news(&self, mut web: Vec<SearchHit>, terms: &[String]) -> Vec<SearchHit> {
        let total = self.budget.max_total_results;
        let reserved = self.budget.max_news_results.min(total.saturating_sub(1));
        let overflow = web.split_off(web.len().min(total - reserved));

        let news = self.retriever.search(terms, true).await;
        let mut merged = UniqueHits::with_capacity(total);
        merged.extend(web);
        let mut added = 0;
        for hit in news {
            if added >= reserved {
                break;
            }
            if merged.push(hit) {
                added += 1;
            }
        }
        merged.extend(overflow);
        merged.into_hits()
    }
}

pub fn format_error(error: &dyn std::fmt::Display) -> String {
    format!("{ERROR_PREFIX}{error}")
}
