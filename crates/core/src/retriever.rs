use crate::budget::BudgetPolicy;
use crate::rate_limit::RateLimiter;
use crate::traits::{NewsSearch, WebSearch};
use crate::SearchHit;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Retriever<W, N> {
    web: W,
    news: N,
    budget: BudgetPolicy,
    limiter: Arc<RateLimiter>,
}

impl<W, N> Retriever<W, N>
where
    W: WebSearch + Send + Sync,
    N: NewsSearch + Send + Sync,
{
    pub fn new(web: W, news: N, budget: BudgetPolicy, limiter: Arc<RateLimiter>) -> Self {
        Self {
            web,
            news,
            budget,
            limiter,
        }
    }

    pub async fn search(&self, terms: &[String], want_news: bool) -> Vec<SearchHit> {
        let mut merged = UniqueHits::with_capacity(self.budget.max_total_results);

        for term in terms.iter().take(self.budget.max_search_terms) {
            let term = term.trim();
            if term.is_empty() {
                continue;
            }

            let hits = self.search_term(term, want_news).await;
            debug!(term, want_news, hit_count = hits.len(), "search term complete");

            if merged.extend(hits) {
                break;
            }
        }

        merged.into_hits()
    }

    #[cfg(test)]
    pub(crate) fn web(&self) -> &W {
        &self.web
    }

    #[cfg(test)]
    pub(crate) fn news(&self) -> &N {
        &self.news
    }

    async fn search_term(&self, term: &str, want_news: bool) -> Vec<SearchHit> {
        self.limiter.acquire().await;
        let limit = self.budget.max_results_per_term;

        let result = if want_news {
            self.news.get_news(term, limit).await
        } else {
            self.web.search(term, limit).await
        };

        match result {
            Ok(hits) => hits.into_iter().take(limit).collect(),
            Err(error) => {
                warn!(term, want_news, %error, "search failed, continuing without results");
                Vec::new()
            }
        }
    }
}

pub struct UniqueHits {
    capacity: usize,
    seen: HashSet<String>,
    hits: Vec<SearchHit>,
}

impl UniqueHits {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            seen: HashSet::new(),
            hits: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.hits.len() >= self.capacity
    }

    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    pub fn extend(&mut self, hits: impl IntoIterator<Item = SearchHit>) -> bool {
        for hit in hits {
            if self.is_full() {
                break;
            }
            self.push(hit);
        }
        self.is_full()
    }

    pub fn push(&mut self, hit: SearchHit) -> bool {
        if self.is_full() || hit.link.trim().is_empty() {
            return false;
        }
        if !self.seen.insert(hit.link.clone()) {
            return false;
        }
        self.hits.push(hit);
        true
    }

    pub fn into_hits(self) -> Vec<SearchHit> {
        self.hits
    }
}
