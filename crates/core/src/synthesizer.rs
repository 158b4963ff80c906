use crate::budget::BudgetPolicy;
use crate::models::{NO_RESULTS_MESSAGE, SYNTHESIS_FAILED_MESSAGE};
use crate::rate_limit::RateLimiter;
use crate::text::truncate_with_ellipsis;
use crate::traits::TextGenerator;
use crate::{ExtractedItem, Report, ServiceError, SourceRef};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Synthesizer<G> {
    generator: Arc<G>,
    budget: BudgetPolicy,
    limiter: Arc<RateLimiter>,
}

impl<G> Synthesizer<G>
where
    G: TextGenerator + Send + Sync,
{
    pub fn new(generator: Arc<G>, budget: BudgetPolicy, limiter: Arc<RateLimiter>) -> Self {
        Self {
            generator,
            budget,
            limiter,
        }
    }

    pub async fn synthesize(&self, items: &[ExtractedItem], query: &str) -> String {
        if items.is_empty() {
            return NO_RESULTS_MESSAGE.to_string();
        }

        match self.compose(items, query).await {
            Ok(report) => report.to_string(),
            Err(error) => {
                warn!(%error, "synthesis failed");
                SYNTHESIS_FAILED_MESSAGE.to_string()
            }
        }
    }

    pub async fn compose(&self, items: &[ExtractedItem], query: &str) -> Result<Report, ServiceError> {
        let selected = &items[..items.len().min(self.budget.max_extracted_sources)];
        let prompt = synthesis_prompt(query, selected, self.budget.max_synthesis_content_length);

        self.limiter.acquire().await;
        let narrative = self.generator.generate(&prompt).await?;
        info!(source_count = selected.len(), "report synthesized");

        Ok(Report {
            narrative,
            sources: selected
                .iter()
                .map(|item| SourceRef {
                    title: item.title.clone(),
                    url: item.url.clone(),
                })
                .collect(),
        })
    }
}

pub fn synthesis_prompt(query: &str, items: &[ExtractedItem], max_content_length: usize) -> String {
    let context = items
        .iter()
        .map(|item| {
            format!(
                "Source: {} ({})\n{}\n",
                item.title,
                item.url,
                truncate_with_ellipsis(&item.content, max_content_length)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Based on the following extracted information, provide a comprehensive research report answering the query: "{query}"

EXTRACTED INFORMATION:
{context}

Create a well-structured report that:
1. Directly answers the query
2. Synthesizes information from multiple sources
3. Identifies any conflicting information
4. Includes proper citations to sources
"#
    )
}
