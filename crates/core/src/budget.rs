use crate::error::ResearchError;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetPolicy {
    pub max_search_terms: usize,
    pub request_term_cap: usize,
    pub max_results_per_term: usize,
    pub max_total_results: usize,
    pub max_news_results: usize,
    pub max_extracted_sources: usize,
    pub max_item_content_length: usize,
    pub max_synthesis_content_length: usize,
    pub max_page_chars: usize,
    pub max_scoring_input_chars: usize,
    pub generation_interval: Duration,
    pub search_interval: Duration,
    pub fetch_interval: Duration,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            max_search_terms: 3,
            request_term_cap: 2,
            max_results_per_term: 5,
            max_total_results: 8,
            max_news_results: 3,
            max_extracted_sources: 5,
            max_item_content_length: 2_000,
            max_synthesis_content_length: 1_500,
            max_page_chars: 25_000,
            max_scoring_input_chars: 7_500,
            generation_interval: Duration::from_secs(1),
            search_interval: Duration::from_secs(1),
            fetch_interval: Duration::from_millis(500),
        }
    }
}

impl BudgetPolicy {
    pub fn from_env() -> Result<Self, ResearchError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ResearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut policy = Self::default();

        let counts: [(&str, &mut usize); 10] = [
            ("RESEARCH_MAX_SEARCH_TERMS", &mut policy.max_search_terms),
            ("RESEARCH_REQUEST_TERM_CAP", &mut policy.request_term_cap),
            ("RESEARCH_MAX_RESULTS_PER_TERM", &mut policy.max_results_per_term),
            ("RESEARCH_MAX_TOTAL_RESULTS", &mut policy.max_total_results),
            ("RESEARCH_MAX_NEWS_RESULTS", &mut policy.max_news_results),
            ("RESEARCH_MAX_EXTRACTED_SOURCES", &mut policy.max_extracted_sources),
            ("RESEARCH_MAX_ITEM_CONTENT_LENGTH", &mut policy.max_item_content_length),
            (
                "RESEARCH_MAX_SYNTHESIS_CONTENT_LENGTH",
                &mut policy.max_synthesis_content_length,
            ),
            ("RESEARCH_MAX_PAGE_CHARS", &mut policy.max_page_chars),
            ("RESEARCH_MAX_SCORING_INPUT_CHARS", &mut policy.max_scoring_input_chars),
        ];
        for (key, slot) in counts {
            if let Some(value) = parse_var::<usize>(&lookup, key)? {
                *slot = value;
            }
        }

        let intervals: [(&str, &mut Duration); 3] = [
            ("RESEARCH_GENERATION_INTERVAL_MS", &mut policy.generation_interval),
            ("RESEARCH_SEARCH_INTERVAL_MS", &mut policy.search_interval),
            ("RESEARCH_FETCH_INTERVAL_MS", &mut policy.fetch_interval),
        ];
        for (key, slot) in intervals {
            if let Some(millis) = parse_var::<u64>(&lookup, key)? {
                *slot = Duration::from_millis(millis);
            }
        }

        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ResearchError> {
        let required = [
            ("max_search_terms", self.max_search_terms),
            ("request_term_cap", self.request_term_cap),
            ("max_results_per_term", self.max_results_per_term),
            ("max_total_results", self.max_total_results),
            ("max_extracted_sources", self.max_extracted_sources),
            ("max_item_content_length", self.max_item_content_length),
            ("max_synthesis_content_length", self.max_synthesis_content_length),
            ("max_page_chars", self.max_page_chars),
            ("max_scoring_input_chars", self.max_scoring_input_chars),
        ];

        for (name, value) in required {
            if value == 0 {
                return Err(ResearchError::InvalidConfig(format!(
                    "{name} must be greater than zero"
                )));
            }
        }

        Ok(())
    }

    pub fn without_rate_limits(mut self) -> Self {
        self.generation_interval = Duration::ZERO;
        self.search_interval = Duration::ZERO;
        self.fetch_interval = Duration::ZERO;
        self
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ResearchError>
where
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse::<T>()
        .map(Some)
        .map_err(|_| ResearchError::InvalidConfig(format!("{key}={raw} is not a valid number")))
}

#[cfg(test)]
mod tests {
    use super::BudgetPolicy;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_only_named_fields() {
        let policy = BudgetPolicy::from_lookup(lookup_from(&[
            ("RESEARCH_MAX_TOTAL_RESULTS", "12"),
            ("RESEARCH_FETCH_INTERVAL_MS", "250"),
        ]))
        .expect("valid overrides");

        assert_eq!(policy.max_total_results, 12);
        assert_eq!(policy.fetch_interval, Duration::from_millis(250));
        assert_eq!(policy.max_search_terms, BudgetPolicy::default().max_search_terms);
    }

    #[test]
    fn unparsable_value_is_rejected() {
        let result = BudgetPolicy::from_lookup(lookup_from(&[("RESEARCH_MAX_SEARCH_TERMS", "many")]));
        assert!(result.is_err());
    }

    #[test]
    fn zero_caps_fail_validation() {
        let result =
            BudgetPolicy::from_lookup(lookup_from(&[("RESEARCH_MAX_EXTRACTED_SOURCES", "0")]));
        assert!(result.is_err());
    }
}
