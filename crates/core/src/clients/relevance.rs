use crate::llm_json::extract_json;
use crate::text::truncate_chars;
use crate::traits::{RelevanceScorer, TextGenerator};
use crate::ContentAnalysis;
use async_trait::async_trait;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::warn;

const NEUTRAL_SCORE: f64 = 5.0;

const MISSING_CONTENT: &str = "No relevant content extracted";

const RAW_RESPONSE_CHARS: usize = 1_000;

#[serde_as]
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    relevance_score: Option<f64>,
    #[serde(default)]
    relevant_content: Option<String>,
    #[serde(default)]
    source_quality: Option<String>,
}

pub struct LlmRelevanceScorer<G> {
    generator: G,
    max_input_chars: usize,
}

impl<G> LlmRelevanceScorer<G>
where
    G: TextGenerator + Send + Sync,
{
    pub fn new(generator: G, max_input_chars: usize) -> Self {
        Self {
            generator,
            max_input_chars,
        }
    }
}

pub fn scoring_prompt(text: &str, query: &str) -> String {
    format!(
        r#"Analyze the following text for information relevant to this query: '{query}'.
Return a JSON object with two fields: 'relevance_score' (0-10 scale) and 'relevant_content' (extracted relevant information).
You may add a third field 'source_quality' rating the source as "high", "medium" or "low".

Text to analyze: {text}"#
    )
}

pub fn parse_analysis(response: &str) -> ContentAnalysis {
    match extract_json::<RawAnalysis>(response) {
        Some(raw) => ContentAnalysis {
            relevance_score: raw
                .relevance_score
                .filter(|score| score.is_finite())
                .unwrap_or(NEUTRAL_SCORE)
                .clamp(0.0, 10.0),
            relevant_content: raw
                .relevant_content
                .unwrap_or_else(|| MISSING_CONTENT.to_string()),
            source_quality: raw.source_quality.filter(|quality| !quality.trim().is_empty()),
        },
        None => ContentAnalysis {
            relevance_score: NEUTRAL_SCORE,
            relevant_content: truncate_chars(response, RAW_RESPONSE_CHARS).to_string(),
            source_quality: None,
        },
    }
}

#[async_trait]
impl<G> RelevanceScorer for LlmRelevanceScorer<G>
where
    G: TextGenerator + Send + Sync,
{
    async fn analyze(&self, content: &str, query: &str) -> ContentAnalysis {
        let text = truncate_chars(content, self.max_input_chars);

        match self.generator.generate(&scoring_prompt(text, query)).await {
            Ok(response) => parse_analysis(&response),
            Err(error) => {
                warn!(%error, "relevance scoring failed");
                ContentAnalysis::irrelevant()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;
    use std::sync::Mutex;

    #[test]
    fn fenced_analysis_is_parsed() {
        let analysis = parse_analysis(
            "```json\n{\"relevance_score\": 8, \"relevant_content\": \"Seas rose 20 cm.\", \"source_quality\": \"high\"}\n```",
        );
        assert_eq!(analysis.relevance_score, 8.0);
        assert_eq!(analysis.relevant_content, "Seas rose 20 cm.");
        assert_eq!(analysis.source_quality.as_deref(), Some("high"));
    }

    #[test]
    fn missing_fields_get_defaults() {
        let analysis = parse_analysis("{}");
        assert_eq!(analysis.relevance_score, 5.0);
        assert_eq!(analysis.relevant_content, "No relevant content extracted");
        assert_eq!(analysis.source_quality, None);
    }

    #[test]
    fn string_scores_are_accepted_and_clamped() {
        assert_eq!(parse_analysis(r#"{"relevance_score": "7.5"}"#).relevance_score, 7.5);
        assert_eq!(parse_analysis(r#"{"relevance_score": 42}"#).relevance_score, 10.0);
        assert_eq!(parse_analysis(r#"{"relevance_score": -3}"#).relevance_score, 0.0);
    }

    #[test]
    fn non_finite_scores_fall_back_to_neutral() {
        for raw in ["NaN", "inf", "-inf"] {
            let response = format!(r#"{{"relevance_score": "{raw}", "relevant_content": "x"}}"#);
            let score = parse_analysis(&response).relevance_score;
            assert_eq!(score, 5.0, "score for {raw}");
        }
    }

    #[test]
    fn unparsable_response_keeps_neutral_score_and_raw_text() {
        let long = "x".repeat(1_500);
        let analysis = parse_analysis(&long);
        assert_eq!(analysis.relevance_score, 5.0);
        assert_eq!(analysis.relevant_content.len(), 1_000);
    }

    struct EchoGenerator {
        fail: bool,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
            self.prompts
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(prompt.to_string());
            if self.fail {
                return Err(ServiceError::EmptyResponse("echo".to_string()));
            }
            Ok(r#"{"relevance_score": 9, "relevant_content": "echo"}"#.to_string())
        }
    }

    #[tokio::test]
    async fn input_is_truncated_before_scoring() {
        let scorer = LlmRelevanceScorer::new(
            EchoGenerator {
                fail: false,
                prompts: Mutex::new(Vec::new()),
            },
            5,
        );

        let analysis = scorer.analyze("abcdefghij", "letters").await;

        assert_eq!(analysis.relevance_score, 9.0);
        let prompts = scorer
            .generator
            .prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        assert!(prompts[0].ends_with("Text to analyze: abcde"));
        assert!(prompts[0].contains("'letters'"));
    }

    #[tokio::test]
    async fn generation_failure_scores_zero() {
        let scorer = LlmRelevanceScorer::new(
            EchoGenerator {
                fail: true,
                prompts: Mutex::new(Vec::new()),
            },
            100,
        );

        let analysis = scorer.analyze("content", "query").await;

        assert_eq!(analysis, ContentAnalysis::irrelevant());
        assert_eq!(analysis.relevance_score, 0.0);
        assert!(analysis.relevant_content.is_empty());
    }
}
