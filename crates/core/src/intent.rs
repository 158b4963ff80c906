use crate::llm_json::extract_json;
use crate::models::{Intent, FALLBACK_CONTENT_TYPE};
use crate::rate_limit::RateLimiter;
use crate::traits::TextGenerator;
use crate::ServiceError;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
struct RawIntent {
    #[serde(default)]
    main_topic: Option<Value>,
    #[serde(default)]
    key_aspects: Option<Value>,
    #[serde(default)]
    content_type: Option<Value>,
    #[serde(default)]
    search_terms: Option<Value>,
}

impl RawIntent {
    fn into_intent(self, query: &str) -> Intent {
        let main_topic = self
            .main_topic
            .as_ref()
            .and_then(value_to_text)
            .unwrap_or_else(|| query.to_string());

        let key_aspects = texts(self.key_aspects);

        let content_type = texts(self.content_type).join(", ");
        let content_type = if content_type.is_empty() {
            FALLBACK_CONTENT_TYPE.to_string()
        } else {
            content_type
        };

        let mut intent = Intent {
            main_topic,
            key_aspects,
            content_type,
            search_terms: texts(self.search_terms),
        };
        intent.normalize_terms(query);
        intent
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn texts(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(value_to_text).collect(),
        Some(single) => value_to_text(&single).into_iter().collect(),
        None => Vec::new(),
    }
}

pub fn intent_prompt(query: &str) -> String {
    format!(
        r#"Analyze this research query: "{query}"
Break it down into:
1. Main topic
2. Key aspects/questions
3. Type of content needed (facts, opinions, news, etc.)
4. Suggested search terms
Return your analysis as a JSON object with the fields "main_topic" (string),
"key_aspects" (array of strings), "content_type" (string) and "search_terms" (array of strings)."#
    )
}

pub fn parse_intent(response: &str, query: &str) -> Option<Intent> {
    extract_json::<RawIntent>(response).map(|raw| raw.into_intent(query))
}

pub struct IntentAnalyzer<G> {
    generator: Arc<G>,
    limiter: Arc<RateLimiter>,
}

impl<G> IntentAnalyzer<G>
where
    G: TextGenerator + Send + Sync,
{
    pub fn new(generator: Arc<G>, limiter: Arc<RateLimiter>) -> Self {
        Self { generator, limiter }
    }

    pub async fn analyze(&self, query: &str) -> Intent {
        match self.try_analyze(query).await {
            Ok(Some(intent)) => intent,
            Ok(None) => {
                debug!(query, "intent response had no parsable json, using fallback");
                Intent::fallback(query)
            }
            Err(error) => {
                warn!(query, %error, "intent analysis failed, using fallback");
                Intent::fallback(query)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn generator(&self) -> &G {
        &self.generator
    }

    async fn try_analyze(&self, query: &str) -> Result<Option<Intent>, ServiceError> {
        self.limiter.acquire().await;
        let response = self.generator.generate(&intent_prompt(query)).await?;
        Ok(parse_intent(&response, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct ScriptedGenerator {
        reply: Result<String, String>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("quota exhausted".to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(|details| ServiceError::BackendResponse {
                backend: "scripted".to_string(),
                details,
            })
        }
    }

    fn analyzer(generator: ScriptedGenerator) -> IntentAnalyzer<ScriptedGenerator> {
        IntentAnalyzer::new(
            Arc::new(generator),
            Arc::new(RateLimiter::new(Duration::ZERO)),
        )
    }

    #[tokio::test]
    async fn parses_plain_json_response() {
        let analyzer = analyzer(ScriptedGenerator::replying(
            r#"{"main_topic":"climate change","key_aspects":["impacts"],"content_type":"facts","search_terms":["climate change impacts"]}"#,
        ));

        let intent = analyzer.analyze("climate change impacts").await;

        assert_eq!(intent.main_topic, "climate change");
        assert_eq!(intent.key_aspects, vec!["impacts".to_string()]);
        assert_eq!(intent.content_type, "facts");
        assert_eq!(intent.search_terms, vec!["climate change impacts".to_string()]);
        assert_eq!(analyzer.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_outputs_yield_fallback() {
        let malformed = [
            "I am not sure what you mean.",
            "```json\n{ broken\n```",
            "[\"a\", \"b\"]",
            "",
            "{\"main_topic\": ",
        ];

        for reply in malformed {
            let analyzer = analyzer(ScriptedGenerator::replying(reply));
            let intent = analyzer.analyze("rust async runtimes").await;
            assert_eq!(intent, Intent::fallback("rust async runtimes"), "reply: {reply:?}");
            assert_eq!(intent.search_terms, vec!["rust async runtimes".to_string()]);
        }
    }

    #[tokio::test]
    async fn generation_failure_yields_fallback() {
        let analyzer = analyzer(ScriptedGenerator::failing());
        let intent = analyzer.analyze("solar storms").await;
        assert_eq!(intent, Intent::fallback("solar storms"));
    }

    #[test]
    fn loose_shapes_are_normalized_at_the_boundary() {
        let response = "Sure!\n```json\n{\"main_topic\": \"\", \"content_type\": [\"facts\", \"news\"], \"search_terms\": \"single term\"}\n```";
        let intent = parse_intent(response, "original question").expect("json present");

        assert_eq!(intent.main_topic, "original question");
        assert!(intent.key_aspects.is_empty());
        assert_eq!(intent.content_type, "facts, news");
        assert!(intent.wants_news());
        assert_eq!(intent.search_terms, vec!["single term".to_string()]);
    }

    #[test]
    fn empty_search_terms_fall_back_to_query() {
        let intent = parse_intent(r#"{"search_terms": [], "content_type": null}"#, "q")
            .expect("json present");
        assert_eq!(intent.search_terms, vec!["q".to_string()]);
        assert_eq!(intent.content_type, "facts");
    }
}
