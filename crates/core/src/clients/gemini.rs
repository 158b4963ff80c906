use crate::clients::retry::{with_retries, RetryPolicy};
use crate::traits::TextGenerator;
use crate::ServiceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use url::Url;

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiClient {
    client: Arc<Client>,
    endpoint: String,
    model: String,
    api_key: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_client(mut self, client: Arc<Client>) -> Self {
        self.client = client;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn generate_url(&self) -> Result<Url, ServiceError> {
        let base = Url::parse(&self.endpoint)?;
        Ok(base.join(&format!("v1beta/models/{}:generateContent", self.model))?)
    }

    async fn generate_once(&self, url: &Url, prompt: &str) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(url.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "contents": [
                    { "parts": [ { "text": prompt } ] }
                ]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::BackendResponse {
                backend: "gemini".to_string(),
                details: response.status().to_string(),
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        response_text(payload)
    }
}

fn response_text(payload: GenerateContentResponse) -> Result<String, ServiceError> {
    let text = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ServiceError::EmptyResponse("gemini".to_string()));
    }

    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let url = self.generate_url()?;
        with_retries(self.retry, "gemini", || self.generate_once(&url, prompt)).await
    }
}
