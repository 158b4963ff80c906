use crate::text::normalize_whitespace;
use crate::traits::{NewsSearch, WebSearch};
use crate::{SearchHit, ServiceError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com";

pub struct SerpApiClient {
    client: Arc<Client>,
    endpoint: String,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn with_client(mut self, client: Arc<Client>) -> Self {
        self.client = client;
        self
    }

    fn search_url(&self, query: &str, num_results: usize, news: bool) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.endpoint)?.join("search.json")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("engine", "google")
                .append_pair("q", query)
                .append_pair("num", &num_results.to_string());
            if news {
                pairs.append_pair("tbm", "nws");
            }
            pairs.append_pair("api_key", &self.api_key);
        }
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<Value, ServiceError> {
        // Request URLs carry the api key; keep it out of error messages.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| ServiceError::Http(error.without_url()))?;

        if !response.status().is_success() {
            return Err(ServiceError::BackendResponse {
                backend: "serpapi".to_string(),
                details: response.status().to_string(),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|error| ServiceError::Http(error.without_url()))?;

        if let Some(message) = payload.get("error").and_then(Value::as_str) {
            return Err(ServiceError::BackendResponse {
                backend: "serpapi".to_string(),
                details: message.to_string(),
            });
        }

        Ok(payload)
    }
}

#[async_trait]
impl WebSearch for SerpApiClient {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>, ServiceError> {
        let payload = self.fetch(self.search_url(query, num_results, false)?).await?;
        Ok(parse_results(&payload, "organic_results", num_results))
    }
}

#[async_trait]
impl NewsSearch for SerpApiClient {
    async fn get_news(&self, topic: &str, max_results: usize) -> Result<Vec<SearchHit>, ServiceError> {
        let payload = self.fetch(self.search_url(topic, max_results, true)?).await?;
        Ok(parse_results(&payload, "news_results", max_results))
    }
}

pub fn parse_results(payload: &Value, key: &str, limit: usize) -> Vec<SearchHit> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(parse_entry)
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_entry(entry: &Value) -> Option<SearchHit> {
    let object = entry.as_object()?;
    let text = |field: &str| {
        normalize_whitespace(object.get(field).and_then(Value::as_str).unwrap_or_default())
    };

    let link = text("link");
    if link.is_empty() {
        return None;
    }

    let source = match object.get("source") {
        Some(Value::String(name)) => Some(name.clone()),
        Some(Value::Object(details)) => details
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };
    let date = object.get("date").and_then(Value::as_str).map(str::to_string);

    Some(SearchHit {
        title: text("title"),
        link,
        snippet: text("snippet"),
        source,
        date,
    })
}
