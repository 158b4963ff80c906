use serde::{Deserialize, Serialize};
use std::fmt;

pub const FALLBACK_CONTENT_TYPE: &str = "facts";

pub const NO_RESULTS_MESSAGE: &str =
    "I couldn't find relevant information for your query. Please try with different search terms.";

pub const SYNTHESIS_FAILED_MESSAGE: &str = "Failed to synthesize information due to an error.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Intent {
    pub main_topic: String,
    pub key_aspects: Vec<String>,
    pub content_type: String,
    pub search_terms: Vec<String>,
}

impl Intent {
    pub fn fallback(query: &str) -> Self {
        Self {
            main_topic: query.to_string(),
            key_aspects: vec![query.to_string()],
            content_type: FALLBACK_CONTENT_TYPE.to_string(),
            search_terms: vec![query.to_string()],
        }
    }

    pub fn wants_news(&self) -> bool {
        self.content_type.to_lowercase().contains("news")
    }

    /// Restores the non-empty `search_terms` invariant.
    pub fn normalize_terms(&mut self, query: &str) {
        self.search_terms.retain(|term| !term.trim().is_empty());
        if self.search_terms.is_empty() {
            self.search_terms.push(query.to_string());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub source: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScrapedPage {
    pub title: String,
    pub content: String,
    pub url: String,
}

impl ScrapedPage {
    pub fn failed(url: &str) -> Self {
        Self {
            title: "Error scraping page".to_string(),
            content: String::new(),
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContentAnalysis {
    pub relevance_score: f64,
    pub relevant_content: String,
    pub source_quality: Option<String>,
}

impl ContentAnalysis {
    pub fn irrelevant() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedItem {
    pub title: String,
    pub url: String,
    pub content: String,
    pub relevance_score: f64,
    pub source_quality: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub narrative: String,
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\nSources:\n", self.narrative)?;
        for (index, source) in self.sources.iter().enumerate() {
            writeln!(f, "{}. {} - {}", index + 1, source.title, source.url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchOutcome {
    Report(String),
    NoResults,
}

impl fmt::Display for ResearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResearchOutcome::Report(text) => f.write_str(text),
            ResearchOutcome::NoResults => f.write_str(NO_RESULTS_MESSAGE),
        }
    }
}
