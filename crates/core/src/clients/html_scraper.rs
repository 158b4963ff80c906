use crate::text::{clean_page_text, normalize_whitespace, truncate_chars};
use crate::traits::Scraper;
use crate::{ScrapedPage, ServiceError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use tracing::warn;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const UNTITLED: &str = "No title found";

const SKIPPED_TAGS: [&str; 5] = ["script", "style", "noscript", "template", "svg"];

const BLOCK_TAGS: [&str; 20] = [
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "td", "th", "article",
    "section", "main", "blockquote", "pre", "header", "footer",
];

pub struct HtmlScraper {
    client: Client,
    max_page_chars: usize,
}

impl HtmlScraper {
    pub fn new(max_page_chars: usize) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            max_page_chars,
        })
    }

    async fn try_scrape(&self, url: &str) -> Result<ScrapedPage, ServiceError> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ServiceError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        let response = self.client.get(parsed).send().await?.error_for_status()?;
        let body = response.text().await?;

        Ok(page_from_html(&body, url, self.max_page_chars))
    }
}

#[async_trait]
impl Scraper for HtmlScraper {
    async fn scrape(&self, url: &str) -> ScrapedPage {
        match self.try_scrape(url).await {
            Ok(page) => page,
            Err(error) => {
                warn!(url, %error, "scrape failed");
                ScrapedPage::failed(url)
            }
        }
    }
}

pub fn page_from_html(html: &str, url: &str, max_chars: usize) -> ScrapedPage {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|element| element.text().collect::<String>())
        })
        .map(|title| normalize_whitespace(&title))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);
    let content = clean_page_text(&raw);

    ScrapedPage {
        title,
        content: truncate_chars(&content, max_chars).to_string(),
        url: url.to_string(),
    }
}

fn collect_text(element: ElementRef<'_>, buf: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(tag) => {
                let name = tag.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                if BLOCK_TAGS.contains(&name) {
                    buf.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, buf);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <title> Rising Seas </title>
    <style>body { color: red; }</style>
    <script>var tracking = "ignore me";</script>
  </head>
  <body>
    <h1>Sea level rise</h1>
    <p>Global mean sea level rose about <b>20 cm</b> since 1900.</p>
    <table><tr><td>1900</td><td>2000</td></tr></table>
    <noscript>Enable JavaScript</noscript>
  </body>
</html>"#;

    #[test]
    fn scripts_and_styles_are_dropped() {
        let page = page_from_html(PAGE, "http://example.com/seas", 10_000);

        assert_eq!(page.title, "Rising Seas");
        assert_eq!(page.url, "http://example.com/seas");
        assert!(page.content.contains("Sea level rise"));
        assert!(page.content.contains("Global mean sea level rose about 20 cm since 1900."));
        assert!(page.content.contains("1900\n2000"));
        assert!(!page.content.contains("tracking"));
        assert!(!page.content.contains("color: red"));
        assert!(!page.content.contains("Enable JavaScript"));
    }

    #[test]
    fn content_is_capped() {
        let page = page_from_html(PAGE, "http://example.com/seas", 12);
        assert_eq!(page.content.chars().count(), 12);
    }

    #[test]
    fn missing_title_is_reported() {
        let page = page_from_html("<html><body><p>text</p></body></html>", "http://x", 100);
        assert_eq!(page.title, "No title found");
        assert_eq!(page.content, "text");
    }

    #[tokio::test]
    async fn unsupported_scheme_yields_empty_page() {
        let scraper = HtmlScraper::new(1_000).expect("client builds");
        let page = scraper.scrape("ftp://example.com/file").await;
        assert_eq!(page.content, "");
        assert_eq!(page.title, "Error scraping page");
    }
}
