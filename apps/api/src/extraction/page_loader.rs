//! Page Loader — fetches a job posting URL and yields its readable text.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::info;

use crate::errors::AppError;

/// One fetched text document. A fetch may yield zero or more documents
/// (paginated sources); the pipeline only ever consumes the first.
#[derive(Debug, Clone)]
pub struct Document {
    pub url: String,
    pub text: String,
}

/// Loads the document(s) behind a URL. Behind a trait so extraction can be
/// tested without the network.
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<Vec<Document>, AppError>;
}

/// Production loader: one HTTP GET, HTML parsed into plain text.
pub struct HttpPageLoader {
    client: Client,
}

impl HttpPageLoader {
    pub fn new(user_agent: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    async fn load(&self, url: &str) -> Result<Vec<Document>, AppError> {
        info!("Fetching job post: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("{url} returned HTTP {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to read response body: {e}")))?;

        let text = extract_page_text(&html);
        if text.is_empty() {
            return Err(AppError::Fetch(format!("{url} returned no content body")));
        }

        Ok(vec![Document {
            url: url.to_string(),
            text,
        }])
    }
}

/// Extracts readable text from an HTML document, preferring the main content
/// region over boilerplate. Falls back to the whole body.
fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector_str in ["main", "article", "body"] {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
                if !text.is_empty() {
                    return text;
                }
            }
        }
    }

    clean_text(&document.root_element().text().collect::<Vec<_>>().join(" "))
}

fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_page_text_prefers_main_content() {
        let html = r#"
            <html><body>
                <nav>Home About Careers</nav>
                <main><h1>Backend Engineer</h1><p>We need Python and Django.</p></main>
            </body></html>
        "#;
        let text = extract_page_text(html);
        assert!(text.contains("Backend Engineer"));
        assert!(text.contains("Python and Django"));
        assert!(!text.contains("Home About Careers"));
    }

    #[test]
    fn test_extract_page_text_falls_back_to_body() {
        let html = "<html><body><div>Plain posting text</div></body></html>";
        assert_eq!(extract_page_text(html), "Plain posting text");
    }

    #[test]
    fn test_empty_page_yields_empty_text() {
        assert!(extract_page_text("<html><body>  \n </body></html>").is_empty());
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let messy = "  Senior   Engineer\n\n   Remote \t position ";
        assert_eq!(clean_text(messy), "Senior Engineer Remote position");
    }
}
