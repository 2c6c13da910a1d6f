//! Generic web-page retriever that extracts the main article text

use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use super::FetchError;

/// Content extraction is capped to keep downstream prompts bounded
const MAX_WORDS: usize = 3000;

/// Selectors tried in order to locate the main content block
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    ".mw-parser-output",
    ".content",
    ".post-content",
    ".article-content",
    ".entry-content",
    "#content",
    ".main-content",
];

/// Retriever for article pages
///
/// Fetches a URL with browser-like headers (some news sites reject
/// unadorned clients), locates the main content block, and converts it to
/// plain text.
pub struct ArticleRetriever {
    client: Client,
}

impl ArticleRetriever {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(
                    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
                )
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Fetch a URL and extract its main article text
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        tracing::debug!(url = %url, "Fetching article page");

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            tracing::warn!(url = %url, status = status.as_u16(), "Request blocked by target site");
            return Err(FetchError::Blocked(url.to_string()));
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let raw_html = response.text().await?;
        Ok(extract_article_text(&raw_html))
    }
}

impl Default for ArticleRetriever {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the main content out of an HTML document as plain text
fn extract_article_text(raw_html: &str) -> String {
    let document = Html::parse_document(raw_html);

    // Try content-specific selectors first, then fall back to the largest
    // <div>, then the whole document.
    let fragment_html = select_main_content(&document)
        .unwrap_or_else(|| document.root_element().html());

    let text = html_to_text(&fragment_html);
    cap_words(&text, MAX_WORDS)
}

fn select_main_content(document: &Html) -> Option<String> {
    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(el) = document.select(&selector).next() {
                let html = el.html();
                if !el.text().collect::<String>().trim().is_empty() {
                    tracing::debug!(selector = selector_str, "Found main content block");
                    return Some(html);
                }
            }
        }
    }

    // Largest text block fallback
    let div_selector = Selector::parse("div").ok()?;
    document
        .select(&div_selector)
        .max_by_key(|div| div.text().collect::<String>().trim().len())
        .map(|div| div.html())
}

/// Convert HTML to whitespace-normalized plain text
fn html_to_text(html: &str) -> String {
    let markdown = htmd::convert(html).unwrap_or_else(|_| html.to_string());

    // Drop markdown link targets and emphasis noise, keep the prose
    markdown
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn cap_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return words.join(" ");
    }
    tracing::debug!(words = words.len(), cap = max_words, "Truncating extracted text");
    let mut capped = words[..max_words].join(" ");
    capped.push_str("...");
    capped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prefers_article_tag() {
        let html = r#"
            <html><body>
            <nav>Site navigation</nav>
            <article><p>The actual story text lives here.</p></article>
            <footer>Footer junk</footer>
            </body></html>
        "#;
        let text = extract_article_text(html);
        assert!(text.contains("The actual story text lives here."));
        assert!(!text.contains("Site navigation"));
    }

    #[test]
    fn test_extract_falls_back_to_largest_div() {
        let html = r#"
            <html><body>
            <div>tiny</div>
            <div>This much longer block of text is the real content of the page and
            should win the largest-block fallback.</div>
            </body></html>
        "#;
        let text = extract_article_text(html);
        assert!(text.contains("largest-block fallback"));
    }

    #[test]
    fn test_cap_words() {
        let long = vec!["word"; 40].join(" ");
        let capped = cap_words(&long, 10);
        assert_eq!(capped.split_whitespace().count(), 10);
        assert!(capped.ends_with("..."));
    }
}
