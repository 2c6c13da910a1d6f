//! URL retrieval and article-text extraction

mod article;

pub use article::ArticleRetriever;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} while fetching {url}")]
    Status { status: u16, url: String },

    #[error("Request blocked by target site: {0}")]
    Blocked(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
