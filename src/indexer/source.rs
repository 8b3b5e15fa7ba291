//! Article sources for the search index
//!
//! The content API is an external collaborator; anything that can hand back
//! a list of articles can feed the index.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use super::document::Article;
use crate::error::{Result, SearchError};

#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(&self) -> Result<Vec<Article>>;

    /// Short description used in log lines
    fn describe(&self) -> String;
}

/// Fetches articles from the blog backend's search-data endpoint
pub struct HttpArticleSource {
    client: Client,
    url: String,
}

impl HttpArticleSource {
    pub fn new(base_url: &str, data_path: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("finseek/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), data_path),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ArticleSource for HttpArticleSource {
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the search-data payload from a local JSON file
pub struct FileArticleSource {
    path: PathBuf,
}

impl FileArticleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ArticleSource for FileArticleSource {
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl ArticleSource for Vec<Article> {
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory articles", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source_for(server: &MockServer) -> HttpArticleSource {
        HttpArticleSource::new(&server.uri(), "/api/search-data", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_http_source_decodes_articles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "type": "article",
                    "title": "Bitcoin Outlook 2024",
                    "slug": "/article/btc-2024",
                    "category": "Crypto",
                    "content_snippet": "Halving ahead"
                }
            ])))
            .mount(&server)
            .await;

        let articles = source_for(&server).fetch_articles().await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].slug.as_deref(), Some("/article/btc-2024"));
    }

    #[tokio::test]
    async fn test_http_source_reports_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search-data"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = source_for(&server).fetch_articles().await.unwrap_err();
        assert!(matches!(err, SearchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_http_source_rejects_error_objects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search-data"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "boom"})),
            )
            .mount(&server)
            .await;

        let err = source_for(&server).fetch_articles().await.unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }

    #[test]
    fn test_url_joining() {
        let source =
            HttpArticleSource::new("http://blog.local/", "/api/search-data", Duration::from_secs(1))
                .unwrap();
        assert_eq!(source.url(), "http://blog.local/api/search-data");
    }

    #[tokio::test]
    async fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"title": "ETF basics", "slug": "/article/etf"}}]"#).unwrap();

        let articles = FileArticleSource::new(file.path()).fetch_articles().await.unwrap();
        assert_eq!(articles, vec![Article::new("ETF basics", "/article/etf")]);
    }
}
