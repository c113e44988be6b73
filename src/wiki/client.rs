//! Wikipedia client over the MediaWiki Action API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use crate::Result;
use crate::config::WikiConfig;
use crate::error::Error;
use super::{Article, KnowledgeBase};

/// Wikipedia API client.
///
/// Holds only immutable configuration; cloning shares the connection pool.
#[derive(Clone)]
pub struct WikipediaClient {
    endpoint: Url,
    client: Client,
}

impl WikipediaClient {
    /// Create a client for the configured language edition.
    pub fn new(config: &WikiConfig) -> Result<Self> {
        let endpoint = endpoint_for(&config.language)?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { endpoint, client })
    }

    /// The `api.php` URL this client talks to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn query<T>(&self, params: &[(&str, &str)]) -> Result<ApiResponse<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!(endpoint = %self.endpoint, ?params, "Wikipedia API request");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::KnowledgeBase {
                code: status.as_u16().to_string(),
                info: body.chars().take(200).collect(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl KnowledgeBase for WikipediaClient {
    async fn page(&self, title: &str) -> Result<Article> {
        let response = self
            .query::<PageQuery>(&[
                ("titles", title),
                ("prop", "extracts|categories|links"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("cllimit", "max"),
                ("pllimit", "max"),
                ("plnamespace", "0"),
            ])
            .await?;

        into_article(title, response)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let limit = limit.to_string();
        let response = self
            .query::<SearchQuery>(&[
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", &limit),
                ("srprop", ""),
            ])
            .await?;

        into_titles(response)
    }
}

/// Build `https://{language}.wikipedia.org/w/api.php`.
fn endpoint_for(language: &str) -> Result<Url> {
    let valid = !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(Error::Config(format!("Invalid Wikipedia language code: {:?}", language)));
    }

    Ok(Url::parse(&format!("https://{}.wikipedia.org/w/api.php", language))?)
}

fn into_article(requested: &str, response: ApiResponse<PageQuery>) -> Result<Article> {
    let query = response.into_query()?;

    // Empty or unusable titles come back with no pages at all.
    let Some(page) = query.and_then(|q| q.pages.into_iter().next()) else {
        return Ok(Article::missing(requested));
    };

    if page.missing || page.invalid {
        let title = if page.title.is_empty() { requested.to_string() } else { page.title };
        return Ok(Article::missing(title));
    }

    Ok(Article {
        title: page.title,
        exists: true,
        summary: page.extract.unwrap_or_default().trim().to_string(),
        categories: page.categories.into_iter().map(|c| c.title).collect(),
        links: page.links.into_iter().map(|l| l.title).collect(),
    })
}

fn into_titles(response: ApiResponse<SearchQuery>) -> Result<Vec<String>> {
    Ok(response
        .into_query()?
        .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
        .unwrap_or_default())
}

// MediaWiki API response types (formatversion=2)
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    query: Option<T>,
    error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    fn into_query(self) -> Result<Option<T>> {
        match self.error {
            Some(err) => Err(Error::KnowledgeBase {
                code: err.code,
                info: err.info,
            }),
            None => Ok(self.query),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    #[serde(default)]
    categories: Vec<TitleRef>,
    #[serde(default)]
    links: Vec<TitleRef>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<TitleRef>,
}

#[derive(Debug, Deserialize)]
struct TitleRef {
    title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: for<'de> Deserialize<'de>>(raw: &str) -> ApiResponse<T> {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_endpoint_for_language() {
        let url = endpoint_for("en").unwrap();
        assert_eq!(url.as_str(), "https://en.wikipedia.org/w/api.php");

        assert!(endpoint_for("zh-yue").is_ok());
        assert!(endpoint_for("").is_err());
        assert!(endpoint_for("en/../evil").is_err());
    }

    #[test]
    fn test_client_uses_configured_language() {
        let config = WikiConfig {
            language: "de".to_string(),
            ..WikiConfig::default()
        };
        let client = WikipediaClient::new(&config).unwrap();
        assert_eq!(client.endpoint().host_str(), Some("de.wikipedia.org"));
    }

    #[test]
    fn test_parse_existing_page() {
        let raw = r#"{
            "batchcomplete": true,
            "query": {
                "redirects": [{"from": "Gradient Descent", "to": "Gradient descent"}],
                "pages": [{
                    "pageid": 201489,
                    "ns": 0,
                    "title": "Gradient descent",
                    "extract": "Gradient descent is a method for unconstrained optimization.\n",
                    "categories": [
                        {"ns": 14, "title": "Category:Optimization algorithms and methods"},
                        {"ns": 14, "title": "Category:Gradient methods"}
                    ],
                    "links": [
                        {"ns": 0, "title": "Backpropagation"},
                        {"ns": 0, "title": "Conjugate gradient method"}
                    ]
                }]
            }
        }"#;

        let article = into_article("Gradient Descent", parse(raw)).unwrap();
        assert!(article.exists);
        assert_eq!(article.title, "Gradient descent");
        assert_eq!(article.summary, "Gradient descent is a method for unconstrained optimization.");
        assert_eq!(article.categories[1], "Category:Gradient methods");
        assert_eq!(article.links, vec!["Backpropagation", "Conjugate gradient method"]);
    }

    #[test]
    fn test_parse_missing_page() {
        let raw = r#"{"batchcomplete": true, "query": {"pages": [
            {"ns": 0, "title": "Zzqx-nonexistent-term-123", "missing": true}
        ]}}"#;

        let article = into_article("zzqx-nonexistent-term-123", parse(raw)).unwrap();
        assert!(!article.exists);
        assert_eq!(article.title, "Zzqx-nonexistent-term-123");
    }

    #[test]
    fn test_parse_invalid_and_empty_responses() {
        let invalid = r#"{"query": {"pages": [
            {"title": "", "invalidreason": "The requested page title is empty.", "invalid": true}
        ]}}"#;
        let article = into_article("", parse(invalid)).unwrap();
        assert!(!article.exists);

        let empty = r#"{"batchcomplete": true}"#;
        let article = into_article("  ", parse(empty)).unwrap();
        assert!(!article.exists);
        assert_eq!(article.title, "  ");
    }

    #[test]
    fn test_parse_api_error() {
        let raw = r#"{"error": {"code": "nosrsearch", "info": "The \"srsearch\" parameter must be set."}}"#;
        let err = into_titles(parse(raw)).unwrap_err();
        assert!(matches!(err, Error::KnowledgeBase { ref code, .. } if code == "nosrsearch"));
    }

    #[test]
    fn test_parse_search_results() {
        let raw = r#"{"batchcomplete": true, "query": {
            "searchinfo": {"totalhits": 3},
            "search": [{"ns": 0, "title": "Cross-entropy"}, {"ns": 0, "title": "Loss function"}]
        }}"#;
        let titles = into_titles(parse(raw)).unwrap();
        assert_eq!(titles, vec!["Cross-entropy", "Loss function"]);

        let none = r#"{"query": {"search": []}}"#;
        assert!(into_titles(parse(none)).unwrap().is_empty());
    }
}
