//! Knowledge base access.
//!
//! The lookups only need two things from an encyclopedia: a page by title
//! and a ranked title search. [`KnowledgeBase`] captures exactly that, so the
//! live [`WikipediaClient`] can be swapped for [`StaticKnowledgeBase`] in tests.

mod client;

pub use client::WikipediaClient;

use std::collections::HashMap;

use async_trait::async_trait;
use crate::Result;
use crate::error::Error;

/// A knowledge base entry as seen by the lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub exists: bool,
    /// Lead section as plain text
    pub summary: String,
    /// Category titles in API order, namespace prefix included
    pub categories: Vec<String>,
    /// Outgoing article links in API order
    pub links: Vec<String>,
}

impl Article {
    /// An entry that does not exist.
    pub fn missing(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Read-only knowledge base interface
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Fetch a page by exact title (redirects followed).
    async fn page(&self, title: &str) -> Result<Article>;

    /// Free-text search returning at most `limit` titles, best match first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

/// In-memory knowledge base for testing
#[derive(Debug, Default)]
pub struct StaticKnowledgeBase {
    articles: HashMap<String, Article>,
    searches: HashMap<String, Vec<String>>,
    failing_pages: HashMap<String, String>,
    failing_search: Option<String>,
}

impl StaticKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing article.
    pub fn with_article(
        mut self,
        title: &str,
        summary: &str,
        categories: &[&str],
        links: &[&str],
    ) -> Self {
        self.articles.insert(
            title.to_string(),
            Article {
                title: title.to_string(),
                exists: true,
                summary: summary.to_string(),
                categories: categories.iter().map(|s| s.to_string()).collect(),
                links: links.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    /// Canned search results for a query.
    pub fn with_search(mut self, query: &str, titles: &[&str]) -> Self {
        self.searches
            .insert(query.to_string(), titles.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Make fetching `title` fail with `message`.
    pub fn with_failing_page(mut self, title: &str, message: &str) -> Self {
        self.failing_pages.insert(title.to_string(), message.to_string());
        self
    }

    /// Make every search fail with `message`.
    pub fn with_failing_search(mut self, message: &str) -> Self {
        self.failing_search = Some(message.to_string());
        self
    }
}

#[async_trait]
impl KnowledgeBase for StaticKnowledgeBase {
    async fn page(&self, title: &str) -> Result<Article> {
        if let Some(message) = self.failing_pages.get(title) {
            return Err(Error::Other(message.clone()));
        }

        Ok(self
            .articles
            .get(title)
            .cloned()
            .unwrap_or_else(|| Article::missing(title)))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        if let Some(message) = &self.failing_search {
            return Err(Error::Other(message.clone()));
        }

        Ok(self
            .searches
            .get(query)
            .map(|titles| titles.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
