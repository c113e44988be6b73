//! Term lookups against a knowledge base.
//!
//! Two operations share one resolution path: try the term as a page title,
//! then fall back to the top search hit. Results are typed; turning them
//! into the text an agent reads happens in the tool layer.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use crate::error::Error;
use crate::wiki::{Article, KnowledgeBase};

/// Ellipsis appended to truncated summaries
pub const ELLIPSIS: &str = "...";

/// Categories shown by a context lookup
pub const MAX_CATEGORIES: usize = 5;

/// Links considered by a context lookup
pub const LINK_WINDOW: usize = 10;

/// Related terms shown by a context lookup
pub const MAX_RELATED: usize = 5;

/// Immutable lookup settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupSettings {
    /// Summary length (characters) above which truncation kicks in
    pub max_length: usize,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self { max_length: 500 }
    }
}

/// Why a lookup produced no result
#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("no entry found for '{term}'")]
    NotFound { term: String },

    /// The search fallback failed; no entry could be established either way.
    #[error("search for '{term}' failed: {source}")]
    SearchFailed {
        term: String,
        #[source]
        source: Error,
    },

    #[error("{0}")]
    Fetch(#[source] Error),
}

impl LookupError {
    /// True for both plain absence and a failed search fallback.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. } | LookupError::SearchFailed { .. })
    }
}

/// A resolved, possibly truncated definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// The term as the caller typed it
    pub term: String,
    /// Title of the entry that answered
    pub title: String,
    pub summary: String,
    pub truncated: bool,
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wikipedia definition for '{}':\n{}", self.term, self.summary)
    }
}

/// Categories and related terms for a resolved entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermContext {
    pub term: String,
    pub title: String,
    pub categories: Vec<String>,
    pub related: Vec<String>,
}

impl fmt::Display for TermContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Context for '{}':\nCategories: {}\nRelated terms: {}",
            self.term,
            self.categories.join(", "),
            self.related.join(", ")
        )
    }
}

/// Stateless lookup client over a knowledge base
pub struct Lookup<K: KnowledgeBase> {
    kb: Arc<K>,
    settings: LookupSettings,
}

impl<K: KnowledgeBase> Clone for Lookup<K> {
    fn clone(&self) -> Self {
        Self {
            kb: Arc::clone(&self.kb),
            settings: self.settings,
        }
    }
}

impl<K: KnowledgeBase> Lookup<K> {
    pub fn new(kb: K, settings: LookupSettings) -> Self {
        Self { kb: Arc::new(kb), settings }
    }

    /// Definition truncated to the configured length.
    pub async fn definition(&self, term: &str) -> Result<Definition, LookupError> {
        self.lookup(term, self.settings.max_length).await
    }

    /// Definition truncated to `max_length` characters.
    pub async fn lookup(&self, term: &str, max_length: usize) -> Result<Definition, LookupError> {
        let article = self.resolve(term).await?;
        let (summary, truncated) = truncate_at_word(&article.summary, max_length);

        Ok(Definition {
            term: term.to_string(),
            title: article.title,
            summary,
            truncated,
        })
    }

    /// Leading categories and related links for a term.
    pub async fn context(&self, term: &str) -> Result<TermContext, LookupError> {
        let article = self.resolve(term).await?;

        let categories = article
            .categories
            .iter()
            .take(MAX_CATEGORIES)
            .map(|c| strip_namespace(c).to_string())
            .collect();

        let related = article
            .links
            .iter()
            .take(LINK_WINDOW)
            .take(MAX_RELATED)
            .cloned()
            .collect();

        Ok(TermContext {
            term: term.to_string(),
            title: article.title,
            categories,
            related,
        })
    }

    /// Direct title lookup, then the top search hit.
    async fn resolve(&self, term: &str) -> Result<Article, LookupError> {
        if term.trim().is_empty() {
            return Err(LookupError::NotFound { term: term.to_string() });
        }

        let direct = self.kb.page(term).await.map_err(LookupError::Fetch)?;
        if direct.exists {
            return Ok(direct);
        }

        debug!("No page titled '{}', falling back to search", term);

        let hits = self.kb.search(term, 1).await.map_err(|source| {
            warn!("Search fallback for '{}' failed: {}", term, source);
            LookupError::SearchFailed {
                term: term.to_string(),
                source,
            }
        })?;

        let Some(top) = hits.into_iter().next() else {
            return Err(LookupError::NotFound { term: term.to_string() });
        };

        debug!("Search for '{}' resolved to '{}'", term, top);

        let article = self.kb.page(&top).await.map_err(LookupError::Fetch)?;
        if article.exists {
            Ok(article)
        } else {
            Err(LookupError::NotFound { term: term.to_string() })
        }
    }
}

/// Truncate `text` to at most `max_length` characters at a word boundary.
///
/// The cut lands on the last whitespace at or before char index
/// `max_length`; with none, everything is dropped. Returns the text and
/// whether it was truncated.
///
/// Unlike a cut confined to the first `max_length` chars, a space exactly at
/// `max_length` counts, any whitespace splits, and trailing whitespace is
/// trimmed: `"alpha beta gamma"` at 10 keeps `"alpha beta"`, not `"alpha"`.
pub fn truncate_at_word(text: &str, max_length: usize) -> (String, bool) {
    if text.chars().count() <= max_length {
        return (text.to_string(), false);
    }

    // Byte offset of the last whitespace among chars[0..=max_length].
    let cut = text
        .char_indices()
        .take(max_length + 1)
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .last()
        .unwrap_or(0);

    let kept = text[..cut].trim_end();
    (format!("{}{}", kept, ELLIPSIS), true)
}

/// `Category:Machine learning` -> `Machine learning`
pub fn strip_namespace(title: &str) -> &str {
    title.rsplit(':').next().unwrap_or(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::StaticKnowledgeBase;

    const CROSS_ENTROPY: &str = "In information theory, the cross-entropy between two probability \
        distributions measures the average number of bits needed to identify an event drawn from \
        the set when the coding scheme is optimized for an estimated distribution rather than the \
        true distribution.";

    fn kb() -> StaticKnowledgeBase {
        StaticKnowledgeBase::new()
            .with_article(
                "Gradient descent",
                "Gradient descent is a first-order iterative algorithm.",
                &[
                    "Category:Articles with short description",
                    "Category:First order methods",
                    "Category:Gradient methods",
                    "Category:Mathematical optimization",
                    "Category:Optimization algorithms and methods",
                    "Category:Short description is different from Wikidata",
                    "Category:Webarchive template wayback links",
                ],
                &[
                    "Accelerated gradient", "Backpropagation", "Conjugate gradient method",
                    "Convex function", "Delta rule", "Gauss-Newton algorithm", "Hill climbing",
                    "Line search", "Newton's method", "Stochastic gradient descent", "Wolfe conditions",
                ],
            )
            .with_article("Cross-entropy", CROSS_ENTROPY, &["Category:Entropy and information"], &[])
            .with_search("cross-entropy loss", &["Cross-entropy", "Loss function"])
    }

    fn lookup() -> Lookup<StaticKnowledgeBase> {
        Lookup::new(kb(), LookupSettings::default())
    }

    #[tokio::test]
    async fn test_direct_hit() {
        let def = lookup().lookup("Gradient descent", 500).await.unwrap();
        assert_eq!(def.title, "Gradient descent");
        assert!(!def.truncated);
        assert!(def.to_string().starts_with("Wikipedia definition for 'Gradient descent':\n"));
        assert!(def.to_string().ends_with("first-order iterative algorithm."));
    }

    #[tokio::test]
    async fn test_search_fallback_keeps_typed_term() {
        let def = lookup().lookup("cross-entropy loss", 500).await.unwrap();
        assert_eq!(def.title, "Cross-entropy");
        assert_eq!(def.summary, CROSS_ENTROPY);
        assert!(def.to_string().starts_with("Wikipedia definition for 'cross-entropy loss':"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let err = lookup().lookup("zzqx-nonexistent-term-123", 500).await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound { ref term } if term == "zzqx-nonexistent-term-123"));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_search_hit_that_is_missing_is_not_found() {
        let kb = StaticKnowledgeBase::new().with_search("ghost", &["Ghost page"]);
        let err = Lookup::new(kb, LookupSettings::default()).definition("ghost").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_blank_term_is_not_found() {
        for term in ["", "   ", "\t\n"] {
            let err = lookup().definition(term).await.unwrap_err();
            assert!(matches!(err, LookupError::NotFound { .. }));
        }
    }

    #[tokio::test]
    async fn test_search_failure_is_distinct() {
        let kb = StaticKnowledgeBase::new().with_failing_search("connection reset");
        let err = Lookup::new(kb, LookupSettings::default()).definition("attention").await.unwrap_err();
        assert!(matches!(err, LookupError::SearchFailed { .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_page_failure_is_fetch_error() {
        let kb = StaticKnowledgeBase::new().with_failing_page("Transformer", "timed out");
        let err = Lookup::new(kb, LookupSettings::default()).definition("Transformer").await.unwrap_err();
        assert!(matches!(err, LookupError::Fetch(_)));
        assert_eq!(err.to_string(), "timed out");
    }

    #[tokio::test]
    async fn test_lookup_truncates_to_bound() {
        let def = lookup().lookup("Cross-entropy", 100).await.unwrap();
        assert!(def.truncated);
        assert!(def.summary.ends_with(ELLIPSIS));
        assert!(def.summary.chars().count() <= 103);

        let body = def.summary.trim_end_matches(ELLIPSIS);
        assert!(CROSS_ENTROPY.starts_with(body));
        // The next source char after the kept text is a boundary.
        let next = CROSS_ENTROPY[body.len()..].chars().next().unwrap();
        assert!(next.is_whitespace());
    }

    #[tokio::test]
    async fn test_definition_uses_settings() {
        let lookup = Lookup::new(kb(), LookupSettings { max_length: 35 });
        let def = lookup.definition("Cross-entropy").await.unwrap();
        assert_eq!(def.summary, "In information theory, the...");
    }

    #[tokio::test]
    async fn test_repeated_lookups_are_identical() {
        let lookup = lookup();
        let a = lookup.lookup("cross-entropy loss", 80).await.unwrap().to_string();
        let b = lookup.lookup("cross-entropy loss", 80).await.unwrap().to_string();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_context_limits() {
        let ctx = lookup().context("Gradient descent").await.unwrap();
        assert_eq!(ctx.categories.len(), 5);
        assert_eq!(ctx.categories[0], "Articles with short description");
        assert_eq!(ctx.categories[4], "Optimization algorithms and methods");
        assert_eq!(
            ctx.related,
            vec!["Accelerated gradient", "Backpropagation", "Conjugate gradient method", "Convex function", "Delta rule"]
        );

        let text = ctx.to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Context for 'Gradient descent':"));
        assert!(lines.next().unwrap().starts_with("Categories: Articles with short description, First order methods"));
        assert!(lines.next().unwrap().starts_with("Related terms: Accelerated gradient, Backpropagation"));
    }

    #[tokio::test]
    async fn test_context_with_few_entries() {
        let ctx = lookup().context("cross-entropy loss").await.unwrap();
        assert_eq!(ctx.categories, vec!["Entropy and information"]);
        assert!(ctx.related.is_empty());
        assert!(ctx.to_string().ends_with("Related terms: "));
    }

    #[test]
    fn test_truncate_short_text_verbatim() {
        assert_eq!(truncate_at_word("short text", 10), ("short text".to_string(), false));
        assert_eq!(truncate_at_word("", 0), (String::new(), false));
    }

    #[test]
    fn test_truncate_backs_off_to_space() {
        let (text, truncated) = truncate_at_word("alpha beta gamma", 8);
        assert!(truncated);
        assert_eq!(text, "alpha...");
    }

    #[test]
    fn test_truncate_boundary_exactly_at_limit() {
        // Char 10 is the space after "beta", so the whole prefix is kept.
        assert_eq!(truncate_at_word("alpha beta gamma", 10).0, "alpha beta...");
    }

    #[test]
    fn test_truncate_without_boundary_drops_word() {
        assert_eq!(truncate_at_word("supercalifragilistic", 5).0, "...");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let text = "Über die Größe von Zügen";
        let (out, truncated) = truncate_at_word(text, 12);
        assert!(truncated);
        assert_eq!(out, "Über die...");
    }

    #[test]
    fn test_truncate_collapses_trailing_whitespace() {
        assert_eq!(truncate_at_word("one  two three", 5).0, "one...");
    }

    #[test]
    fn test_strip_namespace() {
        assert_eq!(strip_namespace("Category:Machine learning"), "Machine learning");
        assert_eq!(strip_namespace("Kategorie:Foo:Bar"), "Bar");
        assert_eq!(strip_namespace("No namespace"), "No namespace");
    }
}
