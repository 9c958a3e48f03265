//! Search query types sent to a search backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Document, ShareId};

/// Trim a raw input value into a query. An empty result means "no search".
pub fn normalize_query(raw: &str) -> &str {
    raw.trim()
}

/// Caller-supplied filters merged into every request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Filter by tags (any match)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Restrict to a single collection
    #[serde(default)]
    pub collection: Option<String>,

    /// Filter by date range
    #[serde(default)]
    pub updated_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_before: Option<DateTime<Utc>>,
}

impl SearchFilters {
    /// Whether a document passes every filter
    pub fn matches(&self, doc: &Document) -> bool {
        if !self.tags.is_empty() && !doc.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if let Some(ref collection) = self.collection {
            if doc.collection.as_ref() != Some(collection) {
                return false;
            }
        }
        if let Some(after) = self.updated_after {
            if doc.updated_at < after {
                return false;
            }
        }
        if let Some(before) = self.updated_before {
            if doc.updated_at > before {
                return false;
            }
        }
        true
    }
}

/// Options merged with the query before dispatch
///
/// The share scope is fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub share_id: ShareId,

    #[serde(default)]
    pub filters: SearchFilters,
}

impl SearchOptions {
    pub fn new(share_id: ShareId) -> Self {
        Self {
            share_id,
            filters: SearchFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// A window into the result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }

    /// The page following one that returned `loaded` entries in total
    pub fn after(loaded: usize, limit: usize) -> Self {
        Self {
            offset: loaded,
            limit,
        }
    }

    pub fn is_first(&self) -> bool {
        self.offset == 0
    }
}

/// One dispatch to the search backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The trimmed, non-empty query string
    pub query: String,

    pub options: SearchOptions,

    pub page: PageRequest,

    /// Monotonic dispatch number used to discard superseded responses
    pub seq: u64,
}

impl SearchRequest {
    pub fn new(
        query: impl Into<String>,
        options: SearchOptions,
        page: PageRequest,
        seq: u64,
    ) -> Self {
        Self {
            query: query.into(),
            options,
            page,
            seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  rust  "), "rust");
        assert_eq!(normalize_query(" \t\n"), "");
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let filters = SearchFilters::default();
        assert!(filters.matches(&Document::new("A", "b")));
    }

    #[test]
    fn test_tag_and_collection_filters() {
        let doc = Document::new("Plan", "q3 plan")
            .with_collection("eng")
            .with_tags(vec!["roadmap".into()]);

        let filters = SearchFilters {
            tags: vec!["roadmap".into(), "other".into()],
            collection: Some("eng".into()),
            ..Default::default()
        };
        assert!(filters.matches(&doc));

        let filters = SearchFilters {
            collection: Some("sales".into()),
            ..Default::default()
        };
        assert!(!filters.matches(&doc));
    }

    #[test]
    fn test_date_filters() {
        let now = Utc::now();
        let doc = Document::new("Old", "").with_updated_at(now - Duration::days(10));

        let recent = SearchFilters {
            updated_after: Some(now - Duration::days(1)),
            ..Default::default()
        };
        assert!(!recent.matches(&doc));

        let older = SearchFilters {
            updated_before: Some(now - Duration::days(5)),
            ..Default::default()
        };
        assert!(older.matches(&doc));
    }

    #[test]
    fn test_page_requests() {
        assert!(PageRequest::first(25).is_first());
        let next = PageRequest::after(25, 25);
        assert_eq!(next.offset, 25);
        assert!(!next.is_first());
    }
}
