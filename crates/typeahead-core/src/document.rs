//! Searchable documents and the result entries a search returns

use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DocumentId;

/// A document that can be searched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: DocumentId,

    pub title: String,

    /// Plain text body used for matching and context snippets
    #[serde(default)]
    pub text: String,

    /// Collection the document lives in, if any
    #[serde(default)]
    pub collection: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(),
            title: title.into(),
            text: text.into(),
            collection: None,
            tags: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// The lightweight reference carried by result entries
    pub fn reference(&self) -> DocumentRef {
        DocumentRef {
            id: self.id,
            title: self.title.clone(),
            collection: self.collection.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Reference to a matched document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: DocumentId,
    pub title: String,
    pub collection: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// One search hit: a document reference plus the snippet that matched
///
/// Entries keep the order the backend returned them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub document: DocumentRef,

    /// Snippet of text around the match
    pub context: String,
}

impl ResultEntry {
    pub fn new(document: DocumentRef, context: impl Into<String>) -> Self {
        Self {
            document,
            context: context.into(),
        }
    }

    /// Byte ranges in `context` where `term` occurs, ignoring case
    pub fn highlights(&self, term: &str) -> Vec<Range<usize>> {
        match_ranges(&self.context, term)
    }
}

/// Non-overlapping byte ranges of `term` in `haystack`, ignoring case
pub fn match_ranges(haystack: &str, term: &str) -> Vec<Range<usize>> {
    let term = term.trim();
    if term.is_empty() {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    let mut start = 0;
    while start < haystack.len() {
        let rest = &haystack[start..];
        if let Some(len) = prefix_match_len(rest, term) {
            ranges.push(start..start + len);
            start += len;
        } else {
            start += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    ranges
}

/// Byte length of the prefix of `haystack` matching `needle`, if it matches
fn prefix_match_len(haystack: &str, needle: &str) -> Option<usize> {
    let mut hay = haystack.char_indices();
    for n in needle.chars() {
        let (_, h) = hay.next()?;
        if !h.to_lowercase().eq(n.to_lowercase()) {
            return None;
        }
    }
    Some(hay.next().map_or(haystack.len(), |(i, _)| i))
}
