//! In-process search backend over a document corpus

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use typeahead_core::{match_ranges, Document, ResultEntry, SearchRequest, ShareId};

use crate::backend::SearchBackend;
use crate::error::{Result, SearchError};

/// Characters of context kept before the first match
const CONTEXT_BEFORE: usize = 40;

/// Characters of context kept after the start of the first match
const CONTEXT_AFTER: usize = 80;

/// A set of documents belonging to one share, as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    pub share_id: ShareId,
    pub documents: Vec<Document>,
}

impl Corpus {
    pub fn new(share_id: ShareId) -> Self {
        Self {
            share_id,
            documents: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a corpus from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        let corpus = Self::from_json(&json)?;
        info!(
            "Loaded {} documents for share {}",
            corpus.documents.len(),
            corpus.share_id
        );
        Ok(corpus)
    }
}

/// Answers searches from documents held in memory
///
/// Every whitespace-separated term must appear (ignoring case) in a
/// document's title or text. Hits are ranked by title match, then by the
/// number of occurrences, then by most recent update.
pub struct MemoryBackend {
    shares: RwLock<HashMap<ShareId, Vec<Document>>>,
    latency: Duration,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            shares: RwLock::new(HashMap::new()),
            latency: Duration::ZERO,
        }
    }

    /// Delay every response, simulating a remote round trip
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn from_corpus(corpus: Corpus) -> Self {
        let mut shares = HashMap::new();
        shares.insert(corpus.share_id, corpus.documents);
        Self {
            shares: RwLock::new(shares),
            latency: Duration::ZERO,
        }
    }

    /// Add a document to a share, creating the share if needed
    pub async fn insert(&self, share_id: ShareId, document: Document) {
        self.shares
            .write()
            .await
            .entry(share_id)
            .or_default()
            .push(document);
    }

    pub async fn document_count(&self, share_id: ShareId) -> usize {
        self.shares
            .read()
            .await
            .get(&share_id)
            .map_or(0, Vec::len)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ResultEntry>> {
        if request.query.trim().is_empty() {
            return Err(SearchError::InvalidRequest("empty query".into()));
        }
        if request.page.limit == 0 {
            return Err(SearchError::InvalidRequest("page limit must be positive".into()));
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let shares = self.shares.read().await;
        let documents = shares
            .get(&request.options.share_id)
            .ok_or(SearchError::ShareNotFound(request.options.share_id))?;

        let terms: Vec<&str> = request.query.split_whitespace().collect();
        let mut hits: Vec<Hit<'_>> = documents
            .iter()
            .filter(|doc| request.options.filters.matches(doc))
            .filter_map(|doc| Hit::score(doc, &terms))
            .collect();

        hits.sort_by(|a, b| {
            b.in_title
                .cmp(&a.in_title)
                .then(b.occurrences.cmp(&a.occurrences))
                .then(b.doc.updated_at.cmp(&a.doc.updated_at))
        });

        let entries: Vec<ResultEntry> = hits
            .into_iter()
            .skip(request.page.offset)
            .take(request.page.limit)
            .map(|hit| {
                let context = context_snippet(&hit.doc.text, terms[0]);
                ResultEntry::new(hit.doc.reference(), context)
            })
            .collect();

        debug!(
            "Search '{}' (seq {}) returned {} entries at offset {}",
            request.query,
            request.seq,
            entries.len(),
            request.page.offset
        );

        Ok(entries)
    }
}

struct Hit<'a> {
    doc: &'a Document,
    in_title: bool,
    occurrences: usize,
}

impl<'a> Hit<'a> {
    fn score(doc: &'a Document, terms: &[&str]) -> Option<Self> {
        let mut in_title = false;
        let mut occurrences = 0;
        for term in terms {
            let title_hits = match_ranges(&doc.title, term).len();
            let text_hits = match_ranges(&doc.text, term).len();
            if title_hits + text_hits == 0 {
                return None;
            }
            in_title |= title_hits > 0;
            occurrences += title_hits + text_hits;
        }
        Some(Self {
            doc,
            in_title,
            occurrences,
        })
    }
}

/// A window of `text` around the first occurrence of `term`
fn context_snippet(text: &str, term: &str) -> String {
    let Some(first) = match_ranges(text, term).into_iter().next() else {
        return truncate_chars(text, CONTEXT_BEFORE + CONTEXT_AFTER);
    };

    let before: Vec<(usize, char)> = text[..first.start].char_indices().collect();
    let start = before
        .len()
        .checked_sub(CONTEXT_BEFORE)
        .map_or(0, |i| before[i].0);
    let end = text[first.start..]
        .char_indices()
        .nth(CONTEXT_AFTER)
        .map_or(text.len(), |(i, _)| first.start + i);

    let mut snippet = String::new();
    if start > 0 {
        snippet.push('…');
    }
    snippet.push_str(text[start..end].trim());
    if end < text.len() {
        snippet.push('…');
    }
    snippet
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((i, _)) => format!("{}…", text[..i].trim_end()),
        None => text.to_string(),
    }
}
