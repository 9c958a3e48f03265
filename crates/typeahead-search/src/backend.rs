//! The remote search API contract

use async_trait::async_trait;
use typeahead_core::{ResultEntry, SearchRequest};

use crate::Result;

/// A search backend answering one request at a time
///
/// Results come back in relevance order and are displayed as received.
/// Implementations own their own timeouts.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ResultEntry>>;
}
