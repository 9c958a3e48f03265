//! Search controller - turns keystrokes into settled, supersession-safe results
//!
//! The controller keeps two queries apart:
//! - the *current* query, updated on every keystroke
//! - the *settled* query, updated only when the debounce window elapses and
//!   a request is issued for it
//!
//! Renderers must key off the settled query so the label they show always
//! matches the request that produced the results. Every dispatch gets a new
//! sequence number; a response is applied only if its number is still the
//! latest one when it arrives.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, trace, warn};
use typeahead_core::{
    normalize_query, PageRequest, ResultEntry, SearchConfig, SearchOptions, SearchRequest,
};

use crate::backend::SearchBackend;
use crate::debounce::Debouncer;
use crate::Result;

/// Where the latest request for the settled query stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// Nothing has been requested for the current query
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last request failed; shown as "no results"
    Failed,
}

/// Observable controller state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    /// Trimmed query as typed
    pub query: String,

    /// Query the displayed results belong to
    pub settled_query: String,

    /// Results for the settled query, in server order
    pub entries: Vec<ResultEntry>,

    pub status: SearchStatus,

    /// Sequence number of the latest dispatch
    pub seq: u64,

    /// Whether a dispatch is waiting out the debounce window
    pub pending: bool,

    /// Whether the last page came back short
    pub exhausted: bool,
}

impl SearchSnapshot {
    pub fn has_results(&self) -> bool {
        !self.query.is_empty() && !self.entries.is_empty()
    }

    /// Loading with nothing to show yet
    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading && self.entries.is_empty()
    }
}

/// What `set_query` did with the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryChange {
    /// Query is empty; results were cleared
    Cleared,
    /// A debounced dispatch is scheduled
    Scheduled,
    /// Query equals the settled query; nothing new is dispatched
    Unchanged,
}

/// Options object handed to the result list; compared by value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    pub query: String,
}

/// Result of a page fetch requested by the result list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Issued { seq: u64 },
    Skipped,
}

/// Settles queries and keeps displayed results in sync with the latest one
///
/// All methods are synchronous and must be called inside a tokio runtime;
/// network calls run on spawned tasks.
pub struct SearchController {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl SearchController {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        options: SearchOptions,
        config: SearchConfig,
    ) -> Self {
        let (state, _) = watch::channel(SearchSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                backend,
                options,
                page_size: config.page_size.max(1),
                state,
            }),
            debouncer: Debouncer::new(config.debounce()),
        }
    }

    /// Options merged into every request; fixed for this controller
    pub fn options(&self) -> &SearchOptions {
        &self.shared.options
    }

    /// Update the query from a raw input value
    pub fn set_query(&self, raw: &str) -> QueryChange {
        let query = normalize_query(raw);

        if query.is_empty() {
            self.debouncer.cancel();
            self.shared.clear();
            debug!("Query cleared");
            return QueryChange::Cleared;
        }

        let unchanged = {
            let state = self.shared.state.borrow();
            state.settled_query == query && state.status != SearchStatus::Failed
        };

        if unchanged {
            self.debouncer.cancel();
            self.shared.state.send_if_modified(|s| {
                let modified = s.query != query || s.pending;
                s.query = query.to_string();
                s.pending = false;
                modified
            });
            return QueryChange::Unchanged;
        }

        self.dispatch(query);
        QueryChange::Scheduled
    }

    /// Debounced dispatch: records `query` as the current query, then settles
    /// it and issues the request once no other dispatch arrives within the
    /// window
    ///
    /// Returns false without scheduling anything when `query` is empty after
    /// trimming.
    pub fn dispatch(&self, query: &str) -> bool {
        let query = normalize_query(query).to_string();
        if query.is_empty() {
            return false;
        }

        self.shared.state.send_modify(|s| {
            s.query = query.clone();
            s.pending = true;
        });

        let shared = Arc::clone(&self.shared);
        trace!("Scheduling dispatch for '{}'", query);
        self.debouncer.call(move || shared.settle(query));
        true
    }

    /// Fetch function for the result list
    pub fn fetcher(&self) -> PageFetcher {
        PageFetcher {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn query(&self) -> String {
        self.shared.state.borrow().query.clone()
    }

    pub fn settled_query(&self) -> String {
        self.shared.state.borrow().settled_query.clone()
    }

    pub fn has_results(&self) -> bool {
        self.shared.state.borrow().has_results()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

/// Requests further pages of the settled query on behalf of the result list
#[derive(Clone)]
pub struct PageFetcher {
    shared: Arc<Shared>,
}

impl PageFetcher {
    /// Fetch `page` for `options`
    ///
    /// Settlement already issues the first page, so a first-page fetch only
    /// goes out again after a failure. Later pages are issued only when they
    /// continue the loaded entries. Options for any query other than the
    /// settled one are ignored.
    pub fn fetch(&self, options: &ListOptions, page: PageRequest) -> FetchOutcome {
        self.shared.fetch_page(&options.query, page)
    }

    /// Fetch the page after the loaded entries
    pub fn fetch_more(&self, options: &ListOptions) -> FetchOutcome {
        let loaded = self.shared.state.borrow().entries.len();
        self.fetch(options, PageRequest::after(loaded, self.shared.page_size))
    }
}

impl fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFetcher")
            .field("page_size", &self.shared.page_size)
            .finish_non_exhaustive()
    }
}

struct Shared {
    backend: Arc<dyn SearchBackend>,
    options: SearchOptions,
    page_size: usize,
    state: watch::Sender<SearchSnapshot>,
}

impl Shared {
    fn clear(&self) {
        self.state.send_modify(|s| {
            // Bumping the sequence drops whatever is still in flight
            s.seq += 1;
            s.query.clear();
            s.settled_query.clear();
            s.entries.clear();
            s.status = SearchStatus::Idle;
            s.pending = false;
            s.exhausted = false;
        });
    }

    fn settle(self: &Arc<Self>, query: String) {
        let mut issued = None;
        self.state.send_if_modified(|s| {
            // Cleared or retyped while the timer was firing
            if s.query != query {
                return false;
            }
            s.seq += 1;
            issued = Some(s.seq);
            s.settled_query = query.clone();
            s.entries.clear();
            s.status = SearchStatus::Loading;
            s.pending = false;
            s.exhausted = false;
            true
        });

        let Some(seq) = issued else {
            trace!("Skipping settlement of stale query '{}'", query);
            return;
        };

        debug!("Dispatching search for '{}' (seq {})", query, seq);
        let request = SearchRequest::new(
            query,
            self.options.clone(),
            PageRequest::first(self.page_size),
            seq,
        );
        self.spawn_request(request);
    }

    fn fetch_page(self: &Arc<Self>, query: &str, page: PageRequest) -> FetchOutcome {
        if page.limit == 0 {
            return FetchOutcome::Skipped;
        }

        let mut issued = None;
        self.state.send_if_modified(|s| {
            if s.settled_query.is_empty() || s.settled_query != query {
                return false;
            }
            let allowed = if page.is_first() {
                s.status == SearchStatus::Failed
            } else {
                s.status == SearchStatus::Ready && !s.exhausted && page.offset == s.entries.len()
            };
            if !allowed {
                return false;
            }
            s.seq += 1;
            s.status = SearchStatus::Loading;
            issued = Some(s.seq);
            true
        });

        match issued {
            Some(seq) => {
                debug!(
                    "Fetching page at offset {} for '{}' (seq {})",
                    page.offset, query, seq
                );
                let request = SearchRequest::new(query, self.options.clone(), page, seq);
                self.spawn_request(request);
                FetchOutcome::Issued { seq }
            }
            None => FetchOutcome::Skipped,
        }
    }

    fn spawn_request(self: &Arc<Self>, request: SearchRequest) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = shared.backend.search(&request).await;
            shared.resolve(request, outcome);
        });
    }

    fn resolve(&self, request: SearchRequest, outcome: Result<Vec<ResultEntry>>) {
        let error = outcome.as_ref().err().map(ToString::to_string);

        let applied = self.state.send_if_modified(|s| {
            if s.seq != request.seq {
                return false;
            }
            match outcome {
                Ok(entries) => {
                    s.exhausted = entries.len() < request.page.limit;
                    if request.page.is_first() {
                        s.entries = entries;
                    } else {
                        s.entries.extend(entries);
                    }
                    s.status = SearchStatus::Ready;
                }
                Err(_) if request.page.is_first() => {
                    s.entries.clear();
                    s.status = SearchStatus::Failed;
                }
                Err(_) => {
                    // Keep the pages already loaded
                    s.status = SearchStatus::Ready;
                }
            }
            true
        });

        if !applied {
            trace!(
                "Discarding superseded response for '{}' (seq {})",
                request.query,
                request.seq
            );
            return;
        }

        if let Some(error) = error {
            warn!(
                "Search for '{}' failed (seq {}): {}",
                request.query, request.seq, error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use typeahead_core::{Document, ShareId};

    use crate::SearchError;

    /// Echoes the query back as a single entry
    struct EchoBackend {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchBackend for EchoBackend {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<ResultEntry>> {
            self.calls.lock().push(request.query.clone());
            if request.query == "boom" {
                return Err(SearchError::Backend("unavailable".into()));
            }
            let doc = Document::new(request.query.clone(), "");
            Ok(vec![ResultEntry::new(doc.reference(), request.query.clone())])
        }
    }

    fn controller() -> (SearchController, Arc<EchoBackend>) {
        let backend = Arc::new(EchoBackend {
            calls: Mutex::new(Vec::new()),
        });
        let controller = SearchController::new(
            backend.clone(),
            SearchOptions::new(ShareId::new()),
            SearchConfig::default(),
        );
        (controller, backend)
    }

    async fn wait(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_query_lags_until_window_elapses() {
        let (controller, _) = controller();

        assert_eq!(controller.set_query("  rust "), QueryChange::Scheduled);
        assert_eq!(controller.query(), "rust");
        assert_eq!(controller.settled_query(), "");
        assert!(controller.snapshot().pending);

        wait(450).await;
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.settled_query, "rust");
        assert_eq!(snapshot.status, SearchStatus::Ready);
        assert_eq!(snapshot.entries[0].context, "rust");
        assert!(!snapshot.pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_previous_results_stay_until_settlement() {
        let (controller, _) = controller();
        controller.set_query("te");
        wait(450).await;

        controller.set_query("tea");
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.settled_query, "te");
        assert_eq!(snapshot.entries[0].context, "te");
        assert!(snapshot.has_results());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_query_is_a_no_op() {
        let (controller, backend) = controller();
        controller.set_query("te");
        wait(450).await;

        assert_eq!(controller.set_query("tes"), QueryChange::Scheduled);
        assert_eq!(controller.set_query("te "), QueryChange::Unchanged);
        assert!(!controller.is_pending());
        wait(450).await;

        assert_eq!(*backend.calls.lock(), vec!["te".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_surfaces_as_no_results() {
        let (controller, _) = controller();
        controller.set_query("ok");
        wait(450).await;
        assert!(controller.has_results());

        controller.set_query("boom");
        wait(450).await;
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.status, SearchStatus::Failed);
        assert!(snapshot.entries.is_empty());
        assert!(!snapshot.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_is_synchronous() {
        let (controller, _) = controller();
        controller.set_query("rust");
        wait(450).await;

        assert_eq!(controller.set_query("   "), QueryChange::Cleared);
        let snapshot = controller.snapshot();
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.settled_query, "");
        assert_eq!(snapshot.status, SearchStatus::Idle);
        assert!(!snapshot.has_results());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_settlement() {
        let (controller, _) = controller();
        let mut rx = controller.subscribe();

        controller.set_query("watch");
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().pending);

        wait(450).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().settled_query, "watch");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_ignores_empty_query() {
        let (controller, backend) = controller();

        assert!(!controller.dispatch("   "));
        assert!(!controller.is_pending());
        wait(500).await;

        let snapshot = controller.snapshot();
        assert!(backend.calls.lock().is_empty());
        assert_eq!(snapshot.status, SearchStatus::Idle);
        assert_eq!(snapshot.seq, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_records_current_query() {
        let (controller, backend) = controller();

        assert!(controller.dispatch(" rust "));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.query, "rust");
        assert!(snapshot.pending);

        wait(450).await;
        assert_eq!(*backend.calls.lock(), vec!["rust".to_string()]);
        assert_eq!(controller.settled_query(), "rust");
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_skips_query_cleared_while_firing() {
        let (controller, backend) = controller();
        controller.set_query("rust");

        // A clear that lands after the timer fired but before settlement
        controller.shared.clear();
        controller.shared.settle("rust".to_string());
        wait(500).await;

        let snapshot = controller.snapshot();
        assert!(backend.calls.lock().is_empty());
        assert_eq!(snapshot.settled_query, "");
        assert_eq!(snapshot.status, SearchStatus::Idle);
        assert!(!snapshot.has_results());
    }
}
