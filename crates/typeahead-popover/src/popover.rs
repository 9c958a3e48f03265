//! Search popover - keystrokes in, overlay state and list props out

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;
use typeahead_core::{ResultEntry, SearchConfig, SearchOptions};
use typeahead_search::{
    ListOptions, PageFetcher, QueryChange, SearchBackend, SearchController, SearchSnapshot,
    SearchStatus,
};

use crate::disclosure::{Disclosure, DisclosureState, EventResponse};
use crate::keys::{FieldState, KeyEvent};

/// Events bubbled up from the result list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    /// Escape pressed inside the list
    Escape,
    /// Entry at this index was clicked or selected
    Activate(usize),
}

/// Outcome of a list event
#[derive(Debug, Clone, PartialEq)]
pub struct ListOutcome {
    pub response: EventResponse,

    /// The entry that was activated, if any
    pub activated: Option<ResultEntry>,
}

/// Everything the paginated result list needs to render
#[derive(Debug, Clone)]
pub struct ResultListProps {
    /// Keyed by the settled query; the list refetches when this changes
    pub options: ListOptions,

    pub items: Vec<ResultEntry>,

    pub status: SearchStatus,

    /// No further pages are available
    pub exhausted: bool,

    pub fetch: PageFetcher,

    /// Text for the empty view
    pub empty_message: String,

    /// Term item renderers should highlight
    pub highlight: String,
}

impl ResultListProps {
    /// Show the loading placeholder instead of items
    pub fn show_loading(&self) -> bool {
        self.status == SearchStatus::Loading && self.items.is_empty()
    }

    /// Show the empty view
    pub fn show_empty(&self) -> bool {
        !self.options.query.is_empty()
            && self.items.is_empty()
            && matches!(self.status, SearchStatus::Ready | SearchStatus::Failed)
    }
}

/// Type-ahead search popover
///
/// Text changes go to the controller (query update, debounced fetch) and to
/// the disclosure machine (show/hide). Key events are routed through the
/// disclosure machine using the controller's "has results" signal.
pub struct SearchPopover {
    controller: SearchController,
    disclosure: Disclosure,
}

impl SearchPopover {
    pub fn new(controller: SearchController) -> Self {
        Self {
            controller,
            disclosure: Disclosure::new(),
        }
    }

    /// Build a popover searching `options` on `backend`
    pub fn with_backend(
        backend: Arc<dyn SearchBackend>,
        options: SearchOptions,
        config: SearchConfig,
    ) -> Self {
        Self::new(SearchController::new(backend, options, config))
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn state(&self) -> DisclosureState {
        self.disclosure.state()
    }

    pub fn is_open(&self) -> bool {
        self.disclosure.is_open()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.controller.subscribe()
    }

    /// The input value changed
    pub fn handle_input(&mut self, value: &str) -> EventResponse {
        if self.controller.set_query(value) == QueryChange::Cleared {
            debug!("Input cleared, closing results");
        }
        self.disclosure.text_changed(value)
    }

    /// A key went down in the input
    pub fn handle_key(&mut self, event: &KeyEvent, field: &FieldState) -> EventResponse {
        let has_results = self.controller.has_results();
        self.disclosure.key_down(event, field, has_results)
    }

    /// An event bubbled up from the result list
    pub fn handle_list_event(&mut self, event: ListEvent) -> ListOutcome {
        match event {
            ListEvent::Escape => ListOutcome {
                response: self.disclosure.list_escape(),
                activated: None,
            },
            ListEvent::Activate(index) => {
                let activated = self.controller.snapshot().entries.get(index).cloned();
                if let Some(ref entry) = activated {
                    debug!("Activated result '{}'", entry.document.title);
                }
                ListOutcome {
                    response: self.disclosure.result_activated(),
                    activated,
                }
            }
        }
    }

    /// Props for the result list, keyed by the settled query
    pub fn list_props(&self) -> ResultListProps {
        let snapshot = self.controller.snapshot();
        ResultListProps {
            empty_message: format!("No results for {}", snapshot.settled_query),
            highlight: snapshot.settled_query.clone(),
            options: ListOptions {
                query: snapshot.settled_query,
            },
            items: snapshot.entries,
            status: snapshot.status,
            exhausted: snapshot.exhausted,
            fetch: self.controller.fetcher(),
        }
    }
}
