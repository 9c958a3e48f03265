//! Disclosure state machine for the results overlay
//!
//! Decides when the overlay is visible and where keyboard focus goes,
//! independently of network timing. Transitions are synchronous; the machine
//! never fails.

use serde::{Deserialize, Serialize};
use tracing::trace;
use typeahead_core::normalize_query;

use crate::keys::{FieldState, Key, KeyEvent};

/// Whether the results overlay is visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisclosureState {
    #[default]
    Closed,
    Open,
}

impl DisclosureState {
    pub fn as_str(&self) -> &str {
        match self {
            DisclosureState::Closed => "closed",
            DisclosureState::Open => "open",
        }
    }
}

/// Element that should receive keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusTarget {
    Input,
    FirstResult,
}

/// Commands for the host after an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResponse {
    /// Suppress the host widget's default reaction (caret movement etc.)
    pub handled: bool,

    /// Move focus here
    pub focus: Option<FocusTarget>,

    /// Select the entire input value
    pub select_all: bool,
}

impl EventResponse {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    pub fn focus(target: FocusTarget) -> Self {
        Self {
            focus: Some(target),
            ..Self::default()
        }
    }
}

/// Overlay visibility plus focus routing between input, overlay and the
/// first result
///
/// `Open` is only reachable while the input holds a non-empty query.
/// Opening and closing never move focus on their own.
#[derive(Debug, Clone, Default)]
pub struct Disclosure {
    state: DisclosureState,
    has_query: bool,
}

impl Disclosure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DisclosureState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DisclosureState::Open
    }

    /// The input value changed
    pub fn text_changed(&mut self, value: &str) -> EventResponse {
        self.has_query = !normalize_query(value).is_empty();
        if self.has_query {
            self.open();
        } else {
            self.close();
        }
        EventResponse::ignored()
    }

    /// A key went down in the input
    pub fn key_down(
        &mut self,
        event: &KeyEvent,
        field: &FieldState,
        has_results: bool,
    ) -> EventResponse {
        match event.key {
            Key::Enter => {
                if has_results {
                    self.open();
                }
                EventResponse::ignored()
            }

            Key::Down if !event.shift() => {
                if !has_results {
                    return EventResponse::ignored();
                }
                if field.is_caret_at_end() {
                    self.open();
                }
                if self.is_open() {
                    EventResponse::focus(FocusTarget::FirstResult)
                } else {
                    EventResponse::ignored()
                }
            }

            Key::Up => {
                if self.is_open() {
                    self.close();
                    EventResponse::handled()
                } else if !field.is_empty() && !field.is_caret_at_start() {
                    EventResponse {
                        handled: true,
                        select_all: true,
                        focus: None,
                    }
                } else {
                    EventResponse::ignored()
                }
            }

            Key::Escape if self.is_open() => {
                self.close();
                EventResponse::handled()
            }

            _ => EventResponse::ignored(),
        }
    }

    /// Escape bubbled up from the result list
    pub fn list_escape(&mut self) -> EventResponse {
        EventResponse::focus(FocusTarget::Input)
    }

    /// A result entry was clicked or selected
    pub fn result_activated(&mut self) -> EventResponse {
        self.close();
        EventResponse::ignored()
    }

    fn open(&mut self) {
        if !self.has_query || self.is_open() {
            return;
        }
        trace!("Disclosure opened");
        self.state = DisclosureState::Open;
    }

    fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        trace!("Disclosure closed");
        self.state = DisclosureState::Closed;
    }
}
