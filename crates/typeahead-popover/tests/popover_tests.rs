use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use typeahead_core::{Document, SearchConfig, SearchOptions, ShareId};
use typeahead_popover::{
    DisclosureState, FieldState, FocusTarget, Key, KeyEvent, ListEvent, SearchPopover,
};
use typeahead_search::{Corpus, MemoryBackend, SearchStatus};

fn popover_with_latency(latency_ms: u64) -> SearchPopover {
    let share = ShareId::new();
    let mut corpus = Corpus::new(share);
    corpus.documents = vec![
        Document::new("Testing guide", "how we write tests for the api"),
        Document::new("Release notes", "the test suite now runs in parallel"),
        Document::new("Onboarding", "welcome aboard"),
    ];
    let backend =
        MemoryBackend::from_corpus(corpus).with_latency(Duration::from_millis(latency_ms));

    SearchPopover::with_backend(
        Arc::new(backend),
        SearchOptions::new(share),
        SearchConfig::default(),
    )
}

/// Simulate typing `text` into the field, one input event per character
fn type_text(popover: &mut SearchPopover, text: &str) {
    let mut value = String::new();
    for c in text.chars() {
        value.push(c);
        popover.handle_input(&value);
    }
}

async fn wait(ms: u64) {
    sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_typing_opens_immediately_and_settles_after_window() {
    let mut popover = popover_with_latency(20);

    type_text(&mut popover, "test");
    assert_eq!(popover.state(), DisclosureState::Open);

    let props = popover.list_props();
    assert_eq!(props.options.query, "");
    assert!(props.items.is_empty());

    wait(410).await;
    let props = popover.list_props();
    assert_eq!(props.options.query, "test");
    assert!(props.show_loading());

    wait(50).await;
    let props = popover.list_props();
    assert_eq!(props.status, SearchStatus::Ready);
    assert_eq!(props.items.len(), 2);
    assert_eq!(props.items[0].document.title, "Testing guide");
    assert_eq!(props.highlight, "test");
    assert!(!props.show_loading());
}

#[tokio::test(start_paused = true)]
async fn test_arrow_down_moves_focus_to_first_result() {
    let mut popover = popover_with_latency(0);
    type_text(&mut popover, "test");
    popover.handle_key(&KeyEvent::new(Key::Escape), &FieldState::caret_at_end("test"));
    assert_eq!(popover.state(), DisclosureState::Closed);

    // No results yet: nothing happens
    let response = popover.handle_key(&KeyEvent::new(Key::Down), &FieldState::caret_at_end("test"));
    assert_eq!(response.focus, None);
    assert_eq!(popover.state(), DisclosureState::Closed);

    wait(500).await;
    let response = popover.handle_key(&KeyEvent::new(Key::Down), &FieldState::caret_at("test", 2));
    assert_eq!(response.focus, None);
    assert_eq!(popover.state(), DisclosureState::Closed);

    let response = popover.handle_key(&KeyEvent::new(Key::Down), &FieldState::caret_at_end("test"));
    assert_eq!(response.focus, Some(FocusTarget::FirstResult));
    assert_eq!(popover.state(), DisclosureState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_input_closes_and_clears_despite_in_flight_request() {
    let mut popover = popover_with_latency(300);
    type_text(&mut popover, "test");
    wait(450).await;
    assert_eq!(popover.list_props().status, SearchStatus::Loading);

    popover.handle_input("");
    assert_eq!(popover.state(), DisclosureState::Closed);
    assert!(popover.list_props().items.is_empty());

    wait(1_000).await;
    assert!(popover.list_props().items.is_empty());

    // Keys cannot reopen an empty query
    popover.handle_key(&KeyEvent::new(Key::Enter), &FieldState::default());
    popover.handle_key(&KeyEvent::new(Key::Down), &FieldState::default());
    assert_eq!(popover.state(), DisclosureState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_escape_and_enter_toggle_overlay() {
    let mut popover = popover_with_latency(0);
    type_text(&mut popover, "test");
    wait(500).await;

    let field = FieldState::caret_at_end("test");
    let response = popover.handle_key(&KeyEvent::new(Key::Escape), &field);
    assert!(response.handled);
    assert!(!popover.is_open());

    let response = popover.handle_key(&KeyEvent::new(Key::Enter), &field);
    assert!(!response.handled);
    assert!(popover.is_open());

    let response = popover.handle_key(&KeyEvent::new(Key::Up), &field);
    assert!(response.handled);
    assert!(!popover.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_list_events_route_focus_and_activation() {
    let mut popover = popover_with_latency(0);
    type_text(&mut popover, "test");
    wait(500).await;

    let outcome = popover.handle_list_event(ListEvent::Escape);
    assert_eq!(outcome.response.focus, Some(FocusTarget::Input));
    assert!(outcome.activated.is_none());
    assert!(popover.is_open());

    let outcome = popover.handle_list_event(ListEvent::Activate(1));
    assert_eq!(outcome.activated.unwrap().document.title, "Release notes");
    assert!(!popover.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_no_matches_shows_empty_view() {
    let mut popover = popover_with_latency(0);
    type_text(&mut popover, "zebra");
    wait(500).await;

    let props = popover.list_props();
    assert!(props.show_empty());
    assert_eq!(props.empty_message, "No results for zebra");
    assert!(!popover.controller().has_results());
}

#[tokio::test(start_paused = true)]
async fn test_whitespace_only_input_never_opens() {
    let mut popover = popover_with_latency(0);
    popover.handle_input("   ");
    wait(500).await;

    assert_eq!(popover.state(), DisclosureState::Closed);
    assert_eq!(popover.controller().snapshot().seq, 1);
    assert!(popover.list_props().options.query.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_list_shows_loading_for_new_settled_query() {
    let mut popover = popover_with_latency(300);
    type_text(&mut popover, "test");
    wait(800).await;
    assert_eq!(popover.list_props().items.len(), 2);

    popover.handle_input("testing");
    wait(450).await;
    let props = popover.list_props();
    assert_eq!(props.options.query, "testing");
    assert_eq!(props.highlight, "testing");
    assert!(props.items.is_empty());
    assert!(props.show_loading());
    assert!(!props.show_empty());

    // Nothing to focus until the new results arrive
    popover.handle_key(&KeyEvent::new(Key::Escape), &FieldState::caret_at_end("testing"));
    let response =
        popover.handle_key(&KeyEvent::new(Key::Down), &FieldState::caret_at_end("testing"));
    assert_eq!(response.focus, None);

    wait(300).await;
    let props = popover.list_props();
    assert_eq!(props.items.len(), 1);
    assert_eq!(props.items[0].document.title, "Testing guide");
    assert_eq!(props.options.query, "testing");
}
