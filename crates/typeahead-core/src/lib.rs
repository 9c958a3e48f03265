//! Typeahead Core - Core types for the typeahead search control
//!
//! This crate defines the data model shared by the search pipeline and the
//! popover:
//! - `ShareId` / `DocumentId`: identifiers for search scopes and documents
//! - `SearchOptions` / `SearchRequest`: what gets sent to a search backend
//! - `ResultEntry`: one matched document plus its context snippet
//! - `SearchConfig`: debounce window and page size

pub mod config;
pub mod document;
pub mod error;
pub mod ids;
pub mod query;

pub use config::*;
pub use document::*;
pub use error::*;
pub use ids::*;
pub use query::*;
