//! Typeahead Search - the query-to-results pipeline
//!
//! This crate provides:
//! - `SearchBackend`: the contract for the remote search API
//! - `MemoryBackend`: an in-process backend over a document corpus
//! - `Debouncer`: a last-call-wins timer primitive
//! - `SearchController`: settles queries, dispatches requests and discards
//!   superseded responses

pub mod backend;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod memory;

pub use backend::*;
pub use controller::*;
pub use debounce::*;
pub use error::*;
pub use memory::*;
