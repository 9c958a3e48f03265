//! Typeahead Popover - the interaction layer of the typeahead control
//!
//! This crate provides:
//! - `KeyEvent` / `FieldState`: what the host text field reports
//! - `Disclosure`: overlay visibility and focus routing
//! - `SearchPopover`: wires keystrokes into the search controller and the
//!   disclosure machine, and builds props for the result list

pub mod disclosure;
pub mod keys;
pub mod popover;

pub use disclosure::*;
pub use keys::*;
pub use popover::*;
