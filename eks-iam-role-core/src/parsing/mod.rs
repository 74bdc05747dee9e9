//! Policy document parsing and canonicalization (pure Rust)

pub mod document;

pub use document::{canonicalize, decode_document, parse_policy_document};
