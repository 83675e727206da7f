//! Search layer facade.
//!
//! - **[`client`]**: MediaWiki full-text search and opensearch suggestions,
//!   behind the [`client::SearchBackend`] seam.

pub mod client;

pub use client::{SearchBackend, SearchError, WikiClient};
