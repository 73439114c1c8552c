//! Attorney search: the filter record, the API client and the page controller.

pub mod client;
pub mod controller;
pub mod filters;
pub mod result;

pub use client::{HttpSearchClient, SearchBackend};
pub use controller::{Completion, SearchController, SearchStatus};
pub use filters::{FilterParams, MissingStatus, SearchFilters};
pub use result::SearchResult;
