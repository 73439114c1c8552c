use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    search::{client::SearchBackend, filters::SearchFilters, result::SearchResult},
};

pub const SEARCH_ERROR_MESSAGE: &str = "An error occurred while searching. Please try again.";
pub const PAGE_ERROR_MESSAGE: &str =
    "An error occurred while fetching results. Please try again.";

/// Lifecycle of the request currently driving the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum SearchStatus {
    Idle,
    Loading,
    Success,
    Error(String),
}

impl SearchStatus {
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Search,
    PageChange,
}

/// An issued request. Hand it back to [`SearchController::complete`] together
/// with the backend's answer.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    seq: u64,
    kind: RequestKind,
    filters: SearchFilters,
}

impl RequestTicket {
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// The exact payload to send.
    pub const fn filters(&self) -> &SearchFilters {
        &self.filters
    }
}

/// Whether a finished request was applied to the controller.
///
/// Tickets only order requests issued through the same controller; callers
/// that share one controller across overlapping requests rely on this to
/// drop superseded answers.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request was issued after this one; its answer was dropped.
    Stale,
}

/// Owns the filters, the result list and the status of one search page.
#[derive(Debug, Clone)]
pub struct SearchController {
    filters: SearchFilters,
    results: Vec<SearchResult>,
    status: SearchStatus,
    last_issued: u64,
}

impl SearchController {
    pub fn new(filters: SearchFilters) -> Self {
        Self {
            filters,
            results: Vec::new(),
            status: SearchStatus::Idle,
            last_issued: 0,
        }
    }

    /// Seeds a controller from an already finished request, as done for the
    /// server-rendered first load.
    pub fn with_results(filters: SearchFilters, results: Vec<SearchResult>) -> Self {
        Self {
            results,
            ..Self::new(filters)
        }
    }

    /// First load of the page. Backend failures degrade to an empty list and
    /// the status stays `Idle`.
    pub async fn initial_load(backend: &dyn SearchBackend, filters: SearchFilters) -> Self {
        let results = match backend.search(&filters).await {
            Ok(results) => results,
            Err(err) => {
                warn!(error = %err, "Initial search failed, rendering without results");
                Vec::new()
            }
        };
        Self::with_results(filters, results)
    }

    pub const fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub const fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub const fn current_page(&self) -> u32 {
        self.filters.page
    }

    /// Replaces the filters with a fresh submission and issues a page-1 request.
    pub fn begin_search(&mut self, filters: SearchFilters) -> RequestTicket {
        self.filters = filters.with_page(1);
        self.issue(RequestKind::Search, self.filters.clone())
    }

    /// Issues a request identical to the current filters except for `page`.
    pub fn begin_page_change(&mut self, page: u32) -> RequestTicket {
        let filters = self.filters.with_page(page);
        self.issue(RequestKind::PageChange, filters)
    }

    fn issue(&mut self, kind: RequestKind, filters: SearchFilters) -> RequestTicket {
        self.last_issued = self.last_issued.wrapping_add(1);
        self.status = SearchStatus::Loading;
        debug!(seq = self.last_issued, ?kind, page = filters.page, "Issuing search request");
        RequestTicket {
            seq: self.last_issued,
            kind,
            filters,
        }
    }

    /// Applies a finished request, unless a newer one has been issued since.
    ///
    /// On failure the previous result list is kept.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<Vec<SearchResult>, AppError>,
    ) -> Completion {
        if ticket.seq != self.last_issued {
            debug!(
                seq = ticket.seq,
                latest = self.last_issued,
                "Discarding superseded search response"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(results) => {
                info!(count = results.len(), page = ticket.filters.page, "Search succeeded");
                if ticket.kind == RequestKind::PageChange {
                    self.filters.page = ticket.filters.page;
                }
                self.results = results;
                self.status = SearchStatus::Success;
            }
            Err(err) => {
                warn!(error = %err, kind = ?ticket.kind, "Search request failed");
                let message = match ticket.kind {
                    RequestKind::Search => SEARCH_ERROR_MESSAGE,
                    RequestKind::PageChange => PAGE_ERROR_MESSAGE,
                };
                self.status = SearchStatus::Error(message.to_string());
            }
        }
        Completion::Applied
    }

    /// Runs a user-triggered search to completion.
    pub async fn search(
        &mut self,
        backend: &dyn SearchBackend,
        filters: SearchFilters,
    ) -> Completion {
        let ticket = self.begin_search(filters);
        let outcome = backend.search(ticket.filters()).await;
        self.complete(ticket, outcome)
    }

    /// Fetches another page of the current filters.
    pub async fn change_page(&mut self, backend: &dyn SearchBackend, page: u32) -> Completion {
        let ticket = self.begin_page_change(page);
        let outcome = backend.search(ticket.filters()).await;
        self.complete(ticket, outcome)
    }
}
