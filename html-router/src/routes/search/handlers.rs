use axum::{
    extract::{RawQuery, State},
    http::{header::CACHE_CONTROL, HeaderMap, HeaderValue},
    response::IntoResponse,
    Form,
};
use axum_htmx::{HX_PUSH_URL, HX_RESWAP, HX_RETARGET};
use common::search::{
    filters::page_target, FilterParams, MissingStatus, SearchController, SearchFilters,
    SearchResult, SearchStatus,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::form::{FormValues, SearchForm};
use crate::{
    html_state::HtmlState,
    middlewares::response_middleware::{HtmlError, TemplateResponse},
    utils::pagination::Pager,
};

/// Lets shared caches reuse the first render briefly while refreshing it.
pub const INITIAL_CACHE_CONTROL: &str = "public, s-maxage=10, stale-while-revalidate=59";

const PAGE_TEMPLATE: &str = "search/base.html";

/// Everything the search page templates render.
#[derive(Serialize)]
pub struct SearchPageData {
    form: FormValues,
    filters: SearchFilters,
    status: SearchStatus,
    results: Vec<SearchResult>,
    show_table: bool,
    show_empty: bool,
    pager: Pager,
    query_string: String,
    share_link: String,
    partial: bool,
}

impl SearchPageData {
    fn new(
        state: &HtmlState,
        headers: &HeaderMap,
        controller: &SearchController,
        partial: bool,
    ) -> Self {
        let filters = controller.filters().clone();
        let results = controller.results().to_vec();
        let status = controller.status().clone();
        let query_string = filters.to_query_string();
        let share_link = format!("{}/?{query_string}", state.share_origin(headers));

        Self {
            form: FormValues::from(&filters),
            pager: Pager::new(&filters, results.len(), state.next_page_policy()),
            show_table: !results.is_empty(),
            show_empty: status == SearchStatus::Success && results.is_empty(),
            filters,
            status,
            results,
            query_string,
            share_link,
            partial,
        }
    }
}

/// Server-rendered first load. The search runs before the page is produced
/// and backend failures only mean an empty table.
pub async fn search_page_handler(
    State(state): State<HtmlState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let filters = FilterParams::from_query_str(query.as_deref().unwrap_or_default())
        .into_filters(MissingStatus::Active);
    let controller = SearchController::initial_load(state.backend.as_ref(), filters).await;
    info!(
        results = controller.results().len(),
        page = controller.current_page(),
        "Rendered initial search page"
    );

    (
        [(CACHE_CONTROL, HeaderValue::from_static(INITIAL_CACHE_CONTROL))],
        TemplateResponse::new_template(
            PAGE_TEMPLATE,
            SearchPageData::new(&state, &headers, &controller, false),
        ),
    )
}

/// Form submission: new filters, always starting from page 1.
pub async fn submit_search_handler(
    State(state): State<HtmlState>,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> Result<impl IntoResponse, HtmlError> {
    let filters = form.into_filters()?;
    let mut controller = SearchController::new(filters.clone());
    let completion = controller.search(state.backend.as_ref(), filters).await;
    debug!(?completion, status = ?controller.status(), "Search action finished");

    Ok(results_response(&state, &headers, &controller))
}

/// Pager click: the current filters with only the page changed. Without a
/// usable target the current page is fetched again.
pub async fn change_page_handler(
    State(state): State<HtmlState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let query = query.unwrap_or_default();
    let filters = FilterParams::from_query_str(&query).into_filters(MissingStatus::Unfiltered);
    let page = page_target(&query).unwrap_or(filters.page);
    let mut controller = SearchController::new(filters);
    let completion = controller.change_page(state.backend.as_ref(), page).await;
    debug!(?completion, page, status = ?controller.status(), "Page change finished");

    results_response(&state, &headers, &controller)
}

/// Renders the outcome of a user action as an htmx fragment and mirrors the
/// filters into the address bar.
///
/// A failed request only replaces the status line, so the table from the
/// previous request stays on screen. The pager under it is swapped out of
/// band so its links follow the filters now in the address bar.
fn results_response(
    state: &HtmlState,
    headers: &HeaderMap,
    controller: &SearchController,
) -> impl IntoResponse {
    let data = SearchPageData::new(state, headers, controller, true);
    let push_url = format!("/?{}", data.query_string);
    let mut response_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&push_url) {
        response_headers.insert(HX_PUSH_URL, value);
    }

    if let SearchStatus::Error(message) = controller.status() {
        warn!(%message, "Showing search error");
        response_headers.insert(HX_RETARGET, HeaderValue::from_static("#search-status"));
        response_headers.insert(HX_RESWAP, HeaderValue::from_static("innerHTML"));
        return (
            response_headers,
            TemplateResponse::new_partial(PAGE_TEMPLATE, "status_section", data),
        );
    }

    (
        response_headers,
        TemplateResponse::new_partial(PAGE_TEMPLATE, "results_section", data),
    )
}
