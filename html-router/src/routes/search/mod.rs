mod form;
mod handlers;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
pub use form::{FormValues, SearchForm, StatusChoice};
pub use handlers::{
    change_page_handler, search_page_handler, submit_search_handler, SearchPageData,
    INITIAL_CACHE_CONTROL,
};

use crate::html_state::HtmlState;

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    Router::new()
        .route("/", get(search_page_handler))
        .route("/search", post(submit_search_handler))
        .route("/page", get(change_page_handler))
}
