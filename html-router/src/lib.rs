pub mod html_state;
pub mod middlewares;
pub mod router_factory;
pub mod routes;
pub mod utils;

use axum::{extract::FromRef, Router};
use html_state::HtmlState;
use router_factory::RouterFactory;

/// Html routes
pub fn html_routes<S>(app_state: &HtmlState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    RouterFactory::new(app_state)
        .add_public_routes(routes::search::router())
        .with_public_assets("/assets", "assets/")
        .with_compression()
        .build()
}
