use std::sync::Arc;

use api_router::api_routes_v1;
use axum::Router;
use common::{search::HttpSearchClient, utils::config::get_config};
use html_router::{html_routes, html_state::HtmlState};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    let search_client = HttpSearchClient::from_config(&config)?;
    info!(
        endpoint = %search_client.endpoint(),
        timeout_secs = config.search_timeout_secs,
        next_page_policy = ?config.next_page_policy,
        "Search API client initialized"
    );

    let html_state = HtmlState::new_with_resources(Arc::new(search_client), config.clone(), None);
    let app = app(html_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(html_state: HtmlState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes_v1())
        .merge(html_routes(&html_state))
        .with_state(html_state)
}
