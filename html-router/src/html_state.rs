use axum::http::{header::HOST, HeaderMap};
use common::create_template_engine;
use common::search::SearchBackend;
use common::utils::config::{AppConfig, NextPagePolicy};
use common::utils::template_engine::{ProvidesTemplateEngine, TemplateEngine};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct HtmlState {
    pub backend: Arc<dyn SearchBackend>,
    pub templates: Arc<TemplateEngine>,
    pub config: AppConfig,
}

impl HtmlState {
    pub fn new_with_resources(
        backend: Arc<dyn SearchBackend>,
        config: AppConfig,
        template_engine: Option<Arc<TemplateEngine>>,
    ) -> Self {
        let templates =
            template_engine.unwrap_or_else(|| Arc::new(create_template_engine!("templates")));
        debug!("Template engine configured for html_router.");

        Self {
            backend,
            templates,
            config,
        }
    }

    pub const fn next_page_policy(&self) -> NextPagePolicy {
        self.config.next_page_policy
    }

    /// Origin used to build shareable links, e.g. `https://tm.example.com`.
    pub fn share_origin(&self, headers: &HeaderMap) -> String {
        if let Some(base) = self.config.public_base_url.as_deref() {
            return base.trim_end_matches('/').to_string();
        }
        headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .map_or_else(
                || format!("http://localhost:{}", self.config.http_port),
                |host| format!("http://{host}"),
            )
    }
}

impl ProvidesTemplateEngine for HtmlState {
    fn template_engine(&self) -> &Arc<TemplateEngine> {
        &self.templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use common::{
        error::AppError,
        search::{SearchFilters, SearchResult},
    };

    struct NoBackend;

    #[async_trait]
    impl SearchBackend for NoBackend {
        async fn search(&self, _: &SearchFilters) -> Result<Vec<SearchResult>, AppError> {
            Ok(Vec::new())
        }
    }

    fn state(public_base_url: Option<&str>) -> HtmlState {
        let config = AppConfig {
            public_base_url: public_base_url.map(str::to_string),
            ..AppConfig::default()
        };
        HtmlState::new_with_resources(Arc::new(NoBackend), config, None)
    }

    #[test]
    fn configured_base_url_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("internal:3000"));

        let origin = state(Some("https://tm.example.com/")).share_origin(&headers);
        assert_eq!(origin, "https://tm.example.com");
    }

    #[test]
    fn falls_back_to_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("search.local:8080"));

        assert_eq!(state(None).share_origin(&headers), "http://search.local:8080");
        assert_eq!(
            state(None).share_origin(&HeaderMap::new()),
            "http://localhost:3000"
        );
    }
}
