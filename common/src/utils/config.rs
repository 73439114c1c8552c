use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

/// Decides when the pager's "Next" control is offered.
#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NextPagePolicy {
    /// Always offer the next page, the API decides whether it is empty.
    #[default]
    Unbounded,
    /// Stop once a response held fewer buckets than the requested page size.
    ShortPage,
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_search_api_url")]
    pub search_api_url: String,
    /// Origin used for shareable links. Derived from the `Host` header when unset.
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,
    #[serde(default)]
    pub next_page_policy: NextPagePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            search_api_url: default_search_api_url(),
            public_base_url: None,
            search_timeout_secs: default_search_timeout_secs(),
            next_page_policy: NextPagePolicy::default(),
        }
    }
}

const fn default_http_port() -> u16 {
    3000
}

fn default_search_api_url() -> String {
    "https://vit-tm-task.api.trademarkia.app/api/v3/us".to_string()
}

const fn default_search_timeout_secs() -> u64 {
    30
}

pub fn get_config() -> Result<AppConfig, AppError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    Ok(config.try_deserialize()?)
}
