use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Extension,
};
use axum_htmx::{HxRequest, HX_TRIGGER};
use common::{
    error::AppError,
    utils::template_engine::{ProvidesTemplateEngine, Value},
};
use minijinja::context;
use serde::Serialize;
use serde_json::json;
use tracing::error;

#[derive(Clone, Debug)]
pub enum TemplateKind {
    Full(String),
    Partial(String, String),
    Error(StatusCode),
}

/// Handler output rendered by [`with_template_response`].
#[derive(Clone)]
pub struct TemplateResponse {
    template_kind: TemplateKind,
    context: Value,
}

impl TemplateResponse {
    pub fn new_template<T: Serialize>(name: impl Into<String>, context: T) -> Self {
        Self {
            template_kind: TemplateKind::Full(name.into()),
            context: Value::from_serialize(&context),
        }
    }

    pub fn new_partial<T: Serialize>(
        template: impl Into<String>,
        block: impl Into<String>,
        context: T,
    ) -> Self {
        Self {
            template_kind: TemplateKind::Partial(template.into(), block.into()),
            context: Value::from_serialize(&context),
        }
    }

    pub fn error(status: StatusCode, title: &str, description: &str) -> Self {
        let ctx = context! {
            status_code => status.as_u16(),
            title => title,
            description => description
        };
        Self {
            template_kind: TemplateKind::Error(status),
            context: ctx,
        }
    }

    pub fn server_error() -> Self {
        Self::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Something went wrong on our end.",
        )
    }

    pub fn bad_request(message: &str) -> Self {
        Self::error(StatusCode::BAD_REQUEST, "Bad Request", message)
    }
}

impl IntoResponse for TemplateResponse {
    fn into_response(self) -> Response {
        Extension(self).into_response()
    }
}

#[derive(Serialize)]
struct ContextWrapper {
    is_htmx: bool,
    #[serde(flatten)]
    context: HashMap<String, Value>,
}

fn context_to_map(value: &Value) -> Result<HashMap<String, Value>, minijinja::value::ValueKind> {
    match value.kind() {
        minijinja::value::ValueKind::Map => {
            let mut map = HashMap::new();
            if let Ok(keys) = value.try_iter() {
                for key in keys {
                    if let Ok(val) = value.get_item(&key) {
                        map.insert(key.to_string(), val);
                    }
                }
            }
            Ok(map)
        }
        minijinja::value::ValueKind::None | minijinja::value::ValueKind::Undefined => {
            Ok(HashMap::new())
        }
        other => Err(other),
    }
}

/// Copies handler-set headers (cache directives, htmx response headers) onto
/// the rendered response. The body headers belong to the rendered HTML.
fn forward_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        to.insert(name.clone(), value.clone());
    }
}

fn rendered(result: Result<String, minijinja::Error>, what: &str, from: &HeaderMap) -> Response {
    match result {
        Ok(html) => {
            let mut final_response = Html(html).into_response();
            forward_headers(from, final_response.headers_mut());
            final_response
        }
        Err(e) => {
            error!("Failed to render {}: {:?}", what, e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_error())).into_response()
        }
    }
}

pub async fn with_template_response<S>(
    State(state): State<S>,
    HxRequest(is_htmx): HxRequest,
    req: Request,
    next: Next,
) -> Response
where
    S: ProvidesTemplateEngine + Clone + Send + Sync + 'static,
{
    let mut response = next.run(req).await;

    let Some(template_response) = response.extensions_mut().remove::<TemplateResponse>() else {
        return response;
    };
    let template_engine = state.template_engine();

    let context_map = match context_to_map(&template_response.context) {
        Ok(map) => map,
        Err(kind) => {
            error!(
                "Template context must be a map or unit, got kind={:?} for template_kind={:?}",
                kind, template_response.template_kind
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_error())).into_response();
        }
    };
    let context = Value::from_serialize(&ContextWrapper {
        is_htmx,
        context: context_map,
    });

    match &template_response.template_kind {
        TemplateKind::Full(name) => rendered(
            template_engine.render(name, &context),
            &format!("template '{name}'"),
            response.headers(),
        ),
        TemplateKind::Partial(template, block) => rendered(
            template_engine.render_block(template, block, &context),
            &format!("block '{template}/{block}'"),
            response.headers(),
        ),
        TemplateKind::Error(status) => {
            if is_htmx {
                // htmx swaps nothing on 204; the page shows the toast instead
                let title = template_response
                    .context
                    .get_attr("title")
                    .ok()
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_else(|| "Error".to_string());
                let description = template_response
                    .context
                    .get_attr("description")
                    .ok()
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_else(|| "An error occurred.".to_string());

                let trigger_payload = json!({"toast": {"title": title, "description": description, "type": "error"}});
                let trigger_value = serde_json::to_string(&trigger_payload).unwrap_or_else(|e| {
                    error!("Failed to serialize HX-Trigger payload: {}", e);
                    r#"{"toast":{"title":"Error","description":"An unexpected error occurred.", "type":"error"}}"#
                        .to_string()
                });
                (StatusCode::NO_CONTENT, [(HX_TRIGGER, trigger_value)], "").into_response()
            } else {
                match template_engine.render("errors/error.html", &context) {
                    Ok(html) => (*status, Html(html)).into_response(),
                    Err(e) => {
                        error!("Critical: Failed to render 'errors/error.html': {:?}", e);
                        (*status, Html(fallback_error())).into_response()
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum HtmlError {
    AppError(AppError),
    TemplateError(String),
}

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        Self::AppError(err)
    }
}

impl From<minijinja::Error> for HtmlError {
    fn from(err: minijinja::Error) -> Self {
        Self::TemplateError(err.to_string())
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        match self {
            Self::AppError(err) => match err {
                AppError::Validation(msg) => TemplateResponse::bad_request(&msg).into_response(),
                _ => {
                    error!("Internal error: {:?}", err);
                    TemplateResponse::server_error().into_response()
                }
            },
            Self::TemplateError(err) => {
                error!("Template error: {}", err);
                TemplateResponse::server_error().into_response()
            }
        }
    }
}

fn fallback_error() -> String {
    r#"
    <html>
        <body>
            <main class="page">
                <h1>Error</h1>
                <p>Sorry, something went wrong displaying this page.</p>
            </main>
        </body>
    </html>
    "#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_become_bad_requests() {
        let response = HtmlError::from(AppError::Validation("unknown status".into())).into_response();
        let template = response
            .extensions()
            .get::<TemplateResponse>()
            .expect("template extension");
        assert!(matches!(
            template.template_kind,
            TemplateKind::Error(status) if status == StatusCode::BAD_REQUEST
        ));
    }

    #[test]
    fn upstream_errors_become_server_errors() {
        let response = HtmlError::from(AppError::UpstreamPayload("bad".into())).into_response();
        let template = response
            .extensions()
            .get::<TemplateResponse>()
            .expect("template extension");
        assert!(matches!(
            template.template_kind,
            TemplateKind::Error(status) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[test]
    fn forwards_everything_but_body_headers() {
        let mut from = HeaderMap::new();
        from.insert(header::CACHE_CONTROL, "public, s-maxage=10".parse().expect("value"));
        from.insert(header::CONTENT_TYPE, "text/plain".parse().expect("value"));
        let mut to = HeaderMap::new();
        to.insert(header::CONTENT_TYPE, "text/html".parse().expect("value"));

        forward_headers(&from, &mut to);

        assert_eq!(to[header::CACHE_CONTROL], "public, s-maxage=10");
        assert_eq!(to[header::CONTENT_TYPE], "text/html");
    }

    #[test]
    fn rejects_non_map_context() {
        assert!(context_to_map(&Value::from(3)).is_err());
        assert!(context_to_map(&Value::from(())).expect("unit is empty").is_empty());
    }
}
