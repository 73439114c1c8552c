use axum::{routing::get, Router};
use routes::liveness::live;

mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // Unauthenticated probe for k8s/systemd
    Router::new().route("/live", get(live))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn liveness_probe_answers_ok() {
        let app: Router = Router::new().nest("/api/v1", api_routes_v1());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/live")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json, serde_json::json!({ "status": "ok" }));
    }
}
