use std::net::SocketAddr;
use std::path::Path;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::{AppConfig, StorageConfig};
use crate::images::services::POST_IMAGE_PREFIX;
use crate::state::AppState;
use crate::{auth, posts};

pub fn build_app(state: AppState) -> Router {
    let mut router = Router::new()
        .nest("/users", auth::router())
        .nest("/posts", posts::router())
        .route("/health", get(|| async { "ok" }));

    if let StorageConfig::Local { upload_dir } = &state.config.storage {
        let dir = Path::new(upload_dir).join(POST_IMAGE_PREFIX);
        router = router.nest_service(&format!("/{POST_IMAGE_PREFIX}"), ServeDir::new(dir));
    }

    router
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use super::build_app;
    use crate::state::AppState;

    #[tokio::test]
    async fn health_is_ok() {
        let resp = build_app(AppState::fake())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let resp = build_app(AppState::fake())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
