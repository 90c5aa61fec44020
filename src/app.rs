use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::error::ApiError;
use crate::state::AppState;
use crate::{auth, favorites};

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state);
    Router::new()
        .route("/", get(index))
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(favorites::router())
                .route("/health", get(health)),
        )
        .fallback(route_not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

fn cors_layer(state: &AppState) -> CorsLayer {
    match &state.config.cors_allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}

/// Liveness plus a round trip through the pool.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query_scalar::<_, OffsetDateTime>("SELECT now()")
        .fetch_one(&state.db)
        .await
    {
        Ok(now) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Server is running",
                "database": "Connected",
                "timestamp": now.format(&Rfc3339).unwrap_or_default(),
            })),
        ),
        Err(e) => {
            error!(error = %e, "health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Database connection error",
                })),
            )
        }
    }
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Album Finder API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /api/health",
            "register": "POST /api/auth/register",
            "login": "POST /api/auth/login",
            "profile": "GET /api/auth/profile",
            "favorites": "GET /api/favorites",
            "addFavorite": "POST /api/favorites",
            "removeFavorite": "DELETE /api/favorites/:albumId"
        }
    }))
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
