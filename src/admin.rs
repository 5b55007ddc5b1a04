//! Admin HTTP API
//!
//! Optional plain-HTTP side channel exposing health and cache statistics.
//!
//! # Endpoints
//! - `GET /health` - Health check
//! - `GET /stats` - Cache statistics

use axum::{extract::State, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use crate::api::AppState;
use crate::models::{HealthResponse, StatsResponse};

/// Creates the admin router.
pub fn create_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.lock().await;
    Json(StatsResponse::new(&cache.stats(), cache.max_size()))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.config.upstream_url.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CachedValue;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn create_test_state() -> AppState {
        let config = Config::new("https://blog.test", "Test Blog").unwrap();
        AppState::from_config(config).unwrap()
    }

    async fn body_to_json(body: Body) -> Value {
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_admin_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["upstream"], "https://blog.test");
    }

    #[tokio::test]
    async fn test_stats_endpoint_reflects_cache() {
        let state = create_test_state();
        {
            let mut cache = state.cache.lock().await;
            cache.set("post:a", CachedValue::Gemtext("a".to_string()));
            cache.get("post:a", std::time::Duration::from_secs(60));
            cache.get("post:b", std::time::Duration::from_secs(60));
        }
        let app = create_admin_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 1);
        assert_eq!(json["total_entries"], 1);
        assert_eq!(json["max_size"], 1000);
    }

    #[tokio::test]
    async fn test_unknown_admin_path() {
        let app = create_admin_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
