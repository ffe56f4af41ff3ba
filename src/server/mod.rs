//! Development server for the `/template-features` REST surface.
//!
//! Keeps records in memory. Used by the `feature-server` binary and by the
//! HTTP client's end-to-end tests.

mod store;

pub use store::MemoryStore;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{FeatureRequest, FeatureResponse};
use crate::remote::DEFAULT_SEARCH_LIMIT;

/// State shared across handlers.
#[derive(Clone, Default)]
pub struct ServerState {
    store: Arc<MemoryStore>,
    api_key: Option<Arc<str>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a pre-populated record set.
    pub fn with_features(features: Vec<FeatureResponse>) -> Self {
        Self {
            store: Arc::new(MemoryStore::with_features(features)),
            api_key: None,
        }
    }

    /// Requires `Authorization: Bearer <key>` on every feature route.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Arc::from(api_key.into()));
        self
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

fn error_response(status: StatusCode, error: &'static str, message: String) -> Response {
    (status, Json(ErrorBody { error, message })).into_response()
}

fn not_found(id: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("No feature with id {}", id),
    )
}

/// Authentication middleware, a no-op when no key is configured
async fn auth_middleware(State(state): State<ServerState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let api_key = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        Some(_) => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "invalid_auth",
                "Authorization header must use Bearer scheme".to_string(),
            );
        }
        None => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Authorization header required".to_string(),
            );
        }
    };

    if api_key != expected {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "invalid_key",
            "Invalid API key".to_string(),
        );
    }
    next.run(request).await
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct ListParams {
    active: Option<bool>,
}

async fn list_features(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<FeatureResponse>> {
    Json(state.store.list(params.active))
}

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT as usize
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

async fn search_features(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<FeatureResponse>> {
    Json(state.store.search(&params.q, params.limit))
}

async fn get_feature(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    match state.store.get(&id) {
        Some(feature) => Json(feature).into_response(),
        None => not_found(&id),
    }
}

async fn create_feature(
    State(state): State<ServerState>,
    Json(request): Json<FeatureRequest>,
) -> Response {
    let created = state.store.create(request);
    tracing::info!(id = %created.id, "created feature");
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_feature(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(request): Json<FeatureRequest>,
) -> Response {
    match state.store.update(&id, request) {
        Some(updated) => Json(updated).into_response(),
        None => not_found(&id),
    }
}

async fn delete_feature(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    if state.store.delete(&id) {
        tracing::info!(%id, "deleted feature");
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(&id)
    }
}

/// Builds the application router.
pub fn router(state: ServerState) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new().route("/health", get(health));

    let feature_routes = Router::new()
        .route(
            "/template-features",
            get(list_features).post(create_feature),
        )
        .route("/template-features/search", get(search_features))
        .route(
            "/template-features/{id}",
            get(get_feature).put(update_feature).delete(delete_feature),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(feature_routes)
        .with_state(state)
}
