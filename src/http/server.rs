//! # HTTP Server
//!
//! Axum router exposing the charity query endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderValue,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ServerConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::params;
use crate::query::QueryNormalizer;
use crate::store::DocumentStore;

use super::errors::{ApiError, ApiResult};
use super::response::CharitiesResponse;

/// State shared by all requests
pub struct AppState<S: DocumentStore> {
    pub normalizer: QueryNormalizer,
    pub store: S,
}

type SharedState<S> = Arc<AppState<S>>;

/// HTTP server for the query API
pub struct ApiServer<S: DocumentStore> {
    config: ServerConfig,
    state: SharedState<S>,
}

impl<S> ApiServer<S>
where
    S: DocumentStore + 'static,
    ApiError: From<S::Error>,
{
    pub fn new(config: ServerConfig, normalizer: QueryNormalizer, store: S) -> Self {
        Self {
            config,
            state: Arc::new(AppState { normalizer, store }),
        }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/:version/charities", get(list_charities::<S>))
            .with_state(self.state.clone())
            .layer(ServiceBuilder::new().layer(cors_layer(&self.config)))
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> std::io::Result<()> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{}", e))
        })?;

        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?.to_string();
        let version = self.state.normalizer.config().version.clone();
        log_event_with_fields(
            Event::ServerStart,
            &[("addr", bound.as_str()), ("version", version.as_str())],
        );

        axum::serve(listener, self.router()).await
    }
}

/// Any origin when none are configured, the configured list otherwise
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /api/:version/charities`
async fn list_charities<S>(
    State(state): State<SharedState<S>>,
    Path(version): Path<String>,
    Query(raw): Query<Vec<(String, String)>>,
) -> ApiResult<Json<CharitiesResponse>>
where
    S: DocumentStore + 'static,
    ApiError: From<S::Error>,
{
    let latest = &state.normalizer.config().version;
    if &version != latest {
        log_event_with_fields(
            Event::VersionRejected,
            &[("latest", latest.as_str()), ("requested", version.as_str())],
        );
        return Err(ApiError::UnsupportedVersion {
            requested: version,
            latest: latest.clone(),
        });
    }

    let outcome = state.normalizer.normalize_and_execute(
        &state.store,
        &raw,
        params::search_term(&raw),
        params::wants_count(&raw),
    )?;

    Ok(Json(CharitiesResponse::new(latest.clone(), outcome)))
}
