//! HTTP gateway over the composed resource store

use crate::fs_store::FsStore;
use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chronoscope_core::{
    ChronoscopeConfig, Conditions, Error, RepresentationPreferences, ResourceIdentifier,
    ResourceStore,
};
use chronoscope_query::{IndexRepresentationStore, TemporalStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub struct GatewayState {
    pub store: Arc<dyn ResourceStore>,
    pub base_url: String,
}

/// `IndexRepresentationStore(TemporalStore(FsStore))`, with the index layer
/// left out when disabled.
pub fn build_store(config: &ChronoscopeConfig) -> chronoscope_core::Result<Arc<dyn ResourceStore>> {
    let files: Arc<dyn ResourceStore> = Arc::new(FsStore::new(&config.server.root, config.base_url()));
    let temporal: Arc<dyn ResourceStore> = Arc::new(TemporalStore::new(files, config.temporal.clone()));
    if !config.index.enabled {
        return Ok(temporal);
    }
    Ok(Arc::new(IndexRepresentationStore::from_config(temporal, &config.index)?))
}

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .fallback(resource_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_gateway(config: ChronoscopeConfig) -> anyhow::Result<()> {
    let store = build_store(&config)?;
    let state = Arc::new(GatewayState {
        store,
        base_url: config.base_url(),
    });
    let bind_addr: SocketAddr = config.bind_addr().parse()?;

    info!("Chronoscope Gateway v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  Root:         {}", config.server.root.display());
    info!("  Base URL:     {}", state.base_url);
    info!("  Max members:  {}", config.temporal.max_members);
    if config.index.enabled {
        info!("  Index:        {} for {}", config.index.name, config.index.media_range);
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn resource_handler(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET")],
            "read-only gateway",
        )
            .into_response();
    }

    let identifier = identifier_for(&state.base_url, &uri);
    let preferences = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(RepresentationPreferences::from_accept)
        .unwrap_or_default();
    let conditions = conditions_from(&headers);

    match state
        .store
        .get_representation(&identifier, &preferences, conditions.as_ref())
        .await
    {
        Ok(representation) => {
            let content_type = representation
                .metadata
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            (
                [(header::CONTENT_TYPE, content_type)],
                axum::body::Body::from_stream(representation.data),
            )
                .into_response()
        }
        Err(e) => error_response(&identifier, e),
    }
}

/// Identifier of the resource a request URI addresses.
pub fn identifier_for(base_url: &str, uri: &Uri) -> ResourceIdentifier {
    let path = uri.path().trim_start_matches('/');
    match uri.query() {
        Some(query) => ResourceIdentifier::new(format!("{}{}?{}", base_url, path, query)),
        None => ResourceIdentifier::new(format!("{}{}", base_url, path)),
    }
}

fn conditions_from(headers: &HeaderMap) -> Option<Conditions> {
    let list = |name: header::HeaderName| {
        headers.get(name).and_then(|v| v.to_str().ok()).map(|v| {
            v.split(',')
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect::<Vec<_>>()
        })
    };
    let conditions = Conditions {
        if_match: list(header::IF_MATCH),
        if_none_match: list(header::IF_NONE_MATCH),
    };
    (!conditions.is_empty()).then_some(conditions)
}

pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::MalformedQuery { .. } | Error::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
        Error::ParseFailure { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(identifier: &ResourceIdentifier, error: Error) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        warn!("{} failed: {}", identifier, error);
    }
    (status, error.to_string()).into_response()
}
