//! HTTP façade: one route per upstream, dispatching on the `resource` parameter

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::info;

use crate::error::{ErrorBody, ProxyError, ProxyResult};
use crate::game_finder::GameFinder;
use crate::models::{FilterSpec, SampleOutcome};

/// Catalog data changes rarely; let shared caches keep it and refresh in the background
pub const CATALOG_CACHE_CONTROL: &str =
    "public, max-age=0, s-maxage=86400, stale-while-revalidate=604800";
/// Random picks must never be served from a cache
pub const NO_STORE: &str = "no-store, max-age=0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    GiantBomb,
    Rawg,
}

/// A configured upstream, or the name of the setting it is missing
#[derive(Clone)]
pub enum UpstreamSlot {
    Ready(Arc<GameFinder>),
    Unconfigured(&'static str),
}

impl UpstreamSlot {
    pub fn from_result(result: ProxyResult<GameFinder>) -> Self {
        match result {
            Ok(finder) => Self::Ready(Arc::new(finder)),
            Err(ProxyError::ConfigMissing(key)) => Self::Unconfigured(key),
            Err(_) => Self::Unconfigured("upstream client"),
        }
    }

    fn finder(&self) -> ProxyResult<&GameFinder> {
        match self {
            Self::Ready(finder) => Ok(finder.as_ref()),
            Self::Unconfigured(key) => Err(ProxyError::ConfigMissing(*key)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub giantbomb: UpstreamSlot,
    pub rawg: UpstreamSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Filters,
    Game,
    Genres,
    Platforms,
    RandomGame,
}

impl Resource {
    /// Resources each upstream endpoint accepts
    pub fn parse(upstream: UpstreamKind, raw: Option<&str>) -> ProxyResult<Self> {
        let raw = raw.map(str::trim).unwrap_or_default();
        let resource = match (upstream, raw) {
            (UpstreamKind::GiantBomb, "filters") => Self::Filters,
            (UpstreamKind::GiantBomb, "game") => Self::Game,
            (UpstreamKind::Rawg, "genres") => Self::Genres,
            (UpstreamKind::Rawg, "platforms") => Self::Platforms,
            (UpstreamKind::Rawg, "random-game") => Self::RandomGame,
            _ => return Err(ProxyError::InvalidResource(raw.to_string())),
        };
        Ok(resource)
    }

    pub fn cache_control(self) -> &'static str {
        match self {
            Self::Filters | Self::Genres | Self::Platforms => CATALOG_CACHE_CONTROL,
            Self::Game | Self::RandomGame => NO_STORE,
        }
    }
}

fn outcome_response(outcome: SampleOutcome) -> Response {
    match outcome {
        SampleOutcome::Found(detail) => Json(detail).into_response(),
        SampleOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("No games match the selected filters")),
        )
            .into_response(),
        SampleOutcome::ExhaustedRetries { attempts } => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new(format!(
                "Could not find a valid game after {attempts} attempts"
            ))),
        )
            .into_response(),
    }
}

async fn dispatch(
    resource: Resource,
    slot: &UpstreamSlot,
    params: &HashMap<String, String>,
) -> ProxyResult<Response> {
    let finder = slot.finder()?;

    let response = match resource {
        Resource::Filters => Json(finder.filters().await?).into_response(),
        Resource::Genres => Json(finder.genres()).into_response(),
        Resource::Platforms => Json(finder.platforms().await?).into_response(),
        Resource::Game | Resource::RandomGame => {
            let filters = FilterSpec::from_params(params);
            outcome_response(finder.random_game(&filters).await?)
        }
    };
    Ok(response)
}

async fn serve(
    upstream: UpstreamKind,
    slot: &UpstreamSlot,
    params: HashMap<String, String>,
) -> Response {
    let raw_resource = params.get("resource").map(String::as_str);
    info!("{:?} request for resource {:?}", upstream, raw_resource);

    let (mut response, cache_control) = match Resource::parse(upstream, raw_resource) {
        Ok(resource) => {
            let response = dispatch(resource, slot, &params)
                .await
                .unwrap_or_else(|e| e.into_response());
            // failures are never cached, whatever the resource
            let cache_control = if response.status().is_success() {
                resource.cache_control()
            } else {
                NO_STORE
            };
            (response, cache_control)
        }
        Err(e) => (e.into_response(), NO_STORE),
    };

    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));
    response
}

async fn giantbomb(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    serve(UpstreamKind::GiantBomb, &state.giantbomb, params).await
}

async fn rawg(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    serve(UpstreamKind::Rawg, &state.rawg, params).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub fn make_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/giantbomb", get(giantbomb))
        .route("/api/rawg", get(rawg))
        .with_state(state)
}

pub async fn run_server(state: AppState, bind_addr: &str) -> Result<()> {
    let app = make_app(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}
