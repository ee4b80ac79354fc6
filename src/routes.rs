// src/routes.rs

use crate::access_log::LogRotator;
use crate::auth::AuthGate;
use crate::error::{KeepError, Result};
use crate::models::{
    NameRequest, NoteList, RenameRequest, SearchParams, SearchRequest, StatusReply, WriteRequest,
};
use crate::store::NoteStore;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, DefaultBodyLimit, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Everything a handler can reach. Built once at startup.
pub struct AppState {
    pub store: NoteStore,
    pub gate: AuthGate,
    pub access_log: LogRotator,
}

impl AppState {
    pub fn new(store: NoteStore, gate: AuthGate, access_log: LogRotator) -> Arc<Self> {
        Arc::new(Self {
            store,
            gate,
            access_log,
        })
    }
}

pub fn make_router(state: Arc<AppState>) -> Router {
    // Unknown methods on known paths answer like unknown paths
    let data = Router::new()
        .route("/list_files", get(list_files).fallback(route_not_found))
        .route(
            "/search_files",
            get(search_by_query)
                .post(search_by_body)
                .fallback(route_not_found),
        )
        .route("/create_file", post(create_file).fallback(route_not_found))
        .route("/update_file", post(update_file).fallback(route_not_found))
        .route("/delete_file", post(delete_file).fallback(route_not_found))
        .route("/rename_file", post(rename_file).fallback(route_not_found))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_password,
        ));

    Router::new()
        .route("/", get(index).fallback(route_not_found))
        .merge(data)
        .fallback(route_not_found)
        // Note bodies have no size cap
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn_with_state(state.clone(), record_access))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn require_password(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match state.gate.check(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            info!("rejected {} {}: bad password", request.method(), request.uri());
            err.into_response()
        }
    }
}

/// Write one access record per request, whatever the outcome.
///
/// The record is keyed by arrival time and written on a detached blocking
/// task, so the response never waits on the log directory.
async fn record_access(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let arrived = Utc::now();
    let request_line = format!(
        "\"{} {} {:?}\"",
        request.method(),
        request.uri(),
        request.version()
    );
    let response = next.run(request).await;

    let message = format!("{request_line} {}", response.status().as_u16());
    let access_log = state.access_log.clone();
    drop(tokio::task::spawn_blocking(move || {
        access_log.record_at(arrived, &message)
    }));
    response
}

/// Run a store operation on the blocking pool.
async fn with_store<T, F>(state: &Arc<AppState>, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&NoteStore) -> Result<T> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || op(&state.store))
        .await
        .map_err(|e| KeepError::Io(std::io::Error::other(e)))?
}

/// Decode a JSON object body; an empty body counts as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T> {
    if body.is_empty() {
        return Ok(T::default());
    }
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| KeepError::InvalidJson)?;
    if !value.is_object() {
        return Err(KeepError::InvalidJson);
    }
    serde_json::from_value(value).map_err(|_| KeepError::InvalidJson)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn route_not_found() -> KeepError {
    KeepError::RouteNotFound
}

async fn list_files(State(state): State<Arc<AppState>>) -> Result<Json<NoteList>> {
    let files = with_store(&state, |store| store.list()).await?;
    Ok(Json(NoteList { files }))
}

async fn search_by_query(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<NoteList>> {
    let Query(params) = params.map_err(|e| {
        debug!("bad search query: {e}");
        KeepError::InvalidQuery
    })?;
    let files = with_store(&state, move |store| store.search(&params.q)).await?;
    Ok(Json(NoteList { files }))
}

async fn search_by_body(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<NoteList>> {
    let SearchRequest { query } = parse_body(&body)?;
    let files = with_store(&state, move |store| store.search(&query)).await?;
    Ok(Json(NoteList { files }))
}

async fn create_file(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<StatusReply>)> {
    let WriteRequest { name, content } = parse_body(&body)?;
    let name = with_store(&state, move |store| store.create(&name, &content)).await?;
    info!(%name, "created note");
    Ok((
        StatusCode::CREATED,
        Json(StatusReply {
            status: "created",
            name,
        }),
    ))
}

async fn update_file(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<StatusReply>> {
    let WriteRequest { name, content } = parse_body(&body)?;
    let name = with_store(&state, move |store| store.update(&name, &content)).await?;
    info!(%name, "updated note");
    Ok(Json(StatusReply {
        status: "updated",
        name,
    }))
}

async fn delete_file(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<StatusReply>> {
    let NameRequest { name } = parse_body(&body)?;
    let name = with_store(&state, move |store| store.delete(&name)).await?;
    info!(%name, "deleted note");
    Ok(Json(StatusReply {
        status: "deleted",
        name,
    }))
}

async fn rename_file(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<StatusReply>> {
    let RenameRequest { name, new_name } = parse_body(&body)?;
    let name = with_store(&state, move |store| store.rename(&name, &new_name)).await?;
    info!(%name, "renamed note");
    Ok(Json(StatusReply {
        status: "renamed",
        name,
    }))
}
