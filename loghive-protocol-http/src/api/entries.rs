use std::collections::HashMap;

use poem::http::StatusCode;
use poem::session::Session;
use poem::web::{Data, Json, Query, RemoteAddr};
use poem::{handler, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::*;

use loghive_core::{paginate, LogEntry, Services, TIMESTAMP_FORMAT};

use super::SessionExt;

#[derive(Deserialize)]
pub struct ListQuery {
    /// Filter kind: `off`, `severity` or `from`.
    f: Option<String>,
    /// Filter target.
    ftgt: Option<String>,
    /// Entries per page, raw.
    epp: Option<String>,
    /// Page number, raw.
    p: Option<String>,
}

#[derive(Serialize)]
pub struct ProducerEntry {
    id: String,
    name: String,
}

#[derive(Serialize)]
pub struct EntriesPage {
    entries: Vec<LogEntry>,
    page: usize,
    page_max: usize,
    epp: usize,
    /// Entries on this page.
    count: usize,
    /// Entries matching the filter, across all pages.
    total: usize,
    last_update: Option<String>,
    filter: String,
    filter_target: Option<String>,
    severities: HashMap<String, String>,
    producers: Vec<ProducerEntry>,
}

#[handler]
pub async fn list(
    session: &Session,
    services: Data<&Services>,
    Query(query): Query<ListQuery>,
) -> poem::Result<Json<EntriesPage>> {
    let viewer = session.get_viewer();
    let (require_login, default_per_page) = {
        let config = services.config.lock().await;
        (
            config.store.require_login,
            config.store.ui.entries_per_page,
        )
    };
    if require_login && viewer.is_none() {
        return Err(poem::Error::from_status(StatusCode::UNAUTHORIZED));
    }

    let mut store = services.store.lock().await;
    let mut entries = store.filtered(
        query.f.as_deref(),
        query.ftgt.as_deref(),
        viewer.as_deref(),
        require_login,
    );
    let last_update = store
        .entries()
        .last()
        .map(|entry| entry.timestamp.format(TIMESTAMP_FORMAT).to_string());
    let severities = store
        .registry()
        .severities()
        .iter()
        .map(|(name, colors)| (name.clone(), colors.css()))
        .collect();
    let producers = store
        .registry()
        .producers()
        .iter()
        .map(|(id, info)| ProducerEntry {
            id: id.clone(),
            name: info.display_name.clone(),
        })
        .collect();
    drop(store);
    // Most recent first.
    entries.reverse();

    let total = entries.len();
    let window = paginate(total, query.epp.as_deref(), query.p.as_deref(), default_per_page);
    let (start, end) = window.bounds(total);
    Ok(Json(EntriesPage {
        entries: entries[start..end].to_vec(),
        page: window.page,
        page_max: window.max_page,
        epp: window.per_page,
        count: end - start,
        total,
        last_update,
        filter: query.f.unwrap_or_else(|| "off".to_owned()),
        filter_target: query.ftgt,
        severities,
        producers,
    }))
}

#[derive(Deserialize)]
pub struct AddRequest {
    from: String,
    severity: String,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    body: Option<Value>,
}

#[handler]
pub async fn add(
    session: &Session,
    services: Data<&Services>,
    remote: &RemoteAddr,
    Json(body): Json<AddRequest>,
) -> poem::Result<Response> {
    let require_login = services.config.lock().await.store.require_login;
    if require_login && session.get_viewer().is_none() {
        return Err(poem::Error::from_status(StatusCode::UNAUTHORIZED));
    }
    if body.from.is_empty() || body.severity.is_empty() {
        return Ok(StatusCode::BAD_REQUEST.into_response());
    }
    let remote_addr = remote.as_socket_addr().map(|a| a.ip().to_string());
    let id = services.store.lock().await.add(
        &body.from,
        &body.severity,
        &body.comment,
        body.body,
        remote_addr.as_deref(),
    );
    debug!(id, from = %body.from, "Entry accepted");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response())
}

#[derive(Deserialize)]
pub struct PurgeRequest {
    from: String,
    #[serde(default)]
    comment: Option<String>,
}

#[handler]
pub async fn purge(
    session: &Session,
    services: Data<&Services>,
    Json(body): Json<PurgeRequest>,
) -> poem::Result<Response> {
    let require_login = services.config.lock().await.store.require_login;
    if require_login && session.get_viewer().is_none() {
        return Err(poem::Error::from_status(StatusCode::UNAUTHORIZED));
    }
    if body.from.is_empty() {
        return Ok(StatusCode::BAD_REQUEST.into_response());
    }

    let comment = body.comment.as_deref().unwrap_or("Log clear request");
    let mut store = services.store.lock().await;
    let purged = store.count();
    store.purge();
    store.add_internal(
        "Warning",
        &format!("{comment} by '{}'", body.from),
        None,
    );
    info!(purged, from = %body.from, "Purged all entries");
    Ok(Json(serde_json::json!({ "purged": purged })).into_response())
}
