use poem::handler;
use poem::http::StatusCode;
use poem::session::Session;
use poem::web::{Data, Json};
use serde::Serialize;

use loghive_core::Services;

use super::SessionExt;

#[derive(Serialize)]
pub struct StatusInfo {
    version: String,
    entries: usize,
    producers: usize,
    severities: usize,
    public: bool,
    require_login: bool,
    external_url: Option<String>,
}

#[handler]
pub async fn status(
    session: &Session,
    services: Data<&Services>,
) -> poem::Result<Json<StatusInfo>> {
    let config = services.config.lock().await;
    if config.store.require_login && session.get_viewer().is_none() {
        return Err(poem::Error::from_status(StatusCode::UNAUTHORIZED));
    }
    let (severities, producers, entries) = services.store.lock().await.lists_count();
    Ok(Json(StatusInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        entries,
        producers,
        severities,
        public: config.store.public,
        require_login: config.store.require_login,
        external_url: config.store.external_url.clone(),
    }))
}

#[handler]
pub async fn info() -> (StatusCode, &'static str) {
    (StatusCode::IM_A_TEAPOT, "This is a log server, not a coffee machine.")
}
