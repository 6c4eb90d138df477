use poem::http::StatusCode;
use poem::session::Session;
use poem::web::{Data, Json, RemoteAddr};
use poem::{handler, IntoResponse, Response};
use serde::Deserialize;
use tracing::*;

use loghive_core::{LoginOutcome, Services};

use super::SessionExt;

#[derive(Deserialize)]
pub struct LoginRequest {
    user: String,
    webpass: String,
    /// Accepted for client compatibility; session lifetime is fixed.
    #[serde(default)]
    remember: bool,
}

#[handler]
pub async fn login(
    session: &Session,
    services: Data<&Services>,
    remote: &RemoteAddr,
    Json(body): Json<LoginRequest>,
) -> poem::Result<Response> {
    let Some(provider) = services.credentials.clone() else {
        debug!("Login attempted with no credential backend");
        return Ok(StatusCode::BAD_REQUEST.into_response());
    };
    let Some(addr) = remote.as_socket_addr().map(|a| a.ip()) else {
        return Ok(StatusCode::BAD_REQUEST.into_response());
    };

    debug!(user = %body.user, remember = body.remember, "Login attempt");
    let outcome = services
        .login_throttle
        .lock()
        .await
        .attempt(addr, &body.user, &body.webpass, provider.as_ref())
        .await;

    match outcome {
        LoginOutcome::Success(user) => {
            let display = user.name.clone().unwrap_or_else(|| body.user.clone());
            let viewer = user.url.clone().unwrap_or_else(|| display.clone());
            session.set_viewer(viewer);
            services.store.lock().await.add_internal(
                "Success",
                &format!("User '{display}' logged in"),
                None,
            );
            Ok(Json(user).into_response())
        }
        LoginOutcome::Failed => Ok(StatusCode::UNAUTHORIZED.into_response()),
        LoginOutcome::Locked => Ok(StatusCode::FORBIDDEN.into_response()),
        LoginOutcome::BadRequest => Ok(StatusCode::BAD_REQUEST.into_response()),
    }
}

#[handler]
pub async fn logout(session: &Session) -> StatusCode {
    session.clear();
    StatusCode::OK
}
