mod api;

use anyhow::{Context, Result};
use poem::listener::TcpListener;
use poem::middleware::AddData;
use poem::session::{CookieConfig, MemoryStorage, ServerSession};
use poem::{get, post, Endpoint, EndpointExt, Route, Server};
use std::net::SocketAddr;
use tracing::*;

use loghive_core::Services;

pub fn make_app(services: Services) -> impl Endpoint {
    let store = services.store.clone();
    Route::new()
        .at("/auth/login", post(api::auth::login))
        .at("/auth/logout", get(api::auth::logout))
        .at(
            "/api/entries",
            get(api::entries::list).post(api::entries::add),
        )
        .at("/api/entries/purge", post(api::entries::purge))
        .at("/api/status", get(api::info::status))
        .at("/api/info", get(api::info::info))
        .with(ServerSession::new(
            CookieConfig::default().secure(false),
            MemoryStorage::new(),
        ))
        .with(AddData::new(services))
        .catch_all_error(move |err| {
            let store = store.clone();
            async move {
                if err.status().is_server_error() {
                    error!(%err, "Unhandled server error");
                    store
                        .lock()
                        .await
                        .log_uncaught_exception(&err.to_string(), None);
                }
                err.into_response()
            }
        })
}

#[derive(Clone)]
pub struct HttpProtocolServer {
    services: Services,
}

impl HttpProtocolServer {
    pub fn new(services: &Services) -> Self {
        HttpProtocolServer {
            services: services.clone(),
        }
    }

    pub async fn run(self, address: SocketAddr) -> Result<()> {
        let app = make_app(self.services);
        info!(?address, "Listening");
        Server::new(TcpListener::bind(address))
            .run(app)
            .await
            .context("Failed to start log server")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use loghive_common::{LoghiveConfig, LoghiveConfigStore};
    use poem::http::StatusCode;
    use poem::test::TestClient;

    use super::*;

    async fn services() -> Services {
        let config = LoghiveConfig {
            store: LoghiveConfigStore::default(),
            paths_relative_to: PathBuf::from("."),
        };
        // No database configured, so login is not required.
        Services::new(config).await.unwrap()
    }

    async fn client() -> TestClient<impl Endpoint> {
        TestClient::new(make_app(services().await))
    }

    #[tokio::test]
    async fn test_info_is_a_teapot() {
        let cli = client().await;
        let resp = cli.get("/api/info").send().await;
        resp.assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_status_reports_counts() {
        let cli = client().await;
        let resp = cli.get("/api/status").send().await;
        resp.assert_status_is_ok();
        let value = resp.json().await;
        let value = value.value().object();
        assert!(value.get("entries").i64() > 0);
        assert_eq!(value.get("require_login").bool(), false);
        assert_eq!(value.get("severities").i64(), 5);
    }

    #[tokio::test]
    async fn test_submitted_entry_is_listed_most_recent_first() {
        let cli = client().await;
        let resp = cli
            .post("/api/entries")
            .body_json(&serde_json::json!({
                "from": "http://alpha/",
                "severity": "error",
                "comment": "disk full",
            }))
            .send()
            .await;
        resp.assert_status(StatusCode::CREATED);

        let resp = cli.get("/api/entries").send().await;
        resp.assert_status_is_ok();
        let value = resp.json().await;
        let page = value.value().object();
        let entries = page.get("entries").array();
        // The auto-registration notice lands after the entry itself.
        let first = entries.get(0).object();
        assert_eq!(first.get("severity").string(), "Warning");
        let second = entries.get(1).object();
        assert_eq!(second.get("comment").string(), "disk full");
        assert_eq!(page.get("page").i64(), 1);
    }

    #[tokio::test]
    async fn test_entry_without_severity_is_rejected() {
        let cli = client().await;
        let resp = cli
            .post("/api/entries")
            .body_json(&serde_json::json!({
                "from": "http://alpha/",
                "severity": "",
                "comment": "x",
            }))
            .send()
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_purge_requires_a_requester() {
        let cli = client().await;
        let resp = cli
            .post("/api/entries/purge")
            .body_json(&serde_json::json!({ "from": "" }))
            .send()
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);

        let resp = cli
            .post("/api/entries/purge")
            .body_json(&serde_json::json!({ "from": "ops" }))
            .send()
            .await;
        resp.assert_status_is_ok();

        // Only the purge notice remains.
        let resp = cli.get("/api/status").send().await;
        let value = resp.json().await;
        assert_eq!(value.value().object().get("entries").i64(), 1);
    }

    #[tokio::test]
    async fn test_login_without_database_is_a_bad_request() {
        let cli = client().await;
        let resp = cli
            .post("/auth/login")
            .body_json(&serde_json::json!({
                "user": "alice",
                "webpass": "hunter2",
            }))
            .send()
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pagination_parameters_degrade_gracefully() {
        let cli = client().await;
        for i in 0..5 {
            cli.post("/api/entries")
                .body_json(&serde_json::json!({
                    "from": "http://alpha/",
                    "severity": "warning",
                    "comment": format!("entry {i}"),
                }))
                .send()
                .await
                .assert_status(StatusCode::CREATED);
        }

        let resp = cli
            .get("/api/entries")
            .query("epp", &"garbage")
            .query("p", &"-3")
            .send()
            .await;
        resp.assert_status_is_ok();
        let value = resp.json().await;
        assert_eq!(value.value().object().get("page").i64(), 1);
    }

    #[tokio::test]
    async fn test_api_routes_reject_anonymous_callers_when_login_is_required() {
        let services = services().await;
        services.config.lock().await.store.require_login = true;
        let cli = TestClient::new(make_app(services));

        cli.get("/api/entries")
            .send()
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        cli.get("/api/status")
            .send()
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        cli.post("/api/entries")
            .body_json(&serde_json::json!({
                "from": "http://alpha/",
                "severity": "error",
                "comment": "x",
            }))
            .send()
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        cli.post("/api/entries/purge")
            .body_json(&serde_json::json!({ "from": "ops" }))
            .send()
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
