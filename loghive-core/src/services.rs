use std::sync::Arc;

use anyhow::Result;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tracing::*;

use loghive_common::LoghiveConfig;

use crate::auth::{CredentialProvider, DatabaseCredentialProvider};
use crate::db::{connect_to_db, load_registry};
use crate::entries::EntryStore;
use crate::login_protection::{InjectionGuard, LoginThrottle};

#[derive(Clone)]
pub struct Services {
    pub config: Arc<Mutex<LoghiveConfig>>,
    pub store: Arc<Mutex<EntryStore>>,
    pub login_throttle: Arc<Mutex<LoginThrottle>>,
    pub credentials: Option<Arc<dyn CredentialProvider>>,
    pub db: Option<Arc<Mutex<DatabaseConnection>>>,
}

impl Services {
    pub async fn new(mut config: LoghiveConfig) -> Result<Self> {
        let store = Arc::new(Mutex::new(EntryStore::new(
            config.store.ui.accent.clone(),
            config.store.public,
        )));

        {
            let mut store = store.lock().await;
            for (name, colors) in &config.store.severities {
                store.add_severity(name, colors.clone(), true, true);
            }
            for (id, producer) in &config.store.producers {
                store.add_producer(
                    id,
                    loghive_common::ColorPair::new(
                        producer.fore.clone(),
                        producer.back.clone(),
                    ),
                    &producer.name,
                    true,
                    true,
                );
            }
        }

        let mut db = None;
        let mut credentials: Option<Arc<dyn CredentialProvider>> = None;
        if let Some(database_url) = config.store.database_url.clone() {
            match connect_to_db(&config, database_url.expose_secret()).await {
                Ok(connection) => {
                    let mut store = store.lock().await;
                    if load_registry(&connection, &mut store).await {
                        let connection = Arc::new(Mutex::new(connection));
                        credentials =
                            Some(Arc::new(DatabaseCredentialProvider::new(connection.clone())));
                        db = Some(connection);
                    }
                }
                Err(error) => {
                    warn!(?error, "Could not connect to the database");
                    store.lock().await.add_internal(
                        "Attention",
                        &format!("Could not connect to the database: '{error}'"),
                        None,
                    );
                }
            }
        }

        {
            let mut store = store.lock().await;
            if db.is_none() {
                // No database means no credentials to check logins against.
                config.store.require_login = false;
                store.add_internal(
                    "Attention",
                    "Log server running WITHOUT database support",
                    None,
                );
            }
            if !config.store.require_login {
                store.add_internal("Warning", "Log server DOES NOT REQUIRE login", None);
            }
            if config.store.public {
                store.add_internal("Warning", "Log server IS public", None);
            }
            store.add_internal("Success", "Log server started successfully", None);
        }

        let login = &config.store.security.login;
        let login_throttle = Arc::new(Mutex::new(LoginThrottle::new(
            InjectionGuard::new(&config.store.security.injection_guard),
            login.max_tries,
            login.lockout,
            store.clone(),
        )));

        Ok(Self {
            config: Arc::new(Mutex::new(config)),
            store,
            login_throttle,
            credentials,
            db,
        })
    }
}
