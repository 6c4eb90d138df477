use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, Statement};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::*;

/// Account row returned by a successful credential check.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct UserRecord {
    pub id: i32,
    pub name: Option<String>,
    pub url: Option<String>,
    pub forecolor: Option<String>,
    pub backcolor: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum CredentialError {
    /// The credential query itself failed to execute. Distinct from a
    /// plain mismatch so callers can treat it as a bad request.
    #[error("credential query failed: {0}")]
    MalformedQuery(#[source] sea_orm::DbErr),

    #[error("no matching account")]
    NoSuchRecord,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Validates an identifier/secret pair against a backing store.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn authenticate(&self, identifier: &str, secret: &str)
        -> Result<UserRecord, CredentialError>;
}

/// Checks credentials through the database's `authenticate` function.
/// Inputs are interpolated into the statement verbatim, which is why every
/// caller must pass them through the injection guard first.
pub struct DatabaseCredentialProvider {
    db: Arc<Mutex<DatabaseConnection>>,
}

impl DatabaseCredentialProvider {
    pub fn new(db: Arc<Mutex<DatabaseConnection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialProvider for DatabaseCredentialProvider {
    async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<UserRecord, CredentialError> {
        let db = self.db.lock().await;
        let statement = Statement::from_string(
            db.get_database_backend(),
            format!("SELECT * FROM authenticate('{identifier}', '{secret}');"),
        );
        let row = UserRecord::find_by_statement(statement)
            .one(&*db)
            .await
            .map_err(|error| {
                warn!(?error, "Credential query failed");
                CredentialError::MalformedQuery(error)
            })?;
        row.ok_or(CredentialError::NoSuchRecord)
    }
}
