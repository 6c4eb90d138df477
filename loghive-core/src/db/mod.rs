use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait};
use tracing::*;

use loghive_common::{ColorPair, LoghiveConfig, LoghiveError};
use loghive_db_entities::{Severity, User};

use crate::entries::EntryStore;

pub async fn connect_to_db(
    config: &LoghiveConfig,
    database_url: &str,
) -> Result<DatabaseConnection, LoghiveError> {
    let mut url = url::Url::parse(database_url)?;
    if url.scheme() == "sqlite" {
        let path = url.path();
        let mut abs_path = config.paths_relative_to.clone();
        abs_path.push(path);

        if let Some(parent) = abs_path.parent() {
            std::fs::create_dir_all(parent)?
        }

        url.set_path(abs_path.to_str().ok_or_else(|| {
            LoghiveError::Anyhow(anyhow::anyhow!("Failed to convert database path to string"))
        })?);

        url.set_query(Some("mode=rwc"));
    }

    let mut opt = ConnectOptions::new(url.to_string());
    opt.max_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(true);

    let connection = Database::connect(opt).await?;
    Ok(connection)
}

/// Bulk-loads severities and producers into the store's registry without
/// generating per-row entries. Rows the store already knows (typically from
/// the config file) win over database rows. Returns false when neither
/// table could be read.
pub async fn load_registry(db: &DatabaseConnection, store: &mut EntryStore) -> bool {
    let mut severities = 0usize;
    let mut producers = 0usize;
    let mut reachable = false;

    match Severity::Entity::find().all(db).await {
        Ok(rows) => {
            reachable = true;
            for row in rows {
                let Some(name) = row.name else {
                    store.add_internal(
                        "Error",
                        &format!("Severity row {} has no name, skipped", row.id),
                        None,
                    );
                    continue;
                };
                let colors = ColorPair::new(row.forecolor, row.backcolor);
                if store.add_severity(&name, colors, false, true) {
                    severities += 1;
                }
            }
        }
        Err(error) => {
            warn!(?error, "Could not load severities from the database");
            store.add_internal(
                "Attention",
                &format!("Could not load severities: '{error}'"),
                None,
            );
        }
    }

    match User::Entity::find().all(db).await {
        Ok(rows) => {
            reachable = true;
            for row in rows {
                let (Some(url), Some(name)) = (row.url, row.name) else {
                    store.add_internal(
                        "Error",
                        &format!("User row {} has no name or url, skipped", row.id),
                        None,
                    );
                    continue;
                };
                let colors = ColorPair::new(row.forecolor, row.backcolor);
                if store.add_producer(&url, colors, &name, false, true) {
                    producers += 1;
                }
            }
        }
        Err(error) => {
            warn!(?error, "Could not load users from the database");
            store.add_internal(
                "Attention",
                &format!("Could not load known servers: '{error}'"),
                None,
            );
        }
    }

    if reachable {
        info!(severities, producers, "Loaded registry from the database");
        store.add_internal(
            "Success",
            &format!("Loaded {producers} servers and {severities} severities from the database"),
            None,
        );
    }
    reachable
}
