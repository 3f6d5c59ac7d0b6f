use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use super::error::{Error, QueryError};
use crate::config::StoreConfig;

/// Opens the relation store and brings its schema up to date.
pub async fn open_store(config: &StoreConfig) -> Result<Pool<Sqlite>, Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(QueryError::from)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.keep_alive {
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(QueryError::from)?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(QueryError::from)?;

    log::debug!(
        "Opened store {} ({} connections)",
        config.database_url,
        config.max_connections
    );

    Ok(pool)
}
