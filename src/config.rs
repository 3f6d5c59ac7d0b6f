use std::env;

use crate::constants::{DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS};

/// Connection settings for the relation store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Keep connections open for the lifetime of the pool. Required for
    /// `sqlite::memory:` databases, which vanish with their last connection.
    pub keep_alive: bool,
}

impl StoreConfig {
    pub fn new(database_url: &str) -> Self {
        Self {
            database_url: database_url.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            keep_alive: false,
        }
    }

    /// Reads `FOODGRAM_DATABASE_URL` (or `DATABASE_URL`) and
    /// `FOODGRAM_MAX_CONNECTIONS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let database_url = env::var("FOODGRAM_DATABASE_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

        let max_connections = env::var("FOODGRAM_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        Self {
            database_url,
            max_connections,
            keep_alive: false,
        }
    }

    /// A private in-memory database behind a single long-lived connection.
    pub fn in_memory() -> Self {
        Self {
            database_url: String::from("sqlite::memory:"),
            max_connections: 1,
            keep_alive: true,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_URL)
    }
}
