//! Wires table controllers to REST collections: configuration, request
//! authentication and the HTTP data source.

mod auth;
mod config;
mod rest;
mod tables;

pub use auth::{AuthProvider, NoAuth, StaticToken};
pub use config::Config;
pub use rest::RestSource;
pub use tables::{
    InspectionsTable, RecordsTable, UsersTable, inspections_config, inspections_table,
    records_table, users_config, users_table,
};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Honors `RUST_LOG`, defaulting to `info`.
///
/// Returns an error if a subscriber was already installed.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}
