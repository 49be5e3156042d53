use table::{Column, Sort, TableConfig, TableController};
use types::{Inspection, Person, Record};

use crate::{auth::AuthProvider, config::Config, rest::RestSource};

pub type UsersTable<A> = TableController<RestSource<Person, A>>;
pub type InspectionsTable<A> = TableController<RestSource<Inspection, A>>;
pub type RecordsTable<A> = TableController<RestSource<Record, A>>;

fn configured(columns: Vec<Column>, config: &Config) -> TableConfig {
    TableConfig::new(columns)
        .page_size(config.page_size)
        .pagination(config.pagination)
}

pub fn users_config(config: &Config) -> TableConfig {
    configured(
        vec![
            Column::new("name", "Username"),
            Column::new("display_name", "Display Name"),
            Column::new("mail", "Email"),
            Column::new("groups", "Groups"),
            Column::new("active", "Active"),
        ],
        config,
    )
    .searchable(["name", "display_name", "mail"])
    .sorted_by(Sort::asc("name"))
}

pub fn inspections_config(config: &Config) -> TableConfig {
    configured(
        vec![
            Column::new("id", "ID"),
            Column::new("site", "Site"),
            Column::new("inspector", "Inspector"),
            Column::new("status", "Status"),
            Column::new("scheduled_at", "Scheduled"),
            Column::new("score", "Score"),
        ],
        config,
    )
    .searchable(["site", "inspector", "status"])
    .sorted_by(Sort::desc("scheduled_at"))
}

/// The people directory at `{api_url}/users`.
pub fn users_table<A: AuthProvider>(config: &Config, auth: A) -> UsersTable<A> {
    let source = RestSource::new(config.api_url.clone(), "users", auth);
    TableController::new(users_config(config), source)
}

/// Site inspections at `{api_url}/inspections`.
pub fn inspections_table<A: AuthProvider>(config: &Config, auth: A) -> InspectionsTable<A> {
    let source = RestSource::new(config.api_url.clone(), "inspections", auth);
    TableController::new(inspections_config(config), source)
}

/// Any other collection, with schemaless rows.
pub fn records_table<A: AuthProvider>(
    config: &Config,
    collection: &str,
    columns: Vec<Column>,
    auth: A,
) -> RecordsTable<A> {
    let source = RestSource::new(config.api_url.clone(), collection, auth);
    TableController::new(configured(columns, config), source)
}
