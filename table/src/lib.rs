//! A headless table: filtering, sorting, pagination, CSV export and
//! optimistic single-row edits over a remote collection.

mod controller;
mod export;
mod sort;
mod source;
mod view;

pub use controller::{
    LoadOutcome, LoadStatus, MutationOutcome, RowId, TableConfig, TableController,
};
pub use export::{Export, ExportFormat};
pub use sort::{Sort, SortDirection, compare};
pub use source::{DataSource, Page, PageQuery, PaginationMode};
pub use view::{DateRange, FilterTag};

/// A displayed and exported field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}
