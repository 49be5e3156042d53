//! Dioxus bindings for table controllers.

mod components;
mod hook;

pub use components::{DataTable, LoadState, Pager, SearchBox};
pub use hook::{TableRow, UseTable, use_table};
