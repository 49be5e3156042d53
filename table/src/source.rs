use types::{Patch, Result, Row};

use crate::{DateRange, FilterTag, Sort};

/// Where pagination, filtering and sorting happen.
///
/// A deployment picks one: either the read endpoint returns the whole
/// collection and the controller does the work, or the endpoint returns one
/// page at a time along with a total count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaginationMode {
    #[default]
    Client,
    Server,
}

/// Parameters handed to the read endpoint.
///
/// In client mode only the filters are informative; a source may ignore
/// them and return everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageQuery {
    pub query: String,
    pub tag: Option<FilterTag>,
    pub date_range: Option<DateRange>,
    pub sort: Option<Sort>,
    /// 1-indexed. `None` asks for the whole collection.
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub rows: Vec<R>,
    /// Total number of matching rows, reported by server-paginated
    /// endpoints.
    pub total: Option<usize>,
}

impl<R> Page<R> {
    pub fn full(rows: Vec<R>) -> Self {
        Self { rows, total: None }
    }

    pub fn partial(rows: Vec<R>, total: usize) -> Self {
        Self {
            rows,
            total: Some(total),
        }
    }
}

/// The remote collection behind a table.
///
/// The controller runs on a single-threaded executor, so the returned
/// futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait DataSource {
    type Row: Row;

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page<Self::Row>>;

    /// Write `patch` to the row with `id`. Endpoints that echo the updated
    /// row return it so the local copy can be reconciled.
    async fn apply_patch(
        &self,
        id: &<Self::Row as Row>::Id,
        patch: &Patch,
    ) -> Result<Option<Self::Row>>;
}
