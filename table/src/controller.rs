use std::{cell::RefCell, collections::HashMap, future::Future, rc::Rc};

use tokio::sync::Notify;
use tracing::{debug, warn};
use types::{Error, Patch, Result, Row};

use crate::{
    Column, DateRange, DataSource, Export, ExportFormat, FilterTag, Page, PageQuery,
    PaginationMode, Sort, export, view::View,
};

pub type RowId<S> = <<S as DataSource>::Row as Row>::Id;

#[derive(Debug, Clone)]
pub struct TableConfig {
    pub columns: Vec<Column>,
    pub searchable_fields: Vec<String>,
    pub page_size: usize,
    pub pagination: PaginationMode,
    pub default_sort: Option<Sort>,
}

impl TableConfig {
    pub const DEFAULT_PAGE_SIZE: usize = 25;

    /// Every column is searchable until told otherwise.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            searchable_fields: columns.iter().map(|c| c.key.clone()).collect(),
            columns,
            page_size: Self::DEFAULT_PAGE_SIZE,
            pagination: PaginationMode::Client,
            default_sort: None,
        }
    }

    pub fn searchable<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.searchable_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn pagination(mut self, pagination: PaginationMode) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn sorted_by(mut self, sort: Sort) -> Self {
        self.default_sort = Some(sort);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { rows: usize },
    /// A later load had already been applied; this response was dropped.
    Superseded,
    /// The controller was disposed while the request was in flight.
    Disposed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<R> {
    /// The write went through. Carries the reconciled row, or `None` if a
    /// reload removed it in the meantime.
    Confirmed(Option<R>),
    /// A newer mutation of the same row was queued while this one waited.
    Superseded,
    Disposed,
}

struct Pending {
    patch: Patch,
    snapshot: Patch,
    settled: Rc<Notify>,
}

enum Begun {
    Applied,
    Queued(u64),
}

struct State<R: Row> {
    items: Vec<R>,
    total: Option<usize>,
    view: View,
    status: LoadStatus,
    load_error: Option<Error>,
    pending: HashMap<R::Id, Pending>,
    queued: HashMap<R::Id, u64>,
    next_ticket: u64,
    issued: u64,
    applied: u64,
    disposed: bool,
}

/// Headless controller for a filterable, sortable, paginated, exportable
/// table backed by a [`DataSource`].
///
/// Meant for a single-threaded executor. State is only borrowed between
/// `.await` points, so a render reading [`TableController::visible_rows`]
/// never observes a half-applied change.
pub struct TableController<S: DataSource> {
    config: TableConfig,
    source: S,
    state: RefCell<State<S::Row>>,
}

impl<S: DataSource> TableController<S> {
    pub fn new(config: TableConfig, source: S) -> Self {
        let view = View::new(config.page_size, config.default_sort.clone());
        Self {
            config,
            source,
            state: RefCell::new(State {
                items: Vec::new(),
                total: None,
                view,
                status: LoadStatus::Idle,
                load_error: None,
                pending: HashMap::new(),
                queued: HashMap::new(),
                next_ticket: 0,
                issued: 0,
                applied: 0,
                disposed: false,
            }),
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the collection (or the current page, in server mode).
    ///
    /// The status flips to [`LoadStatus::Loading`] before this returns. A
    /// failed load keeps the previous rows visible.
    pub fn load(&self) -> impl Future<Output = Result<LoadOutcome>> + '_ {
        let issued = self.begin_load();
        async move {
            let (seq, query) = issued?;
            let result = self.source.fetch_page(&query).await;
            self.finish_load(seq, result)
        }
    }

    fn begin_load(&self) -> Result<(u64, PageQuery)> {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return Err(Error::Disposed);
        }
        state.issued += 1;
        state.status = LoadStatus::Loading;
        let seq = state.issued;
        debug!(seq, "issuing load");
        Ok((seq, self.page_query(&state.view)))
    }

    fn page_query(&self, view: &View) -> PageQuery {
        let (page, page_size) = match self.config.pagination {
            PaginationMode::Client => (None, None),
            PaginationMode::Server => (Some(view.page), Some(view.page_size)),
        };
        PageQuery {
            query: view.query.clone(),
            tag: view.tag.clone(),
            date_range: view.date_range.clone(),
            sort: view.sort.clone(),
            page,
            page_size,
        }
    }

    fn finish_load(&self, seq: u64, result: Result<Page<S::Row>>) -> Result<LoadOutcome> {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return Ok(LoadOutcome::Disposed);
        }
        if seq <= state.applied {
            debug!(seq, applied = state.applied, "discarding superseded load");
            return Ok(LoadOutcome::Superseded);
        }

        state.applied = seq;
        let latest = seq == state.issued;

        match result {
            Ok(page) => {
                let rows = page.rows.len();
                self.replace_items(&mut state, page);
                state.load_error = None;
                if latest {
                    state.status = LoadStatus::Idle;
                }
                debug!(seq, rows, "applied load");
                Ok(LoadOutcome::Applied { rows })
            }
            Err(error) => {
                warn!(seq, %error, "load failed");
                if latest {
                    state.status = LoadStatus::Error;
                    state.load_error = Some(error.clone());
                }
                Err(error)
            }
        }
    }

    fn replace_items(&self, state: &mut State<S::Row>, page: Page<S::Row>) {
        if self.config.pagination == PaginationMode::Server && page.total.is_none() {
            warn!("server-paginated source returned no total; counting the page only");
        }
        state.items = page.rows;
        state.total = page.total;

        // Keep in-flight optimistic writes visible on top of fresh data.
        let State { items, pending, .. } = &mut *state;
        for (id, pending) in pending.iter_mut() {
            if let Some(row) = items.iter_mut().find(|r| r.id() == *id) {
                pending.snapshot = snapshot(row, &pending.patch);
                if let Err(error) = row.apply(&pending.patch) {
                    warn!(%id, %error, "could not re-apply pending patch");
                }
            }
        }

        self.clamp(state);
    }

    /// Apply `patch` to the row with `id` right away, then write it to the
    /// source. On any failure the patched fields are restored.
    ///
    /// If another mutation of the same row is still in flight, this one waits
    /// for it to settle before applying anything.
    pub fn mutate(
        &self,
        id: RowId<S>,
        patch: Patch,
    ) -> impl Future<Output = Result<MutationOutcome<S::Row>>> + '_ {
        let begun = self.begin_mutation(&id, &patch);
        async move {
            if let Begun::Queued(ticket) = begun? {
                if !self.wait_for_turn(&id, ticket).await {
                    return Ok(self.skipped_outcome());
                }
                self.apply_optimistic(&id, &patch)?;
            }

            let result = self.source.apply_patch(&id, &patch).await;
            self.settle_mutation(&id, result)
        }
    }

    fn begin_mutation(&self, id: &RowId<S>, patch: &Patch) -> Result<Begun> {
        {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return Err(Error::Disposed);
            }
            // A waiter that has been woken but not yet polled still holds the
            // row, so a newer request must queue behind it and take its turn.
            if state.pending.contains_key(id) || state.queued.contains_key(id) {
                state.next_ticket += 1;
                let ticket = state.next_ticket;
                state.queued.insert(id.clone(), ticket);
                debug!(%id, ticket, "queueing mutation behind earlier write");
                return Ok(Begun::Queued(ticket));
            }
        }
        self.apply_optimistic(id, patch)?;
        Ok(Begun::Applied)
    }

    /// Resolves `true` once no write for `id` is in flight and `ticket` is
    /// still the newest one queued for it.
    async fn wait_for_turn(&self, id: &RowId<S>, ticket: u64) -> bool {
        loop {
            let settled = {
                let state = self.state.borrow();
                if state.disposed {
                    return false;
                }
                match state.pending.get(id) {
                    Some(pending) => pending.settled.clone(),
                    None => break,
                }
            };
            settled.notified().await;
        }

        let mut state = self.state.borrow_mut();
        if state.queued.get(id) != Some(&ticket) {
            return false;
        }
        state.queued.remove(id);
        true
    }

    fn skipped_outcome(&self) -> MutationOutcome<S::Row> {
        if self.state.borrow().disposed {
            MutationOutcome::Disposed
        } else {
            MutationOutcome::Superseded
        }
    }

    fn apply_optimistic(&self, id: &RowId<S>, patch: &Patch) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let row = state
            .items
            .iter_mut()
            .find(|r| r.id() == *id)
            .ok_or_else(|| Error::UnknownRecord(id.to_string()))?;

        // Patch a copy so a rejected field leaves the row untouched.
        let mut patched = row.clone();
        patched.apply(patch)?;
        let snapshot = snapshot(row, patch);
        *row = patched;

        state.pending.insert(
            id.clone(),
            Pending {
                patch: patch.clone(),
                snapshot,
                settled: Rc::new(Notify::new()),
            },
        );
        self.clamp(&mut state);
        Ok(())
    }

    fn settle_mutation(
        &self,
        id: &RowId<S>,
        result: Result<Option<S::Row>>,
    ) -> Result<MutationOutcome<S::Row>> {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return Ok(MutationOutcome::Disposed);
        }
        let Some(pending) = state.pending.remove(id) else {
            return Ok(MutationOutcome::Disposed);
        };
        pending.settled.notify_waiters();

        let position = state.items.iter().position(|r| r.id() == *id);
        let outcome = match result {
            Ok(returned) => {
                debug!(%id, "mutation confirmed");
                let confirmed = match (returned, position) {
                    (Some(row), Some(i)) => {
                        state.items[i] = row.clone();
                        Some(row)
                    }
                    (Some(row), None) => Some(row),
                    (None, Some(i)) => Some(state.items[i].clone()),
                    (None, None) => None,
                };
                Ok(MutationOutcome::Confirmed(confirmed))
            }
            Err(error) => {
                warn!(%id, %error, "mutation failed, rolling back");
                if let Some(i) = position {
                    let row = &mut state.items[i];
                    for (field, value) in pending.snapshot {
                        if let Err(error) = row.set_field(&field, value) {
                            warn!(%id, field = %field, %error, "could not restore field");
                        }
                    }
                }
                Err(error)
            }
        };

        self.clamp(&mut state);
        outcome
    }

    /// Stop applying results. In-flight requests settle into nothing.
    pub fn dispose(&self) {
        let mut state = self.state.borrow_mut();
        state.disposed = true;
        state.items.clear();
        state.total = None;
        state.status = LoadStatus::Idle;
        state.load_error = None;
        state.queued.clear();
        for (_, pending) in state.pending.drain() {
            pending.settled.notify_waiters();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.update_filters(|view| view.query = query.into());
    }

    pub fn set_filter_tag(&self, tag: Option<FilterTag>) {
        self.update_filters(|view| view.tag = tag);
    }

    pub fn set_date_range(&self, range: Option<DateRange>) {
        self.update_filters(|view| view.date_range = range);
    }

    /// A size of zero is treated as one.
    pub fn set_page_size(&self, page_size: usize) {
        self.update_filters(|view| view.page_size = page_size.max(1));
    }

    fn update_filters(&self, update: impl FnOnce(&mut View)) {
        let mut state = self.state.borrow_mut();
        update(&mut state.view);
        state.view.page = 1;
        self.clamp(&mut state);
    }

    /// Sorting by a new key starts ascending; the current key is left alone.
    pub fn set_sort_key(&self, key: impl Into<String>) {
        let key = key.into();
        let mut state = self.state.borrow_mut();
        if state.view.sort.as_ref().is_some_and(|s| s.key == key) {
            return;
        }
        state.view.sort = Some(Sort::asc(key));
    }

    pub fn toggle_sort_direction(&self) {
        if let Some(sort) = self.state.borrow_mut().view.sort.as_mut() {
            sort.direction = sort.direction.toggled();
        }
    }

    pub fn clear_sort(&self) {
        self.state.borrow_mut().view.sort = None;
    }

    /// Out-of-range pages are clamped.
    pub fn go_to_page(&self, page: usize) {
        let mut state = self.state.borrow_mut();
        state.view.page = page;
        self.clamp(&mut state);
    }

    /// The rows of the current page, in display order.
    pub fn visible_rows(&self) -> Vec<S::Row> {
        let state = self.state.borrow();
        if self.config.pagination == PaginationMode::Server {
            return state.items.clone();
        }
        let rows = state
            .view
            .filter_and_sort(&state.items, &self.config.searchable_fields);
        rows[state.view.page_range(rows.len())]
            .iter()
            .map(|row| (*row).clone())
            .collect()
    }

    /// Filtered and sorted rows, unpaginated, as CSV or TSV.
    ///
    /// In server mode only the loaded page is available.
    pub fn export_current_view(&self, format: ExportFormat) -> Export {
        let state = self.state.borrow();
        match self.config.pagination {
            PaginationMode::Client => {
                let rows = state
                    .view
                    .filter_and_sort(&state.items, &self.config.searchable_fields);
                export::export(&self.config.columns, rows, format)
            }
            PaginationMode::Server => export::export(&self.config.columns, &state.items, format),
        }
    }

    fn clamp(&self, state: &mut State<S::Row>) {
        let filtered = self.count_filtered(state);
        state.view.clamp_page(filtered);
    }

    fn count_filtered(&self, state: &State<S::Row>) -> usize {
        match self.config.pagination {
            PaginationMode::Client => state
                .view
                .filter_and_sort(&state.items, &self.config.searchable_fields)
                .len(),
            PaginationMode::Server => state.total.unwrap_or(state.items.len()),
        }
    }

    pub fn filtered_count(&self) -> usize {
        self.count_filtered(&self.state.borrow())
    }

    pub fn page(&self) -> usize {
        self.state.borrow().view.page
    }

    pub fn page_size(&self) -> usize {
        self.state.borrow().view.page_size
    }

    pub fn page_count(&self) -> usize {
        let state = self.state.borrow();
        state.view.page_count(self.count_filtered(&state))
    }

    pub fn query(&self) -> String {
        self.state.borrow().view.query.clone()
    }

    pub fn sort(&self) -> Option<Sort> {
        self.state.borrow().view.sort.clone()
    }

    pub fn filter_tag(&self) -> Option<FilterTag> {
        self.state.borrow().view.tag.clone()
    }

    pub fn date_range(&self) -> Option<DateRange> {
        self.state.borrow().view.date_range.clone()
    }

    pub fn status(&self) -> LoadStatus {
        self.state.borrow().status
    }

    pub fn load_error(&self) -> Option<Error> {
        self.state.borrow().load_error.clone()
    }

    pub fn is_pending(&self, id: &RowId<S>) -> bool {
        self.state.borrow().pending.contains_key(id)
    }

    /// Every loaded row, unfiltered, in the order the source returned them.
    pub fn items(&self) -> Vec<S::Row> {
        self.state.borrow().items.clone()
    }

    pub fn total(&self) -> Option<usize> {
        self.state.borrow().total
    }
}

fn snapshot<R: Row>(row: &R, patch: &Patch) -> Patch {
    patch
        .keys()
        .map(|field| (field.clone(), row.field(field)))
        .collect()
}
