use std::rc::Rc;

use dioxus::prelude::*;
use table::{
    DataSource, DateRange, Export, ExportFormat, FilterTag, LoadStatus, RowId, Sort,
    TableController,
};
use types::{Error, Patch, Row, Value};

/// One rendered line of a [`crate::DataTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub key: String,
    pub cells: Vec<Value>,
    pub pending: bool,
}

/// A table controller owned by a component.
///
/// Reads subscribe the component to a revision counter that every change
/// bumps, so the controller itself can stay a plain value.
pub struct UseTable<S: DataSource + 'static> {
    controller: Rc<TableController<S>>,
    revision: Signal<u64>,
}

impl<S: DataSource + 'static> Clone for UseTable<S> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            revision: self.revision,
        }
    }
}

/// Create the controller on first render, load it, and dispose of it when
/// the component unmounts.
pub fn use_table<S: DataSource + 'static>(
    init: impl FnOnce() -> TableController<S>,
) -> UseTable<S> {
    let controller = use_hook(|| Rc::new(init()));
    let revision = use_signal(|| 0);
    let table = UseTable {
        controller,
        revision,
    };

    use_hook({
        let table = table.clone();
        move || table.reload()
    });
    use_drop({
        let controller = table.controller.clone();
        move || controller.dispose()
    });

    table
}

impl<S: DataSource + 'static> UseTable<S> {
    fn bump(&self) {
        let mut revision = self.revision;
        *revision.write() += 1;
    }

    fn track(&self) -> &TableController<S> {
        // Subscribe the calling component.
        let _ = self.revision.read();
        &self.controller
    }

    pub fn controller(&self) -> &TableController<S> {
        &self.controller
    }

    pub fn rows(&self) -> Vec<TableRow> {
        let controller = self.track();
        controller
            .visible_rows()
            .iter()
            .map(|row| {
                let id = row.id();
                TableRow {
                    key: id.to_string(),
                    cells: controller
                        .config()
                        .columns
                        .iter()
                        .map(|column| row.field(&column.key))
                        .collect(),
                    pending: controller.is_pending(&id),
                }
            })
            .collect()
    }

    pub fn status(&self) -> LoadStatus {
        self.track().status()
    }

    pub fn load_error(&self) -> Option<Error> {
        self.track().load_error()
    }

    pub fn query(&self) -> String {
        self.track().query()
    }

    pub fn sort(&self) -> Option<Sort> {
        self.track().sort()
    }

    pub fn page(&self) -> usize {
        self.track().page()
    }

    pub fn page_count(&self) -> usize {
        self.track().page_count()
    }

    pub fn filtered_count(&self) -> usize {
        self.track().filtered_count()
    }

    /// Refetch in the background. Failures surface through
    /// [`UseTable::load_error`].
    pub fn reload(&self) {
        let table = self.clone();
        spawn(async move {
            let load = table.controller.load();
            table.bump();
            if let Ok(outcome) = load.await {
                tracing::trace!(?outcome, "table reloaded");
            }
            table.bump();
        });
    }

    /// Optimistically edit a row in the background.
    pub fn mutate(&self, id: RowId<S>, patch: Patch) {
        let table = self.clone();
        spawn(async move {
            let write = table.controller.mutate(id, patch);
            table.bump();
            if let Err(error) = write.await {
                tracing::warn!(%error, "row update rejected");
            }
            table.bump();
        });
    }

    pub fn set_query(&self, query: String) {
        self.controller.set_query(query);
        self.after_view_change();
    }

    pub fn set_filter_tag(&self, tag: Option<FilterTag>) {
        self.controller.set_filter_tag(tag);
        self.after_view_change();
    }

    pub fn set_date_range(&self, range: Option<DateRange>) {
        self.controller.set_date_range(range);
        self.after_view_change();
    }

    pub fn set_page_size(&self, page_size: usize) {
        self.controller.set_page_size(page_size);
        self.after_view_change();
    }

    /// Header click: a new column sorts ascending, the current one flips.
    pub fn sort_by(&self, key: String) {
        let current = self.controller.sort();
        if current.is_some_and(|sort| sort.key == key) {
            self.controller.toggle_sort_direction();
        } else {
            self.controller.set_sort_key(key);
        }
        self.after_view_change();
    }

    pub fn go_to_page(&self, page: usize) {
        self.controller.go_to_page(page);
        self.after_view_change();
    }

    pub fn export(&self, format: ExportFormat) -> Export {
        self.controller.export_current_view(format)
    }

    /// Server-paginated tables need a fetch for every view change.
    fn after_view_change(&self) {
        if self.controller.config().pagination == table::PaginationMode::Server {
            self.reload();
        } else {
            self.bump();
        }
    }
}
