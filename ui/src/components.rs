use dioxus::prelude::*;
use table::{Column, LoadStatus, Sort, SortDirection};
use types::Error;

use crate::TableRow;

#[component]
pub fn DataTable(
    columns: Vec<Column>,
    rows: Vec<TableRow>,
    sort: Option<Sort>,
    on_sort: EventHandler<String>,
    #[props(default)] empty_message: Option<String>,
) -> Element {
    let empty_message = empty_message.unwrap_or_else(|| "Nothing to show.".to_string());
    let span = columns.len().to_string();

    rsx! {
        div { class: "table-container",
            table {
                thead {
                    tr {
                        for column in columns {
                            {
                                let indicator = sort_indicator(sort.as_ref(), &column.key);
                                let key = column.key.clone();
                                rsx! {
                                    th {
                                        class: "sortable",
                                        onclick: move |_| on_sort.call(key.clone()),
                                        "{column.label}"
                                        if let Some(indicator) = indicator {
                                            span { class: "sort-indicator", "{indicator}" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                tbody {
                    if rows.is_empty() {
                        tr {
                            td { class: "text-muted", colspan: "{span}", "{empty_message}" }
                        }
                    }
                    for row in rows {
                        tr {
                            key: "{row.key}",
                            class: if row.pending { "pending" },
                            for cell in row.cells.iter() {
                                td { "{cell}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn sort_indicator(sort: Option<&Sort>, key: &str) -> Option<&'static str> {
    match sort {
        Some(sort) if sort.key == key => Some(match sort.direction {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }),
        _ => None,
    }
}

#[component]
pub fn SearchBox(
    value: String,
    on_search: EventHandler<String>,
    #[props(default)] placeholder: Option<String>,
) -> Element {
    let placeholder = placeholder.unwrap_or_else(|| "Search...".to_string());

    rsx! {
        input {
            class: "form-input search-box",
            r#type: "search",
            placeholder: "{placeholder}",
            value: "{value}",
            oninput: move |e| on_search.call(e.value()),
        }
    }
}

#[component]
pub fn Pager(page: usize, page_count: usize, on_page: EventHandler<usize>) -> Element {
    rsx! {
        div { class: "pager",
            button {
                class: "btn btn-secondary",
                disabled: page <= 1,
                onclick: move |_| on_page.call(page.saturating_sub(1)),
                "Previous"
            }
            for number in page_window(page, page_count) {
                button {
                    class: if number == page { "btn btn-primary" } else { "btn btn-secondary" },
                    onclick: move |_| on_page.call(number),
                    "{number}"
                }
            }
            button {
                class: "btn btn-secondary",
                disabled: page >= page_count,
                onclick: move |_| on_page.call(page + 1),
                "Next"
            }
        }
    }
}

/// Page buttons to show: at most `WINDOW` numbers centred on `page`.
fn page_window(page: usize, page_count: usize) -> std::ops::RangeInclusive<usize> {
    const WINDOW: usize = 5;

    let page_count = page_count.max(1);
    let page = page.clamp(1, page_count);
    let start = page
        .saturating_sub(WINDOW / 2)
        .clamp(1, page_count.saturating_sub(WINDOW - 1).max(1));
    let end = (start + WINDOW - 1).min(page_count);
    start..=end
}

#[component]
pub fn LoadState(status: LoadStatus, error: Option<Error>) -> Element {
    match (status, error) {
        (LoadStatus::Loading, _) => rsx! {
            div { class: "loading", "Loading..." }
        },
        (_, Some(error)) => {
            let message = banner_text(&error);
            rsx! {
                div { class: "error-banner",
                    span { class: "error-message", "{message}" }
                }
            }
        }
        _ => rsx! {},
    }
}

/// Remote failures may clear up on retry; local ones will not.
fn banner_text(error: &Error) -> String {
    if error.is_remote() {
        format!("Could not load data, showing the last rows received. {error}")
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_stays_inside_the_page_range() {
        assert_eq!(page_window(1, 1), 1..=1);
        assert_eq!(page_window(1, 3), 1..=3);
        assert_eq!(page_window(1, 20), 1..=5);
        assert_eq!(page_window(10, 20), 8..=12);
        assert_eq!(page_window(20, 20), 16..=20);
        assert_eq!(page_window(0, 0), 1..=1);
    }

    #[test]
    fn banner_mentions_stale_rows_for_remote_failures() {
        let remote = banner_text(&Error::server(502, "bad gateway"));
        assert!(remote.starts_with("Could not load data"));
        assert!(remote.ends_with("server returned 502: bad gateway"));

        assert_eq!(
            banner_text(&Error::Disposed),
            "controller has been disposed"
        );
    }

    #[test]
    fn only_the_sorted_column_gets_an_indicator() {
        let sort = Sort::desc("name");
        assert_eq!(sort_indicator(Some(&sort), "name"), Some("▼"));
        assert_eq!(sort_indicator(Some(&sort), "mail"), None);
        assert_eq!(sort_indicator(None, "name"), None);
    }
}
