use std::ops::Range;

use jiff::civil::Date;
use types::{Row, Value};

use crate::sort::{self, Sort};

/// Restricts a table to rows whose `field` equals `value`, e.g. active users
/// only.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTag {
    pub field: String,
    pub value: Value,
}

impl FilterTag {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches<R: Row>(&self, row: &R) -> bool {
        row.field(&self.field) == self.value
    }
}

/// Inclusive calendar bounds on a date-valued field. Rows whose field is not
/// a date fall outside every range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub field: String,
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl DateRange {
    pub fn contains<R: Row>(&self, row: &R) -> bool {
        let Some(date) = row.field(&self.field).as_date() else {
            return false;
        };
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// The user-driven view parameters.
#[derive(Debug, Clone)]
pub(crate) struct View {
    pub query: String,
    pub sort: Option<Sort>,
    pub tag: Option<FilterTag>,
    pub date_range: Option<DateRange>,
    pub page: usize,
    pub page_size: usize,
}

impl View {
    pub fn new(page_size: usize, sort: Option<Sort>) -> Self {
        Self {
            query: String::new(),
            sort,
            tag: None,
            date_range: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Tag, date range and query filters, then a stable sort.
    pub fn filter_and_sort<'a, R: Row>(&self, items: &'a [R], searchable: &[String]) -> Vec<&'a R> {
        let needle = self.query.trim().to_lowercase();

        let rows = items
            .iter()
            .filter(|row| self.tag.as_ref().is_none_or(|tag| tag.matches(*row)))
            .filter(|row| self.date_range.as_ref().is_none_or(|range| range.contains(*row)))
            .filter(|row| needle.is_empty() || matches_query(*row, searchable, &needle));

        let Some(Sort { key, direction }) = &self.sort else {
            return rows.collect();
        };

        let mut keyed: Vec<(Value, &R)> = rows.map(|row| (row.field(key), row)).collect();
        keyed.sort_by(|(a, _), (b, _)| sort::compare(a, b, *direction));
        keyed.into_iter().map(|(_, row)| row).collect()
    }

    pub fn page_count(&self, filtered: usize) -> usize {
        filtered.div_ceil(self.page_size).max(1)
    }

    pub fn clamp_page(&mut self, filtered: usize) {
        self.page = self.page.clamp(1, self.page_count(filtered));
    }

    pub fn page_range(&self, len: usize) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }
}

fn matches_query<R: Row>(row: &R, searchable: &[String], needle: &str) -> bool {
    searchable
        .iter()
        .any(|field| row.field(field).to_string().to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use types::Record;

    use super::*;

    fn people() -> Vec<Record> {
        vec![
            Record::new().with("id", 1i64).with("name", "Alice").with("team", "Red"),
            Record::new().with("id", 2i64).with("name", "bob").with("team", "Blue"),
            Record::new().with("id", 3i64).with("name", "Carol").with("team", "red"),
        ]
    }

    fn ids(rows: &[&Record]) -> Vec<String> {
        rows.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn query_is_case_insensitive_substring() {
        let mut view = View::new(10, None);
        view.query = "  RED ".into();
        let items = people();
        let rows = view.filter_and_sort(&items, &["team".to_string()]);
        assert_eq!(ids(&rows), ["1", "3"]);
    }

    #[test]
    fn query_only_searches_configured_fields() {
        let mut view = View::new(10, None);
        view.query = "red".into();
        let items = people();
        let rows = view.filter_and_sort(&items, &["name".to_string()]);
        assert!(rows.is_empty());
    }

    #[test]
    fn tag_filters_before_search() {
        let mut view = View::new(10, None);
        view.tag = Some(FilterTag::new("team", "Red"));
        let items = people();
        let rows = view.filter_and_sort(&items, &[]);
        assert_eq!(ids(&rows), ["1"]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let items = vec![
            Record::new().with("id", "a").with("due", "2024-01-01"),
            Record::new().with("id", "b").with("due", "2024-01-15T10:00:00Z"),
            Record::new().with("id", "c").with("due", "2024-02-01"),
            Record::new().with("id", "d").with("due", "soon"),
        ];
        let mut view = View::new(10, None);
        view.date_range = Some(DateRange {
            field: "due".into(),
            from: Some(jiff::civil::date(2024, 1, 1)),
            to: Some(jiff::civil::date(2024, 1, 31)),
        });

        let rows = view.filter_and_sort(&items, &[]);
        assert_eq!(ids(&rows), ["a", "b"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut view = View::new(10, Some(Sort::asc("team")));
        let items = people();
        let rows = view.filter_and_sort(&items, &[]);
        assert_eq!(ids(&rows), ["2", "1", "3"]);

        view.sort = Some(Sort::desc("team"));
        let rows = view.filter_and_sort(&items, &[]);
        assert_eq!(ids(&rows), ["1", "3", "2"]);
    }

    #[test]
    fn page_count_is_at_least_one() {
        let view = View::new(10, None);
        assert_eq!(view.page_count(0), 1);
        assert_eq!(view.page_count(10), 1);
        assert_eq!(view.page_count(11), 2);
    }

    #[test]
    fn page_range_slices_the_current_page() {
        let mut view = View::new(2, None);
        view.page = 2;
        assert_eq!(view.page_range(5), 2..4);
        view.page = 3;
        assert_eq!(view.page_range(5), 4..5);
    }

    #[test]
    fn clamp_keeps_page_in_bounds() {
        let mut view = View::new(2, None);
        view.page = 9;
        view.clamp_page(5);
        assert_eq!(view.page, 3);
        view.page = 0;
        view.clamp_page(0);
        assert_eq!(view.page, 1);
    }
}
