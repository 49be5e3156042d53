use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use types::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub key: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Order two cells for display.
///
/// Nulls go last no matter the direction; the direction only flips the
/// comparison between two non-null values.
pub fn compare(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = compare_present(a, b);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    if let Some(ordering) = a.numeric_cmp(b) {
        return ordering;
    }
    if let (Some(x), Some(y)) = (a.as_bool(), b.as_bool()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_timestamp(), b.as_timestamp()) {
        return x.cmp(&y);
    }
    a.to_string()
        .to_lowercase()
        .cmp(&b.to_string().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_sort_last_in_both_directions() {
        let name = Value::from("a");
        assert_eq!(compare(&Value::Null, &name, SortDirection::Asc), Ordering::Greater);
        assert_eq!(compare(&Value::Null, &name, SortDirection::Desc), Ordering::Greater);
        assert_eq!(compare(&name, &Value::Null, SortDirection::Desc), Ordering::Less);
    }

    #[test]
    fn numbers_compare_numerically() {
        let nine = Value::Number(9.0);
        let ten = Value::Number(10.0);
        assert_eq!(compare(&nine, &ten, SortDirection::Asc), Ordering::Less);
        assert_eq!(compare(&nine, &ten, SortDirection::Desc), Ordering::Greater);
        assert_eq!(
            compare(&Value::Int(9), &ten, SortDirection::Asc),
            Ordering::Less
        );
    }

    #[test]
    fn large_integer_ids_keep_their_order() {
        let low = Value::Int(9_007_199_254_740_992);
        let high = Value::Int(9_007_199_254_740_993);
        assert_eq!(compare(&low, &high, SortDirection::Asc), Ordering::Less);
    }

    #[test]
    fn dates_compare_by_instant() {
        // Lexically "2024-01-02T00:00:00+05:00" sorts after the other one.
        let later = Value::from("2024-01-01T23:00:00Z");
        let earlier = Value::from("2024-01-02T00:00:00+05:00");
        assert_eq!(compare(&earlier, &later, SortDirection::Asc), Ordering::Less);
    }

    #[test]
    fn strings_ignore_case() {
        let lower = Value::from("alice");
        let upper = Value::from("Bob");
        assert_eq!(compare(&lower, &upper, SortDirection::Asc), Ordering::Less);
        assert_eq!(
            compare(&Value::from("ALICE"), &lower, SortDirection::Asc),
            Ordering::Equal
        );
    }

    #[test]
    fn booleans_put_false_first() {
        assert_eq!(
            compare(&Value::Bool(false), &Value::Bool(true), SortDirection::Asc),
            Ordering::Less
        );
    }
}
