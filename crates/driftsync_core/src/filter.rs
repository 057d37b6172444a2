//! Change-detection filters and sort specifications.

use crate::timestamp::Timestamp;
use serde_json::Value;
use std::cmp::Ordering;

/// A predicate selecting documents from a store.
///
/// Filters are evaluated store-side. The change-detection filter produced
/// by [`Store::sync_filter`](crate::Store::sync_filter) selects documents
/// whose last-updated value is strictly newer than a high-water mark.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Matches documents whose named field normalizes to a timestamp
    /// strictly after `after`.
    NewerThan {
        /// Field holding the raw last-updated value.
        field: String,
        /// Exclusive lower bound.
        after: Timestamp,
    },
}

impl Filter {
    /// Builds a strictly-newer-than filter on the given field.
    pub fn newer_than(field: impl Into<String>, after: Timestamp) -> Self {
        Self::NewerThan {
            field: field.into(),
            after,
        }
    }

    /// Returns true for the match-all filter.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// A single-field sort instruction for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort on.
    pub field: String,
    /// Sort direction.
    pub order: SortOrder,
}

impl SortSpec {
    /// Ascending sort on the given field.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    /// Descending sort on the given field.
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }
}

/// Total order over dynamically typed field values.
///
/// Values of different kinds order by kind: null < bool < number < string
/// < array < object. Numbers compare numerically; NaN sorts below every
/// other number. Arrays compare element-wise, objects by length only.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn kind(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NEG_INFINITY);
            let y = y.as_f64().unwrap_or(f64::NEG_INFINITY);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (xv, yv) in x.iter().zip(y.iter()) {
                let ord = compare_values(xv, yv);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
        _ => kind(a).cmp(&kind(b)),
    }
}
