// src/docstore/filter.rs

use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;

use super::Document;
use crate::error::{AppError, AppResult};

/// Document predicate, evaluated field by field.
#[derive(Debug, Clone)]
pub enum Filter {
    All,
    Eq(String, Value),
    In(String, Vec<Value>),
    Gte(String, Value),
    Regex(String, Regex),
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn is_in<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(field.to_string(), values.into_iter().map(Into::into).collect())
    }

    pub fn gte(field: &str, value: impl Into<Value>) -> Self {
        Filter::Gte(field.to_string(), value.into())
    }

    /// Case-insensitive substring match; `fragment` is taken literally.
    pub fn contains_ci(field: &str, fragment: &str) -> AppResult<Self> {
        let regex = Regex::new(&contains_pattern(fragment))
            .map_err(|e| AppError::Document(format!("invalid pattern: {}", e)))?;
        Ok(Filter::Regex(field.to_string(), regex))
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, expected) => doc
                .get(field)
                .map_or(false, |actual| values_equal(actual, expected)),
            Filter::In(field, options) => doc
                .get(field)
                .map_or(false, |actual| options.iter().any(|o| values_equal(actual, o))),
            Filter::Gte(field, bound) => doc
                .get(field)
                .and_then(|actual| compare_values(actual, bound))
                .map_or(false, |ord| ord != Ordering::Less),
            Filter::Regex(field, regex) => doc
                .get(field)
                .and_then(Value::as_str)
                .map_or(false, |text| regex.is_match(text)),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
        }
    }
}

/// Pattern matching `fragment` literally anywhere in a value, with Unicode
/// case folding. The relational `REGEXP` function evaluates the same pattern.
pub fn contains_pattern(fragment: &str) -> String {
    format!("(?i){}", regex::escape(fragment))
}

/// Numbers compare by value regardless of integer/float representation.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Ordering between two scalars of the same kind. Mixed kinds are unordered.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
