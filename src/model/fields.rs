//! Reading decoded payload fields and shared text checks.

use crate::codec::{FlatMap, DATE_FORMAT, NULL_SENTINEL};
use crate::error::ValidationError;
use crate::validation::is_blank;
use chrono::{Local, NaiveDate};
use std::str::FromStr;

/// Typed access to a [`FlatMap`]. Unparsable scalars read as absent.
pub(crate) trait Fields {
    /// Raw text; `None` when the key is missing or holds the `null` sentinel.
    fn text(&self, key: &str) -> Option<&str>;

    fn parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.text(key)?;
        let value = raw.trim().parse().ok();
        if value.is_none() {
            tracing::debug!(field = key, value = raw, "ignoring unparsable value");
        }
        value
    }

    fn date(&self, key: &str) -> Option<NaiveDate> {
        let raw = self.text(key)?;
        let value = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok();
        if value.is_none() {
            tracing::debug!(field = key, value = raw, "ignoring unparsable date");
        }
        value
    }

    fn flag(&self, key: &str) -> Option<bool> {
        match self.text(key)?.trim() {
            t if t.eq_ignore_ascii_case("true") => Some(true),
            t if t.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }
}

impl Fields for FlatMap {
    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str).filter(|v| *v != NULL_SENTINEL)
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Trimmed, non-blank, at most `max` characters.
pub(crate) fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    if is_blank(value) {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    let trimmed = value.trim();
    if trimmed.chars().count() > max {
        return Err(ValidationError::new(field, format!("must be at most {} characters", max)));
    }
    Ok(trimmed.to_string())
}

/// Like [`required_text`] but absent or blank input yields `None`.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value {
        Some(v) if !is_blank(v) => required_text(field, v, max).map(Some),
        _ => Ok(None),
    }
}

pub(crate) fn positive_id(field: &'static str, id: Option<i32>) -> Result<Option<i32>, ValidationError> {
    match id {
        Some(n) if n <= 0 => Err(ValidationError::new(field, "must be positive")),
        other => Ok(other),
    }
}

pub(crate) fn not_future(field: &'static str, date: Option<NaiveDate>) -> Result<Option<NaiveDate>, ValidationError> {
    match date {
        Some(d) if d > today() => Err(ValidationError::new(field, "must not be in the future")),
        other => Ok(other),
    }
}
