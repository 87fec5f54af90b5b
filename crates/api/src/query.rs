//! Query-string parsing for list endpoints.
//!
//! Values arrive as raw strings so malformed numbers become field errors
//! alongside the range and safelist checks instead of an opaque 400.

use greenlight_core::filters::{Filters, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use greenlight_core::validator::FieldErrors;
use serde::Deserialize;

/// Query parameters for `GET /movies`.
#[derive(Debug, Default, Deserialize)]
pub struct ListMoviesParams {
    pub title: Option<String>,
    /// Comma-separated genre list.
    pub genres: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

impl ListMoviesParams {
    /// Title filter, empty when absent.
    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_default()
    }

    /// Genre filter split on commas, empty when absent.
    pub fn genres(&self) -> Vec<String> {
        read_csv(self.genres.as_deref())
    }

    /// Paging and sorting input with defaults applied.
    ///
    /// Unparseable numbers are recorded in `errors` and replaced by defaults.
    pub fn filters(&self, errors: &mut FieldErrors, default_sort: &str) -> Filters {
        Filters {
            page: read_int(self.page.as_deref(), DEFAULT_PAGE, "page", errors),
            page_size: read_int(
                self.page_size.as_deref(),
                DEFAULT_PAGE_SIZE,
                "page_size",
                errors,
            ),
            sort: self
                .sort
                .clone()
                .unwrap_or_else(|| default_sort.to_string()),
        }
    }
}

/// Parse an optional integer parameter, recording a field error on failure.
pub fn read_int(value: Option<&str>, default: i64, key: &str, errors: &mut FieldErrors) -> i64 {
    match value {
        None | Some("") => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            errors.add(key, "must be an integer value");
            default
        }),
    }
}

/// Split a comma-separated parameter, dropping empty entries.
pub fn read_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
