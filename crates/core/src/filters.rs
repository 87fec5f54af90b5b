//! Paging and sorting for list endpoints.
//!
//! Client-supplied `page`, `page_size` and `sort` values are validated
//! against fixed bounds and a per-endpoint sort safelist, then turned into
//! a [`PageRequest`] the storage layer can use without further checks.
//! Nothing here touches shared state; the safelist is always passed in.

use serde::Serialize;

use crate::error::CoreError;
use crate::validator::{permitted_value, FieldErrors};

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Highest page number a client may request.
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page used when the client omits `page`.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the client omits `page_size`.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Raw paging and sorting input for a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    /// Column name, optionally prefixed with `-` for descending order.
    pub sort: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A sort key that has been checked against the endpoint's safelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Bare column name with any `-` prefix removed.
    pub column: String,
    pub direction: SortDirection,
}

/// Validated bounds and ordering handed to the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
    pub sort: SortSpec,
}

/// Pagination summary returned alongside a page of results.
///
/// The all-zero value means "no results"; zero fields are omitted when
/// serialized, so it encodes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Record every paging/sorting problem in `errors`.
///
/// `sort` must match a safelist entry exactly, including any `-` prefix.
pub fn validate_filters(errors: &mut FieldErrors, filters: &Filters, safelist: &[&str]) {
    errors.check(filters.page > 0, "page", "must be greater than zero");
    errors.check(
        filters.page <= MAX_PAGE,
        "page",
        "must be a maximum of 10 million",
    );
    errors.check(filters.page_size > 0, "page_size", "must be greater than zero");
    errors.check(
        filters.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    errors.check(
        permitted_value(filters.sort.as_str(), safelist),
        "sort",
        "invalid sort value",
    );
}

impl Filters {
    /// Resolve the sort key into a column and direction.
    ///
    /// Fails with [`CoreError::ContractViolation`] if the key is not in the
    /// safelist; a validated request never reaches that branch.
    pub fn sort_column(&self, safelist: &[&str]) -> Result<SortSpec, CoreError> {
        if !permitted_value(self.sort.as_str(), safelist) {
            return Err(CoreError::ContractViolation(format!(
                "unsafe sort parameter: {}",
                self.sort
            )));
        }

        let (column, direction) = match self.sort.strip_prefix('-') {
            Some(bare) => (bare, SortDirection::Desc),
            None => (self.sort.as_str(), SortDirection::Asc),
        };

        Ok(SortSpec {
            column: column.to_string(),
            direction,
        })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Bundle limit, offset and resolved sort for the storage layer.
    pub fn page_request(&self, safelist: &[&str]) -> Result<PageRequest, CoreError> {
        Ok(PageRequest {
            limit: self.limit(),
            offset: self.offset(),
            sort: self.sort_column(safelist)?,
        })
    }
}

/// Derive pagination metadata from the total number of matching rows.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SAFELIST: &[&str] = &["id", "title", "year", "-id", "-title", "-year"];

    fn filters(page: i64, page_size: i64, sort: &str) -> Filters {
        Filters {
            page,
            page_size,
            sort: sort.to_string(),
        }
    }

    fn errors_for(f: &Filters) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validate_filters(&mut errors, f, SAFELIST);
        errors
    }

    // -- validate_filters ----------------------------------------------------

    #[test]
    fn valid_filters_pass() {
        assert!(errors_for(&filters(1, 20, "-year")).is_empty());
        assert!(errors_for(&filters(MAX_PAGE, MAX_PAGE_SIZE, "id")).is_empty());
    }

    #[test]
    fn zero_page_is_rejected() {
        let errors = errors_for(&filters(0, 20, "id"));
        assert_eq!(errors.get("page"), Some("must be greater than zero"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn page_above_ten_million_is_rejected() {
        let errors = errors_for(&filters(MAX_PAGE + 1, 20, "id"));
        assert_eq!(errors.get("page"), Some("must be a maximum of 10 million"));
    }

    #[test]
    fn oversized_page_size_is_rejected() {
        let errors = errors_for(&filters(1, 101, "id"));
        assert_eq!(errors.get("page_size"), Some("must be a maximum of 100"));
    }

    #[test]
    fn negative_page_size_is_rejected() {
        let errors = errors_for(&filters(1, -5, "id"));
        assert_eq!(errors.get("page_size"), Some("must be greater than zero"));
    }

    #[test]
    fn unknown_sort_key_is_rejected() {
        let errors = errors_for(&filters(1, 20, "budget"));
        assert_eq!(errors.get("sort"), Some("invalid sort value"));
    }

    #[test]
    fn sort_match_is_exact() {
        assert!(errors_for(&filters(1, 20, "Title")).get("sort").is_some());
        assert!(errors_for(&filters(1, 20, "--id")).get("sort").is_some());
        assert!(errors_for(&filters(1, 20, " id")).get("sort").is_some());
    }

    #[test]
    fn all_violations_reported_together() {
        let errors = errors_for(&filters(0, 101, "budget"));
        assert_eq!(errors.len(), 3);
        assert!(errors.get("page").is_some());
        assert!(errors.get("page_size").is_some());
        assert!(errors.get("sort").is_some());
    }

    // -- sort_column ---------------------------------------------------------

    #[test]
    fn descending_prefix_is_stripped() {
        let sort = filters(1, 20, "-year").sort_column(SAFELIST).unwrap();
        assert_eq!(sort.column, "year");
        assert_eq!(sort.direction, SortDirection::Desc);
        assert_eq!(sort.direction.as_sql(), "DESC");
    }

    #[test]
    fn bare_key_sorts_ascending() {
        let sort = filters(1, 20, "title").sort_column(SAFELIST).unwrap();
        assert_eq!(sort.column, "title");
        assert_eq!(sort.direction.as_sql(), "ASC");
    }

    #[test]
    fn unsafelisted_key_is_a_contract_violation() {
        let result = filters(1, 20, "budget; DROP TABLE movies").sort_column(SAFELIST);
        assert_matches!(result, Err(CoreError::ContractViolation(_)));
    }

    // -- bounds --------------------------------------------------------------

    #[test]
    fn first_page_has_zero_offset() {
        let f = filters(1, 20, "id");
        assert_eq!(f.limit(), 20);
        assert_eq!(f.offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(filters(3, 25, "id").offset(), 50);
        assert_eq!(filters(MAX_PAGE, MAX_PAGE_SIZE, "id").offset(), 999_999_900);
    }

    #[test]
    fn bounds_hold_across_valid_range() {
        for page in [1, 2, 17, 9_999, MAX_PAGE] {
            for page_size in [1, 7, 50, MAX_PAGE_SIZE] {
                let f = filters(page, page_size, "id");
                assert_eq!(f.limit(), page_size);
                assert_eq!(f.offset(), (page - 1) * page_size);
                assert!(f.offset() >= 0);
            }
        }
    }

    #[test]
    fn page_request_bundles_everything() {
        let request = filters(2, 10, "-title").page_request(SAFELIST).unwrap();
        assert_eq!(request.limit, 10);
        assert_eq!(request.offset, 10);
        assert_eq!(request.sort.column, "title");
        assert_eq!(request.sort.direction, SortDirection::Desc);
    }

    // -- calculate_metadata --------------------------------------------------

    #[test]
    fn partial_last_page_rounds_up() {
        let meta = calculate_metadata(21, 1, 20);
        assert_eq!(meta.last_page, 2);
        assert_eq!(meta.first_page, 1);
        assert_eq!(meta.current_page, 1);
        assert_eq!(meta.page_size, 20);
        assert_eq!(meta.total_records, 21);
    }

    #[test]
    fn exact_multiple_does_not_round_up() {
        assert_eq!(calculate_metadata(20, 1, 20).last_page, 1);
        assert_eq!(calculate_metadata(1, 1, 1).last_page, 1);
        assert_eq!(calculate_metadata(1_000_001, 4, 100).last_page, 10_001);
    }

    #[test]
    fn zero_records_yield_empty_metadata() {
        let meta = calculate_metadata(0, 1, 20);
        assert_eq!(meta, Metadata::default());
        assert_eq!(meta.last_page, 0);
        assert_eq!(serde_json::to_value(meta).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn metadata_serializes_snake_case_fields() {
        let json = serde_json::to_value(calculate_metadata(45, 2, 20)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "current_page": 2,
                "page_size": 20,
                "first_page": 1,
                "last_page": 3,
                "total_records": 45,
            })
        );
    }
}
