//! Pagination, sorting and filtering for list endpoints.
//!
//! Pure computation: turns raw query-string values into a validated
//! [`MovieQuery`] and turns a row count into page [`Metadata`]. Nothing here
//! touches the database.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::validation::{permitted_value, FieldErrors};

// ---------------------------------------------------------------------------
// Bounds and defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_SORT: &str = "id";

/// Sort keys accepted by the movie list endpoint. A leading `-` means descending.
pub const MOVIE_SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

/// Sort keys accepted when listing users.
pub const USER_SORT_SAFELIST: &[&str] = &[
    "id", "name", "email", "created_at", "-id", "-name", "-email", "-created_at",
];

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Page window and sort order shared by every list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    /// Record every bound or safelist violation in `errors`.
    pub fn validate(&self, errors: &mut FieldErrors) {
        errors.check(self.page > 0, "page", "must be greater than zero");
        errors.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        errors.check(self.page_size > 0, "page_size", "must be greater than zero");
        errors.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
        errors.check(
            permitted_value(&self.sort.as_str(), self.sort_safelist),
            "sort",
            "invalid sort value",
        );
    }

    /// Column name for the sort key, taken from the safelist rather than
    /// from client input. `None` if the key is not safelisted.
    pub fn sort_column(&self) -> Option<&'static str> {
        self.sort_safelist
            .iter()
            .find(|&&safe| safe == self.sort)
            .map(|&safe| safe.trim_start_matches('-'))
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.page_size)
    }
}

// ---------------------------------------------------------------------------
// Page metadata
// ---------------------------------------------------------------------------

/// Pagination metadata returned alongside a page of results.
///
/// All fields are zero when the query matched nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records <= 0 || page_size <= 0 {
            return Self::default();
        }
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw parameters -> query shape
// ---------------------------------------------------------------------------

/// Raw list query-string values (`?title=&genres=&page=&size=&sort=`).
///
/// Numbers arrive as strings so that a malformed value becomes a field
/// error instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub title: Option<String>,
    pub genres: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

/// Validated, bounded movie list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieQuery {
    /// Free-text match against the title. `None` matches everything.
    pub text: Option<String>,
    /// Every listed genre must be present on a row. Empty matches everything.
    pub genres: Vec<String>,
    pub filters: Filters,
}

impl MovieQuery {
    /// Parse and validate raw parameters, collecting every violation.
    pub fn from_params(params: &ListParams) -> CoreResult<Self> {
        let mut errors = FieldErrors::new();

        let page = read_int(params.page.as_deref(), DEFAULT_PAGE, "page", &mut errors);
        let page_size = read_int(
            params.size.as_deref(),
            DEFAULT_PAGE_SIZE,
            "page_size",
            &mut errors,
        );
        let sort = params
            .sort
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SORT)
            .to_string();

        let filters = Filters {
            page,
            page_size,
            sort,
            sort_safelist: MOVIE_SORT_SAFELIST,
        };
        filters.validate(&mut errors);
        errors.into_result()?;

        Ok(Self {
            text: params
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            genres: read_csv(params.genres.as_deref()),
            filters,
        })
    }

    /// Text predicate as bound into SQL; the empty string disables it.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

fn read_int(raw: Option<&str>, default: i64, field: &str, errors: &mut FieldErrors) -> i64 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(s) => s.parse().unwrap_or_else(|_| {
            errors.add(field, "must be an integer value");
            default
        }),
    }
}

fn read_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|csv| {
        csv.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
