//! Filter state and the query key derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single list filter: either unconstrained or one concrete value
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterValue {
    #[default]
    All,
    Only(String),
}

impl FilterValue {
    /// Parse user input; empty and "all" (any case) mean no constraint
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            FilterValue::All
        } else {
            FilterValue::Only(trimmed.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FilterValue::All)
    }

    /// Upstream query argument: empty string when unconstrained
    pub fn as_param(&self) -> &str {
        match self {
            FilterValue::All => "",
            FilterValue::Only(value) => value,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(raw: &str) -> Self {
        FilterValue::parse(raw)
    }
}

impl From<String> for FilterValue {
    fn from(raw: String) -> Self {
        FilterValue::parse(&raw)
    }
}

impl From<Option<String>> for FilterValue {
    fn from(raw: Option<String>) -> Self {
        raw.map(FilterValue::from).unwrap_or_default()
    }
}

impl From<FilterValue> for String {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::All => "all".to_string(),
            FilterValue::Only(value) => value,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::All => f.write_str("all"),
            FilterValue::Only(value) => f.write_str(value),
        }
    }
}

/// Date range argument for a year filter: `"<year>-01-01,<year>-12-31"`, or empty
pub fn date_range(year: &FilterValue) -> String {
    match year {
        FilterValue::All => String::new(),
        FilterValue::Only(year) => format!("{year}-01-01,{year}-12-31"),
    }
}

/// User-editable search/filter inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub year: FilterValue,
    pub genre: FilterValue,
    pub platform: FilterValue,
}

impl FilterState {
    pub fn date_range(&self) -> String {
        date_range(&self.year)
    }

    /// Compose the key for one page of this filter combination
    pub fn key(&self, page: u32, page_size: u32) -> QueryKey {
        QueryKey {
            search: self.search.trim().to_string(),
            genres: self.genre.as_param().to_string(),
            platforms: self.platform.as_param().to_string(),
            dates: self.date_range(),
            page,
            page_size,
        }
    }
}

/// Everything that determines one upstream search request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    pub search: String,
    pub genres: String,
    pub platforms: String,
    pub dates: String,
    pub page: u32,
    pub page_size: u32,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "search={:?} genres={:?} platforms={:?} dates={:?} page={} size={}",
            self.search, self.genres, self.platforms, self.dates, self.page, self.page_size
        )
    }
}
