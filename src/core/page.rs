use serde::{Deserialize, Serialize};

use crate::core::GameSummary;

/// Paginated envelope as returned by the catalog API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total matches across all pages
    #[serde(default)]
    pub count: u64,

    #[serde(default)]
    pub next: Option<String>,

    #[serde(default)]
    pub previous: Option<String>,

    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

/// One page of search results, tagged with the page that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<GameSummary>,
    pub page: u32,
}

impl PageResult {
    pub fn from_paginated(page: u32, raw: Paginated<GameSummary>) -> Self {
        Self {
            count: raw.count,
            next: raw.next,
            previous: raw.previous,
            results: raw.results,
            page,
        }
    }

    pub fn empty(page: u32) -> Self {
        Self::from_paginated(page, Paginated::default())
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
