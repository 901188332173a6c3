pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, Result};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable string slots surviving restarts (list page persistence)
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Per-user game lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Favorites,
    Wishlist,
}

impl ListKind {
    /// Table holding this list
    pub fn table(&self) -> &'static str {
        match self {
            ListKind::Favorites => "favorites",
            ListKind::Wishlist => "wishlist",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for ListKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "favorites" | "favourites" | "favorite" => Ok(ListKind::Favorites),
            "wishlist" => Ok(ListKind::Wishlist),
            other => Err(CatalogError::NotFound(format!("list '{}'", other))),
        }
    }
}

/// One game on one user's list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub user_id: String,
    pub game_id: u64,
    pub kind: ListKind,
    pub created_at: DateTime<Utc>,
}

/// Trait for favorites/wishlist persistence
#[async_trait]
pub trait UserListStore: Send + Sync {
    /// Add a game; fails with `AlreadyListed` when present
    async fn add(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<ListEntry>;

    /// Remove a game; `false` when it was not listed
    async fn remove(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<bool>;

    /// All entries of a list, newest first
    async fn list(&self, kind: ListKind, user_id: &str) -> Result<Vec<ListEntry>>;

    async fn contains(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<bool>;
}
