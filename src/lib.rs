//! # Game Catalog Engine
//!
//! Backend for a game catalog site:
//! - Debounced, paginated game search over RAWG (last request wins)
//! - Game detail pages with screenshots, Reddit posts and Twitch streams
//! - Per-user favorites and wishlist in SQLite
//! - Multiple interfaces: Rust library, HTTP API, CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use game_catalog_engine::{AppConfig, CatalogEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = CatalogEngine::from_config(&AppConfig::from_env()).await?;
//!
//!     let mut list = engine.spawn_list().await;
//!     list.set_search_text("zelda");
//!     list.set_year_filter("2017");
//!
//!     if let Some(view) = list.wait_until(|v| !v.is_loading && v.query.is_some()).await {
//!         println!("{} games, page {}/{:?}", view.count.unwrap_or(0), view.page, view.total_pages);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod core;
pub mod engine;
pub mod error;
pub mod providers;
pub mod storage;

// Re-export primary types
pub use config::AppConfig;
pub use controller::{ControllerConfig, ListController, ListHandle, ListView};
pub use crate::core::{FilterState, FilterValue, GameDetails, GameSummary, PageResult, QueryKey};
pub use engine::{CatalogEngine, GamePage, ListState};
pub use error::{CatalogError, Result};
pub use storage::{KeyValueStore, ListKind, UserListStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
