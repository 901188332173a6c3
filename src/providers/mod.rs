pub mod rawg;
pub mod twitch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{
    GameDetails, Genre, PageResult, Paginated, Platform, QueryKey, RedditPost, Screenshot,
    TwitchGame, TwitchStream,
};
use crate::error::Result;

pub use rawg::RawgProvider;
pub use twitch::TwitchProvider;

/// Arguments of one paginated search; empty strings mean "unconstrained"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub page: u32,
    pub page_size: u32,
    pub search: String,
    pub platforms: String,
    pub genres: String,
    pub dates: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            search: String::new(),
            platforms: String::new(),
            genres: String::new(),
            dates: String::new(),
        }
    }
}

impl From<&QueryKey> for SearchParams {
    fn from(key: &QueryKey) -> Self {
        Self {
            page: key.page,
            page_size: key.page_size,
            search: key.search.clone(),
            platforms: key.platforms.clone(),
            genres: key.genres.clone(),
            dates: key.dates.clone(),
        }
    }
}

/// Trait for game-metadata catalogs (RAWG)
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// One page of games matching the filters
    async fn search_games(&self, params: &SearchParams) -> Result<PageResult>;

    /// Full record for one game
    async fn game(&self, id: u64) -> Result<GameDetails>;

    async fn screenshots(&self, id: u64) -> Result<Vec<Screenshot>>;

    async fn reddit_posts(&self, id: u64) -> Result<Paginated<RedditPost>>;

    async fn genres(&self) -> Result<Vec<Genre>>;

    async fn platforms(&self) -> Result<Vec<Platform>>;

    /// Get provider name
    fn name(&self) -> &str;
}

/// Trait for live-stream directories (Twitch)
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Directory games whose name matches exactly
    async fn search_games(&self, name: &str) -> Result<Vec<TwitchGame>>;

    /// Live streams for a directory game id
    async fn streams(&self, game_id: &str) -> Result<Vec<TwitchStream>>;

    /// Get provider name
    fn name(&self) -> &str;
}
