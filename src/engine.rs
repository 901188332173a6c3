use chrono::Datelike;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio::task::JoinSet;

use crate::config::AppConfig;
use crate::controller::{ControllerConfig, ListController, ListHandle};
use crate::core::{
    GameDetails, Genre, PageResult, Platform, RedditPost, Screenshot, TwitchStream,
};
use crate::error::{CatalogError, Result};
use crate::providers::{CatalogProvider, RawgProvider, SearchParams, StreamProvider, TwitchProvider};
use crate::storage::{KeyValueStore, ListEntry, ListKind, SqliteStore, UserListStore};

/// Main orchestrator: catalog + streams + storage
pub struct CatalogEngine {
    catalog: Arc<dyn CatalogProvider>,
    streams: Option<Arc<dyn StreamProvider>>,
    pages: Arc<dyn KeyValueStore>,
    lists: Arc<dyn UserListStore>,
    controller: ControllerConfig,
    genres: OnceCell<Vec<Genre>>,
    platforms: OnceCell<Vec<Platform>>,
}

/// Everything shown on a game detail page
#[derive(Debug, Clone, Serialize)]
pub struct GamePage {
    pub game: GameDetails,
    pub screenshots: Vec<Screenshot>,
    pub reddit_posts: Vec<RedditPost>,
    pub streams: Vec<TwitchStream>,
}

/// Membership of one game in a user's lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListState {
    pub favorite: bool,
    pub wishlisted: bool,
}

/// Selectable value for a filter drop-down
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

/// Number of past years offered by the year filter
pub const YEAR_OPTIONS: i32 = 40;

impl CatalogEngine {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        streams: Option<Arc<dyn StreamProvider>>,
        pages: Arc<dyn KeyValueStore>,
        lists: Arc<dyn UserListStore>,
        controller: ControllerConfig,
    ) -> Self {
        Self {
            catalog,
            streams,
            pages,
            lists,
            controller,
            genres: OnceCell::new(),
            platforms: OnceCell::new(),
        }
    }

    /// Build the engine with RAWG, Twitch (when configured) and SQLite storage
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        if config.rawg_api_key.is_empty() {
            tracing::warn!("RAWG_API_KEY is empty; catalog requests will be rejected upstream");
        }

        let catalog = Arc::new(RawgProvider::new(
            &config.rawg_base_url,
            &config.rawg_api_key,
            config.http_timeout(),
        )?);

        let streams: Option<Arc<dyn StreamProvider>> = if config.twitch_enabled() {
            tracing::info!("✅ Twitch streams enabled");
            Some(Arc::new(TwitchProvider::new(
                &config.twitch_base_url,
                &config.twitch_auth_url,
                &config.twitch_client_id,
                &config.twitch_client_secret,
                config.http_timeout(),
            )?))
        } else {
            tracing::warn!("⚠️ Twitch credentials missing, game pages will have no streams");
            None
        };

        let store = Arc::new(SqliteStore::new(&config.db_path).await?);

        Ok(Self::new(
            catalog,
            streams,
            store.clone(),
            store,
            config.controller(),
        ))
    }

    /// Start a list controller bound to this engine's catalog and page store
    pub async fn spawn_list(&self) -> ListHandle {
        ListController::spawn(
            Arc::clone(&self.catalog),
            Arc::clone(&self.pages),
            self.controller.clone(),
        )
        .await
    }

    /// One-shot search without debouncing
    pub async fn search(&self, params: &SearchParams) -> Result<PageResult> {
        self.catalog.search_games(params).await
    }

    /// Details, screenshots, Reddit posts and live streams for one game
    pub async fn game_page(&self, id: u64) -> Result<GamePage> {
        let (game, screenshots, reddit) = tokio::try_join!(
            self.catalog.game(id),
            self.catalog.screenshots(id),
            self.catalog.reddit_posts(id),
        )?;

        let streams = self.live_streams(game.name()).await;
        tracing::debug!(
            id,
            screenshots = screenshots.len(),
            posts = reddit.results.len(),
            streams = streams.len(),
            "assembled game page"
        );

        Ok(GamePage {
            game,
            screenshots,
            reddit_posts: reddit.results,
            streams,
        })
    }

    /// Live streams for a game name; empty on any stream provider failure
    pub async fn live_streams(&self, game_name: &str) -> Vec<TwitchStream> {
        let Some(streams) = &self.streams else {
            return Vec::new();
        };

        let directory = match streams.search_games(game_name).await {
            Ok(games) => games,
            Err(e) => {
                tracing::warn!("Provider {} failed: {}", streams.name(), e);
                return Vec::new();
            }
        };

        let Some(first) = directory.first() else {
            return Vec::new();
        };

        match streams.streams(&first.id).await {
            Ok(live) => live,
            Err(e) => {
                tracing::warn!("Provider {} failed: {}", streams.name(), e);
                Vec::new()
            }
        }
    }

    /// Genre filter options, fetched once per engine
    pub async fn genres(&self) -> Result<Vec<Genre>> {
        self.genres
            .get_or_try_init(|| self.catalog.genres())
            .await
            .cloned()
    }

    /// Platform filter options, fetched once per engine
    pub async fn platforms(&self) -> Result<Vec<Platform>> {
        self.platforms
            .get_or_try_init(|| self.catalog.platforms())
            .await
            .cloned()
    }

    /// "All Years" followed by the last [`YEAR_OPTIONS`] years, newest first
    pub fn year_options(current_year: i32) -> Vec<FilterOption> {
        std::iter::once(FilterOption {
            value: "all".to_string(),
            label: "All Years".to_string(),
        })
        .chain((0..YEAR_OPTIONS).map(|offset| {
            let year = (current_year - offset).to_string();
            FilterOption {
                value: year.clone(),
                label: year,
            }
        }))
        .collect()
    }

    /// Year options relative to today
    pub fn current_year_options() -> Vec<FilterOption> {
        Self::year_options(chrono::Utc::now().year())
    }

    pub async fn add_to_list(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<ListEntry> {
        let entry = self.lists.add(kind, user_id, game_id).await?;
        tracing::info!(user_id, game_id, list = %kind, "added game to list");
        Ok(entry)
    }

    pub async fn remove_from_list(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<bool> {
        let removed = self.lists.remove(kind, user_id, game_id).await?;
        if removed {
            tracing::info!(user_id, game_id, list = %kind, "removed game from list");
        }
        Ok(removed)
    }

    /// Flip membership; returns whether the game is now listed
    pub async fn toggle(&self, kind: ListKind, user_id: &str, game_id: u64) -> Result<bool> {
        if self.lists.contains(kind, user_id, game_id).await? {
            self.remove_from_list(kind, user_id, game_id).await?;
            Ok(false)
        } else {
            match self.add_to_list(kind, user_id, game_id).await {
                Ok(_) | Err(CatalogError::AlreadyListed { .. }) => Ok(true),
                Err(e) => Err(e),
            }
        }
    }

    pub async fn list_entries(&self, kind: ListKind, user_id: &str) -> Result<Vec<ListEntry>> {
        self.lists.list(kind, user_id).await
    }

    pub async fn list_state(&self, user_id: &str, game_id: u64) -> Result<ListState> {
        Ok(ListState {
            favorite: self.lists.contains(ListKind::Favorites, user_id, game_id).await?,
            wishlisted: self.lists.contains(ListKind::Wishlist, user_id, game_id).await?,
        })
    }

    /// Full records of a user's list, in list order (newest first)
    pub async fn list_games(&self, kind: ListKind, user_id: &str) -> Result<Vec<GameDetails>> {
        let entries = self.lists.list(kind, user_id).await?;

        let mut lookups = JoinSet::new();
        for (index, entry) in entries.iter().enumerate() {
            let catalog = Arc::clone(&self.catalog);
            let game_id = entry.game_id;
            lookups.spawn(async move { (index, catalog.game(game_id).await) });
        }

        let mut games: Vec<Option<GameDetails>> = vec![None; entries.len()];
        while let Some(joined) = lookups.join_next().await {
            let (index, result) = joined.map_err(|e| CatalogError::Other(e.to_string()))?;
            games[index] = Some(result?);
        }

        Ok(games.into_iter().flatten().collect())
    }
}
