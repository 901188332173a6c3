#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use game_catalog_engine::core::{
    GameDetails, GameSummary, Genre, PageResult, Paginated, Platform, RedditPost, Screenshot,
    TwitchGame, TwitchStream,
};
use game_catalog_engine::error::{CatalogError, Result};
use game_catalog_engine::providers::{CatalogProvider, SearchParams, StreamProvider};

/// Catalog double: records every search and answers from a script
pub struct ScriptedCatalog {
    pub count: u64,
    calls: Mutex<Vec<SearchParams>>,
    delays: Mutex<HashMap<String, Duration>>,
    failing: Mutex<HashSet<String>>,
    genre_calls: Mutex<u32>,
    overfill: Mutex<u64>,
}

impl ScriptedCatalog {
    pub fn new(count: u64) -> Self {
        Self {
            count,
            calls: Mutex::new(Vec::new()),
            delays: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            genre_calls: Mutex::new(0),
            overfill: Mutex::new(0),
        }
    }

    /// Searches for `search` take `delay` to answer
    pub fn delay(&self, search: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(search.to_string(), delay);
    }

    /// Searches for `search` fail until `recover` is called
    pub fn fail(&self, search: &str) {
        self.failing.lock().unwrap().insert(search.to_string());
    }

    /// Every page carries `extra` games beyond the requested page size
    pub fn overfill(&self, extra: u64) {
        *self.overfill.lock().unwrap() = extra;
    }

    pub fn recover(&self, search: &str) {
        self.failing.lock().unwrap().remove(search);
    }

    pub fn calls(&self) -> Vec<SearchParams> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.calls().into_iter().map(|p| p.search).collect()
    }

    pub fn genre_calls(&self) -> u32 {
        *self.genre_calls.lock().unwrap()
    }

    /// Game ids a page is expected to contain
    pub fn ids_for(&self, search: &str, page: u32, page_size: u32) -> Vec<u64> {
        let start = u64::from(page - 1) * u64::from(page_size);
        let end = (start + u64::from(page_size)).min(self.count);
        let base = if search.is_empty() { 0 } else { 10_000 * search.len() as u64 };
        (start..end).map(|i| base + i + 1).collect()
    }
}

pub fn details(id: u64, name: &str) -> GameDetails {
    GameDetails {
        summary: GameSummary::new(id, name),
        description_raw: String::new(),
        website: String::new(),
        esrb_rating: None,
        developers: Vec::new(),
        publishers: Vec::new(),
        reddit_url: None,
    }
}

#[async_trait]
impl CatalogProvider for ScriptedCatalog {
    async fn search_games(&self, params: &SearchParams) -> Result<PageResult> {
        self.calls.lock().unwrap().push(params.clone());

        let delay = self.delays.lock().unwrap().get(&params.search).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&params.search) {
            return Err(CatalogError::provider("scripted", "HTTP 503 Service Unavailable"));
        }

        let extra = *self.overfill.lock().unwrap();
        let results = self
            .ids_for(&params.search, params.page, params.page_size)
            .into_iter()
            .chain((0..extra).map(|i| 900_000 + i))
            .map(|id| GameSummary::new(id, format!("{} #{}", params.search, id)))
            .collect();

        Ok(PageResult::from_paginated(
            params.page,
            Paginated {
                count: self.count,
                next: None,
                previous: None,
                results,
            },
        ))
    }

    async fn game(&self, id: u64) -> Result<GameDetails> {
        if id == 404 {
            return Err(CatalogError::NotFound(format!("game {}", id)));
        }
        Ok(details(id, &format!("Game {}", id)))
    }

    async fn screenshots(&self, id: u64) -> Result<Vec<Screenshot>> {
        Ok(vec![Screenshot {
            id: 1,
            image: format!("https://media.example/{}.jpg", id),
            width: None,
            height: None,
        }])
    }

    async fn reddit_posts(&self, _id: u64) -> Result<Paginated<RedditPost>> {
        Ok(Paginated::default())
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        *self.genre_calls.lock().unwrap() += 1;
        Ok(vec![Genre {
            id: 4,
            name: "Action".to_string(),
            slug: "action".to_string(),
        }])
    }

    async fn platforms(&self) -> Result<Vec<Platform>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Stream directory double
pub struct ScriptedStreams {
    pub fail: bool,
}

#[async_trait]
impl StreamProvider for ScriptedStreams {
    async fn search_games(&self, name: &str) -> Result<Vec<TwitchGame>> {
        if self.fail {
            return Err(CatalogError::provider("twitch", "HTTP 401 Unauthorized"));
        }
        Ok(vec![TwitchGame {
            id: "509658".to_string(),
            name: name.to_string(),
            box_art_url: String::new(),
        }])
    }

    async fn streams(&self, game_id: &str) -> Result<Vec<TwitchStream>> {
        Ok(vec![serde_json::from_value(serde_json::json!({
            "id": "1",
            "user_id": "2",
            "user_login": "caster",
            "user_name": "Caster",
            "game_id": game_id,
            "viewer_count": 42,
            "started_at": "2024-03-01T18:00:00Z",
            "thumbnail_url": "https://thumbs/{width}x{height}.jpg"
        }))
        .unwrap()])
    }

    fn name(&self) -> &str {
        "twitch"
    }
}
