use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::core::{GameDetails, GameSummary, Genre, PageResult, Paginated, Platform, RedditPost, Screenshot};
use crate::error::{CatalogError, Result};
use crate::providers::{CatalogProvider, SearchParams};

const PROVIDER: &str = "rawg";

/// RAWG video game database client
pub struct RawgProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ScreenshotList {
    #[serde(default)]
    results: Vec<Screenshot>,
}

impl RawgProvider {
    /// Create new RAWG provider
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build a request URL; empty query values are left out
    fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}/{}?key={}",
            self.base_url,
            path.trim_start_matches('/'),
            urlencoding::encode(&self.api_key)
        );

        for (name, value) in query.iter().filter(|(_, value)| !value.is_empty()) {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        url
    }

    fn search_url(&self, params: &SearchParams) -> String {
        self.url(
            "games",
            &[
                ("page_size", params.page_size.to_string()),
                ("page", params.page.to_string()),
                ("search", params.search.clone()),
                ("platforms", params.platforms.clone()),
                ("genres", params.genres.clone()),
                ("dates", params.dates.clone()),
            ],
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::provider(PROVIDER, format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::provider(PROVIDER, format!("{}: HTTP {}", what, status)));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::provider(PROVIDER, format!("{}: invalid JSON: {}", what, e)))
    }
}

#[async_trait]
impl CatalogProvider for RawgProvider {
    async fn search_games(&self, params: &SearchParams) -> Result<PageResult> {
        let url = self.search_url(params);
        let raw: Paginated<GameSummary> = self.get_json(&url, "games").await?;
        tracing::debug!(page = params.page, count = raw.count, "rawg search returned {} games", raw.results.len());
        Ok(PageResult::from_paginated(params.page, raw))
    }

    async fn game(&self, id: u64) -> Result<GameDetails> {
        let url = self.url(&format!("games/{}", id), &[]);
        self.get_json(&url, &format!("game {}", id)).await
    }

    async fn screenshots(&self, id: u64) -> Result<Vec<Screenshot>> {
        let url = self.url(&format!("games/{}/screenshots", id), &[]);
        let list: ScreenshotList = self.get_json(&url, &format!("screenshots of game {}", id)).await?;
        Ok(list.results)
    }

    async fn reddit_posts(&self, id: u64) -> Result<Paginated<RedditPost>> {
        let url = self.url(&format!("games/{}/reddit", id), &[]);
        self.get_json(&url, &format!("reddit posts of game {}", id)).await
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        let url = self.url("genres", &[]);
        let page: Paginated<Genre> = self.get_json(&url, "genres").await?;
        Ok(page.results)
    }

    async fn platforms(&self) -> Result<Vec<Platform>> {
        let url = self.url("platforms", &[]);
        let page: Paginated<Platform> = self.get_json(&url, "platforms").await?;
        Ok(page.results)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
