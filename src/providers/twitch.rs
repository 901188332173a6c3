use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::{TwitchGame, TwitchStream};
use crate::error::{CatalogError, Result};
use crate::providers::StreamProvider;

const PROVIDER: &str = "twitch";

/// Renew the app token this long before it actually expires
const TOKEN_MARGIN: Duration = Duration::from_secs(60);

/// Twitch Helix client using an app access token (client credentials grant)
pub struct TwitchProvider {
    client: Client,
    base_url: String,
    auth_url: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<AppToken>>,
}

#[derive(Debug, Clone)]
struct AppToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct HelixData<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl TwitchProvider {
    /// Create new Twitch provider
    pub fn new(
        base_url: impl Into<String>,
        auth_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_url: auth_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: Mutex::new(None),
        })
    }

    /// Current app token, fetching a new one when missing or about to expire
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if Instant::now() + TOKEN_MARGIN < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let url = format!(
            "{}?client_id={}&client_secret={}&grant_type=client_credentials",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.client_secret)
        );

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| CatalogError::provider(PROVIDER, format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CatalogError::provider(
                PROVIDER,
                format!("Failed to get access token: HTTP {}", response.status()),
            ));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::provider(PROVIDER, format!("Invalid token JSON: {}", e)))?;

        tracing::debug!(expires_in = body.expires_in, "obtained twitch app token");
        let token = AppToken {
            access_token: body.access_token,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        };
        let access = token.access_token.clone();
        *guard = Some(token);
        Ok(access)
    }

    async fn helix<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<Vec<T>> {
        let token = self.access_token().await?;
        let url = format!("{}/{}", self.base_url, path_and_query);

        let response = self
            .client
            .get(&url)
            .header("Client-ID", &self.client_id)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CatalogError::provider(PROVIDER, format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked early; next call fetches a fresh one
            *self.token.lock().await = None;
        }
        if !status.is_success() {
            tracing::error!(%status, path = path_and_query, "twitch API error");
            return Err(CatalogError::provider(PROVIDER, format!("HTTP {}", status)));
        }

        let body: HelixData<T> = response
            .json()
            .await
            .map_err(|e| CatalogError::provider(PROVIDER, format!("Invalid JSON: {}", e)))?;
        Ok(body.data)
    }
}

#[async_trait]
impl StreamProvider for TwitchProvider {
    async fn search_games(&self, name: &str) -> Result<Vec<TwitchGame>> {
        self.helix(&format!("games?name={}", urlencoding::encode(name))).await
    }

    async fn streams(&self, game_id: &str) -> Result<Vec<TwitchStream>> {
        self.helix(&format!("streams?game_id={}", urlencoding::encode(game_id))).await
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
