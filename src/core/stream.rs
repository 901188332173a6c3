use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Game entry in the live-stream directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitchGame {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub box_art_url: String,
}

/// A live stream for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitchStream {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub language: String,
    /// Template containing `{width}x{height}`
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub is_mature: bool,
}

impl TwitchStream {
    /// Thumbnail URL at a concrete size
    pub fn thumbnail(&self, width: u32, height: u32) -> String {
        self.thumbnail_url
            .replace("{width}x{height}", &format!("{width}x{height}"))
    }

    pub fn channel_url(&self) -> String {
        format!("https://www.twitch.tv/{}", self.user_login)
    }
}
