use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Treat JSON `null` the same as a missing field (RAWG sends both)
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Id/name/slug triple used by genres, platforms, stores...
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
}

pub type Genre = NamedRef;
pub type Platform = NamedRef;

/// Platform wrapper as it appears inside a game record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformEntry {
    pub platform: NamedRef,
    #[serde(default)]
    pub released_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsrbRating {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// One row of a game list page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Unique catalog id
    pub id: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Release date (YYYY-MM-DD), absent for unreleased games
    #[serde(default)]
    pub released: Option<String>,

    #[serde(default)]
    pub tba: bool,

    #[serde(default)]
    pub background_image: Option<String>,

    /// Average user rating (0.0-5.0)
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,

    #[serde(default)]
    pub metacritic: Option<i32>,

    /// Average playtime in hours
    #[serde(default, deserialize_with = "null_as_default")]
    pub playtime: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub platforms: Vec<PlatformEntry>,
}

impl GameSummary {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            slug: String::new(),
            name: name.into(),
            released: None,
            tba: false,
            background_image: None,
            rating: 0.0,
            metacritic: None,
            playtime: 0,
            genres: Vec::new(),
            platforms: Vec::new(),
        }
    }

    /// Release year parsed from `released`
    pub fn year(&self) -> Option<i32> {
        self.released
            .as_deref()
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
            .map(|date| chrono::Datelike::year(&date))
    }

    /// Get display name (for logging/UI)
    pub fn display_name(&self) -> String {
        if let Some(year) = self.year() {
            format!("{} ({})", self.name, year)
        } else {
            self.name.clone()
        }
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }
}

/// Full record for the game detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetails {
    #[serde(flatten)]
    pub summary: GameSummary,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description_raw: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub website: String,

    #[serde(default)]
    pub esrb_rating: Option<EsrbRating>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub developers: Vec<NamedRef>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub publishers: Vec<NamedRef>,

    #[serde(default)]
    pub reddit_url: Option<String>,
}

impl GameDetails {
    pub fn id(&self) -> u64 {
        self.summary.id
    }

    pub fn name(&self) -> &str {
        &self.summary.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    pub id: u64,
    pub image: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Community post linked to a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditPost {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username_url: String,
    pub created: DateTime<Utc>,
}
