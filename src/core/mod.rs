pub mod filters;
pub mod game;
pub mod page;
pub mod stream;

pub use filters::{date_range, FilterState, FilterValue, QueryKey};
pub use game::{
    EsrbRating, GameDetails, GameSummary, Genre, NamedRef, Platform, PlatformEntry, RedditPost,
    Screenshot,
};
pub use page::{PageResult, Paginated};
pub use stream::{TwitchGame, TwitchStream};
