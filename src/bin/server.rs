use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use game_catalog_engine::{
    controller::{page_window, total_pages},
    engine::FilterOption,
    error::CatalogError,
    providers::SearchParams,
    storage::ListEntry,
    AppConfig, CatalogEngine, FilterState, FilterValue, GamePage, GameSummary, ListKind,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<CatalogEngine>,
    page_size: u32,
    window_width: u32,
}

#[derive(Debug, Deserialize)]
struct GamesQuery {
    #[serde(default)]
    search: String,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
}

fn default_page() -> u32 { 1 }

#[derive(Debug, Serialize)]
struct GamesResponse {
    count: u64,
    page: u32,
    total_pages: u32,
    window: Vec<u32>,
    results: Vec<GameSummary>,
}

#[derive(Debug, Deserialize)]
struct AddListRequest {
    game_id: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct RemovedResponse {
    removed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "game_catalog_server=debug,game_catalog_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    tracing::info!("🚀 Starting Game Catalog Server");
    tracing::info!("⚙️ Config: {}", config);

    let engine = CatalogEngine::from_config(&config).await?;

    let state = AppState {
        engine: Arc::new(engine),
        page_size: config.page_size,
        window_width: config.window_width,
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/games", get(games_handler))
        .route("/v1/games/:id", get(game_handler))
        .route("/v1/genres", get(genres_handler))
        .route("/v1/platforms", get(platforms_handler))
        .route("/v1/years", get(years_handler))
        .route("/v1/users/:user/:list", get(list_handler).post(add_handler))
        .route("/v1/users/:user/:list/:game_id", delete(remove_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("🎮 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: game_catalog_engine::VERSION.to_string(),
    })
}

async fn games_handler(
    State(state): State<AppState>,
    Query(query): Query<GamesQuery>,
) -> Result<Json<GamesResponse>, AppError> {
    let filters = FilterState {
        search: query.search,
        year: FilterValue::from(query.year),
        genre: FilterValue::from(query.genre),
        platform: FilterValue::from(query.platform),
    };
    let page = query.page.max(1);
    let key = filters.key(page, state.page_size);

    tracing::debug!("Games request: {}", key);
    let result = state.engine.search(&SearchParams::from(&key)).await?;
    let total = total_pages(result.count, state.page_size);

    Ok(Json(GamesResponse {
        count: result.count,
        page,
        total_pages: total,
        window: page_window(page, total, state.window_width),
        results: result.results,
    }))
}

async fn game_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<GamePage>, AppError> {
    let page = state.engine.game_page(id).await?;
    tracing::info!("✅ game {} → {}", id, page.game.name());
    Ok(Json(page))
}

async fn genres_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<game_catalog_engine::core::Genre>>, AppError> {
    Ok(Json(state.engine.genres().await?))
}

async fn platforms_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<game_catalog_engine::core::Platform>>, AppError> {
    Ok(Json(state.engine.platforms().await?))
}

async fn years_handler() -> Json<Vec<FilterOption>> {
    Json(CatalogEngine::current_year_options())
}

async fn list_handler(
    State(state): State<AppState>,
    Path((user, list)): Path<(String, String)>,
) -> Result<Json<Vec<ListEntry>>, AppError> {
    let kind: ListKind = list.parse()?;
    Ok(Json(state.engine.list_entries(kind, &user).await?))
}

async fn add_handler(
    State(state): State<AppState>,
    Path((user, list)): Path<(String, String)>,
    Json(req): Json<AddListRequest>,
) -> Result<(StatusCode, Json<ListEntry>), AppError> {
    let kind: ListKind = list.parse()?;
    let entry = state.engine.add_to_list(kind, &user, req.game_id).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn remove_handler(
    State(state): State<AppState>,
    Path((user, list, game_id)): Path<(String, String, u64)>,
) -> Result<Json<RemovedResponse>, AppError> {
    let kind: ListKind = list.parse()?;
    let removed = state.engine.remove_from_list(kind, &user, game_id).await?;
    Ok(Json(RemovedResponse { removed }))
}

// Error handling
struct AppError(CatalogError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            CatalogError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {}", what)),
            CatalogError::AlreadyListed { list, game_id } => (
                StatusCode::CONFLICT,
                format!("Game {} is already in {}", game_id, list),
            ),
            CatalogError::Provider { provider, message } => {
                (StatusCode::BAD_GATEWAY, format!("Provider '{}' error: {}", provider, message))
            }
            e => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        tracing::error!("❌ Error: {} - {}", status, message);

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<CatalogError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
