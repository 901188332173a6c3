use clap::{Parser, Subcommand};
use game_catalog_engine::{
    controller::{page_window, total_pages},
    providers::SearchParams,
    AppConfig, CatalogEngine, FilterState, FilterValue, ListHandle, ListKind, ListView,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "game-catalog-cli")]
#[command(about = "Game Catalog CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database path (overrides DB_PATH)
    #[arg(short, long)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog once
    Search {
        /// Search text
        #[arg(default_value = "")]
        query: String,

        /// Release year, or "all"
        #[arg(short, long, default_value = "all")]
        year: String,

        /// Genre slug, or "all"
        #[arg(short, long, default_value = "all")]
        genre: String,

        /// Platform id, or "all"
        #[arg(short, long, default_value = "all")]
        platform: String,

        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Show a game page
    Game {
        /// Catalog id
        id: u64,
    },

    /// Interactive browsing: type to search, `:help` for commands
    Browse,

    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Manage wishlist
    Wishlist {
        #[command(subcommand)]
        action: ListAction,
    },
}

#[derive(Subcommand)]
enum ListAction {
    /// Show the list
    List {
        #[arg(short, long)]
        user: String,
    },
    /// Add a game
    Add {
        #[arg(short, long)]
        user: String,
        game_id: u64,
    },
    /// Remove a game
    Remove {
        #[arg(short, long)]
        user: String,
        game_id: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "game_catalog_engine=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let engine = CatalogEngine::from_config(&config).await?;

    match cli.command {
        Commands::Search { query, year, genre, platform, page } => {
            let filters = FilterState {
                search: query,
                year: FilterValue::parse(&year),
                genre: FilterValue::parse(&genre),
                platform: FilterValue::parse(&platform),
            };
            let key = filters.key(page.max(1), config.page_size);

            println!("🔍 Searching: {}", key);
            let result = engine.search(&SearchParams::from(&key)).await?;
            let total = total_pages(result.count, config.page_size);

            for game in &result.results {
                println!("   [{}] {} ★{:.1}", game.id, game.display_name(), game.rating);
            }
            println!(
                "\n📄 Page {}/{} ({} games) {:?}",
                key.page,
                total,
                result.count,
                page_window(key.page, total, config.window_width)
            );
        }

        Commands::Game { id } => {
            let page = engine.game_page(id).await?;
            let game = &page.game;

            println!("🎮 {}", game.summary.display_name());
            println!("   Rating: {:.1}", game.summary.rating);
            println!("   Released: {}", game.summary.released.as_deref().unwrap_or("TBA"));
            println!("   Genres: {}", game.summary.genre_names().join(", "));
            if !game.description_raw.is_empty() {
                println!("\n{}\n", game.description_raw);
            }

            println!("🖼️  {} screenshots", page.screenshots.len());
            for shot in &page.screenshots {
                println!("   {}", shot.image);
            }

            println!("💬 {} Reddit posts", page.reddit_posts.len());
            for post in &page.reddit_posts {
                println!("   u/{} - {} ({})", post.username, post.name, post.url);
            }

            println!("📺 {} live streams", page.streams.len());
            for stream in &page.streams {
                println!("   {} ({} viewers) {}", stream.user_name, stream.viewer_count, stream.channel_url());
            }
        }

        Commands::Browse => {
            let list = engine.spawn_list().await;
            browse(list).await?;
        }

        Commands::Favorites { action } => run_list_action(&engine, ListKind::Favorites, action).await?,
        Commands::Wishlist { action } => run_list_action(&engine, ListKind::Wishlist, action).await?,
    }

    Ok(())
}

async fn run_list_action(engine: &CatalogEngine, kind: ListKind, action: ListAction) -> anyhow::Result<()> {
    match action {
        ListAction::List { user } => {
            let games = engine.list_games(kind, &user).await?;
            println!("📋 {} of {} ({} games)", kind, user, games.len());
            for game in games {
                println!("   [{}] {}", game.id(), game.summary.display_name());
            }
        }
        ListAction::Add { user, game_id } => {
            engine.add_to_list(kind, &user, game_id).await?;
            println!("✅ Added {} to {}", game_id, kind);
        }
        ListAction::Remove { user, game_id } => {
            if engine.remove_from_list(kind, &user, game_id).await? {
                println!("✅ Removed {} from {}", game_id, kind);
            } else {
                println!("ℹ️  {} was not in {}", game_id, kind);
            }
        }
    }
    Ok(())
}

const BROWSE_HELP: &str = "\
  <text>            search
  :year <y|all>     year filter
  :genre <g|all>    genre filter
  :platform <p|all> platform filter
  :page <n>         jump to page
  :next / :prev     move one page
  :retry            repeat the last request
  :quit";

async fn browse(list: ListHandle) -> anyhow::Result<()> {
    println!("{}", BROWSE_HELP);

    let mut views = list.subscribe();
    let renderer = tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            render(&view);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            ":quit" | ":q" => break,
            ":help" => println!("{}", BROWSE_HELP),
            ":year" => list.set_year_filter(arg),
            ":genre" => list.set_genre_filter(arg),
            ":platform" => list.set_platform_filter(arg),
            ":next" => list.next_page(),
            ":prev" => list.previous_page(),
            ":retry" => list.retry(),
            ":page" => match arg.trim().parse::<u32>() {
                Ok(page) => list.set_page(page),
                Err(_) => println!("⚠️  not a page number: {}", arg),
            },
            _ => list.set_search_text(line),
        }
    }

    drop(list);
    renderer.abort();
    Ok(())
}

fn render(view: &ListView) {
    if view.is_loading {
        println!("⏳ loading…");
        return;
    }
    if let Some(error) = &view.error {
        println!("❌ {} (type :retry)", error);
        return;
    }
    if view.items.is_empty() {
        println!("No games found");
    }
    for game in &view.items {
        println!("   [{}] {} ★{:.1}", game.id, game.display_name(), game.rating);
    }

    let pages: Vec<String> = view
        .window
        .iter()
        .map(|p| if *p == view.page { format!("[{}]", p) } else { p.to_string() })
        .collect();
    println!(
        "📄 page {}/{} {}",
        view.page,
        view.total_pages.map(|t| t.to_string()).unwrap_or_else(|| "?".to_string()),
        pages.join(" ")
    );
}
