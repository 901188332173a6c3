//! Game list controller.
//!
//! Turns search/filter/page input into paginated catalog requests. Text and
//! filter input is debounced per field; a request is issued once per settled
//! [`QueryKey`], and only the response for the most recently issued key is
//! applied. The current page is persisted to a [`KeyValueStore`] so a restart
//! resumes on the same page.
//!
//! The controller runs as a single tokio task. Front-ends talk to it through a
//! [`ListHandle`] and render the [`ListView`] snapshots it publishes.

pub mod cache;
pub mod debounce;
pub mod latest;
pub mod pagination;

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::core::{FilterState, FilterValue, GameSummary, PageResult, QueryKey};
use crate::error::Result;
use crate::providers::{CatalogProvider, SearchParams};
use crate::storage::KeyValueStore;

pub use cache::PageCache;
pub use debounce::Debounced;
pub use latest::{LatestRequest, Ticket};
pub use pagination::{is_valid_page, page_window, total_pages};

/// List controller settings
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Quiet time before a search/filter edit takes effect
    pub debounce: Duration,
    /// Fixed number of games per page
    pub page_size: u32,
    /// Number of page buttons in [`ListView::window`]
    pub window_width: u32,
    /// Pages kept in the per-controller cache
    pub cache_capacity: usize,
    /// Storage key of the persisted page number
    pub page_key: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            page_size: 20,
            window_width: 5,
            cache_capacity: 32,
            page_key: "game-list.current-page".to_string(),
        }
    }
}

/// Renderer-facing snapshot of the list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    /// Games of the last applied page
    pub items: Vec<GameSummary>,
    /// A request for the current key is in flight
    pub is_loading: bool,
    /// Failure of the last request, cleared by the next success
    pub error: Option<String>,
    pub page: u32,
    /// Known once a request has succeeded
    pub total_pages: Option<u32>,
    pub count: Option<u64>,
    /// Page buttons to render
    pub window: Vec<u32>,
    /// Raw (not yet debounced) input
    pub filters: FilterState,
    /// Key of the latest issued request
    pub query: Option<QueryKey>,
}

impl ListView {
    /// Snapshot before the mount request lands
    fn initial(page: u32) -> Self {
        Self {
            items: Vec::new(),
            is_loading: true,
            error: None,
            page,
            total_pages: None,
            count: None,
            window: Vec::new(),
            filters: FilterState::default(),
            query: None,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.total_pages.is_some_and(|total| self.page < total)
    }
}

#[derive(Debug)]
enum Command {
    Search(String),
    Year(FilterValue),
    Genre(FilterValue),
    Platform(FilterValue),
    Page(u32),
    NextPage,
    PreviousPage,
    Retry,
}

/// Front-end side of a running controller. Dropping it stops the controller.
pub struct ListHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<ListView>,
    task: JoinHandle<()>,
}

impl ListHandle {
    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("list controller is no longer running");
        }
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.send(Command::Search(text.into()));
    }

    pub fn set_year_filter(&self, year: impl Into<FilterValue>) {
        self.send(Command::Year(year.into()));
    }

    pub fn set_genre_filter(&self, genre: impl Into<FilterValue>) {
        self.send(Command::Genre(genre.into()));
    }

    pub fn set_platform_filter(&self, platform: impl Into<FilterValue>) {
        self.send(Command::Platform(platform.into()));
    }

    /// Jump to a page; ignored when outside `[1, total_pages]`
    pub fn set_page(&self, page: u32) {
        self.send(Command::Page(page));
    }

    pub fn next_page(&self) {
        self.send(Command::NextPage);
    }

    pub fn previous_page(&self) {
        self.send(Command::PreviousPage);
    }

    /// Re-issue the current request (after an error)
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    /// Latest published snapshot
    pub fn view(&self) -> ListView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListView> {
        self.view.clone()
    }

    /// Wait for the next snapshot; `false` once the controller stopped
    pub async fn changed(&mut self) -> bool {
        self.view.changed().await.is_ok()
    }

    /// Wait until a snapshot satisfies `ready`
    pub async fn wait_until(&mut self, ready: impl Fn(&ListView) -> bool) -> Option<ListView> {
        loop {
            {
                let view = self.view.borrow_and_update();
                if ready(&view) {
                    return Some(view.clone());
                }
            }
            if !self.changed().await {
                return None;
            }
        }
    }
}

impl Drop for ListHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

type Fetched = (Ticket<QueryKey>, Result<PageResult>);

/// Controller state; owned by its task
pub struct ListController {
    provider: Arc<dyn CatalogProvider>,
    store: Arc<dyn KeyValueStore>,
    config: ControllerConfig,

    search: Debounced<String>,
    year: Debounced<FilterValue>,
    genre: Debounced<FilterValue>,
    platform: Debounced<FilterValue>,

    raw: FilterState,
    settled: FilterState,
    page: u32,

    items: Vec<GameSummary>,
    count: Option<u64>,
    error: Option<String>,

    latest: LatestRequest<QueryKey>,
    cache: PageCache,
    in_flight: JoinSet<Fetched>,

    commands: mpsc::UnboundedReceiver<Command>,
    view: watch::Sender<ListView>,
}

impl ListController {
    /// Restore the persisted page, start the controller task and issue the first request
    pub async fn spawn(
        provider: Arc<dyn CatalogProvider>,
        store: Arc<dyn KeyValueStore>,
        config: ControllerConfig,
    ) -> ListHandle {
        let page = restore_page(store.as_ref(), &config.page_key).await;
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (view, view_rx) = watch::channel(ListView::initial(page));

        let controller = Self {
            search: Debounced::new(String::new(), config.debounce),
            year: Debounced::new(FilterValue::All, config.debounce),
            genre: Debounced::new(FilterValue::All, config.debounce),
            platform: Debounced::new(FilterValue::All, config.debounce),
            raw: FilterState::default(),
            settled: FilterState::default(),
            page,
            items: Vec::new(),
            count: None,
            error: None,
            latest: LatestRequest::new(),
            cache: PageCache::new(config.cache_capacity),
            in_flight: JoinSet::new(),
            commands,
            view,
            provider,
            store,
            config,
        };

        tracing::debug!(page, provider = controller.provider.name(), "starting list controller");
        let task = tokio::spawn(controller.run());

        ListHandle {
            commands: commands_tx,
            view: view_rx,
            task,
        }
    }

    async fn run(mut self) {
        self.refresh().await;

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
                true = self.search.changed() => {}
                true = self.year.changed() => {}
                true = self.genre.changed() => {}
                true = self.platform.changed() => {}
                Some(joined) = self.in_flight.join_next() => self.apply(joined).await,
            }

            self.refresh().await;
        }

        tracing::debug!("list controller stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Search(text) => {
                self.raw.search = text.clone();
                self.search.set(text);
            }
            Command::Year(year) => {
                self.raw.year = year.clone();
                self.year.set(year);
            }
            Command::Genre(genre) => {
                self.raw.genre = genre.clone();
                self.genre.set(genre);
            }
            Command::Platform(platform) => {
                self.raw.platform = platform.clone();
                self.platform.set(platform);
            }
            Command::Page(page) => self.change_page(page).await,
            Command::NextPage => self.change_page(self.page.saturating_add(1)).await,
            Command::PreviousPage => self.change_page(self.page.saturating_sub(1)).await,
            Command::Retry => {
                if let Some(key) = self.latest.current_key().cloned() {
                    let ticket = self.latest.force_issue(key);
                    self.fetch(ticket);
                }
            }
        }
    }

    fn total_pages(&self) -> Option<u32> {
        self.count.map(|count| total_pages(count, self.config.page_size))
    }

    async fn change_page(&mut self, page: u32) {
        if page == self.page {
            return;
        }
        if !is_valid_page(page, self.total_pages()) {
            tracing::debug!(page, total = ?self.total_pages(), "ignoring out-of-range page");
            return;
        }
        self.page = page;
        self.persist_page().await;
    }

    async fn persist_page(&self) {
        let value = self.page.to_string();
        if let Err(e) = self.store.set(&self.config.page_key, &value).await {
            tracing::warn!("Failed to persist list page {}: {}", self.page, e);
        }
    }

    /// Recompose the key from settled input and issue a request if it changed
    async fn refresh(&mut self) {
        let settled = FilterState {
            search: self.search.get(),
            year: self.year.get(),
            genre: self.genre.get(),
            platform: self.platform.get(),
        };

        if settled != self.settled {
            self.settled = settled;
            if self.page != 1 {
                // New result set: start from its first page
                self.page = 1;
                self.persist_page().await;
            }
        }

        loop {
            let key = self.settled.key(self.page, self.config.page_size);
            if self.latest.current_key() == Some(&key) {
                break;
            }
            match self.cache.get(&key) {
                Some(page) => {
                    tracing::debug!(%key, "page cache hit");
                    self.latest.satisfy(key);
                    // A clamped page needs its own key
                    if !self.apply_page(page).await {
                        break;
                    }
                }
                None => {
                    if let Some(ticket) = self.latest.issue(key) {
                        self.fetch(ticket);
                    }
                    break;
                }
            }
        }

        self.publish();
    }

    fn fetch(&mut self, ticket: Ticket<QueryKey>) {
        tracing::debug!(key = %ticket.key(), "issuing catalog search");
        let provider = Arc::clone(&self.provider);
        let params = SearchParams::from(ticket.key());

        self.in_flight.spawn(async move {
            let result = provider.search_games(&params).await;
            (ticket, result)
        });
    }

    async fn apply(&mut self, joined: std::result::Result<Fetched, JoinError>) {
        let (ticket, result) = match joined {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::error!("catalog search task failed: {}", e);
                if self.latest.is_pending() && self.in_flight.is_empty() {
                    if let Some(key) = self.latest.current_key().cloned() {
                        self.latest.satisfy(key);
                    }
                    self.fail(format!("search task failed: {}", e));
                }
                return;
            }
        };

        if !self.latest.complete(&ticket) {
            tracing::debug!(key = %ticket.key(), "discarding stale search response");
            return;
        }

        match result {
            Ok(mut page) => {
                let page_size = ticket.key().page_size as usize;
                if page.results.len() > page_size {
                    tracing::warn!(
                        key = %ticket.key(),
                        "catalog returned {} games for a page of {}, truncating",
                        page.results.len(),
                        page_size
                    );
                    page.results.truncate(page_size);
                }
                self.cache.insert(ticket.key().clone(), page.clone());
                self.apply_page(page).await;
            }
            Err(e) => {
                tracing::warn!(key = %ticket.key(), "catalog search failed: {}", e);
                self.fail(e.to_string());
            }
        }
    }

    /// Show a page result; `true` when the current page was past the last
    /// page and got clamped
    async fn apply_page(&mut self, page: PageResult) -> bool {
        self.count = Some(page.count);
        self.items = page.results;
        self.error = None;

        let last = total_pages(page.count, self.config.page_size).max(1);
        if self.page <= last {
            return false;
        }
        tracing::debug!(page = self.page, last, "current page past the last page, clamping");
        self.page = last;
        self.persist_page().await;
        true
    }

    fn fail(&mut self, message: String) {
        self.items.clear();
        self.error = Some(message);
    }

    fn publish(&self) {
        let total = self.total_pages();
        let next = ListView {
            items: self.items.clone(),
            is_loading: self.latest.is_pending(),
            error: self.error.clone(),
            page: self.page,
            total_pages: total,
            count: self.count,
            window: total
                .map(|total| page_window(self.page, total, self.config.window_width))
                .unwrap_or_default(),
            filters: self.raw.clone(),
            query: self.latest.current_key().cloned(),
        };

        self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Persisted page number, or 1 when absent, unparsable or unreadable
async fn restore_page(store: &dyn KeyValueStore, key: &str) -> u32 {
    match store.get(key).await {
        Ok(Some(raw)) => match raw.trim().parse::<u32>() {
            Ok(page) if page >= 1 => page,
            _ => {
                tracing::debug!(value = %raw, "ignoring malformed persisted page");
                1
            }
        },
        Ok(None) => 1,
        Err(e) => {
            tracing::warn!("Failed to read persisted list page: {}", e);
            1
        }
    }
}
