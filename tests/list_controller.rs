mod common;

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use common::ScriptedCatalog;
use game_catalog_engine::{
    storage::MemoryStore, ControllerConfig, KeyValueStore, ListController, ListHandle,
};

const PAGE_KEY: &str = "game-list.current-page";

fn config() -> ControllerConfig {
    ControllerConfig {
        debounce: Duration::from_millis(500),
        page_size: 20,
        window_width: 5,
        cache_capacity: 32,
        page_key: PAGE_KEY.to_string(),
    }
}

async fn spawn(catalog: &Arc<ScriptedCatalog>, store: &Arc<MemoryStore>) -> ListHandle {
    ListController::spawn(catalog.clone(), store.clone(), config()).await
}

/// Let every timer and in-flight request run out
async fn settle() {
    sleep(Duration::from_secs(5)).await;
}

#[tokio::test(start_paused = true)]
async fn test_mount_issues_one_unconstrained_fetch() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;

    settle().await;

    let calls = catalog.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].page, 1);
    assert_eq!(calls[0].page_size, 20);
    assert_eq!(calls[0].search, "");
    assert_eq!(calls[0].dates, "");

    let view = list.view();
    assert!(!view.is_loading);
    assert_eq!(view.items.len(), 20);
    assert_eq!(view.count, Some(45));
    assert_eq!(view.total_pages, Some(3));
    assert_eq!(view.window, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_typing_issues_single_fetch_with_final_text() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;
    settle().await;

    list.set_search_text("zelda");
    sleep(Duration::from_millis(200)).await;
    list.set_search_text("zeldb");

    // Nothing goes out while the user is still typing
    sleep(Duration::from_millis(400)).await;
    assert_eq!(catalog.calls().len(), 1);

    settle().await;
    assert_eq!(catalog.searches(), vec!["", "zeldb"]);
    assert_eq!(list.view().filters.search, "zeldb");
}

#[tokio::test(start_paused = true)]
async fn test_filter_edits_within_delay_coalesce() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;
    settle().await;

    list.set_year_filter("2021");
    sleep(Duration::from_millis(100)).await;
    list.set_year_filter("2022");
    list.set_genre_filter("action");
    list.set_platform_filter("4");
    settle().await;

    let calls = catalog.calls();
    assert!(calls.iter().all(|c| !c.dates.starts_with("2021")));
    let last = calls.last().unwrap();
    assert_eq!(last.dates, "2022-01-01,2022-12-31");
    assert_eq!(last.genres, "action");
    assert_eq!(last.platforms, "4");
    assert_eq!(list.view().query.unwrap().genres, "action");
}

#[tokio::test(start_paused = true)]
async fn test_year_all_clears_date_range() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;
    settle().await;

    list.set_year_filter("2022");
    settle().await;
    list.set_year_filter("all");
    settle().await;

    let dates: Vec<String> = catalog.calls().into_iter().map(|c| c.dates).collect();
    assert_eq!(dates, vec!["", "2022-01-01,2022-12-31"]);
    // Back to the mount key: served from the page cache
    assert_eq!(list.view().query.unwrap().dates, "");
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    catalog.delay("slow", Duration::from_secs(2));
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;
    settle().await;

    list.set_search_text("slow");
    // "slow" settles at 500ms and stays in flight until 2.5s
    sleep(Duration::from_millis(600)).await;
    assert!(list.view().is_loading);

    list.set_search_text("fast");
    // "fast" settles at 1.1s and answers immediately
    sleep(Duration::from_millis(700)).await;
    let view = list.view();
    assert!(!view.is_loading);
    assert_eq!(view.query.as_ref().unwrap().search, "fast");
    let fast_ids: Vec<u64> = view.items.iter().map(|g| g.id).collect();
    assert_eq!(fast_ids, catalog.ids_for("fast", 1, 20));

    // The slow answer arrives later and must not overwrite
    settle().await;
    assert_eq!(catalog.searches(), vec!["", "slow", "fast"]);
    let after: Vec<u64> = list.view().items.iter().map(|g| g.id).collect();
    assert_eq!(after, fast_ids);
}

#[tokio::test(start_paused = true)]
async fn test_page_clamped_to_known_total() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;
    settle().await;

    list.set_page(3);
    settle().await;
    let view = list.view();
    assert_eq!(view.page, 3);
    assert_eq!(view.items.len(), 5);
    assert_eq!(view.total_pages, Some(3));

    list.set_page(4);
    list.next_page();
    list.set_page(0);
    settle().await;

    let view = list.view();
    assert_eq!(view.page, 3);
    assert_eq!(catalog.calls().len(), 2);
    assert!(view.window.iter().all(|p| (1..=3).contains(p)));
}

#[tokio::test(start_paused = true)]
async fn test_page_change_is_not_debounced() {
    let catalog = Arc::new(ScriptedCatalog::new(200));
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;
    settle().await;

    list.set_page(7);
    sleep(Duration::from_millis(10)).await;

    let calls = catalog.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].page, 7);
    assert_eq!(list.view().window, vec![5, 6, 7, 8, 9]);
}

#[tokio::test(start_paused = true)]
async fn test_page_persists_across_reload_but_filters_do_not() {
    let catalog = Arc::new(ScriptedCatalog::new(100));
    let store = Arc::new(MemoryStore::new());

    {
        let list = spawn(&catalog, &store).await;
        settle().await;
        list.set_genre_filter("indie");
        settle().await;
        list.set_page(2);
        settle().await;
        assert_eq!(store.get(PAGE_KEY).await.unwrap().as_deref(), Some("2"));
    }

    let reloaded = spawn(&catalog, &store).await;
    settle().await;

    let view = reloaded.view();
    assert_eq!(view.page, 2);
    assert!(view.filters.genre.is_all());
    let last = catalog.calls().pop().unwrap();
    assert_eq!(last.page, 2);
    assert_eq!(last.genres, "");
}

#[tokio::test(start_paused = true)]
async fn test_malformed_persisted_page_falls_back_to_first() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    let store = Arc::new(MemoryStore::new());
    store.set(PAGE_KEY, "page two").await.unwrap();

    let list = spawn(&catalog, &store).await;
    settle().await;

    assert_eq!(list.view().page, 1);
    assert_eq!(catalog.calls()[0].page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_restored_page_past_last_page_is_clamped() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    let store = Arc::new(MemoryStore::new());
    store.set(PAGE_KEY, "10").await.unwrap();

    let list = spawn(&catalog, &store).await;
    settle().await;

    let view = list.view();
    assert_eq!(view.total_pages, Some(3));
    assert_eq!(view.page, 3);
    assert!(view.window.contains(&view.page));
    assert_eq!(view.items.len(), 5);
    assert!(!view.is_loading);
    assert_eq!(store.get(PAGE_KEY).await.unwrap().as_deref(), Some("3"));

    let pages: Vec<u32> = catalog.calls().iter().map(|c| c.page).collect();
    assert_eq!(pages, vec![10, 3]);

    list.previous_page();
    settle().await;
    assert_eq!(list.view().page, 2);
}

#[tokio::test(start_paused = true)]
async fn test_restored_page_with_no_results_falls_back_to_first() {
    let catalog = Arc::new(ScriptedCatalog::new(0));
    let store = Arc::new(MemoryStore::new());
    store.set(PAGE_KEY, "4").await.unwrap();

    let list = spawn(&catalog, &store).await;
    settle().await;

    let view = list.view();
    assert_eq!(view.page, 1);
    assert_eq!(view.total_pages, Some(0));
    assert!(view.items.is_empty());
    assert_eq!(catalog.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_first_snapshot_is_loading() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    let store = Arc::new(MemoryStore::new());

    let list = spawn(&catalog, &store).await;
    let view = list.view();
    assert!(view.is_loading);
    assert!(view.items.is_empty());

    settle().await;
    assert!(!list.view().is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_page_is_truncated() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    catalog.overfill(3);
    let store = Arc::new(MemoryStore::new());

    let list = spawn(&catalog, &store).await;
    settle().await;

    let ids: Vec<u64> = list.view().items.iter().map(|g| g.id).collect();
    assert_eq!(ids, catalog.ids_for("", 1, 20));
}

#[tokio::test(start_paused = true)]
async fn test_settled_filter_change_resets_page() {
    let catalog = Arc::new(ScriptedCatalog::new(100));
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;
    settle().await;

    list.set_page(4);
    settle().await;
    list.set_search_text("hades");
    settle().await;

    let calls = catalog.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].search, "hades");
    assert_eq!(calls[2].page, 1);
    assert_eq!(list.view().page, 1);
    assert_eq!(store.get(PAGE_KEY).await.unwrap().as_deref(), Some("1"));
}

#[tokio::test(start_paused = true)]
async fn test_failure_surfaces_error_and_recovers() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    catalog.fail("broken");
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;
    settle().await;

    list.set_search_text("broken");
    settle().await;

    let view = list.view();
    assert!(!view.is_loading);
    assert!(view.items.is_empty());
    assert!(view.error.as_deref().unwrap().contains("503"));

    catalog.recover("broken");
    list.retry();
    settle().await;

    let view = list.view();
    assert_eq!(view.error, None);
    assert_eq!(view.items.len(), 20);
    assert_eq!(catalog.searches(), vec!["", "broken", "broken"]);
}

#[tokio::test(start_paused = true)]
async fn test_revisited_page_served_from_cache() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;
    settle().await;

    list.next_page();
    settle().await;
    list.previous_page();
    settle().await;

    assert_eq!(catalog.calls().len(), 2);
    let view = list.view();
    assert_eq!(view.page, 1);
    assert_eq!(view.items.len(), 20);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_cancels_pending_input() {
    let catalog = Arc::new(ScriptedCatalog::new(45));
    let store = Arc::new(MemoryStore::new());
    let list = spawn(&catalog, &store).await;
    settle().await;

    list.set_search_text("never sent");
    sleep(Duration::from_millis(100)).await;
    drop(list);
    settle().await;

    assert_eq!(catalog.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wait_until_observes_result() {
    let catalog = Arc::new(ScriptedCatalog::new(7));
    let store = Arc::new(MemoryStore::new());
    let mut list = spawn(&catalog, &store).await;

    let view = list
        .wait_until(|v| v.count.is_some() && !v.is_loading)
        .await
        .unwrap();
    assert_eq!(view.items.len(), 7);
    assert_eq!(view.total_pages, Some(1));
    assert!(!view.has_next());
}
