use std::sync::Arc;
use std::time::Duration;

use storefront_core::{SearchConfig, SessionStore, StorefrontError};
use storefront_search::{SearchController, SearchEvent, SearchState};
use storefront_test::{sample_catalog, RecordingApi};
use tokio::sync::mpsc::UnboundedReceiver;

// ── Helpers ────────────────────────────────────────────────────────────────

fn setup() -> (
    RecordingApi,
    SessionStore,
    SearchController,
    UnboundedReceiver<SearchEvent>,
) {
    let api = RecordingApi::with_catalog(sample_catalog());
    let store = SessionStore::new();
    store.install_catalog(sample_catalog());
    let (search, events) =
        SearchController::new(Arc::new(api.clone()), store.clone(), SearchConfig::default());
    (api, store, search, events)
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn drain(events: &mut UnboundedReceiver<SearchEvent>) -> Vec<SearchEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn names(store: &SessionStore) -> Vec<String> {
    store.displayed().iter().map(|p| p.name.clone()).collect()
}

// ── Debounce ───────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn rapid_typing_dispatches_once_for_last_text() {
    let (api, store, search, mut events) = setup();

    search.on_input_changed("a");
    sleep_ms(100).await;
    search.on_input_changed("ap");
    sleep_ms(100).await;
    search.on_input_changed("app");
    assert_eq!(search.state(), SearchState::PendingSearch);

    sleep_ms(600).await;

    assert_eq!(api.search_calls(), vec!["app"]);
    assert_eq!(search.state(), SearchState::Idle);
    assert_eq!(names(&store), vec!["Apple iPhone XR", "Applewood Table"]);
    assert_eq!(
        drain(&mut events),
        vec![SearchEvent::Applied {
            seq: 1,
            text: "app".into(),
            count: 2
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn nothing_is_dispatched_before_the_delay() {
    let (api, _store, search, _events) = setup();

    search.on_input_changed("ball");
    sleep_ms(499).await;
    assert!(api.search_calls().is_empty());

    sleep_ms(2).await;
    assert_eq!(api.search_calls(), vec!["ball"]);
}

#[tokio::test(start_paused = true)]
async fn custom_debounce_is_honoured() {
    let api = RecordingApi::with_catalog(sample_catalog());
    let config = SearchConfig {
        debounce: Duration::from_millis(50),
    };
    let (search, _events) = SearchController::new(Arc::new(api.clone()), SessionStore::new(), config);

    search.on_input_changed("ball");
    sleep_ms(60).await;
    assert_eq!(api.search_calls(), vec!["ball"]);
}

// ── Ordering ───────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stale_response_does_not_overwrite_newer_results() {
    let (api, store, search, mut events) = setup();
    api.on_search_delayed("a", Duration::from_millis(1_000), Ok(sample_catalog()));

    search.on_input_changed("a");
    sleep_ms(600).await;
    search.on_input_changed("app");
    sleep_ms(600).await;
    assert_eq!(names(&store), vec!["Apple iPhone XR", "Applewood Table"]);

    // The response for "a" lands after "app" was applied.
    sleep_ms(1_000).await;

    assert_eq!(api.search_calls(), vec!["a", "app"]);
    assert_eq!(names(&store).len(), 2);
    assert_eq!(
        drain(&mut events),
        vec![
            SearchEvent::Applied {
                seq: 2,
                text: "app".into(),
                count: 2
            },
            SearchEvent::Discarded { seq: 1 },
        ]
    );
    assert_eq!(search.last_issued(), 2);
}

// ── Response handling ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn no_matches_empties_the_view_without_error() {
    let (_api, store, search, mut events) = setup();

    search.on_input_changed("zzz");
    sleep_ms(600).await;

    assert!(store.displayed().is_empty());
    assert_eq!(store.catalog().unwrap().len(), 5);
    assert_eq!(
        drain(&mut events),
        vec![SearchEvent::NoMatches {
            seq: 1,
            text: "zzz".into()
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn server_failure_restores_full_catalog() {
    let (api, store, search, mut events) = setup();
    let failure = StorefrontError::ServerFailure {
        status: 500,
        message: "Search index offline".into(),
    };
    api.on_search("broken", Err(failure.clone()));

    search.on_input_changed("sports");
    sleep_ms(600).await;
    assert_eq!(store.displayed().len(), 2);

    search.on_input_changed("broken");
    sleep_ms(600).await;

    assert_eq!(store.displayed().len(), 5);
    let events = drain(&mut events);
    assert_eq!(events.last(), Some(&SearchEvent::Failed { seq: 2, error: failure }));
}

#[tokio::test(start_paused = true)]
async fn network_failure_keeps_current_view() {
    let (api, store, search, mut events) = setup();
    api.on_search(
        "offline",
        Err(StorefrontError::NetworkFailure("connection refused".into())),
    );

    search.on_input_changed("sports");
    sleep_ms(600).await;
    search.on_input_changed("offline");
    sleep_ms(600).await;

    assert_eq!(
        names(&store),
        vec!["Basketball", "YONEX Smash Badminton Racquet"]
    );
    match drain(&mut events).pop() {
        Some(SearchEvent::Failed { seq: 2, error }) => {
            assert_eq!(error.user_message(), storefront_core::CONNECTIVITY_MESSAGE);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn cart_is_untouched_by_search() {
    let (_api, store, search, _events) = setup();
    store.apply_cart(vec![storefront_core::CartEntry::new("KCRwjF7lN97HnEaY", 2)]);
    let revision_items = store.cart_items();

    search.on_input_changed("zzz");
    sleep_ms(600).await;

    assert_eq!(store.cart_items(), revision_items);
}

// ── Teardown ───────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_timer() {
    let (api, _store, search, mut events) = setup();

    search.on_input_changed("ball");
    search.shutdown();
    assert_eq!(search.state(), SearchState::Idle);

    search.on_input_changed("ball");
    sleep_ms(1_000).await;

    assert!(api.search_calls().is_empty());
    assert!(search.is_shut_down());
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_controller_abandons_in_flight_search() {
    let (api, store, search, mut events) = setup();
    api.on_search_delayed("a", Duration::from_millis(1_000), Ok(vec![]));

    search.on_input_changed("a");
    sleep_ms(600).await;
    assert_eq!(api.search_calls(), vec!["a"]);

    drop(search);
    sleep_ms(2_000).await;

    assert_eq!(store.displayed().len(), 5);
    assert!(drain(&mut events).is_empty());
}
