//! Page loading, item caching and update notifications, against a scripted API

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use schedjoules::utils::{find_elems, lock};
use schedjoules::{Calendar, ItemConfig, ItemEvent, LoadError, MockTransport, Page, Renderable, Sdk, SdkConfig, Updatable};

const HOME_URL: &str = "https://api.schedjoules.com/pages/115673";
const SPORTS_URL: &str = "https://api.schedjoules.com/pages/200";


fn home_page(calendar_name: &str) -> Value {
    json!({
        "item_id": 115673,
        "name": "Home",
        "page_sections": [{
            "name": "Popular",
            "items": [
                {"item_class": "page", "item": {"item_id": 200, "name": "Sports", "category": "Sports"}},
                {"item_class": "calendar", "item": {
                    "item_id": 300,
                    "name": calendar_name,
                    "category": "Holidays",
                    "url": "https://example.com/300.ics",
                }},
            ]
        }]
    })
}

fn setup() -> (Sdk, Arc<MockTransport>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let mock = Arc::new(MockTransport::new());
    mock.respond(HOME_URL, 200, home_page("Netherlands"));

    let config = SdkConfig { api_key: Some("test-key".to_string()), ..SdkConfig::default() };
    let sdk = Sdk::with_transport(config, mock.clone()).unwrap();
    (sdk, mock)
}

fn counter() -> (Arc<Mutex<u32>>, Arc<Mutex<u32>>) {
    let count = Arc::new(Mutex::new(0));
    (count.clone(), count)
}


#[tokio::test]
async fn test_loading_a_page_caches_what_it_lists() {
    let (sdk, mock) = setup();

    let page = sdk.get_page("115673", ItemConfig::new()).unwrap();
    // Nothing is requested until the SDK is given a chance to run
    assert_eq!(sdk.pending_loads(), 1);
    assert!(mock.requests().is_empty());

    sdk.settle().await;
    assert_eq!(sdk.pending_loads(), 0);
    assert_eq!(mock.request_count(HOME_URL), 1);
    assert_eq!(mock.requests()[0].authorization, "Token token=\"test-key\"");

    assert_eq!(sdk.cached_count(), 3);
    assert!(sdk.cached_item("115673").unwrap().is_page());
    assert!(sdk.cached_item("200").unwrap().is_page());
    assert!(sdk.cached_item("300").unwrap().is_calendar());

    let page = lock(&page);
    assert_eq!(page.name(), Some("Home"));
    assert_eq!(page.page_sections().len(), 1);
    assert_eq!(page.page_sections()[0].items.len(), 2);

    // Items listed by a page are not loaded on their own
    assert_eq!(mock.request_count(SPORTS_URL), 0);
}

#[tokio::test]
async fn test_reloading_updates_items_in_place() {
    let (sdk, mock) = setup();
    let page = sdk.get_page("115673", ItemConfig::new()).unwrap();
    sdk.settle().await;

    let calendar = sdk.get_calendar("300", ItemConfig::new()).unwrap();
    assert_eq!(lock(&calendar).name(), Some("Netherlands"));
    assert_eq!(lock(&calendar).container().children().next().unwrap().text(), "Holidays - Netherlands");

    mock.respond(HOME_URL, 200, home_page("Belgium"));
    sdk.update_pages();
    sdk.settle().await;

    // Still one object per id
    assert_eq!(sdk.cached_count(), 3);
    let same_calendar = sdk.get_calendar("300", ItemConfig::new()).unwrap();
    assert!(Arc::ptr_eq(&calendar, &same_calendar));
    let same_page = sdk.get_page("115673", ItemConfig::new()).unwrap();
    assert!(Arc::ptr_eq(&page, &same_page));
    assert_eq!(sdk.pending_loads(), 0);

    // The calendar has been updated, and has rendered itself again
    let calendar = lock(&calendar);
    assert_eq!(calendar.name(), Some("Belgium"));
    assert_eq!(calendar.url(), Some("https://example.com/300.ics"));
    assert_eq!(calendar.container().children().next().unwrap().text(), "Holidays - Belgium");
    assert_eq!(calendar.container().children().count(), 2);
}

#[tokio::test]
async fn test_pages_are_loaded_once() {
    let (sdk, mock) = setup();

    let first = sdk.get_page("115673", ItemConfig::new()).unwrap();
    let second = sdk.get_page("115673", ItemConfig::new()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(sdk.pending_loads(), 1);

    sdk.settle().await;
    sdk.get_page("115673", ItemConfig::new());
    sdk.settle().await;
    assert_eq!(mock.request_count(HOME_URL), 1);
}

#[tokio::test]
async fn test_calendars_are_only_known_from_pages() {
    let (sdk, mock) = setup();

    assert!(sdk.get_calendar("300", ItemConfig::new()).is_none());
    assert_eq!(sdk.cached_count(), 0);
    assert!(mock.requests().is_empty());

    sdk.get_page("115673", ItemConfig::new());
    sdk.settle().await;
    let calendar = sdk.get_calendar("300", ItemConfig::new()).unwrap();
    assert!(lock(&calendar).is_initialized());

    // A page is not a calendar
    assert!(sdk.get_calendar("200", ItemConfig::new()).is_none());
}

#[tokio::test]
async fn test_get_page_keeps_a_cached_calendar() {
    let (sdk, mock) = setup();
    sdk.get_page("115673", ItemConfig::new());
    sdk.settle().await;
    let calendar = sdk.get_calendar("300", ItemConfig::new()).unwrap();

    assert!(sdk.get_page("300", ItemConfig::new()).is_none());
    assert!(sdk.cached_item("300").unwrap().is_calendar());
    assert_eq!(sdk.cached_count(), 3);
    assert_eq!(sdk.pending_loads(), 0);

    // The calendar that has been handed out still receives the updates
    mock.respond(HOME_URL, 200, home_page("Belgium"));
    sdk.update_pages();
    sdk.settle().await;
    assert_eq!(lock(&calendar).name(), Some("Belgium"));
    let same_calendar = sdk.get_calendar("300", ItemConfig::new()).unwrap();
    assert!(Arc::ptr_eq(&calendar, &same_calendar));
}

#[tokio::test]
async fn test_calendar_on_update_runs_at_init() {
    let (sdk, _mock) = setup();
    sdk.get_page("115673", ItemConfig::new());
    sdk.settle().await;

    let (count, seen) = counter();
    let config = ItemConfig::new().on_update(move |calendar: &mut Calendar| {
        calendar.render();
        *lock(&count) += 1;
    });
    let calendar = sdk.get_calendar("300", config).unwrap();
    assert_eq!(*lock(&seen), 1);
    assert_eq!(find_elems(lock(&calendar).container(), "a")[0].attr("href"), Some("https://example.com/300.ics"));

    // Initializing again does not subscribe twice
    sdk.get_calendar("300", ItemConfig::new());
    assert_eq!(lock(&calendar).base().listeners().count(ItemEvent::Updated), 1);
}

#[tokio::test]
async fn test_unchanged_locale_does_nothing() {
    let (sdk, mock) = setup();
    sdk.get_page("115673", ItemConfig::new());
    sdk.settle().await;
    mock.clear_requests();

    sdk.set_locale("en");
    assert_eq!(sdk.pending_loads(), 0);
    sdk.settle().await;
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_locale_change_reloads_initialized_pages() {
    let (sdk, mock) = setup();
    let mut french = home_page("Pays-Bas");
    french["name"] = json!("Accueil");
    mock.respond(&format!("{}?locale=fr", HOME_URL), 200, french);

    let page = sdk.get_page("115673", ItemConfig::new()).unwrap();
    sdk.settle().await;
    mock.clear_requests();

    sdk.set_locale("fr");
    assert_eq!(sdk.locale(), "fr");
    sdk.settle().await;

    // Only the initialized page is reloaded, in the new locale
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "https://api.schedjoules.com/pages/115673?locale=fr");
    assert_eq!(lock(&page).name(), Some("Accueil"));

    let calendar = sdk.get_calendar("300", ItemConfig::new()).unwrap();
    assert_eq!(lock(&calendar).name(), Some("Pays-Bas"));
}

#[tokio::test]
async fn test_page_on_update_only_runs_while_attached() {
    let (sdk, _mock) = setup();

    let (count, seen) = counter();
    let config = ItemConfig::new().on_update(move |page: &mut Page| {
        page.render();
        *lock(&count) += 1;
    });
    let page = sdk.get_page("115673", config).unwrap();
    sdk.settle().await;
    assert_eq!(*lock(&seen), 0);
    assert_eq!(lock(&page).container().children().count(), 0);

    lock(&page).base_mut().attach();
    sdk.update_pages();
    sdk.settle().await;
    assert_eq!(*lock(&seen), 1);
    assert_eq!(find_elems(lock(&page).container(), "section").len(), 1);
}

#[tokio::test]
async fn test_observers_and_loaded_event() {
    let (sdk, _mock) = setup();
    let page = sdk.get_page("115673", ItemConfig::new()).unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    for (event, name) in &[(ItemEvent::Updated, "updated"), (ItemEvent::Loaded, "loaded")] {
        let events = events.clone();
        let name = name.to_string();
        lock(&page).subscribe(*event, Arc::new(move |_: &mut Page| lock(&events).push(name.clone())));
    }

    sdk.settle().await;
    assert_eq!(*lock(&events), vec!["updated", "loaded"]);
}

#[tokio::test]
async fn test_failures_are_logged_and_dropped() {
    let (sdk, mock) = setup();
    mock.respond(HOME_URL, 500, json!({"error": "oops"}));

    let (count, seen) = counter();
    let config = ItemConfig::new().on_update(move |_: &mut Page| *lock(&count) += 1);
    let page = sdk.get_page("115673", config).unwrap();
    lock(&page).base_mut().attach();
    lock(&page).subscribe(ItemEvent::Loaded, Arc::new(|_: &mut Page| panic!("Nothing has been loaded")));

    sdk.settle().await;
    assert_eq!(*lock(&seen), 0);
    assert_eq!(sdk.cached_count(), 1);
    assert!(lock(&page).page_sections().is_empty());

    // The same failure, reported explicitly
    match sdk.load_page(&page).await {
        Err(LoadError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("Unexpected result {:?}", other),
    }

    mock.fail(HOME_URL);
    assert!(matches!(sdk.load_page(&page).await, Err(LoadError::Transport(_))));
}

#[tokio::test]
async fn test_api_key_can_be_changed() {
    let (sdk, mock) = setup();
    sdk.set_api_key("another-key");
    assert_eq!(sdk.loader().config().locale, "en");

    sdk.get_page("115673", ItemConfig::new());
    sdk.settle().await;
    assert_eq!(mock.requests()[0].authorization, "Token token=\"another-key\"");
}

#[tokio::test]
async fn test_invalid_base_uri() {
    let config = SdkConfig { uri: "definitely not a URI".to_string(), ..SdkConfig::default() };
    assert!(Sdk::with_transport(config, Arc::new(MockTransport::new())).is_err());
}
