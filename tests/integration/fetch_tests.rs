//! Profile fetch tests against a mock API

use profile_harvest::config::UserAgentConfig;
use profile_harvest::coordinator::{Message, Reporter};
use profile_harvest::crawler::build_http_client;
use profile_harvest::fetch::FetchBatcher;
use profile_harvest::state::{FetchPhase, FetchStatus};
use profile_harvest::storage::{SqliteStore, StateStore};
use profile_harvest::{HarvestError, ProfileRecord};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn batcher(server: &MockServer, delay: Duration) -> FetchBatcher {
    let user_agent = UserAgentConfig {
        crawler_name: "TestHarvester".to_string(),
        crawler_version: "1.0".to_string(),
        contact_url: "https://example.com/about".to_string(),
        contact_email: "admin@example.com".to_string(),
    };
    let client = build_http_client(&user_agent, Duration::from_secs(5)).unwrap();
    FetchBatcher::new(client, Url::parse(&server.uri()).unwrap(), delay)
}

async fn mount_user(server: &MockServer, login: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{}", login)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn logins(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn fetch_updates(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<FetchStatus> {
    let mut updates = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let Message::FetchUpdate { status } = message {
            updates.push(status);
        }
    }
    updates
}

#[tokio::test]
async fn test_fetches_in_input_order_with_defaults() {
    let server = MockServer::start().await;
    mount_user(
        &server,
        "alice",
        json!({
            "login": "alice",
            "name": "Alice Smith",
            "location": "Berlin",
            "company": null,
            "email": null,
            "blog": "https://alice.dev",
            "bio": "Rustacean",
            "public_repos": 42,
            "followers": 7
        }),
    )
    .await;
    mount_user(&server, "bob", json!({ "login": "bob" })).await;

    let mut store = SqliteStore::open_in_memory().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let profiles = batcher(&server, Duration::ZERO)
        .run(&mut store, &logins(&["alice", "bob"]), &Reporter::new(tx))
        .await
        .expect("batch should succeed");

    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].login, "alice");
    assert_eq!(profiles[0].name, "Alice Smith");
    assert_eq!(profiles[0].company, "");
    assert_eq!(profiles[0].public_repos, 42);
    assert_eq!(profiles[1], ProfileRecord::with_login("bob"));

    assert_eq!(store.load_profiles().unwrap(), profiles);

    let status = store.load_fetch_status().unwrap().unwrap();
    assert_eq!(status.phase, FetchPhase::Complete);
    assert_eq!(status.message, "Successfully fetched 2 profiles!");

    let updates = fetch_updates(&mut rx);
    let phases: Vec<FetchPhase> = updates.iter().map(|s| s.phase).collect();
    assert_eq!(
        phases,
        vec![FetchPhase::Progress, FetchPhase::Progress, FetchPhase::Complete]
    );
    assert_eq!(updates[1].message, "Fetching profiles... (1/2)");
}

#[tokio::test]
async fn test_rate_limit_aborts_whole_batch() {
    let server = MockServer::start().await;
    mount_user(&server, "a", json!({ "login": "a" })).await;
    Mock::given(method("GET"))
        .and(path("/users/b"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "c" })))
        .expect(0)
        .mount(&server)
        .await;

    let mut store = SqliteStore::open_in_memory().unwrap();

    let result = batcher(&server, Duration::ZERO)
        .run(&mut store, &logins(&["a", "b", "c"]), &Reporter::silent())
        .await;

    assert!(matches!(result, Err(HarvestError::RateLimited { ref login }) if login == "b"));

    let status = store.load_fetch_status().unwrap().unwrap();
    assert_eq!(status.phase, FetchPhase::Error);
    assert_eq!(status.current, 1);
    assert_eq!(status.total, 3);
    assert_eq!(
        status.message,
        "Error: API rate limit exceeded. Try again later."
    );
    assert!(store.load_profiles().unwrap().is_empty());
}

#[tokio::test]
async fn test_other_api_error_aborts_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut store = SqliteStore::open_in_memory().unwrap();

    let result = batcher(&server, Duration::ZERO)
        .run(&mut store, &logins(&["ghost"]), &Reporter::silent())
        .await;

    assert!(matches!(result, Err(HarvestError::Api { status: 404, .. })));
    let status = store.load_fetch_status().unwrap().unwrap();
    assert_eq!(status.message, "Error: GitHub API error: 404");
}

#[tokio::test]
async fn test_failed_batch_keeps_previous_profiles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/a"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut store = SqliteStore::open_in_memory().unwrap();
    let earlier = vec![ProfileRecord::with_login("earlier")];
    store.save_profiles(&earlier).unwrap();

    let result = batcher(&server, Duration::ZERO)
        .run(&mut store, &logins(&["a"]), &Reporter::silent())
        .await;

    assert!(result.is_err());
    assert_eq!(store.load_profiles().unwrap(), earlier);
}

#[tokio::test]
async fn test_requests_are_spaced_out() {
    let server = MockServer::start().await;
    for login in ["x", "y", "z"] {
        mount_user(&server, login, json!({ "login": login })).await;
    }

    let mut store = SqliteStore::open_in_memory().unwrap();
    let started = Instant::now();

    batcher(&server, Duration::from_millis(150))
        .run(&mut store, &logins(&["x", "y", "z"]), &Reporter::silent())
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_empty_list_is_an_error() {
    let server = MockServer::start().await;
    let mut store = SqliteStore::open_in_memory().unwrap();

    let result = batcher(&server, Duration::ZERO)
        .run(&mut store, &[], &Reporter::silent())
        .await;

    assert!(matches!(result, Err(HarvestError::NothingToFetch)));
    assert_eq!(
        store.load_fetch_status().unwrap().unwrap().phase,
        FetchPhase::Error
    );
}

#[tokio::test]
async fn test_undecodable_body_aborts_batch() {
    let server = MockServer::start().await;
    mount_user(&server, "a", json!({ "login": "a" })).await;
    Mock::given(method("GET"))
        .and(path("/users/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let mut store = SqliteStore::open_in_memory().unwrap();

    let result = batcher(&server, Duration::ZERO)
        .run(&mut store, &logins(&["a", "b"]), &Reporter::silent())
        .await;

    match result {
        Err(HarvestError::Transport { url, .. }) => assert!(url.ends_with("/users/b")),
        other => panic!("expected a transport error, got {:?}", other),
    }

    let status = store.load_fetch_status().unwrap().unwrap();
    assert_eq!(status.phase, FetchPhase::Error);
    assert_eq!(status.current, 1);
    assert_eq!(status.total, 2);
    assert!(status.current <= status.total);
    assert!(store.load_profiles().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_api_aborts_batch() {
    let user_agent = UserAgentConfig {
        crawler_name: "TestHarvester".to_string(),
        crawler_version: "1.0".to_string(),
        contact_url: "https://example.com/about".to_string(),
        contact_email: "admin@example.com".to_string(),
    };
    let client = build_http_client(&user_agent, Duration::from_secs(2)).unwrap();
    let mut batcher = FetchBatcher::new(
        client,
        Url::parse("http://127.0.0.1:9").unwrap(),
        Duration::ZERO,
    );

    let mut store = SqliteStore::open_in_memory().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let result = batcher
        .run(&mut store, &logins(&["alice"]), &Reporter::new(tx))
        .await;

    assert!(matches!(result, Err(HarvestError::Transport { .. })));

    let status = store.load_fetch_status().unwrap().unwrap();
    assert_eq!(status.phase, FetchPhase::Error);
    assert_eq!(status.current, 0);
    assert_eq!(status.total, 1);
    assert!(status.message.starts_with("Error: Request to"));
    assert!(store.load_profiles().unwrap().is_empty());

    let last = fetch_updates(&mut rx).pop().unwrap();
    assert_eq!(last.phase, FetchPhase::Error);
}
