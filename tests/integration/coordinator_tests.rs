//! End-to-end harvest through the coordinator: crawl, fetch, export

use crate::support::{result_page, search_url, test_config, OnPage, SEARCH_PATH};
use chrono::NaiveDate;
use profile_harvest::coordinator::{Coordinator, Message, Reporter};
use profile_harvest::crawler::{build_http_client, HttpPageSource, LinkExtractor};
use profile_harvest::output::write_export;
use profile_harvest::state::{CrawlPhase, FetchPhase, IdentifierSet};
use profile_harvest::storage::{SqliteStore, StateStore};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_search(server: &MockServer) {
    for (page, users, next) in [
        (1, vec!["alice", "bob"], Some(2)),
        (2, vec!["bob", "carol"], None),
    ] {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(OnPage(page))
            .respond_with(ResponseTemplate::new(200).set_body_string(result_page(&users, next)))
            .mount(server)
            .await;
    }
}

async fn mount_profiles(server: &MockServer) {
    let profiles = [
        json!({
            "login": "alice",
            "name": "Alice Smith",
            "location": "Berlin, Germany",
            "bio": "He said \"hi\", then left\n",
            "public_repos": 12,
            "followers": 340
        }),
        json!({ "login": "bob", "name": "Bob", "public_repos": 3 }),
        json!({ "login": "carol", "company": "@acme", "followers": 5 }),
    ];

    for profile in profiles {
        let login = profile["login"].as_str().unwrap().to_string();
        Mock::given(method("GET"))
            .and(path(format!("/api/users/{}", login)))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile))
            .mount(server)
            .await;
    }
}

/// Waits for the next message matching `done`, with a timeout
async fn wait_for(
    rx: &mut UnboundedReceiver<Message>,
    done: impl Fn(&Message) -> bool,
) -> Message {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let message = rx.recv().await.expect("observer channel closed");
            if done(&message) {
                return message;
            }
        }
    })
    .await
    .expect("timed out waiting for the coordinator")
}

#[tokio::test]
async fn test_full_harvest() {
    let server = MockServer::start().await;
    mount_search(&server).await;
    mount_profiles(&server).await;

    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("harvest.db");
    let export_dir = temp.path().join("exports");
    let config = test_config(
        &format!("{}/api", server.uri()),
        db_path.to_str().unwrap(),
        export_dir.to_str().unwrap(),
    );

    let client = build_http_client(&config.user_agent, Duration::from_secs(5)).unwrap();
    let store = SqliteStore::new(&db_path).unwrap();
    let coordinator = Coordinator::new(&config, HttpPageSource::new(client), store).unwrap();

    let (observer_tx, mut observed) = mpsc::unbounded_channel();
    let (commands, handle) = coordinator.spawn(Reporter::new(observer_tx));

    commands
        .send(Message::BeginMultiPageScrape {
            url: search_url(&server.uri()),
            fresh: false,
        })
        .await
        .unwrap();

    let ready = wait_for(&mut observed, |m| {
        matches!(
            m,
            Message::ScrapeResultsReady { .. } | Message::ScrapeFailed { .. }
        )
    })
    .await;
    assert_eq!(
        ready,
        Message::ScrapeResultsReady {
            identifiers: vec!["alice".into(), "bob".into(), "carol".into()],
            total_pages: Some(2),
        }
    );

    commands.send(Message::BeginProfileFetch).await.unwrap();

    let finished = wait_for(&mut observed, |m| {
        matches!(m, Message::FetchUpdate { status } if status.is_terminal())
    })
    .await;
    let Message::FetchUpdate { status } = finished else {
        unreachable!();
    };
    assert_eq!(status.phase, FetchPhase::Complete);
    assert_eq!(status.message, "Successfully fetched 3 profiles!");

    drop(commands);
    let store = handle.await.unwrap();

    assert_eq!(store.load_crawl_phase().unwrap(), CrawlPhase::Completed);
    assert!(store.load_crawl_state().unwrap().is_none());

    let profiles = store.load_profiles().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let export = write_export(&export_dir, &profiles, date).unwrap();

    assert_eq!(export, export_dir.join("github-profiles-2024-05-01.csv"));
    let csv = std::fs::read_to_string(&export).unwrap();
    assert_eq!(
        csv,
        [
            "Name,Username,Location,Company,Email,Website,Public Repos,Followers,Bio",
            "Alice Smith,alice,\"Berlin, Germany\",,,,12,340,\"He said \"\"hi\"\", then left\n\"",
            "Bob,bob,,,,,3,0,",
            ",carol,,@acme,,,0,5,",
        ]
        .join("\n")
    );
}

#[tokio::test]
async fn test_scrape_failure_reaches_observer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("harvest.db");
    let config = test_config(
        &server.uri(),
        db_path.to_str().unwrap(),
        temp.path().to_str().unwrap(),
    );

    let client = build_http_client(&config.user_agent, Duration::from_secs(5)).unwrap();
    let coordinator = Coordinator::new(
        &config,
        HttpPageSource::new(client),
        SqliteStore::new(&db_path).unwrap(),
    )
    .unwrap();

    let (observer_tx, mut observed) = mpsc::unbounded_channel();
    let (commands, handle) = coordinator.spawn(Reporter::new(observer_tx));

    commands
        .send(Message::BeginMultiPageScrape {
            url: search_url(&server.uri()),
            fresh: true,
        })
        .await
        .unwrap();

    let failed = wait_for(&mut observed, |m| matches!(m, Message::ScrapeFailed { .. })).await;
    assert!(matches!(failed, Message::ScrapeFailed { page: 1, .. }));

    drop(commands);
    let store = handle.await.unwrap();
    assert_eq!(store.load_crawl_phase().unwrap(), CrawlPhase::Failed);
    assert!(store.load_identifiers().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_url_reaches_observer() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("harvest.db");
    let config = test_config(
        "https://api.github.com",
        db_path.to_str().unwrap(),
        temp.path().to_str().unwrap(),
    );

    let client = build_http_client(&config.user_agent, Duration::from_secs(5)).unwrap();
    let coordinator = Coordinator::new(
        &config,
        HttpPageSource::new(client),
        SqliteStore::new(&db_path).unwrap(),
    )
    .unwrap();

    let (observer_tx, mut observed) = mpsc::unbounded_channel();
    let (commands, _handle) = coordinator.spawn(Reporter::new(observer_tx));

    commands
        .send(Message::BeginSinglePageScrape {
            url: "not a url".to_string(),
        })
        .await
        .unwrap();

    let failed = wait_for(&mut observed, |m| matches!(m, Message::ScrapeFailed { .. })).await;
    let Message::ScrapeFailed { message, .. } = failed else {
        unreachable!();
    };
    assert!(message.starts_with("URL error"));
}

/// Reads usernames from `data-login` attributes instead of profile links
struct DataLoginExtractor;

impl LinkExtractor for DataLoginExtractor {
    fn extract(&self, html: &str) -> IdentifierSet {
        html.split("data-login=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .filter(|login| !login.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[tokio::test]
async fn test_scrape_with_custom_extractor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<ul><li data-login="dora">Dora</li><li data-login="eve">Eve</li>
               <li data-login="dora">Dora again</li></ul>"#,
        ))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("harvest.db");
    let config = test_config(
        &server.uri(),
        db_path.to_str().unwrap(),
        temp.path().to_str().unwrap(),
    );

    let client = build_http_client(&config.user_agent, Duration::from_secs(5)).unwrap();
    let coordinator = Coordinator::new(
        &config,
        HttpPageSource::new(client),
        SqliteStore::new(&db_path).unwrap(),
    )
    .unwrap()
    .with_extractor(Box::new(DataLoginExtractor));

    let (observer_tx, mut observed) = mpsc::unbounded_channel();
    let (commands, handle) = coordinator.spawn(Reporter::new(observer_tx));

    commands
        .send(Message::BeginSinglePageScrape {
            url: search_url(&server.uri()),
        })
        .await
        .unwrap();

    let ready = wait_for(&mut observed, |m| {
        matches!(
            m,
            Message::ScrapeResultsReady { .. } | Message::ScrapeFailed { .. }
        )
    })
    .await;
    assert_eq!(
        ready,
        Message::ScrapeResultsReady {
            identifiers: vec!["dora".to_string(), "eve".to_string()],
            total_pages: None,
        }
    );

    drop(commands);
    let store = handle.await.unwrap();
    assert_eq!(store.load_identifiers().unwrap().to_vec(), vec!["dora", "eve"]);
    assert_eq!(store.load_crawl_phase().unwrap(), CrawlPhase::Completed);
}
