//! End-to-end tests for the tracking script endpoint.

use std::sync::Arc;

use site_tracker::config::TrackerConfig;
use site_tracker::registry::{FileRegistry, MemoryRegistry};

mod common;

fn scenario_registry() -> Arc<MemoryRegistry> {
    let registry = MemoryRegistry::new();
    registry.set_main_url(1, "example.com/a");
    registry.add_url(2, "example.com/a/b");
    Arc::new(registry)
}

#[tokio::test]
async fn test_longest_registered_url_wins() {
    let registry = scenario_registry();
    let server = common::start_server(TrackerConfig::default(), registry.clone()).await;

    let res = common::client()
        .get(server.url("/tracking-script"))
        .query(&[("location", "https://example.com/a/b/page")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "text/plain; charset=utf-8"
    );
    assert!(res.headers().contains_key("x-request-id"));

    let body = res.text().await.unwrap();
    let tracker = format!("http://{}/matomo.php", server.addr);
    assert!(body.contains("_paq.push(['setSiteId', 358]);"));
    assert!(body.contains(&format!("_paq.push(['addTracker', '{}', 2]);", tracker)));
    assert!(body.contains(&format!("src='http://{}/matomo.js'", server.addr)));
}

#[tokio::test]
async fn test_unmatched_location_only_tracks_catch_all() {
    let server = common::start_server(TrackerConfig::default(), scenario_registry()).await;

    let body = common::client()
        .get(server.url("/tracking-script"))
        .query(&[("location", "https://other.com")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("_paq.push(['trackPageView']);"));
    assert!(!body.contains("addTracker"));
}

#[tokio::test]
async fn test_missing_location_is_rejected_without_registry_access() {
    let registry = scenario_registry();
    let server = common::start_server(TrackerConfig::default(), registry.clone()).await;
    let client = common::client();

    for url in [server.url("/tracking-script"), server.url("/tracking-script?location=")] {
        let res = client.get(url).send().await.unwrap();
        assert_eq!(res.status(), 400);
        assert_eq!(
            res.text().await.unwrap(),
            "'location' parameter with the current URL must be provided!"
        );
    }
    assert_eq!(registry.reads(), 0);
}

#[tokio::test]
async fn test_repeated_location_is_served_from_cache() {
    let registry = scenario_registry();
    let server = common::start_server(TrackerConfig::default(), registry.clone()).await;
    let client = common::client();

    for _ in 0..3 {
        let res = client
            .get(server.url("/tracking-script"))
            .query(&[("location", "https://example.com/a/page")])
            .send()
            .await
            .unwrap();
        assert!(res.text().await.unwrap().contains("', 1]);"));
    }
    assert_eq!(registry.reads(), 1);
}

#[tokio::test]
async fn test_registry_outage_is_an_error_not_a_miss() {
    let registry = scenario_registry();
    registry.set_offline(true);
    let server = common::start_server(TrackerConfig::default(), registry.clone()).await;

    let res = common::client()
        .get(server.url("/tracking-script"))
        .query(&[("location", "https://example.com/a/b/page")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    assert!(!res.text().await.unwrap().contains("_paq"));
}

#[tokio::test]
async fn test_configured_base_url_and_forwarded_scheme() {
    let mut config = TrackerConfig::default();
    config.tracker.base_url = Some("https://stats.example.com".into());
    let server = common::start_server(config, scenario_registry()).await;

    let body = common::client()
        .get(server.url("/tracking-script"))
        .query(&[("location", "https://example.com/a")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("'https://stats.example.com/matomo.php'"));

    let server = common::start_server(TrackerConfig::default(), scenario_registry()).await;
    let body = common::client()
        .get(server.url("/tracking-script"))
        .header("x-forwarded-proto", "https")
        .query(&[("location", "https://example.com/a")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(&format!("'https://{}/matomo.php'", server.addr)));
}

#[tokio::test]
async fn test_file_registry_end_to_end() {
    let file = common::registry_file(
        r#"
        [[sites]]
        id = 1
        main_url = "example.com/a"

        [[sites]]
        id = 2
        urls = ["example.com/a/b"]

        [[sites]]
        id = 358
        main_url = "example.com/a/b/page"
        "#,
    );
    let server = common::start_server(
        TrackerConfig::default(),
        Arc::new(FileRegistry::new(file.path())),
    )
    .await;

    let body = common::client()
        .get(server.url("/tracking-script"))
        .query(&[("location", "https://example.com/a/b/page")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(body.matches("addTracker").count(), 1);
    assert!(body.contains("/matomo.php', 2]);"));
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let server = common::start_server(TrackerConfig::default(), scenario_registry()).await;
    let client = common::client();

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let res = client.get(server.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_repeated_location_uses_last_value() {
    let server = common::start_server(TrackerConfig::default(), scenario_registry()).await;

    let res = common::client()
        .get(server.url("/tracking-script"))
        .query(&[
            ("location", "https://other.com"),
            ("location", "https://example.com/a/b/page"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.text().await.unwrap().contains("/matomo.php', 2]);"));

    let res = common::client()
        .get(server.url("/tracking-script"))
        .query(&[("location", "https://example.com/a"), ("location", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert_eq!(
        res.text().await.unwrap(),
        "'location' parameter with the current URL must be provided!"
    );
}

#[tokio::test]
async fn test_client_request_id_is_echoed() {
    let server = common::start_server(TrackerConfig::default(), scenario_registry()).await;

    let res = common::client()
        .get(server.url("/tracking-script"))
        .header("x-request-id", "req-123")
        .query(&[("location", "https://example.com/a")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-request-id"], "req-123");
}
