//! Robots.txt verdicts, including the racing-first-callers case.

use std::sync::Arc;
use std::time::Duration;
use webscout::DomainManager;

fn manager() -> DomainManager {
    DomainManager::new("TestCrawler/1.0 (test@example.com)", Duration::from_millis(1))
        .expect("manager builds")
}

#[tokio::test]
async fn disallowed_paths_are_refused_and_others_allowed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/robots.txt")
        .with_status(200)
        .with_body("User-agent: *\nDisallow: /private")
        .create_async()
        .await;

    let mgr = manager();
    let base = server.url();

    assert!(!mgr.is_allowed(&format!("{base}/private/x")).await);
    assert!(mgr.is_allowed(&format!("{base}/ok")).await);
}

#[tokio::test]
async fn all_racing_first_callers_see_the_same_verdict() {
    let mut server = mockito::Server::new_async().await;
    let robots = server
        .mock("GET", "/robots.txt")
        .with_status(200)
        .with_body("User-agent: *\nDisallow: /private")
        .expect_at_least(1)
        .create_async()
        .await;

    let mgr = Arc::new(manager());
    let url = format!("{}/private/thing", server.url());

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let mgr = Arc::clone(&mgr);
            let url = url.clone();
            tokio::spawn(async move { mgr.is_allowed(&url).await })
        })
        .collect();

    for task in tasks {
        assert!(!task.await.expect("task completes"), "a racing caller was allowed");
    }
    robots.assert_async().await;
}

#[tokio::test]
async fn missing_robots_txt_fails_open() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/robots.txt")
        .with_status(404)
        .create_async()
        .await;

    let mgr = manager();
    assert!(mgr.is_allowed(&format!("{}/anything", server.url())).await);
}

#[tokio::test]
async fn unreachable_host_fails_open() {
    // Nothing listens on port 1; the fetch error must not block crawling.
    let mgr = manager();
    assert!(mgr.is_allowed("http://127.0.0.1:1/page").await);
}

#[tokio::test]
async fn robots_txt_is_fetched_once_per_host() {
    let mut server = mockito::Server::new_async().await;
    let robots = server
        .mock("GET", "/robots.txt")
        .with_status(200)
        .with_body("User-agent: *\nDisallow: /private")
        .expect(1)
        .create_async()
        .await;

    let mgr = manager();
    let base = server.url();
    for path in ["/a", "/b", "/private/c", "/d"] {
        let _ = mgr.is_allowed(&format!("{base}{path}")).await;
    }
    robots.assert_async().await;
}

#[tokio::test]
async fn unparseable_urls_are_refused() {
    let mgr = manager();
    assert!(!mgr.is_allowed("not a url").await);
}
