//! The visited set under heavy concurrent contention.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use webscout::VisitedSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn exactly_one_of_a_thousand_racers_claims_a_url() {
    let visited = Arc::new(VisitedSet::new());
    let claims = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..1000)
        .map(|_| {
            let visited = Arc::clone(&visited);
            let claims = Arc::clone(&claims);
            tokio::spawn(async move {
                if !visited.seen_or_insert("https://example.com/contested") {
                    claims.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.expect("task completes");
    }

    assert_eq!(claims.load(Ordering::Relaxed), 1);
    assert_eq!(visited.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_distinct_urls_are_all_claimed_once() {
    let visited = Arc::new(VisitedSet::new());
    let claims = Arc::new(AtomicUsize::new(0));

    // 100 distinct URLs, 10 racers each.
    let tasks: Vec<_> = (0..1000)
        .map(|i| {
            let visited = Arc::clone(&visited);
            let claims = Arc::clone(&claims);
            tokio::spawn(async move {
                let url = format!("https://example.com/page/{}", i % 100);
                if !visited.seen_or_insert(&url) {
                    claims.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.expect("task completes");
    }

    assert_eq!(claims.load(Ordering::Relaxed), 100);
    assert_eq!(visited.len(), 100);
}
