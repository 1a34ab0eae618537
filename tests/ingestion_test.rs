//! Feed ingestion tests.
//!
//! Exercise the select, mark, fetch and insert cycle against an in-memory
//! store and a scripted feed source.

mod common;

use chrono::{Duration, TimeZone, Utc};

use common::{create_feed, create_user, rss, test_db, FakeSource};
use gator::rss::{FeedRepository, PostRepository, Scraper, TickOutcome};

const FEED_URL: &str = "https://blog.example.com/index.xml";

#[tokio::test]
async fn test_no_feeds_is_idle() {
    let db = test_db().await;
    let source = FakeSource::new();

    let outcome = Scraper::new(&db, &source, 100).scrape_next().await.unwrap();
    assert_eq!(outcome, TickOutcome::Idle);
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_new_feed_with_mixed_dates() {
    let db = test_db().await;
    let user = create_user(&db, "alice").await;
    let feed = create_feed(&db, &user, "Blog", FEED_URL).await;
    let source = FakeSource::new().with_feed(
        FEED_URL,
        &rss(&[
            (
                "Parsed",
                "https://blog.example.com/parsed",
                "Mon, 02 Jan 2006 15:04:05 -0700",
            ),
            (
                "Unparsed",
                "https://blog.example.com/unparsed",
                "the other day",
            ),
        ]),
    );

    let before = Utc::now() - Duration::seconds(1);
    let outcome = Scraper::new(&db, &source, 100).scrape_next().await.unwrap();
    let after = Utc::now();

    let TickOutcome::Scraped(report) = outcome else {
        panic!("expected the feed to be scraped");
    };
    assert_eq!(report.feed_id, feed.id);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed, 0);

    let posts = PostRepository::new(db.pool());
    let parsed = posts
        .get_by_url("https://blog.example.com/parsed")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        parsed.published_at,
        Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap()
    );
    assert_eq!(parsed.description.as_deref(), Some("About Parsed"));

    let unparsed = posts
        .get_by_url("https://blog.example.com/unparsed")
        .await
        .unwrap()
        .unwrap();
    assert!(unparsed.published_at >= before);
    assert!(unparsed.published_at <= after);

    let stored = FeedRepository::new(db.pool())
        .get_by_id(feed.id)
        .await
        .unwrap()
        .unwrap();
    let fetched_at = stored.last_fetched_at.unwrap();
    assert!(fetched_at >= before && fetched_at <= after);
}

#[tokio::test]
async fn test_refetch_is_idempotent() {
    let db = test_db().await;
    let user = create_user(&db, "alice").await;
    let feed = create_feed(&db, &user, "Blog", FEED_URL).await;
    let source = FakeSource::new().with_feed(
        FEED_URL,
        &rss(&[
            ("One", "https://blog.example.com/1", "Tue, 10 Jun 2003 04:00:00 GMT"),
            ("Two", "https://blog.example.com/2", "2003-06-11T04:00:00Z"),
            ("Three", "https://blog.example.com/3", "12 Jun 03 04:00 EST"),
        ]),
    );
    let scraper = Scraper::new(&db, &source, 100);

    scraper.scrape_next().await.unwrap();
    let posts = PostRepository::new(db.pool());
    assert_eq!(posts.count_by_feed(feed.id).await.unwrap(), 3);

    let TickOutcome::Scraped(second) = scraper.scrape_next().await.unwrap() else {
        panic!("expected the feed to be scraped again");
    };
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(second.failed, 0);
    assert_eq!(posts.count_by_feed(feed.id).await.unwrap(), 3);
    assert_eq!(source.requests(), vec![FEED_URL, FEED_URL]);
}

#[tokio::test]
async fn test_same_post_in_two_feeds_is_stored_once() {
    let db = test_db().await;
    let user = create_user(&db, "alice").await;
    let first = create_feed(&db, &user, "First", "https://a.example/rss").await;
    let second = create_feed(&db, &user, "Second", "https://b.example/rss").await;
    let shared = rss(&[(
        "Shared",
        "https://news.example/shared",
        "Tue, 10 Jun 2003 04:00:00 GMT",
    )]);
    let source = FakeSource::new()
        .with_feed("https://a.example/rss", &shared)
        .with_feed("https://b.example/rss", &shared);
    let scraper = Scraper::new(&db, &source, 100);

    scraper.scrape_next().await.unwrap();
    scraper.scrape_next().await.unwrap();

    let posts = PostRepository::new(db.pool());
    let total = posts.count_by_feed(first.id).await.unwrap()
        + posts.count_by_feed(second.id).await.unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_feeds_rotate_least_recently_fetched_first() {
    let db = test_db().await;
    let user = create_user(&db, "alice").await;
    create_feed(&db, &user, "A", "https://a.example/rss").await;
    create_feed(&db, &user, "B", "https://b.example/rss").await;
    create_feed(&db, &user, "C", "https://c.example/rss").await;
    let empty = rss(&[]);
    let source = FakeSource::new()
        .with_feed("https://a.example/rss", &empty)
        .with_feed("https://b.example/rss", &empty)
        .with_feed("https://c.example/rss", &empty);
    let scraper = Scraper::new(&db, &source, 100);

    for _ in 0..4 {
        scraper.scrape_next().await.unwrap();
    }

    let requests = source.requests();
    let mut first_round = requests[..3].to_vec();
    first_round.sort();
    assert_eq!(
        first_round,
        vec![
            "https://a.example/rss",
            "https://b.example/rss",
            "https://c.example/rss",
        ]
    );
    // Once every feed has been fetched the oldest comes round again.
    assert_eq!(requests[3], requests[0]);
}

#[tokio::test]
async fn test_failing_feed_does_not_block_others() {
    let db = test_db().await;
    let user = create_user(&db, "alice").await;
    create_feed(&db, &user, "Broken", "https://broken.example/rss").await;
    let healthy = create_feed(&db, &user, "Healthy", "https://ok.example/rss").await;
    let source = FakeSource::new().with_feed(
        "https://ok.example/rss",
        &rss(&[("Post", "https://ok.example/1", "2024-01-01T00:00:00Z")]),
    );
    let scraper = Scraper::new(&db, &source, 100);

    let first = scraper.scrape_next().await;
    let second = scraper.scrape_next().await;
    assert_eq!([first.is_err(), second.is_err()].iter().filter(|e| **e).count(), 1);

    let count = PostRepository::new(db.pool())
        .count_by_feed(healthy.id)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
