//! One aggregation tick: select, mark, fetch, ingest.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::fetcher::FeedSource;
use super::repository::{FeedRepository, PostRepository};
use super::types::{InsertOutcome, NewPost};
use crate::db::Database;
use crate::Result;

/// Counters for one scraped feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Feed that was scraped.
    pub feed_id: Uuid,
    /// URL that was fetched.
    pub feed_url: String,
    /// Posts newly stored.
    pub inserted: usize,
    /// Items already stored, or without a link.
    pub skipped: usize,
    /// Items whose insert failed for another reason.
    pub failed: usize,
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// There are no feeds.
    Idle,
    /// One feed was scraped.
    Scraped(ScrapeReport),
}

/// Scrapes feeds from a store using a feed source.
pub struct Scraper<'a, S> {
    db: &'a Database,
    source: S,
    max_items: usize,
}

impl<'a, S: FeedSource> Scraper<'a, S> {
    /// Create a scraper that stores at most `max_items` items per fetch.
    pub fn new(db: &'a Database, source: S, max_items: usize) -> Self {
        Self {
            db,
            source,
            max_items,
        }
    }

    /// Scrape the feed that has waited longest.
    ///
    /// A fetch or parse failure is returned as an error after the feed has
    /// been marked; per-item failures are logged and counted instead.
    pub async fn scrape_next(&self) -> Result<TickOutcome> {
        let feeds = FeedRepository::new(self.db.pool());

        let Some(feed) = feeds.get_next_to_fetch().await? else {
            debug!("No feeds to fetch");
            return Ok(TickOutcome::Idle);
        };

        // Marked before fetching so a slow or failing feed cannot starve the
        // rest of the list. A failed fetch still counts as fetched.
        feeds.mark_fetched(feed.id, Utc::now()).await?;

        info!(feed = %feed.name, url = %feed.url, "Fetching feed");
        let parsed = self.source.fetch(&feed.url).await?;

        let posts = PostRepository::new(self.db.pool());
        let mut report = ScrapeReport {
            feed_id: feed.id,
            feed_url: feed.url.clone(),
            inserted: 0,
            skipped: 0,
            failed: 0,
        };

        for item in parsed.items.into_iter().take(self.max_items) {
            let Some(link) = item.link.filter(|l| !l.trim().is_empty()) else {
                debug!(feed = %feed.name, title = %item.title, "Skipping item without link");
                report.skipped += 1;
                continue;
            };

            let published_at = item.published_at.unwrap_or_else(Utc::now);
            let mut new_post = NewPost::new(feed.id, item.title, link, published_at);
            if let Some(description) = item.description {
                new_post = new_post.with_description(description);
            }

            match posts.create(&new_post).await {
                Ok(InsertOutcome::Inserted(_)) => report.inserted += 1,
                Ok(InsertOutcome::Duplicate) => report.skipped += 1,
                Err(e) => {
                    warn!(url = %new_post.url, error = %e, "Failed to store post");
                    report.failed += 1;
                }
            }
        }

        info!(
            feed = %feed.name,
            inserted = report.inserted,
            skipped = report.skipped,
            failed = report.failed,
            "Feed collected"
        );

        Ok(TickOutcome::Scraped(report))
    }
}
