//! Periodic feed aggregation loop for gator.

use std::future::Future;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

use super::fetcher::FeedSource;
use super::scraper::{Scraper, TickOutcome};
use crate::db::Database;

/// Run `tick` every `period` until `shutdown` resolves.
///
/// The first tick runs immediately. Each tick is awaited before the timer is
/// polled again, so ticks never overlap, and ticks missed while a slow one ran
/// are dropped rather than replayed. Returns the number of ticks executed.
pub async fn run_periodically<F, Fut, S>(period: Duration, shutdown: S, mut tick: F) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
    S: Future<Output = ()>,
{
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut ticks = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = timer.tick() => {}
        }
        tick().await;
        ticks += 1;
    }

    ticks
}

/// Feed aggregator.
///
/// Scrapes one feed per tick and logs every failure without stopping.
pub struct Aggregator<'a, S> {
    scraper: Scraper<'a, S>,
    period: Duration,
}

impl<'a, S: FeedSource> Aggregator<'a, S> {
    /// Create a new aggregator.
    pub fn new(db: &'a Database, source: S, period: Duration, max_items: usize) -> Self {
        Self {
            scraper: Scraper::new(db, source, max_items),
            period,
        }
    }

    /// Run until `shutdown` resolves. Returns the number of ticks executed.
    pub async fn run<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        info!("Collecting feeds every {:?}", self.period);

        let ticks = run_periodically(self.period, shutdown, || self.tick()).await;

        info!(ticks, "Aggregator stopped");
        ticks
    }

    /// Run a single tick, logging its result.
    pub async fn tick(&self) {
        match self.scraper.scrape_next().await {
            Ok(TickOutcome::Idle) => debug!("Nothing to fetch"),
            Ok(TickOutcome::Scraped(report)) => {
                debug!(url = %report.feed_url, inserted = report.inserted, "Tick complete");
            }
            Err(e) => error!(error = %e, "Aggregation tick failed"),
        }
    }
}
