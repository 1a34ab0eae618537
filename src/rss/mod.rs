//! RSS aggregation for gator.
//!
//! Feed storage, fetching, date normalization and the polling loop.

pub mod fetcher;
pub mod pubdate;
pub mod repository;
pub mod scraper;
pub mod types;
pub mod updater;

pub use fetcher::{parse_feed, validate_url, FeedSource, RssFetcher};
pub use pubdate::{normalize_pub_date, parse_pub_date};
pub use repository::{FeedFollowRepository, FeedRepository, PostRepository};
pub use scraper::{ScrapeReport, Scraper, TickOutcome};
pub use types::{
    Feed, FeedFollow, FeedWithOwner, InsertOutcome, NewFeed, NewPost, ParsedFeed, ParsedItem,
    Post, PostWithFeed, DEFAULT_BROWSE_LIMIT,
};
pub use updater::{run_periodically, Aggregator};
