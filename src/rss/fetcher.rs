//! RSS feed fetcher.
//!
//! Performs one HTTP GET with a fixed timeout, parses the body with feed-rs
//! and HTML-entity-decodes the text fields.

use std::future::Future;
use std::time::Duration;

use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use crate::config::FetcherConfig;
use crate::error::{GatorError, Result};
use crate::rss::pubdate::normalize_pub_date;
use crate::rss::types::{ParsedFeed, ParsedItem};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Something that can turn a feed URL into a parsed feed.
///
/// The aggregator only talks to this trait, so tests can stand in for the
/// network.
pub trait FeedSource {
    /// Fetch and parse the feed at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<ParsedFeed>>;
}

/// HTTP feed fetcher.
pub struct RssFetcher {
    client: Client,
    max_feed_size: u64,
}

impl RssFetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GatorError::Feed(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes,
        })
    }
}

impl FeedSource for RssFetcher {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed> {
        debug!(url, "Fetching feed");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                GatorError::Feed(format!("request timed out: {}", url))
            } else {
                GatorError::Feed(format!("failed to fetch feed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(GatorError::Feed(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(GatorError::Feed(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_feed_size
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatorError::Feed(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_feed_size {
            return Err(GatorError::Feed(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_feed_size
            )));
        }

        parse_feed(&bytes)
    }
}

/// Validate a feed URL before storing it.
///
/// The URL must be absolute http(s) with a host.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| GatorError::Validation(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(GatorError::Validation(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(GatorError::Validation("URL has no host".to_string()));
    }

    Ok(())
}

/// Parse feed bytes into a ParsedFeed.
///
/// Item dates go through [`normalize_pub_date`], so every dated item comes
/// back with a timestamp even when its text is unparseable.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed> {
    let feed = parser::Builder::new()
        .timestamp_parser(|text| Some(normalize_pub_date(text)))
        .build()
        .parse(bytes)
        .map_err(|e| GatorError::Feed(format!("failed to parse feed: {}", e)))?;

    let title = feed
        .title
        .map(|t| unescape(&t.content))
        .unwrap_or_default();
    let link = feed.links.first().map(|l| l.href.clone());
    let description = feed.description.map(|d| unescape(&d.content));

    let items = feed
        .entries
        .into_iter()
        .map(|entry| ParsedItem {
            title: entry
                .title
                .map(|t| unescape(&t.content))
                .unwrap_or_default(),
            link: entry.links.first().map(|l| l.href.clone()),
            description: entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body))
                .map(|d| unescape(&d)),
            published_at: entry.published.or(entry.updated),
        })
        .collect();

    Ok(ParsedFeed {
        title,
        link,
        description,
        items,
    })
}

/// Decode HTML entities left in text after XML decoding.
fn unescape(text: &str) -> String {
    html_escape::decode_html_entities(text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_validate_url_valid() {
        assert!(validate_url("https://blog.boot.dev/index.xml").is_ok());
        assert!(validate_url("http://localhost:8080/feed").is_ok());
    }

    #[test]
    fn test_validate_url_invalid_scheme() {
        let result = validate_url("ftp://example.com/feed.xml");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unsupported URL scheme"));
    }

    #[test]
    fn test_validate_url_not_a_url() {
        let result = validate_url("example.com/feed.xml");
        assert!(matches!(result, Err(GatorError::Validation(_))));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(unescape("&lt;p&gt;"), "<p>");
        assert_eq!(unescape("It&#39;s &quot;fine&quot;"), "It's \"fine\"");
        assert_eq!(unescape("caf&eacute;"), "café");
    }

    #[test]
    fn test_parse_feed_rss() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Boot.dev Blog</title>
    <link>https://blog.boot.dev/</link>
    <description>Latest posts &amp;amp; news</description>
    <item>
      <title>Rust &amp;amp; You</title>
      <link>https://blog.boot.dev/rust</link>
      <description>Why &amp;lt;Rust&amp;gt;</description>
      <pubDate>Tue, 10 Jun 2003 04:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.title, "Boot.dev Blog");
        assert_eq!(feed.description.as_deref(), Some("Latest posts & news"));
        assert_eq!(feed.items.len(), 1);

        let item = &feed.items[0];
        assert_eq!(item.title, "Rust & You");
        assert_eq!(item.link.as_deref(), Some("https://blog.boot.dev/rust"));
        assert_eq!(item.description.as_deref(), Some("Why <Rust>"));
        assert_eq!(
            item.published_at,
            Some(Utc.with_ymd_and_hms(2003, 6, 10, 4, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_feed_unparseable_date_falls_back_to_now() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Feed</title>
    <item>
      <title>Odd date</title>
      <link>https://example.com/odd</link>
      <pubDate>sometime last week</pubDate>
    </item>
  </channel>
</rss>"#;

        let before = Utc::now();
        let feed = parse_feed(rss.as_bytes()).unwrap();
        let published = feed.items[0].published_at.unwrap();
        assert!(published >= before);
        assert!(published <= Utc::now());
    }

    #[test]
    fn test_parse_feed_minimal() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <item>
      <link>https://example.com/1</link>
    </item>
  </channel>
</rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.title, "");
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].title, "");
        assert!(feed.items[0].description.is_none());
        assert!(feed.items[0].published_at.is_none());
    }

    #[test]
    fn test_parse_feed_invalid() {
        assert!(parse_feed(b"This is not XML").is_err());
    }
}
