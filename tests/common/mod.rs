//! Test helpers for integration tests.
//!
//! Provides an in-memory store, a scripted feed source and seed helpers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use gator::rss::{parse_feed, FeedRepository, FeedSource, NewFeed, ParsedFeed};
use gator::{Config, Context, Database, GatorError, NewUser, Result, Session, User, UserRepository};

/// Feed source that serves canned RSS documents by URL.
#[derive(Default)]
pub struct FakeSource {
    documents: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `xml` for `url`.
    pub fn with_feed(mut self, url: &str, xml: &str) -> Self {
        self.documents.insert(url.to_string(), xml.to_string());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl FeedSource for FakeSource {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed> {
        self.requests.borrow_mut().push(url.to_string());
        match self.documents.get(url) {
            Some(xml) => parse_feed(xml.as_bytes()),
            None => Err(GatorError::Feed(format!("HTTP error: 404 Not Found ({url})"))),
        }
    }
}

impl FeedSource for &FakeSource {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed> {
        (**self).fetch(url).await
    }
}

/// Build an RSS 2.0 document from `(title, link, pub_date)` items.
pub fn rss(items: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
<title>Test Feed</title>
<link>https://example.com/</link>
<description>A feed for tests</description>
"#,
    );
    for (title, link, pub_date) in items {
        xml.push_str(&format!(
            "<item><title>{title}</title><link>{link}</link>\
             <description>About {title}</description><pubDate>{pub_date}</pubDate></item>\n"
        ));
    }
    xml.push_str("</channel>\n</rss>\n");
    xml
}

/// Open an empty in-memory store.
pub async fn test_db() -> Database {
    Database::open_in_memory().await.unwrap()
}

/// Context over an in-memory store with an unsaved session.
pub async fn test_context() -> Context {
    Context::new(test_db().await, Config::default(), Session::in_memory())
}

pub async fn create_user(db: &Database, name: &str) -> User {
    UserRepository::new(db.pool())
        .create(&NewUser::new(name))
        .await
        .unwrap()
}

pub async fn create_feed(db: &Database, owner: &User, name: &str, url: &str) -> gator::rss::Feed {
    FeedRepository::new(db.pool())
        .create(&NewFeed::new(name, url, owner.id))
        .await
        .unwrap()
}
