//! RSS types for gator.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Default number of posts shown by `browse`.
pub const DEFAULT_BROWSE_LIMIT: i64 = 2;

/// A subscribed feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    /// Feed ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Feed URL (globally unique).
    pub url: String,
    /// User who added the feed.
    pub user_id: Uuid,
    /// Last time the feed was picked by the aggregator; `None` means never.
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// When the feed was created.
    pub created_at: DateTime<Utc>,
    /// When the feed was last updated.
    pub updated_at: DateTime<Utc>,
}

/// New feed for creation.
#[derive(Debug, Clone)]
pub struct NewFeed {
    /// Display name.
    pub name: String,
    /// Feed URL.
    pub url: String,
    /// Owning user ID.
    pub user_id: Uuid,
}

impl NewFeed {
    /// Create a new feed.
    pub fn new(name: impl Into<String>, url: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            user_id,
        }
    }
}

/// A feed together with the name of the user who added it.
#[derive(Debug, Clone)]
pub struct FeedWithOwner {
    /// The feed.
    pub feed: Feed,
    /// Owner's user name.
    pub owner_name: String,
}

/// A user following a feed.
#[derive(Debug, Clone)]
pub struct FeedFollow {
    /// Follow ID.
    pub id: Uuid,
    /// Following user.
    pub user_id: Uuid,
    /// Followed feed.
    pub feed_id: Uuid,
    /// Follower's user name.
    pub user_name: String,
    /// Followed feed's name.
    pub feed_name: String,
    /// When the follow was created.
    pub created_at: DateTime<Utc>,
}

/// An ingested post.
#[derive(Debug, Clone)]
pub struct Post {
    /// Post ID.
    pub id: Uuid,
    /// Post title.
    pub title: String,
    /// Link to the article (globally unique).
    pub url: String,
    /// Description/summary.
    pub description: Option<String>,
    /// Publication time.
    pub published_at: DateTime<Utc>,
    /// Feed the post came from.
    pub feed_id: Uuid,
    /// When the post was ingested.
    pub created_at: DateTime<Utc>,
}

/// New post for creation.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Feed ID.
    pub feed_id: Uuid,
    /// Post title.
    pub title: String,
    /// Link to the article.
    pub url: String,
    /// Description; empty descriptions are stored as NULL.
    pub description: Option<String>,
    /// Publication time.
    pub published_at: DateTime<Utc>,
}

impl NewPost {
    /// Create a new post.
    pub fn new(
        feed_id: Uuid,
        title: impl Into<String>,
        url: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            feed_id,
            title: title.into(),
            url: url.into(),
            description: None,
            published_at,
        }
    }

    /// Set the description, ignoring blank text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let desc = description.into();
        self.description = if desc.trim().is_empty() {
            None
        } else {
            Some(desc)
        };
        self
    }
}

/// Result of inserting a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was created.
    Inserted(Uuid),
    /// A post with the same URL already exists.
    Duplicate,
}

/// A post joined with the name of its feed, for browsing.
#[derive(Debug, Clone)]
pub struct PostWithFeed {
    /// The post.
    pub post: Post,
    /// Name of the feed the post came from.
    pub feed_name: String,
}

/// Parsed feed data from the network.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    /// Channel title.
    pub title: String,
    /// Channel link.
    pub link: Option<String>,
    /// Channel description.
    pub description: Option<String>,
    /// Parsed items.
    pub items: Vec<ParsedItem>,
}

/// Parsed item data from the network.
#[derive(Debug, Clone)]
pub struct ParsedItem {
    /// Item title.
    pub title: String,
    /// Link to the original article.
    pub link: Option<String>,
    /// Item description.
    pub description: Option<String>,
    /// Publication time, if the item carried one.
    pub published_at: Option<DateTime<Utc>>,
}
