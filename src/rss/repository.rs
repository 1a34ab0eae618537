//! Feed, follow and post repositories for gator.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{
    Feed, FeedFollow, FeedWithOwner, InsertOutcome, NewFeed, NewPost, Post, PostWithFeed,
};
use crate::datetime::to_db;
use crate::db::{is_unique_violation, parse_id, parse_timestamp, DbPool};
use crate::{GatorError, Result};

const FEED_COLUMNS: &str = "f.id, f.name, f.url, f.user_id, f.last_fetched_at, \
                            f.created_at, f.updated_at";

/// Row type for feed from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: String,
    name: String,
    url: String,
    user_id: String,
    last_fetched_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<FeedRow> for Feed {
    type Error = GatorError;

    fn try_from(row: FeedRow) -> Result<Self> {
        Ok(Feed {
            id: parse_id(&row.id)?,
            name: row.name,
            url: row.url,
            user_id: parse_id(&row.user_id)?,
            last_fetched_at: row
                .last_fetched_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Row type for feed joined with its owner.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedWithOwnerRow {
    #[sqlx(flatten)]
    feed: FeedRow,
    owner_name: String,
}

impl TryFrom<FeedWithOwnerRow> for FeedWithOwner {
    type Error = GatorError;

    fn try_from(row: FeedWithOwnerRow) -> Result<Self> {
        Ok(FeedWithOwner {
            feed: row.feed.try_into()?,
            owner_name: row.owner_name,
        })
    }
}

/// Row type for feed follow joined with user and feed names.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedFollowRow {
    id: String,
    user_id: String,
    feed_id: String,
    user_name: String,
    feed_name: String,
    created_at: String,
}

impl TryFrom<FeedFollowRow> for FeedFollow {
    type Error = GatorError;

    fn try_from(row: FeedFollowRow) -> Result<Self> {
        Ok(FeedFollow {
            id: parse_id(&row.id)?,
            user_id: parse_id(&row.user_id)?,
            feed_id: parse_id(&row.feed_id)?,
            user_name: row.user_name,
            feed_name: row.feed_name,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Row type for post from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: String,
    title: String,
    url: String,
    description: Option<String>,
    published_at: String,
    feed_id: String,
    created_at: String,
}

impl TryFrom<PostRow> for Post {
    type Error = GatorError;

    fn try_from(row: PostRow) -> Result<Self> {
        Ok(Post {
            id: parse_id(&row.id)?,
            title: row.title,
            url: row.url,
            description: row.description,
            published_at: parse_timestamp(&row.published_at)?,
            feed_id: parse_id(&row.feed_id)?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Row type for post joined with its feed name.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostWithFeedRow {
    #[sqlx(flatten)]
    post: PostRow,
    feed_name: String,
}

impl TryFrom<PostWithFeedRow> for PostWithFeed {
    type Error = GatorError;

    fn try_from(row: PostWithFeedRow) -> Result<Self> {
        Ok(PostWithFeed {
            post: row.post.try_into()?,
            feed_name: row.feed_name,
        })
    }
}

/// Repository for feed operations.
pub struct FeedRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new feed.
    ///
    /// Returns `AlreadyExists` if another feed has the same URL.
    pub async fn create(&self, new_feed: &NewFeed) -> Result<Feed> {
        let now = Utc::now();
        let feed = Feed {
            id: Uuid::new_v4(),
            name: new_feed.name.clone(),
            url: new_feed.url.clone(),
            user_id: new_feed.user_id,
            last_fetched_at: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO feeds (id, name, url, user_id, last_fetched_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NULL, $5, $6)
            "#,
        )
        .bind(feed.id.to_string())
        .bind(&feed.name)
        .bind(&feed.url)
        .bind(feed.user_id.to_string())
        .bind(to_db(&feed.created_at))
        .bind(to_db(&feed.updated_at))
        .execute(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                GatorError::AlreadyExists(format!("feed {}", new_feed.url))
            } else {
                GatorError::Database(e.to_string())
            }
        })?;

        Ok(feed)
    }

    /// Get a feed by ID.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds f WHERE f.id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        row.map(Feed::try_from).transpose()
    }

    /// Get a feed by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds f WHERE f.url = $1"
        ))
        .bind(url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        row.map(Feed::try_from).transpose()
    }

    /// List every feed with the name of the user who added it.
    pub async fn list_with_owner(&self) -> Result<Vec<FeedWithOwner>> {
        let rows = sqlx::query_as::<_, FeedWithOwnerRow>(&format!(
            r#"
            SELECT {FEED_COLUMNS}, u.name AS owner_name
            FROM feeds f
            INNER JOIN users u ON u.id = f.user_id
            ORDER BY f.created_at ASC, f.id ASC
            "#
        ))
        .fetch_all(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        rows.into_iter().map(FeedWithOwner::try_from).collect()
    }

    /// Get the feed that has gone longest without being fetched.
    ///
    /// Never-fetched feeds come first; ties fall back to creation order.
    pub async fn get_next_to_fetch(&self) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            r#"
            SELECT {FEED_COLUMNS}
            FROM feeds f
            ORDER BY f.last_fetched_at ASC NULLS FIRST, f.created_at ASC, f.id ASC
            LIMIT 1
            "#
        ))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        row.map(Feed::try_from).transpose()
    }

    /// Stamp a feed as fetched at `at`.
    ///
    /// Returns `NotFound` if the feed no longer exists.
    pub async fn mark_fetched(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            "UPDATE feeds SET last_fetched_at = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(to_db(&at))
        .bind(to_db(&at))
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(GatorError::NotFound(format!("feed {}", id)));
        }
        Ok(())
    }

    /// Count all feeds.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM feeds")
            .fetch_one(self.pool)
            .await
            .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(count.0)
    }
}

/// Repository for feed follow operations.
pub struct FeedFollowRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedFollowRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Make `user_id` follow `feed_id`.
    ///
    /// Returns `AlreadyExists` if the user already follows the feed.
    pub async fn create(&self, user_id: Uuid, feed_id: Uuid) -> Result<FeedFollow> {
        let id = Uuid::new_v4();
        let now = to_db(&Utc::now());

        sqlx::query(
            r#"
            INSERT INTO feed_follows (id, user_id, feed_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(feed_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                GatorError::AlreadyExists("feed follow".to_string())
            } else {
                GatorError::Database(e.to_string())
            }
        })?;

        let row = sqlx::query_as::<_, FeedFollowRow>(
            r#"
            SELECT ff.id, ff.user_id, ff.feed_id, u.name AS user_name, f.name AS feed_name,
                   ff.created_at
            FROM feed_follows ff
            INNER JOIN users u ON u.id = ff.user_id
            INNER JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        row.try_into()
    }

    /// Remove a follow. Returns whether a row was deleted.
    pub async fn delete(&self, user_id: Uuid, feed_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM feed_follows WHERE user_id = $1 AND feed_id = $2")
            .bind(user_id.to_string())
            .bind(feed_id.to_string())
            .execute(self.pool)
            .await
            .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// List the follows of a user, oldest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FeedFollow>> {
        let rows = sqlx::query_as::<_, FeedFollowRow>(
            r#"
            SELECT ff.id, ff.user_id, ff.feed_id, u.name AS user_name, f.name AS feed_name,
                   ff.created_at
            FROM feed_follows ff
            INNER JOIN users u ON u.id = ff.user_id
            INNER JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.user_id = $1
            ORDER BY ff.created_at ASC, f.name ASC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        rows.into_iter().map(FeedFollow::try_from).collect()
    }
}

/// Repository for post operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a post.
    ///
    /// A post whose URL is already stored yields `InsertOutcome::Duplicate`
    /// rather than an error. Other failures are returned as errors.
    pub async fn create(&self, post: &NewPost) -> Result<InsertOutcome> {
        let id = Uuid::new_v4();
        let now = to_db(&Utc::now());

        let result = sqlx::query(
            r#"
            INSERT INTO posts (id, title, url, description, published_at, feed_id,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id.to_string())
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.description)
        .bind(to_db(&post.published_at))
        .bind(post.feed_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted(id)),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(GatorError::Database(e.to_string())),
        }
    }

    /// Get a post by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, url, description, published_at, feed_id, created_at
            FROM posts
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        row.map(Post::try_from).transpose()
    }

    /// Count posts belonging to a feed.
    pub async fn count_by_feed(&self, feed_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE feed_id = $1")
            .bind(feed_id.to_string())
            .fetch_one(self.pool)
            .await
            .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(count.0)
    }

    /// List the newest posts from feeds the user follows.
    pub async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<PostWithFeed>> {
        let rows = sqlx::query_as::<_, PostWithFeedRow>(
            r#"
            SELECT p.id, p.title, p.url, p.description, p.published_at, p.feed_id,
                   p.created_at, f.name AS feed_name
            FROM posts p
            INNER JOIN feed_follows ff ON ff.feed_id = p.feed_id
            INNER JOIN feeds f ON f.id = p.feed_id
            WHERE ff.user_id = $1
            ORDER BY p.published_at DESC, p.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        rows.into_iter().map(PostWithFeed::try_from).collect()
    }
}
