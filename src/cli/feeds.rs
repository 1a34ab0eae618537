//! Feed, follow and browse commands.

use std::io::Write;

use tracing::info;

use super::Context;
use crate::datetime::format_utc_datetime;
use crate::db::User;
use crate::rss::{
    validate_url, FeedFollowRepository, FeedRepository, NewFeed, PostRepository,
    DEFAULT_BROWSE_LIMIT,
};
use crate::{GatorError, Result};

pub(super) async fn add<W: Write>(
    ctx: &mut Context,
    user: &User,
    url: &str,
    name: &str,
    out: &mut W,
) -> Result<()> {
    validate_url(url)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(GatorError::Validation("feed name must not be empty".to_string()));
    }

    let feed = FeedRepository::new(ctx.db.pool())
        .create(&NewFeed::new(name, url, user.id))
        .await?;
    FeedFollowRepository::new(ctx.db.pool())
        .create(user.id, feed.id)
        .await?;

    info!(feed = %feed.name, url = %feed.url, user = %user.name, "Feed added");
    writeln!(out, "Name: {}", feed.name)?;
    writeln!(out, "URL:  {}", feed.url)?;
    writeln!(out, "{} now follows {}", user.name, feed.name)?;
    Ok(())
}

pub(super) async fn list<W: Write>(ctx: &mut Context, out: &mut W) -> Result<()> {
    let feeds = FeedRepository::new(ctx.db.pool()).list_with_owner().await?;

    for entry in feeds {
        writeln!(out, "---")?;
        writeln!(out, "Name: {}", entry.feed.name)?;
        writeln!(out, "URL:  {}", entry.feed.url)?;
        writeln!(out, "User: {}", entry.owner_name)?;
    }
    Ok(())
}

pub(super) async fn follow<W: Write>(
    ctx: &mut Context,
    user: &User,
    url: &str,
    out: &mut W,
) -> Result<()> {
    let feed = FeedRepository::new(ctx.db.pool())
        .get_by_url(url)
        .await?
        .ok_or_else(|| GatorError::NotFound(format!("feed {}", url)))?;

    let follow = FeedFollowRepository::new(ctx.db.pool())
        .create(user.id, feed.id)
        .await
        .map_err(|e| match e {
            GatorError::AlreadyExists(_) => {
                GatorError::AlreadyExists(format!("follow of {} by {}", feed.name, user.name))
            }
            other => other,
        })?;

    writeln!(out, "{} now follows {}", follow.user_name, follow.feed_name)?;
    Ok(())
}

pub(super) async fn following<W: Write>(ctx: &mut Context, user: &User, out: &mut W) -> Result<()> {
    let follows = FeedFollowRepository::new(ctx.db.pool())
        .list_for_user(user.id)
        .await?;

    writeln!(out, "Feeds followed by {}:", user.name)?;
    for follow in follows {
        writeln!(out, "- {}", follow.feed_name)?;
    }
    Ok(())
}

pub(super) async fn unfollow<W: Write>(
    ctx: &mut Context,
    user: &User,
    url: &str,
    out: &mut W,
) -> Result<()> {
    let feed = FeedRepository::new(ctx.db.pool())
        .get_by_url(url)
        .await?
        .ok_or_else(|| GatorError::NotFound(format!("feed {}", url)))?;

    let removed = FeedFollowRepository::new(ctx.db.pool())
        .delete(user.id, feed.id)
        .await?;
    if !removed {
        return Err(GatorError::NotFound(format!(
            "follow of {} by {}",
            feed.name, user.name
        )));
    }

    writeln!(out, "{} unfollowed {}", user.name, feed.name)?;
    Ok(())
}

pub(super) async fn browse<W: Write>(
    ctx: &mut Context,
    user: &User,
    limit: Option<i64>,
    out: &mut W,
) -> Result<()> {
    let limit = limit.unwrap_or(DEFAULT_BROWSE_LIMIT);
    if limit <= 0 {
        return Err(GatorError::Validation(
            "limit must be a positive number".to_string(),
        ));
    }

    let posts = PostRepository::new(ctx.db.pool())
        .list_for_user(user.id, limit)
        .await?;
    let display = &ctx.config.display;

    for entry in posts {
        let published =
            format_utc_datetime(&entry.post.published_at, &display.timezone, &display.date_format);
        writeln!(out, "- {}", entry.post.title)?;
        writeln!(out, "  {} | {}", published, entry.feed_name)?;
        writeln!(out, "  {}", entry.post.url)?;
        if let Some(description) = &entry.post.description {
            writeln!(out, "  {}", description)?;
        }
    }
    Ok(())
}
