//! User and session commands.

use std::io::Write;

use tracing::info;

use super::Context;
use crate::db::{NewUser, UserRepository};
use crate::{GatorError, Result};

pub(super) async fn login<W: Write>(ctx: &mut Context, name: &str, out: &mut W) -> Result<()> {
    let user = UserRepository::new(ctx.db.pool())
        .get_by_name(name)
        .await?
        .ok_or_else(|| GatorError::NotFound(format!("user {}", name)))?;

    ctx.session.set_user(&user.name)?;
    info!(user = %user.name, "Logged in");
    writeln!(out, "Logged in as {}", user.name)?;
    Ok(())
}

pub(super) async fn register<W: Write>(ctx: &mut Context, name: &str, out: &mut W) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GatorError::Validation("user name must not be empty".to_string()));
    }

    let user = UserRepository::new(ctx.db.pool())
        .create(&NewUser::new(name))
        .await?;

    ctx.session.set_user(&user.name)?;
    info!(user = %user.name, id = %user.id, "User registered");
    writeln!(out, "User {} created", user.name)?;
    writeln!(out, "Logged in as {}", user.name)?;
    Ok(())
}

pub(super) async fn reset<W: Write>(ctx: &mut Context, out: &mut W) -> Result<()> {
    let deleted = UserRepository::new(ctx.db.pool()).delete_all().await?;
    ctx.session.clear()?;

    info!(users = deleted, "Database reset");
    writeln!(out, "Database reset ({} user(s) deleted)", deleted)?;
    Ok(())
}

pub(super) async fn list<W: Write>(ctx: &mut Context, out: &mut W) -> Result<()> {
    let users = UserRepository::new(ctx.db.pool()).list_all().await?;
    let current = ctx.session.current_user();

    for user in users {
        if current == Some(user.name.as_str()) {
            writeln!(out, "* {} (current)", user.name)?;
        } else {
            writeln!(out, "* {}", user.name)?;
        }
    }
    Ok(())
}
