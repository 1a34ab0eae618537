//! Command-line interface for gator.
//!
//! Each subcommand maps to one handler. Handlers write their output to a
//! caller-supplied writer and return errors instead of exiting.

mod agg;
mod feeds;
mod users;

pub use agg::{collect, parse_interval};

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::db::{Database, User, UserRepository};
use crate::session::Session;
use crate::{Config, GatorError, Result};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "gator.toml";

/// gator: a command-line RSS aggregator.
#[derive(Debug, Parser)]
#[command(name = "gator", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Log in as an existing user
    Login {
        /// User name
        name: String,
    },

    /// Create a user and log in as them
    Register {
        /// User name
        name: String,
    },

    /// Delete every user, feed, follow and post
    Reset,

    /// List registered users
    Users,

    /// Poll feeds forever, one feed per interval
    Agg {
        /// Time between requests, e.g. 30s, 1m, 1h30m
        interval: String,
    },

    /// Add a feed and follow it
    Addfeed {
        /// Feed URL
        url: String,
        /// Display name
        name: String,
    },

    /// List every feed
    Feeds,

    /// Follow an existing feed
    Follow {
        /// Feed URL
        url: String,
    },

    /// List the feeds you follow
    Following,

    /// Stop following a feed
    Unfollow {
        /// Feed URL
        url: String,
    },

    /// Show the newest posts from the feeds you follow
    Browse {
        /// Number of posts to show
        limit: Option<i64>,
    },
}

impl Command {
    /// Whether the command needs a logged-in user.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Command::Addfeed { .. }
                | Command::Follow { .. }
                | Command::Following
                | Command::Unfollow { .. }
                | Command::Browse { .. }
        )
    }
}

/// Everything a handler needs.
pub struct Context {
    /// Feed store.
    pub db: Database,
    /// Loaded configuration.
    pub config: Config,
    /// Login session.
    pub session: Session,
}

impl Context {
    /// Create a new context.
    pub fn new(db: Database, config: Config, session: Session) -> Self {
        Self {
            db,
            config,
            session,
        }
    }

    /// Resolve the logged-in user.
    ///
    /// Fails with `Auth` if nobody is logged in or the user is gone.
    pub async fn require_user(&self) -> Result<User> {
        let name = self
            .session
            .current_user()
            .ok_or_else(|| GatorError::Auth("you must be logged in".to_string()))?;

        UserRepository::new(self.db.pool())
            .get_by_name(name)
            .await?
            .ok_or_else(|| GatorError::Auth(format!("logged-in user {} no longer exists", name)))
    }
}

/// Run one command.
pub async fn execute<W: Write>(ctx: &mut Context, command: Command, out: &mut W) -> Result<()> {
    let user = if command.requires_login() {
        Some(ctx.require_user().await?)
    } else {
        None
    };

    match (command, user) {
        (Command::Login { name }, _) => users::login(ctx, &name, out).await,
        (Command::Register { name }, _) => users::register(ctx, &name, out).await,
        (Command::Reset, _) => users::reset(ctx, out).await,
        (Command::Users, _) => users::list(ctx, out).await,
        (Command::Agg { interval }, _) => agg::run(ctx, &interval, out).await,
        (Command::Feeds, _) => feeds::list(ctx, out).await,
        (Command::Addfeed { url, name }, Some(user)) => {
            feeds::add(ctx, &user, &url, &name, out).await
        }
        (Command::Follow { url }, Some(user)) => feeds::follow(ctx, &user, &url, out).await,
        (Command::Following, Some(user)) => feeds::following(ctx, &user, out).await,
        (Command::Unfollow { url }, Some(user)) => feeds::unfollow(ctx, &user, &url, out).await,
        (Command::Browse { limit }, Some(user)) => feeds::browse(ctx, &user, limit, out).await,
        (_, None) => Err(GatorError::Auth("you must be logged in".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["gator", "register", "alice"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Register {
                name: "alice".to_string()
            }
        );
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));

        let cli = Cli::try_parse_from([
            "gator",
            "addfeed",
            "https://news.ycombinator.com/rss",
            "Hacker News",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Addfeed {
                url: "https://news.ycombinator.com/rss".to_string(),
                name: "Hacker News".to_string()
            }
        );
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::try_parse_from(["gator", "users", "--config", "/tmp/g.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/g.toml"));
        assert_eq!(cli.command, Command::Users);
    }

    #[test]
    fn test_parse_browse_limit() {
        let cli = Cli::try_parse_from(["gator", "browse"]).unwrap();
        assert_eq!(cli.command, Command::Browse { limit: None });

        let cli = Cli::try_parse_from(["gator", "browse", "10"]).unwrap();
        assert_eq!(cli.command, Command::Browse { limit: Some(10) });
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        assert!(Cli::try_parse_from(["gator", "login"]).is_err());
        assert!(Cli::try_parse_from(["gator", "reset", "now"]).is_err());
        assert!(Cli::try_parse_from(["gator", "frobnicate"]).is_err());
    }

    #[test]
    fn test_requires_login() {
        assert!(Command::Following.requires_login());
        assert!(Command::Browse { limit: None }.requires_login());
        assert!(!Command::Users.requires_login());
        assert!(!Command::Feeds.requires_login());
    }
}
