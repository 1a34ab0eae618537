//! gator - a command-line RSS aggregator.
//!
//! Users register, add and follow feeds, and browse the posts that the
//! `agg` loop collects into a SQLite or PostgreSQL database.

pub mod cli;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod rss;
pub mod session;

pub use cli::{execute, Cli, Command, Context};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{GatorError, Result};
pub use session::Session;
