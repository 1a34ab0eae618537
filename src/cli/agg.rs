//! The `agg` command.

use std::future::Future;
use std::io::Write;

use tokio::time::Duration;
use tracing::{error, info};

use super::Context;
use crate::rss::{Aggregator, FeedSource, RssFetcher};
use crate::{GatorError, Result};

/// Nanoseconds per duration unit.
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60e9),
    ("h", 3600e9),
];

pub(super) async fn run<W: Write>(ctx: &mut Context, interval: &str, out: &mut W) -> Result<()> {
    let period = parse_interval(interval)?;
    let fetcher = RssFetcher::new(&ctx.config.fetcher)?;

    collect(ctx, period, fetcher, shutdown_signal(), out).await?;
    Ok(())
}

/// Poll feeds every `period` with `source` until `shutdown` resolves.
///
/// Returns the number of ticks executed.
pub async fn collect<S, F, W>(
    ctx: &Context,
    period: Duration,
    source: S,
    shutdown: F,
    out: &mut W,
) -> Result<usize>
where
    S: FeedSource,
    F: Future<Output = ()>,
    W: Write,
{
    writeln!(out, "Collecting feeds every {:?}", period)?;
    out.flush()?;

    let aggregator = Aggregator::new(
        &ctx.db,
        source,
        period,
        ctx.config.fetcher.max_items_per_feed,
    );
    Ok(aggregator.run(shutdown).await)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, stopping"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

/// Parse a duration such as `500ms`, `30s`, `1m30s` or `1.5h`.
///
/// The value must be positive.
pub fn parse_interval(input: &str) -> Result<Duration> {
    let invalid = || GatorError::Validation(format!("invalid interval: {:?}", input));

    let s = input.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s.is_empty() {
        return Err(invalid());
    }
    if s == "0" {
        return Err(GatorError::Validation("interval must be positive".to_string()));
    }

    let mut nanos = 0.0_f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let factor = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, factor)| *factor)
            .ok_or_else(|| {
                if unit.is_empty() {
                    GatorError::Validation(format!("missing unit in interval {:?}", input))
                } else {
                    GatorError::Validation(format!("unknown unit {:?} in interval", unit))
                }
            })?;
        nanos += value * factor;
    }

    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err(invalid());
    }
    let duration = Duration::from_nanos(nanos.round() as u64);
    if duration.is_zero() {
        return Err(GatorError::Validation("interval must be positive".to_string()));
    }
    Ok(duration)
}
