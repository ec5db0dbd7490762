use std::path::Path;

use chrono::NaiveDateTime;
use clap::Args;
use starwatch_core::{message, NotificationMatcher};

use super::{parse_datetime, CliResult, Context};

#[derive(Args)]
pub struct TickArgs {
    /// Reference time (YYYY-MM-DD HH:MM); defaults to now
    #[arg(long, value_parser = parse_datetime)]
    at: Option<NaiveDateTime>,
    /// Notify offset in minutes; defaults to the stored offset
    #[arg(long)]
    offset: Option<u32>,
    /// Print matched candidates as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: TickArgs, catalog: Option<&Path>) -> CliResult {
    let ctx = Context::load(catalog)?;
    let prefs = ctx.preferences()?;
    let reference = ctx.reference(args.at)?;
    let offset = args.offset.unwrap_or_else(|| prefs.offset_minutes());

    let mut matcher = NotificationMatcher::new(ctx.catalog.clone());
    let candidates = matcher.tick(reference, offset, prefs.tree());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }
    match message::message(&candidates, offset) {
        Some(m) => println!("{m}"),
        None => println!("no events due at {}", reference.format("%Y-%m-%d %H:%M")),
    }
    Ok(())
}
