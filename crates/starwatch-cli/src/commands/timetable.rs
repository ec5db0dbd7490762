use std::path::Path;

use chrono::NaiveDate;
use clap::Args;
use starwatch_core::NotificationMatcher;

use super::{parse_date, CliResult, Context};

#[derive(Args)]
pub struct TimetableArgs {
    /// Only this event
    event: Option<String>,
    /// Day used to resolve rotating events; defaults to today
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    #[arg(long)]
    json: bool,
}

pub fn run(args: TimetableArgs, catalog: Option<&Path>) -> CliResult {
    let ctx = Context::load(catalog)?;
    let date = match args.date {
        Some(d) => d,
        None => ctx.catalog.rotation_date(ctx.reference(None)?),
    };

    let mut matcher = NotificationMatcher::new(ctx.catalog.clone());
    matcher.advance_rotation(date);

    let mut timetables = matcher.timetables();
    if let Some(id) = &args.event {
        if ctx.catalog.event(id).is_none() {
            return Err(format!("unknown event: {id}").into());
        }
        timetables.retain(|t| &t.event_id == id);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&timetables)?);
        return Ok(());
    }
    for t in &timetables {
        let times: Vec<String> = t.times.iter().map(|x| x.format("%H:%M").to_string()).collect();
        println!("{:<24} {}", t.event_id, times.join(" "));
    }
    Ok(())
}
