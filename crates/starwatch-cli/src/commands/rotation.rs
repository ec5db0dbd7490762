use std::path::Path;

use chrono::NaiveDate;
use clap::Args;
use starwatch_core::{Event, RotationState, Schedule};

use super::{parse_date, CliResult, Context};

#[derive(Args)]
pub struct RotationArgs {
    /// Day to resolve (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

pub fn run(args: RotationArgs, catalog: Option<&Path>) -> CliResult {
    let ctx = Context::load(catalog)?;
    let date = match args.date {
        Some(d) => d,
        None => ctx.catalog.rotation_date(ctx.reference(None)?),
    };

    let mut rotation = RotationState::new(ctx.catalog.rotation().clone());
    rotation.advance_for(date);

    println!("{date} ({})", date.format("%A"));
    for slot in rotation.order() {
        let start = rotation
            .start_time(slot)
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default();
        let members: Vec<&str> = ctx
            .catalog
            .events()
            .iter()
            .filter(|e| in_slot(e, slot))
            .map(|e| e.name.as_str())
            .collect();
        println!("{slot:<6} {start}  {}", members.join(", "));
    }
    Ok(())
}

fn in_slot(event: &Event, slot: &str) -> bool {
    matches!(&event.schedule, Schedule::Rotating { slot: s } if s == slot)
}
