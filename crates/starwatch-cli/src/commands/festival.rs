use std::path::Path;

use chrono::NaiveDateTime;
use clap::Args;
use starwatch_core::current_or_next;

use super::{parse_datetime, CliResult, Context};

#[derive(Args)]
pub struct FestivalArgs {
    /// Reference time (YYYY-MM-DD HH:MM); defaults to now
    #[arg(long, value_parser = parse_datetime)]
    at: Option<NaiveDateTime>,
}

pub fn run(args: FestivalArgs, catalog: Option<&Path>) -> CliResult {
    let ctx = Context::load(catalog)?;
    let reference = ctx.reference(args.at)?;
    let status = current_or_next(ctx.catalog.festivals(), reference);

    match (status.title(), status.countdown(reference)) {
        (Some(title), Some(countdown)) => {
            println!("{title}");
            println!("{countdown}");
        }
        _ => println!("no upcoming festival"),
    }
    Ok(())
}
