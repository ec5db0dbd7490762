use std::path::Path;

use clap::Subcommand;

use super::{CliResult, Context};

#[derive(Subcommand)]
pub enum OffsetAction {
    /// Print the notify offset in minutes
    Get,
    /// Set the notify offset; must be one of the configured choices
    Set { minutes: u32 },
    /// List the allowed offsets
    Choices,
}

pub fn run(action: OffsetAction, catalog: Option<&Path>) -> CliResult {
    let ctx = Context::load(catalog)?;
    let mut prefs = ctx.preferences()?;

    match action {
        OffsetAction::Get => println!("{}", prefs.offset_minutes()),
        OffsetAction::Set { minutes } => {
            prefs.set_offset(minutes)?;
            if prefs.pending_writes() > 0 {
                return Err("offset could not be saved".into());
            }
            println!("ok");
        }
        OffsetAction::Choices => {
            let choices: Vec<String> = prefs.offset_choices().iter().map(u32::to_string).collect();
            println!("{}", choices.join(" "));
        }
    }
    Ok(())
}
