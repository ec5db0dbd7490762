use std::path::Path;

use clap::Subcommand;
use starwatch_core::NotifyId;

use super::{CliResult, Context};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// List every toggle and its state
    List,
    /// Get one toggle
    Get {
        /// Identifier such as "event:tequatl" or "category:core"
        id: String,
    },
    /// Set one toggle; grouping identifiers cascade to their members
    Set {
        id: String,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

fn parse_id(raw: &str) -> Result<NotifyId, String> {
    NotifyId::parse(raw).ok_or_else(|| format!("unknown notify identifier: {raw}"))
}

pub fn run(action: NotifyAction, catalog: Option<&Path>) -> CliResult {
    let ctx = Context::load(catalog)?;
    let mut prefs = ctx.preferences()?;

    match action {
        NotifyAction::List => {
            let tree = prefs.tree();
            for (depth, id) in tree.walk() {
                let indent = "  ".repeat(depth);
                if !tree.has_toggle(id) {
                    println!("{indent}{id}");
                    continue;
                }
                let state = if prefs.is_enabled(id) { "on" } else { "off" };
                println!("{indent}{id} {state}");
            }
        }
        NotifyAction::Get { id } => {
            let id = parse_id(&id)?;
            if !prefs.tree().contains(&id) {
                return Err(format!("unknown notify identifier: {id}").into());
            }
            println!("{}", prefs.is_enabled(&id));
        }
        NotifyAction::Set { id, enabled } => {
            let id = parse_id(&id)?;
            let changes = prefs.toggle(&id, enabled)?;
            for change in &changes {
                println!("{} {}", change.id, change.enabled);
            }
            let pending = prefs.pending_writes();
            if pending > 0 {
                return Err(format!("{pending} preference writes could not be saved").into());
            }
        }
    }
    Ok(())
}
