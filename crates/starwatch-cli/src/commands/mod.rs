pub mod config;
pub mod festival;
pub mod notify;
pub mod offset;
pub mod rotation;
pub mod run;
pub mod tick;
pub mod timetable;

use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use starwatch_core::{
    Catalog, ClockSource, Config, NotifyStateTree, Preferences, SqlitePreferenceStore, SystemClock,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Config and catalog shared by every command.
pub struct Context {
    pub config: Config,
    pub catalog: Arc<Catalog>,
}

impl Context {
    /// Load the config and the catalog, shifted onto the reference clock.
    pub fn load(catalog_override: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let path = catalog_override
            .map(Path::to_path_buf)
            .or_else(|| config.catalog_path());
        let catalog = Catalog::load_or_builtin(path.as_deref())?
            .translated(config.clock.utc_offset_minutes);
        Ok(Self {
            config,
            catalog: Arc::new(catalog),
        })
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock::new(self.config.clock.utc_offset_minutes)
    }

    /// `at` if given, the reference clock otherwise.
    pub fn reference(
        &self,
        at: Option<NaiveDateTime>,
    ) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
        match at {
            Some(at) => Ok(at),
            None => Ok(self.clock().now()?),
        }
    }

    pub fn preferences(&self) -> Result<Preferences, Box<dyn std::error::Error>> {
        let store = SqlitePreferenceStore::open_default()?;
        Ok(Preferences::restore(
            NotifyStateTree::from_catalog(&self.catalog),
            Box::new(store),
            self.config.notifications.default_offset_minutes,
            self.config.notifications.offset_choices.clone(),
        ))
    }
}

/// Accepts `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM` and either with seconds.
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DD HH:MM, got '{raw}'"))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got '{raw}'"))
}
