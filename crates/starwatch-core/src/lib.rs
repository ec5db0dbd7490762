//! # Starwatch Core Library
//!
//! Event-time projection and notification matching for a recurring-event
//! game. Given sparse schedule data it works out when every world boss, meta
//! event and festival activity occurs, and decides once per tick which of
//! them the user should hear about right now.
//!
//! ## Architecture
//!
//! - **Schedule**: occurrence projection and day-driven slot rotation
//! - **Festivals**: seasonal windows that gate their member events
//! - **Notify state**: cascading per-event and per-group toggles
//! - **Matcher**: ties the above together for one reference minute
//! - **Storage**: TOML configuration and a SQLite preference store
//! - **Scheduler**: tokio loop driving the matcher and a [`Notifier`]
//!
//! ## Key Components
//!
//! - [`Catalog`]: validated event, slot and festival definitions
//! - [`NotificationMatcher`]: per-tick candidate selection
//! - [`Preferences`]: notify state and offset with write-through persistence
//! - [`Scheduler`]: background loop with a [`SchedulerHandle`] for UI writes

pub mod catalog;
pub mod clock;
pub mod error;
pub mod event;
pub mod festival;
pub mod matcher;
pub mod message;
pub mod notifier;
pub mod notify_state;
pub mod preferences;
pub mod schedule;
pub mod scheduler;
pub mod storage;

pub use catalog::Catalog;
pub use clock::{ClockSource, FixedClock, Granularity, SystemClock};
pub use error::{
    CatalogError, ClockError, ConfigError, CoreError, NotifyError, ScheduleError, StoreError,
    ValidationError,
};
pub use event::{Category, Event, EventKind, Schedule, ScheduleSlot};
pub use festival::{current_or_next, FestivalStatus, FestivalWindow};
pub use matcher::{NotificationCandidate, NotificationMatcher};
pub use message::Message;
pub use notifier::{LogNotifier, Notifier, RecordingNotifier};
pub use notify_state::{NotifyId, NotifyStateTree, StateChange};
pub use preferences::Preferences;
pub use schedule::{RotationPlan, RotationState, Timetable};
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerSettings, TickOutcome};
pub use storage::{Config, MemoryPreferenceStore, PreferenceStore, SqlitePreferenceStore};
