//! Event identity and schedule description.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::notify_state::NotifyId;

/// Kind of event. Drives the phrasing of single-event notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    WorldBoss,
    Adventure,
    #[default]
    MetaEvent,
}

impl EventKind {
    /// Phrase template; `{name}` is replaced with the display name.
    pub fn template(self) -> &'static str {
        match self {
            EventKind::WorldBoss => "{name} will spawn",
            EventKind::Adventure => "The {name} adventure will begin",
            EventKind::MetaEvent => "{name} is starting",
        }
    }

    pub fn phrase(self, name: &str) -> String {
        self.template().replace("{name}", name)
    }
}

/// How an event's occurrences are described. Exactly one mode per event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Schedule {
    /// Initial time of day repeating every `frequency_hours`.
    Recurring {
        initial: NaiveTime,
        frequency_hours: u32,
    },
    /// Irregular, already-ordered times of day.
    Explicit { times: Vec<NaiveTime> },
    /// Member of a rotating schedule slot.
    Rotating { slot: String },
}

/// A single trackable event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub category: String,
    pub subgroup: Option<String>,
    pub kind: EventKind,
    pub map: String,
    pub waypoint: String,
    pub schedule: Schedule,
}

impl Event {
    pub fn notify_id(&self) -> NotifyId {
        NotifyId::event(&self.id)
    }

    /// Grouping identifiers from the outermost level inwards.
    pub fn grouping_ids(&self) -> Vec<NotifyId> {
        let mut ids = vec![NotifyId::category(&self.category)];
        if let Some(subgroup) = &self.subgroup {
            ids.push(NotifyId::subgroup(&self.category, subgroup));
        }
        ids
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self.schedule, Schedule::Rotating { .. })
    }
}

/// A rotating schedule slot. Its start time comes from its rotation position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: String,
    pub frequency_hours: u32,
}

/// Grouping label. Categories without a toggle are always "on".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub toggle: bool,
}
