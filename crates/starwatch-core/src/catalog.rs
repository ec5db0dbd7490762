//! Event catalog loading.
//!
//! The catalog is read once at startup from TOML and is immutable
//! afterwards. Malformed times, ambiguous schedule modes and dangling
//! references are rejected here so the rest of the engine can assume valid
//! data.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::error::CatalogError;
use crate::event::{Category, Event, EventKind, Schedule, ScheduleSlot};
use crate::festival::FestivalWindow;
use crate::schedule::{default_base_time, RotationPlan, DEFAULT_OCCURRENCES_PER_DAY, DEFAULT_SHIFT};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");
const TIME_FORMAT: &str = "%H:%M";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    categories: Vec<RawCategory>,
    #[serde(default)]
    rotation: Option<RawRotation>,
    #[serde(default)]
    events: Vec<RawEvent>,
    #[serde(default)]
    festivals: Vec<RawFestival>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    id: String,
    name: String,
    #[serde(default = "default_true")]
    toggle: bool,
}

#[derive(Debug, Deserialize)]
struct RawRotation {
    #[serde(default)]
    base_time: Option<String>,
    #[serde(default = "default_shift")]
    shift: usize,
    #[serde(default = "default_occurrences_per_day")]
    occurrences_per_day: usize,
    #[serde(default)]
    order: Option<Vec<String>>,
    #[serde(default)]
    slots: Vec<RawSlot>,
}

#[derive(Debug, Deserialize)]
struct RawSlot {
    id: String,
    frequency_hours: u32,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    name: String,
    category: String,
    #[serde(default)]
    subgroup: Option<String>,
    #[serde(default)]
    kind: EventKind,
    #[serde(default)]
    map: String,
    #[serde(default)]
    waypoint: String,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    frequency_hours: Option<u32>,
    #[serde(default)]
    schedule: Option<Vec<String>>,
    #[serde(default)]
    slot: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFestival {
    category: String,
    name: String,
    start: String,
    end: String,
    #[serde(default)]
    members: Vec<String>,
}

fn default_true() -> bool {
    true
}
fn default_shift() -> usize {
    DEFAULT_SHIFT
}
fn default_occurrences_per_day() -> usize {
    DEFAULT_OCCURRENCES_PER_DAY
}

/// Validated, immutable event catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    events: Vec<Event>,
    rotation: RotationPlan,
    festivals: Vec<FestivalWindow>,
    duplicate_names: BTreeSet<String>,
    utc_offset_minutes: i32,
}

impl Catalog {
    /// The catalog bundled with the library.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` if given, the built-in catalog otherwise.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = toml::from_str(content)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawCatalog) -> Result<Self, CatalogError> {
        let mut category_ids = BTreeSet::new();
        let mut categories = Vec::with_capacity(raw.categories.len());
        for c in raw.categories {
            if !category_ids.insert(c.id.clone()) {
                return Err(CatalogError::DuplicateId {
                    kind: "category",
                    id: c.id,
                });
            }
            categories.push(Category {
                id: c.id,
                name: c.name,
                toggle: c.toggle,
            });
        }

        let rotation = parse_rotation(raw.rotation)?;

        let mut event_ids = BTreeSet::new();
        let mut events = Vec::with_capacity(raw.events.len());
        for e in raw.events {
            if !event_ids.insert(e.id.clone()) {
                return Err(CatalogError::DuplicateId { kind: "event", id: e.id });
            }
            if !category_ids.contains(&e.category) {
                return Err(CatalogError::UnknownReference {
                    event: e.id,
                    kind: "category",
                    reference: e.category,
                });
            }
            let schedule = parse_schedule(&e, &rotation)?;
            events.push(Event {
                id: e.id,
                name: e.name,
                category: e.category,
                subgroup: e.subgroup,
                kind: e.kind,
                map: e.map,
                waypoint: e.waypoint,
                schedule,
            });
        }

        let mut festivals = Vec::with_capacity(raw.festivals.len());
        for f in raw.festivals {
            if !category_ids.contains(&f.category) {
                return Err(CatalogError::UnknownReference {
                    event: f.name,
                    kind: "category",
                    reference: f.category,
                });
            }
            let start = parse_datetime(&f.start, &f.name)?;
            let end = parse_datetime(&f.end, &f.name)?;
            if start >= end {
                return Err(CatalogError::FestivalWindow {
                    name: f.name,
                    start,
                    end,
                });
            }
            if let Some(missing) = f.members.iter().find(|m| !event_ids.contains(*m)) {
                return Err(CatalogError::UnknownReference {
                    event: f.name,
                    kind: "event",
                    reference: missing.clone(),
                });
            }
            festivals.push(FestivalWindow {
                category: f.category,
                name: f.name,
                start,
                end,
                members: f.members,
            });
        }

        let mut seen = BTreeSet::new();
        let duplicate_names = events
            .iter()
            .filter(|e| !seen.insert(e.name.clone()))
            .map(|e| e.name.clone())
            .collect();

        Ok(Self {
            categories,
            events,
            rotation,
            festivals,
            duplicate_names,
            utc_offset_minutes: 0,
        })
    }

    /// Shift every time of day and festival timestamp by `offset_minutes`.
    ///
    /// Applied once at load time to move the catalog onto the reference clock.
    pub fn translated(&self, offset_minutes: i32) -> Self {
        if offset_minutes == 0 {
            return self.clone();
        }
        let delta = Duration::minutes(i64::from(offset_minutes));
        let shift = |t: NaiveTime| t.overflowing_add_signed(delta).0;

        let mut out = self.clone();
        for event in &mut out.events {
            match &mut event.schedule {
                Schedule::Recurring { initial, .. } => *initial = shift(*initial),
                Schedule::Explicit { times } => {
                    for t in times.iter_mut() {
                        *t = shift(*t);
                    }
                }
                Schedule::Rotating { .. } => {}
            }
        }
        out.rotation.base_time = shift(out.rotation.base_time);
        for festival in &mut out.festivals {
            festival.start += delta;
            festival.end += delta;
        }
        out.utc_offset_minutes += offset_minutes;
        out
    }

    /// Total shift applied by [`translated`](Self::translated).
    pub fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
    }

    /// UTC calendar date of a reference time. The rotation turns over at UTC midnight.
    pub fn rotation_date(&self, reference: NaiveDateTime) -> NaiveDate {
        let delta = Duration::minutes(i64::from(self.utc_offset_minutes));
        reference
            .checked_sub_signed(delta)
            .unwrap_or(reference)
            .date()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn rotation(&self) -> &RotationPlan {
        &self.rotation
    }

    pub fn festivals(&self) -> &[FestivalWindow] {
        &self.festivals
    }

    /// Name shared by more than one event, so it needs its location to be told apart.
    pub fn is_ambiguous(&self, event: &Event) -> bool {
        self.duplicate_names.contains(&event.name)
    }

    pub fn display_name(&self, event: &Event) -> String {
        if self.is_ambiguous(event) {
            format!("{} ({})", event.name, event.map)
        } else {
            event.name.clone()
        }
    }
}

fn parse_rotation(raw: Option<RawRotation>) -> Result<RotationPlan, CatalogError> {
    let Some(raw) = raw else {
        return Ok(RotationPlan::default());
    };

    let base_time = match &raw.base_time {
        Some(v) => parse_time(v, "rotation base_time")?,
        None => default_base_time(),
    };

    let mut slot_ids = BTreeSet::new();
    let mut slots = Vec::with_capacity(raw.slots.len());
    for s in raw.slots {
        if !slot_ids.insert(s.id.clone()) {
            return Err(CatalogError::DuplicateId { kind: "slot", id: s.id });
        }
        slots.push(ScheduleSlot {
            id: s.id,
            frequency_hours: s.frequency_hours,
        });
    }

    let order = raw
        .order
        .unwrap_or_else(|| slots.iter().map(|s| s.id.clone()).collect());
    if let Some(unknown) = order.iter().find(|id| !slot_ids.contains(*id)) {
        return Err(CatalogError::UnknownReference {
            event: "rotation".into(),
            kind: "slot",
            reference: unknown.clone(),
        });
    }

    Ok(RotationPlan {
        base_time,
        shift: raw.shift,
        occurrences_per_day: raw.occurrences_per_day,
        slots,
        order,
    })
}

fn parse_schedule(e: &RawEvent, rotation: &RotationPlan) -> Result<Schedule, CatalogError> {
    let recurring = e.time.is_some() || e.frequency_hours.is_some();
    let found = [recurring, e.schedule.is_some(), e.slot.is_some()]
        .iter()
        .filter(|m| **m)
        .count();
    if found != 1 {
        return Err(CatalogError::ScheduleMode {
            event: e.id.clone(),
            found,
        });
    }

    let context = format!("event '{}'", e.id);
    if let Some(times) = &e.schedule {
        let times = times
            .iter()
            .map(|t| parse_time(t, &context))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Schedule::Explicit { times });
    }

    if let Some(slot) = &e.slot {
        if !rotation.order.contains(slot) {
            return Err(CatalogError::UnknownReference {
                event: e.id.clone(),
                kind: "slot",
                reference: slot.clone(),
            });
        }
        return Ok(Schedule::Rotating { slot: slot.clone() });
    }

    match (&e.time, e.frequency_hours) {
        (Some(time), Some(frequency_hours)) => Ok(Schedule::Recurring {
            initial: parse_time(time, &context)?,
            frequency_hours,
        }),
        _ => Err(CatalogError::IncompleteSchedule { event: e.id.clone() }),
    }
}

fn parse_time(value: &str, context: &str) -> Result<NaiveTime, CatalogError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|_| CatalogError::MalformedTime {
        value: value.to_string(),
        context: context.to_string(),
    })
}

fn parse_datetime(value: &str, festival: &str) -> Result<NaiveDateTime, CatalogError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).map_err(|_| {
        CatalogError::MalformedTime {
            value: value.to_string(),
            context: format!("festival '{festival}'"),
        }
    })
}
