//! Per-tick notification matching.
//!
//! One tick advances the rotation, drops festival members outside their
//! window, drops disabled events, and keeps the events with an occurrence
//! exactly `offset` minutes after the reference minute.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::{debug, trace};

use crate::catalog::Catalog;
use crate::clock::Granularity;
use crate::event::{Event, EventKind};
use crate::festival;
use crate::notify_state::NotifyStateTree;
use crate::schedule::{timetable, RotationState, Timetable};

/// An event due for notification in the current tick. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationCandidate {
    pub event_id: String,
    pub name: String,
    /// Name with the location appended when the name alone is ambiguous.
    pub display_name: String,
    pub kind: EventKind,
    pub location: String,
    pub waypoint: String,
    pub occurrence: NaiveTime,
    pub trigger: NaiveDateTime,
}

pub struct NotificationMatcher {
    catalog: Arc<Catalog>,
    rotation: RotationState,
    // Fixed timetables; rotating events are projected per tick.
    timetables: BTreeMap<String, Vec<NaiveTime>>,
}

impl NotificationMatcher {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let rotation = RotationState::new(catalog.rotation().clone());
        let timetables = catalog
            .events()
            .iter()
            .filter(|e| !e.is_rotating())
            .filter_map(|e| timetable(e, &rotation))
            .map(|t| (t.event_id, t.times))
            .collect();
        Self {
            catalog,
            rotation,
            timetables,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn rotation_mut(&mut self) -> &mut RotationState {
        &mut self.rotation
    }

    /// Advance the rotation for `date`. True on the first call of the day.
    pub fn advance_rotation(&mut self, date: NaiveDate) -> bool {
        self.rotation.advance_for(date)
    }

    /// Today's occurrences for `event`, or `None` if it is excluded as misconfigured.
    pub fn occurrences(&self, event: &Event) -> Option<Vec<NaiveTime>> {
        if event.is_rotating() {
            timetable(event, &self.rotation).map(|t| t.times)
        } else {
            self.timetables.get(&event.id).cloned()
        }
    }

    /// Timetables for every event that projects cleanly, in catalog order.
    pub fn timetables(&self) -> Vec<Timetable> {
        self.catalog
            .events()
            .iter()
            .filter_map(|e| {
                self.occurrences(e).map(|times| Timetable {
                    event_id: e.id.clone(),
                    times,
                })
            })
            .collect()
    }

    /// Whether the notify state lets `event` fire. Festival members are also
    /// gated by the festival's own toggle.
    pub fn is_enabled(&self, event: &Event, tree: &NotifyStateTree) -> bool {
        if !tree.get(&event.notify_id()) {
            return false;
        }
        self.catalog
            .festivals()
            .iter()
            .filter_map(|f| f.gate_id(&event.id))
            .all(|gate| tree.get(&gate))
    }

    /// Evaluate one tick at `reference` with the user's notify offset.
    pub fn tick(
        &mut self,
        reference: NaiveDateTime,
        offset_minutes: u32,
        tree: &NotifyStateTree,
    ) -> Vec<NotificationCandidate> {
        let reference = Granularity::Minute.truncate(reference);
        let day = self.catalog.rotation_date(reference);
        self.advance_rotation(day);

        let now = reference.time();
        let offset = Duration::minutes(i64::from(offset_minutes));
        let catalog = Arc::clone(&self.catalog);
        let mut candidates = Vec::new();

        for event in catalog.events() {
            if !festival::is_eligible(catalog.festivals(), &event.id, reference) {
                trace!(event = %event.id, "outside festival window");
                continue;
            }
            if !self.is_enabled(event, tree) {
                continue;
            }
            let Some(times) = self.occurrences(event) else {
                continue;
            };

            if let Some(occurrence) = times
                .into_iter()
                .find(|occ| occ.overflowing_sub_signed(offset).0 == now)
            {
                candidates.push(NotificationCandidate {
                    event_id: event.id.clone(),
                    name: event.name.clone(),
                    display_name: catalog.display_name(event),
                    kind: event.kind,
                    location: event.map.clone(),
                    waypoint: event.waypoint.clone(),
                    occurrence,
                    trigger: reference,
                });
            }
        }

        if !candidates.is_empty() {
            debug!(
                at = %reference,
                offset_minutes,
                matched = candidates.len(),
                "notification candidates"
            );
        }
        candidates
    }
}
