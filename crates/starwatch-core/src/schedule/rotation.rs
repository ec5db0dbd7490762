//! Day-driven rotation of schedule slots.
//!
//! A fixed list of slot ids maps rotation position to start time. Every day
//! of the week shifts the list left by one block, so Monday uses the base
//! order and Sunday has been shifted six times. The order is always
//! recomputed from the base order and the weekday, never accumulated, so
//! repeated calls on the same day cannot drift.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::projector::project_block;
use crate::error::ScheduleError;
use crate::event::ScheduleSlot;

/// Positions shifted per rotation step.
pub const DEFAULT_SHIFT: usize = 3;
/// Occurrences kept for a rotating event each day.
pub const DEFAULT_OCCURRENCES_PER_DAY: usize = 3;

pub fn default_base_time() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 30, 0).unwrap_or_default()
}

/// Static description of the rotation, loaded with the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPlan {
    pub base_time: NaiveTime,
    pub shift: usize,
    pub occurrences_per_day: usize,
    pub slots: Vec<ScheduleSlot>,
    /// Monday order of slot ids.
    pub order: Vec<String>,
}

impl Default for RotationPlan {
    fn default() -> Self {
        Self {
            base_time: default_base_time(),
            shift: DEFAULT_SHIFT,
            occurrences_per_day: DEFAULT_OCCURRENCES_PER_DAY,
            slots: Vec::new(),
            order: Vec::new(),
        }
    }
}

impl RotationPlan {
    pub fn slot(&self, id: &str) -> Option<&ScheduleSlot> {
        self.slots.iter().find(|s| s.id == id)
    }
}

/// Number of pending rotations for a date: Monday = 0 ... Sunday = 6.
pub fn rotations_for(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday() - 1
}

/// Rotate `order` left by `shift` positions once per pending rotation.
pub fn advance(order: &[String], date: NaiveDate, shift: usize) -> Vec<String> {
    let mut rotated = order.to_vec();
    if rotated.is_empty() {
        return rotated;
    }
    let steps = shift * rotations_for(date) as usize;
    let len = rotated.len();
    rotated.rotate_left(steps % len);
    rotated
}

/// Start time for each slot: `base_time + position` hours.
pub fn resolve(order: &[String], base_time: NaiveTime) -> BTreeMap<String, NaiveTime> {
    order
        .iter()
        .enumerate()
        .map(|(position, slot)| {
            let offset = Duration::hours(position as i64);
            (slot.clone(), base_time.overflowing_add_signed(offset).0)
        })
        .collect()
}

/// Mutable rotation state for the running process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    plan: RotationPlan,
    order: Vec<String>,
    starts: BTreeMap<String, NaiveTime>,
    last_advanced: Option<NaiveDate>,
}

impl RotationState {
    pub fn new(plan: RotationPlan) -> Self {
        let order = plan.order.clone();
        let starts = resolve(&order, plan.base_time);
        Self {
            plan,
            order,
            starts,
            last_advanced: None,
        }
    }

    /// Bring the order up to date for `date`.
    ///
    /// Returns `true` only on the first call for a calendar day.
    pub fn advance_for(&mut self, date: NaiveDate) -> bool {
        if self.last_advanced == Some(date) {
            return false;
        }
        self.order = advance(&self.plan.order, date, self.plan.shift);
        self.starts = resolve(&self.order, self.plan.base_time);
        self.last_advanced = Some(date);
        info!(
            %date,
            rotations = rotations_for(date),
            order = ?self.order,
            "rotation advanced"
        );
        true
    }

    /// Restore a persisted order. Ignored if it does not match the plan's slots.
    pub fn restore(&mut self, order: Vec<String>, last_advanced: NaiveDate) -> bool {
        let mut expected = self.plan.order.clone();
        let mut given = order.clone();
        expected.sort();
        given.sort();
        if expected != given {
            return false;
        }
        self.starts = resolve(&order, self.plan.base_time);
        self.order = order;
        self.last_advanced = Some(last_advanced);
        true
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn last_advanced(&self) -> Option<NaiveDate> {
        self.last_advanced
    }

    pub fn start_time(&self, slot: &str) -> Option<NaiveTime> {
        self.starts.get(slot).copied()
    }

    /// Today's occurrences for the event in `slot`.
    pub fn occurrences(&self, slot: &str) -> Result<Vec<NaiveTime>, ScheduleError> {
        let start = self
            .start_time(slot)
            .ok_or_else(|| ScheduleError::SlotNotInRotation { slot: slot.into() })?;
        let frequency = self.plan.slot(slot).map(|s| s.frequency_hours).unwrap_or(0);
        Ok(project_block(start, frequency, self.plan.occurrences_per_day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // 2026-03-02 is a Monday.
    fn day(offset: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2 + offset).unwrap()
    }

    fn plan() -> RotationPlan {
        let order = ids(&["A", "B", "C", "D", "E", "F"]);
        RotationPlan {
            slots: order
                .iter()
                .map(|id| ScheduleSlot {
                    id: id.clone(),
                    frequency_hours: 2,
                })
                .collect(),
            order,
            ..RotationPlan::default()
        }
    }

    #[test]
    fn rotations_follow_weekday() {
        assert_eq!(rotations_for(day(0)), 0);
        assert_eq!(rotations_for(day(1)), 1);
        assert_eq!(rotations_for(day(6)), 6);
    }

    #[test]
    fn one_rotation_shifts_a_block() {
        let order = ids(&["A", "B", "C", "D", "E", "F"]);
        assert_eq!(advance(&order, day(1), 3), ids(&["D", "E", "F", "A", "B", "C"]));
    }

    #[test]
    fn sunday_returns_to_base_for_six_slots() {
        let order = ids(&["A", "B", "C", "D", "E", "F"]);
        assert_eq!(advance(&order, day(6), 3), order);
    }

    #[test]
    fn rotation_matches_stepwise_shifting() {
        let order = ids(&["A", "B", "C", "D", "E", "F", "G", "H", "I"]);
        let mut stepped = order.clone();
        for _ in 0..rotations_for(day(4)) {
            stepped.rotate_left(3);
        }
        assert_eq!(advance(&order, day(4), 3), stepped);
    }

    #[test]
    fn resolve_assigns_hourly_starts() {
        let starts = resolve(&ids(&["D", "E", "F"]), t(0, 30));
        assert_eq!(starts["D"], t(0, 30));
        assert_eq!(starts["E"], t(1, 30));
        assert_eq!(starts["F"], t(2, 30));
    }

    #[test]
    fn advance_is_idempotent_within_a_day() {
        let mut state = RotationState::new(plan());
        assert!(state.advance_for(day(1)));
        let once = state.order().to_vec();
        assert!(!state.advance_for(day(1)));
        assert_eq!(state.order(), once.as_slice());
        assert!(state.advance_for(day(2)));
        assert_eq!(state.order(), ids(&["A", "B", "C", "D", "E", "F"]).as_slice());
    }

    #[test]
    fn occurrences_use_block_size() {
        let mut state = RotationState::new(plan());
        state.advance_for(day(1));
        assert_eq!(state.occurrences("A").unwrap(), vec![t(3, 30), t(5, 30), t(7, 30)]);
        assert!(state.occurrences("Z").is_err());
    }

    #[test]
    fn restore_rejects_foreign_order() {
        let mut state = RotationState::new(plan());
        assert!(!state.restore(ids(&["A", "B"]), day(1)));
        assert!(state.restore(ids(&["D", "E", "F", "A", "B", "C"]), day(1)));
        assert!(!state.advance_for(day(1)));
        assert_eq!(state.start_time("D"), Some(t(0, 30)));
    }
}
