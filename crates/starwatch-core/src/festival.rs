//! Seasonal festival windows.
//!
//! A festival is a closed `[start, end]` interval. Its member events only
//! notify while the window is ongoing; outside it they are excluded from
//! matching entirely.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::notify_state::NotifyId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FestivalWindow {
    pub category: String,
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Event ids whose notifications depend on this window.
    pub members: Vec<String>,
}

impl FestivalWindow {
    /// Inclusive of both endpoints.
    pub fn is_ongoing(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }

    pub fn has_member(&self, event_id: &str) -> bool {
        self.members.iter().any(|m| m == event_id)
    }

    /// A single-member festival is toggled through its category; a festival
    /// with several members exposes one toggle per member.
    pub fn uses_shared_toggle(&self) -> bool {
        self.members.len() == 1
    }

    /// Identifier whose state governs the given member's notifications.
    pub fn gate_id(&self, event_id: &str) -> Option<NotifyId> {
        if !self.has_member(event_id) {
            return None;
        }
        if self.uses_shared_toggle() {
            Some(NotifyId::category(&self.category))
        } else {
            Some(NotifyId::event(event_id))
        }
    }

    /// Toggles a UI would render for this window.
    pub fn toggle_ids(&self) -> Vec<NotifyId> {
        if self.uses_shared_toggle() {
            vec![NotifyId::category(&self.category)]
        } else {
            self.members.iter().map(|m| NotifyId::event(m)).collect()
        }
    }
}

/// Result of [`current_or_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FestivalStatus<'a> {
    Ongoing(&'a FestivalWindow),
    Upcoming(&'a FestivalWindow),
    None,
}

impl<'a> FestivalStatus<'a> {
    pub fn window(&self) -> Option<&'a FestivalWindow> {
        match *self {
            FestivalStatus::Ongoing(w) | FestivalStatus::Upcoming(w) => Some(w),
            FestivalStatus::None => None,
        }
    }

    pub fn ongoing(&self) -> Option<&'a FestivalWindow> {
        match *self {
            FestivalStatus::Ongoing(w) => Some(w),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<String> {
        match self {
            FestivalStatus::Ongoing(w) => Some(w.name.clone()),
            FestivalStatus::Upcoming(w) => Some(format!("Next festival: {}", w.name)),
            FestivalStatus::None => None,
        }
    }

    /// Countdown to the end of an ongoing window or the start of an upcoming one.
    pub fn countdown(&self, at: NaiveDateTime) -> Option<String> {
        match self {
            FestivalStatus::Ongoing(w) => Some(countdown(at, w.end, true)),
            FestivalStatus::Upcoming(w) => Some(countdown(at, w.start, false)),
            FestivalStatus::None => None,
        }
    }
}

/// The first ongoing window in list order, otherwise the window with the
/// smallest start strictly after `at`. Equal starts resolve to the later
/// list entry. No future start means [`FestivalStatus::None`].
pub fn current_or_next(windows: &[FestivalWindow], at: NaiveDateTime) -> FestivalStatus<'_> {
    if let Some(w) = windows.iter().find(|w| w.is_ongoing(at)) {
        return FestivalStatus::Ongoing(w);
    }

    let mut next: Option<&FestivalWindow> = None;
    for w in windows.iter().filter(|w| w.start > at) {
        match next {
            Some(best) if w.start > best.start => {}
            _ => next = Some(w),
        }
    }

    next.map(FestivalStatus::Upcoming).unwrap_or(FestivalStatus::None)
}

/// Whether `event_id` may be matched at `at`.
///
/// Events that belong to no festival are always eligible. A festival member
/// is eligible only while one of its windows is ongoing.
pub fn is_eligible(windows: &[FestivalWindow], event_id: &str, at: NaiveDateTime) -> bool {
    let mut member_of_any = false;
    for w in windows.iter().filter(|w| w.has_member(event_id)) {
        if w.is_ongoing(at) {
            return true;
        }
        member_of_any = true;
    }
    !member_of_any
}

/// Human countdown such as `"Ending in 2 days and 3 hours"`.
pub fn countdown(at: NaiveDateTime, target: NaiveDateTime, ongoing: bool) -> String {
    let prefix = if ongoing { "Ending in " } else { "Starting in " };
    let total_hours = (target - at).num_hours().max(0);
    if total_hours == 0 {
        return format!("{prefix}less than an hour");
    }

    let days = total_hours / 24;
    let hours = total_hours % 24;
    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    format!("{prefix}{}", parts.join(" and "))
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn window(
        name: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        members: &[&str],
    ) -> FestivalWindow {
        FestivalWindow {
            category: name.to_lowercase(),
            name: name.into(),
            start,
            end,
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn calendar() -> Vec<FestivalWindow> {
        vec![
            window("Lunar New Year", dt(2, 3, 17, 0), dt(2, 24, 17, 0), &["dragon-ball"]),
            window(
                "Dragon Bash",
                dt(6, 23, 17, 0),
                dt(7, 14, 17, 0),
                &["hologram-stampede", "dragon-arena"],
            ),
            window("Halloween", dt(10, 20, 17, 0), dt(11, 10, 17, 0), &["mad-king-says"]),
        ]
    }

    #[test]
    fn boundaries_are_ongoing() {
        let w = &calendar()[0];
        assert!(w.is_ongoing(w.start));
        assert!(w.is_ongoing(w.end));
        assert!(!w.is_ongoing(dt(2, 3, 16, 59)));
        assert!(!w.is_ongoing(dt(2, 24, 17, 1)));
    }

    #[test]
    fn ongoing_window_wins() {
        let windows = calendar();
        let status = current_or_next(&windows, dt(7, 1, 12, 0));
        assert_eq!(status.ongoing().map(|w| w.name.as_str()), Some("Dragon Bash"));
    }

    #[test]
    fn next_window_is_smallest_future_start() {
        let windows = calendar();
        let status = current_or_next(&windows, dt(3, 1, 0, 0));
        assert!(matches!(status, FestivalStatus::Upcoming(w) if w.name == "Dragon Bash"));
        assert_eq!(status.title().as_deref(), Some("Next festival: Dragon Bash"));
    }

    #[test]
    fn equal_starts_prefer_later_entry() {
        let mut windows = calendar();
        windows.push(window("Festival of the Four Winds", dt(6, 23, 17, 0), dt(7, 20, 0, 0), &[]));
        let status = current_or_next(&windows, dt(5, 1, 0, 0));
        assert_eq!(status.window().map(|w| w.name.as_str()), Some("Festival of the Four Winds"));
    }

    #[test]
    fn no_future_start_is_none() {
        let windows = calendar();
        assert_eq!(current_or_next(&windows, dt(12, 1, 0, 0)), FestivalStatus::None);
        assert_eq!(current_or_next(&[], dt(12, 1, 0, 0)), FestivalStatus::None);
    }

    #[test]
    fn members_only_eligible_while_ongoing() {
        let windows = calendar();
        assert!(!is_eligible(&windows, "mad-king-says", dt(10, 1, 0, 0)));
        assert!(is_eligible(&windows, "mad-king-says", dt(10, 20, 17, 0)));
        assert!(is_eligible(&windows, "tequatl", dt(10, 1, 0, 0)));
    }

    #[test]
    fn gate_id_depends_on_member_count() {
        let windows = calendar();
        assert_eq!(windows[0].gate_id("dragon-ball"), Some(NotifyId::category("lunar new year")));
        assert_eq!(windows[1].gate_id("dragon-arena"), Some(NotifyId::event("dragon-arena")));
        assert_eq!(windows[1].gate_id("tequatl"), None);
        assert_eq!(windows[1].toggle_ids().len(), 2);
    }

    #[test]
    fn countdown_strings() {
        let now = dt(7, 1, 12, 0);
        assert_eq!(countdown(now, dt(7, 1, 12, 59), true), "Ending in less than an hour");
        assert_eq!(countdown(now, dt(7, 1, 13, 0), false), "Starting in 1 hour");
        assert_eq!(countdown(now, dt(7, 3, 15, 0), true), "Ending in 2 days and 3 hours");
        assert_eq!(countdown(now, dt(7, 2, 12, 0), false), "Starting in 1 day");
    }
}
