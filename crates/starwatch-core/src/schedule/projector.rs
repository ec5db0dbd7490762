//! Occurrence projection.
//!
//! Turns an event's sparse schedule description into the ordered list of
//! times of day at which it occurs within one day (or one rotation block).

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::rotation::RotationState;
use crate::error::ScheduleError;
use crate::event::{Event, Schedule};

/// Upper bound on wrap-around steps before a projection is abandoned.
pub const MAX_PROJECTION_ITERATIONS: usize = 48;

const HOURS_PER_DAY: u32 = 24;

/// Projected occurrences for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub event_id: String,
    pub times: Vec<NaiveTime>,
}

/// Occurrences for any schedule mode.
///
/// Explicit lists are returned as given. Recurring schedules start one
/// frequency after the initial time and wrap past midnight until they land
/// on the initial time again, which is included last. Rotating events are
/// resolved through the current rotation order.
pub fn project(event: &Event, rotation: &RotationState) -> Result<Vec<NaiveTime>, ScheduleError> {
    match &event.schedule {
        Schedule::Explicit { times } => Ok(times.clone()),
        Schedule::Recurring {
            initial,
            frequency_hours,
        } => project_recurring(&event.id, *initial, *frequency_hours),
        Schedule::Rotating { slot } => rotation.occurrences(slot),
    }
}

/// Like [`project`], but logs and yields `None` for misconfigured events so
/// the caller can exclude them for the cycle.
pub fn timetable(event: &Event, rotation: &RotationState) -> Option<Timetable> {
    match project(event, rotation) {
        Ok(times) => Some(Timetable {
            event_id: event.id.clone(),
            times,
        }),
        Err(e) => {
            warn!(event = %event.id, error = %e, "excluding event from matching");
            None
        }
    }
}

pub fn project_recurring(
    event_id: &str,
    initial: NaiveTime,
    frequency_hours: u32,
) -> Result<Vec<NaiveTime>, ScheduleError> {
    if frequency_hours == 0 || HOURS_PER_DAY % frequency_hours != 0 {
        return Err(ScheduleError::FrequencyDoesNotDivideDay {
            event: event_id.to_string(),
            frequency_hours,
        });
    }

    let step = Duration::hours(i64::from(frequency_hours));
    let mut current = initial.overflowing_add_signed(step).0;
    let mut times = vec![current];
    let mut iterations = 1;

    while current != initial {
        if iterations >= MAX_PROJECTION_ITERATIONS {
            return Err(ScheduleError::ProjectionDidNotTerminate {
                event: event_id.to_string(),
                iterations,
            });
        }
        current = current.overflowing_add_signed(step).0;
        times.push(current);
        iterations += 1;
    }

    Ok(times)
}

/// Start time plus up to `count - 1` further occurrences every
/// `frequency_hours`, stopping early if the day wraps back to the start.
pub fn project_block(start: NaiveTime, frequency_hours: u32, count: usize) -> Vec<NaiveTime> {
    let mut times = Vec::with_capacity(count);
    if count == 0 {
        return times;
    }
    times.push(start);
    if frequency_hours == 0 {
        return times;
    }

    let step = Duration::hours(i64::from(frequency_hours));
    let mut current = start;
    while times.len() < count {
        current = current.overflowing_add_signed(step).0;
        if current == start {
            break;
        }
        times.push(current);
    }
    times
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn recurring_excludes_initial_until_wrap() {
        let times = project_recurring("shadow-behemoth", t(1, 45), 2).unwrap();
        assert_eq!(times.len(), 12);
        assert_eq!(times[0], t(3, 45));
        assert_eq!(times[10], t(23, 45));
        assert_eq!(*times.last().unwrap(), t(1, 45));
    }

    #[test]
    fn daily_frequency_yields_initial_only() {
        let times = project_recurring("daily", t(18, 0), 24).unwrap();
        assert_eq!(times, vec![t(18, 0)]);
    }

    #[test]
    fn non_dividing_frequency_is_rejected() {
        let err = project_recurring("broken", t(0, 0), 5).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::FrequencyDoesNotDivideDay {
                event: "broken".into(),
                frequency_hours: 5
            }
        );
        assert!(project_recurring("zero", t(0, 0), 0).is_err());
    }

    #[test]
    fn block_stops_at_count() {
        assert_eq!(project_block(t(0, 30), 2, 3), vec![t(0, 30), t(2, 30), t(4, 30)]);
        assert_eq!(project_block(t(23, 30), 24, 3), vec![t(23, 30)]);
        assert!(project_block(t(1, 0), 2, 0).is_empty());
    }

    proptest! {
        #[test]
        fn projection_covers_the_day_once(
            hour in 0u32..24,
            minute in 0u32..60,
            frequency in prop::sample::select(vec![1u32, 2, 3, 4, 6, 8, 12, 24]),
        ) {
            let initial = t(hour, minute);
            let times = project_recurring("prop", initial, frequency).unwrap();

            prop_assert_eq!(times.len() as u32, 24 / frequency);

            let mut distinct = times.clone();
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(distinct.len(), times.len());

            let last = *times.last().unwrap();
            prop_assert_eq!(last, initial);
            let back = last.overflowing_add_signed(Duration::hours(i64::from(frequency))).0;
            prop_assert_eq!(back, times[0]);
        }
    }
}
