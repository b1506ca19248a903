//! Blocking-window evaluation.

use crate::models::{Schedule, Weekday};
use chrono::NaiveDateTime;

/// Whether `now` falls inside today's enabled window.
///
/// The time of day is formatted as zero-padded `HH:MM`, the same width as the
/// stored `start`/`end`, so string order is chronological. Both bounds are
/// inclusive. A window whose end is before its start never matches.
pub fn is_within_window(schedule: &Schedule, now: NaiveDateTime) -> bool {
    let day = Weekday::of(now.date());
    let Some(entry) = schedule.get(day) else {
        return false;
    };
    if !entry.enabled {
        return false;
    }

    let current = now.format("%H:%M").to_string();
    entry.start.as_str() <= current.as_str() && current.as_str() <= entry.end.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleEntry;
    use crate::test_utils::naive;

    // 2024-03-04 is a Monday, 2024-03-10 a Sunday.
    fn monday_nine_to_five() -> Schedule {
        Schedule::new().with(Weekday::Monday, ScheduleEntry::new(true, "09:00", "17:00"))
    }

    #[test]
    fn test_monday_scenario() {
        let schedule = monday_nine_to_five();

        assert!(is_within_window(&schedule, naive(2024, 3, 4, 10, 0, 0)));
        assert!(!is_within_window(&schedule, naive(2024, 3, 4, 8, 59, 0)));
        assert!(!is_within_window(&schedule, naive(2024, 3, 10, 10, 0, 0)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let schedule = monday_nine_to_five();

        assert!(is_within_window(&schedule, naive(2024, 3, 4, 9, 0, 0)));
        assert!(is_within_window(&schedule, naive(2024, 3, 4, 17, 0, 0)));
        assert!(is_within_window(&schedule, naive(2024, 3, 4, 17, 0, 59)));
        assert!(!is_within_window(&schedule, naive(2024, 3, 4, 17, 1, 0)));
        assert!(!is_within_window(&schedule, naive(2024, 3, 4, 8, 59, 59)));
    }

    #[test]
    fn test_disabled_day_never_matches() {
        let schedule = Schedule::new().with(Weekday::Monday, ScheduleEntry::new(false, "00:00", "23:59"));

        for hour in 0..24 {
            for minute in [0, 30, 59] {
                assert!(!is_within_window(&schedule, naive(2024, 3, 4, hour, minute, 0)));
            }
        }
    }

    #[test]
    fn test_absent_day_never_matches() {
        let schedule = Schedule::new();
        for day in 4..=10 {
            for hour in 0..24 {
                assert!(!is_within_window(&schedule, naive(2024, 3, day, hour, 0, 0)));
            }
        }
    }

    #[test]
    fn test_enabled_day_matches_string_comparison() {
        let schedule = Schedule::new().with(Weekday::Tuesday, ScheduleEntry::new(true, "08:15", "12:45"));

        for hour in 0..24 {
            for minute in 0..60 {
                let now = naive(2024, 3, 5, hour, minute, 0);
                let formatted = format!("{hour:02}:{minute:02}");
                let expected = "08:15" <= formatted.as_str() && formatted.as_str() <= "12:45";
                assert_eq!(is_within_window(&schedule, now), expected, "at {formatted}");
            }
        }
    }

    #[test]
    fn test_cross_midnight_window_never_matches() {
        let schedule = Schedule::new().with(Weekday::Monday, ScheduleEntry::new(true, "22:00", "02:00"));

        assert!(!is_within_window(&schedule, naive(2024, 3, 4, 23, 0, 0)));
        assert!(!is_within_window(&schedule, naive(2024, 3, 4, 1, 0, 0)));
    }

    #[test]
    fn test_each_weekday_resolves_its_own_entry() {
        for (offset, day) in (0u32..).zip(Weekday::ALL) {
            let schedule = Schedule::new().with(day, ScheduleEntry::new(true, "00:00", "23:59"));
            assert!(is_within_window(&schedule, naive(2024, 3, 4 + offset, 12, 0, 0)), "{day}");
            let next = if offset == 6 { 4 } else { 5 + offset };
            assert!(!is_within_window(&schedule, naive(2024, 3, next, 12, 0, 0)), "{day} +1");
        }
    }
}
