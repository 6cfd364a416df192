//! Shuttle timetable between the nearest station and campus.
//!
//! The data is a transcription of the operator's printed timetable, so it
//! lives here as static tables rather than behind an upstream fetch.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};
use chrono_tz::Tz;

use crate::model::Direction;

/// Zone the printed timetable is written in.
pub const TIMETABLE_TZ: Tz = chrono_tz::Asia::Tokyo;

/// Operator branding for the shuttle line.
pub const LINE_NAME: &str = "City Link";

/// Shown when no departure can be resolved at all.
pub const NO_SERVICE_LABEL: &str = "--:--";

/// Which printed timetable column applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusDayType {
    Weekday,
    Saturday,
    Holiday,
}

/// Departure minutes within one service hour.
type HourSlot = (u32, &'static [u32]);

const WEEKDAY_TO_CAMPUS: &[HourSlot] = &[
    (7, &[30, 40, 45]),
    (8, &[0, 5, 10, 15, 20, 25, 30, 35, 40, 45]),
    (9, &[5, 15, 25, 35, 55]),
    (10, &[5, 15, 25, 30, 35]),
    (11, &[25, 45, 55]),
    (12, &[45, 55]),
    (13, &[5, 10, 40]),
    (14, &[5, 15, 30, 40, 45, 55]),
    (15, &[5, 15, 30, 40, 45, 55]),
    (16, &[20, 50]),
    (17, &[10, 15, 20, 30, 40]),
];

const SATURDAY_TO_CAMPUS: &[HourSlot] = &[
    (7, &[30, 40]),
    (8, &[0, 5, 10, 15, 20, 25, 30, 35, 40]),
    (9, &[30, 55]),
    (10, &[25, 35, 55]),
    (11, &[25, 40, 55]),
    (12, &[45, 55]),
    (13, &[0, 5, 15, 20, 25]),
    (14, &[20, 35, 50]),
    (15, &[20, 30, 50]),
    (16, &[20]),
];

const HOLIDAY_TO_CAMPUS: &[HourSlot] = &[(12, &[25]), (13, &[45])];

const WEEKDAY_FROM_CAMPUS: &[HourSlot] = &[
    (7, &[5, 10, 15, 20, 25, 30, 35]),
    (8, &[0, 20, 30, 45, 50]),
    (9, &[5, 35, 45, 55]),
    (10, &[5, 15, 20, 25]),
    (11, &[15, 40]),
    (12, &[35, 45, 50, 55]),
    (13, &[0, 30]),
    (14, &[5, 10, 40]),
    (15, &[5, 20, 25, 30, 35, 40, 45]),
    (16, &[10, 40]),
    (17, &[0, 5, 10, 20, 30, 45, 55]),
    (18, &[0, 20, 30, 35]),
    (19, &[0, 35, 45]),
    (20, &[45]),
    (21, &[15]),
    (22, &[0]),
];

const SATURDAY_FROM_CAMPUS: &[HourSlot] = &[
    (7, &[5, 10, 15, 20, 25, 30, 35]),
    (8, &[0, 10, 20, 40]),
    (9, &[20, 45]),
    (10, &[15, 25, 45]),
    (11, &[15, 30, 45]),
    (12, &[35, 45, 50, 55]),
    (13, &[5, 10, 15, 35]),
    (14, &[10, 40]),
    (15, &[10, 25, 40]),
    (16, &[10, 40]),
    (17, &[10, 40]),
    (18, &[10, 40]),
    (19, &[10, 30]),
];

const HOLIDAY_FROM_CAMPUS: &[HourSlot] = &[(12, &[15]), (13, &[35])];

/// A resolved timetable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    pub hour: u32,
    pub minute: u32,
    /// Set when today's service has ended and the slot is tomorrow's first.
    pub next_day: bool,
}

impl Departure {
    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Public holidays share the Sunday column but are not detected.
pub fn day_type(weekday: Weekday) -> BusDayType {
    match weekday {
        Weekday::Sun => BusDayType::Holiday,
        Weekday::Sat => BusDayType::Saturday,
        _ => BusDayType::Weekday,
    }
}

fn timetable(direction: Direction, day: BusDayType) -> &'static [HourSlot] {
    match (direction, day) {
        (Direction::ToCampus, BusDayType::Weekday) => WEEKDAY_TO_CAMPUS,
        (Direction::ToCampus, BusDayType::Saturday) => SATURDAY_TO_CAMPUS,
        (Direction::ToCampus, BusDayType::Holiday) => HOLIDAY_TO_CAMPUS,
        (Direction::ToHome, BusDayType::Weekday) => WEEKDAY_FROM_CAMPUS,
        (Direction::ToHome, BusDayType::Saturday) => SATURDAY_FROM_CAMPUS,
        (Direction::ToHome, BusDayType::Holiday) => HOLIDAY_FROM_CAMPUS,
    }
}

/// Next departure for `direction` at local time `now`.
///
/// A slot at the current minute still counts. Once today's table is
/// exhausted the first slot of the following day's table is returned with
/// `next_day` set.
pub fn next_departure<Z: TimeZone>(direction: Direction, now: DateTime<Z>) -> Option<Departure> {
    let today = timetable(direction, day_type(now.weekday()));
    if let Some((hour, minute)) = next_in_table(today, now.hour(), now.minute()) {
        return Some(Departure { hour, minute, next_day: false });
    }

    let tomorrow = now.date_naive().succ_opt()?;
    let table = timetable(direction, day_type(tomorrow.weekday()));

    first_in_table(table).map(|(hour, minute)| Departure { hour, minute, next_day: true })
}

/// Next departure evaluated against the wall clock in the timetable's zone.
pub fn next_departure_now(direction: Direction) -> Option<Departure> {
    next_departure(direction, chrono::Utc::now().with_timezone(&TIMETABLE_TZ))
}

fn next_in_table(table: &[HourSlot], hour: u32, minute: u32) -> Option<(u32, u32)> {
    for &(slot_hour, minutes) in table {
        if slot_hour < hour {
            continue;
        }
        if slot_hour == hour {
            if let Some(&next) = minutes.iter().find(|&&m| m >= minute) {
                return Some((slot_hour, next));
            }
            continue;
        }
        if let Some(&first) = minutes.first() {
            return Some((slot_hour, first));
        }
    }

    None
}

fn first_in_table(table: &[HourSlot]) -> Option<(u32, u32)> {
    table
        .first()
        .and_then(|&(hour, minutes)| minutes.first().map(|&minute| (hour, minute)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::LocalResult;

    fn tokyo(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        match TIMETABLE_TZ.with_ymd_and_hms(y, mo, d, h, mi, 0) {
            LocalResult::Single(dt) => dt,
            _ => panic!("ambiguous local time in test"),
        }
    }

    #[test]
    fn day_type_maps_weekends() {
        assert_eq!(day_type(Weekday::Sun), BusDayType::Holiday);
        assert_eq!(day_type(Weekday::Sat), BusDayType::Saturday);
        assert_eq!(day_type(Weekday::Wed), BusDayType::Weekday);
    }

    #[test]
    fn same_hour_slot_at_or_after_now() {
        // Monday 08:22, next weekday to-campus slot is 08:25
        let departure = next_departure(Direction::ToCampus, tokyo(2024, 1, 15, 8, 22));

        assert_eq!(departure, Some(Departure { hour: 8, minute: 25, next_day: false }));
    }

    #[test]
    fn slot_at_the_current_minute_counts() {
        let departure = next_departure(Direction::ToCampus, tokyo(2024, 1, 15, 7, 30));

        assert_eq!(departure, Some(Departure { hour: 7, minute: 30, next_day: false }));
    }

    #[test]
    fn exhausted_hour_moves_to_the_next_one() {
        let departure = next_departure(Direction::ToCampus, tokyo(2024, 1, 15, 7, 50));

        assert_eq!(departure, Some(Departure { hour: 8, minute: 0, next_day: false }));
    }

    #[test]
    fn finished_service_rolls_over_to_tomorrow() {
        // Monday 17:45 is past the last weekday to-campus run at 17:40
        let departure = next_departure(Direction::ToCampus, tokyo(2024, 1, 15, 17, 45));

        assert_eq!(departure, Some(Departure { hour: 7, minute: 30, next_day: true }));
    }

    #[test]
    fn sparse_holiday_table_waits_for_midday() {
        // Sunday morning, first holiday to-campus run is 12:25
        let departure = next_departure(Direction::ToCampus, tokyo(2024, 1, 14, 10, 0));

        assert_eq!(departure, Some(Departure { hour: 12, minute: 25, next_day: false }));
    }

    #[test]
    fn saturday_rolls_into_the_holiday_table() {
        // Saturday 19:40 is past the last from-campus run at 19:30; Sunday's
        // first from-campus run is 12:15
        let departure = next_departure(Direction::ToHome, tokyo(2024, 1, 13, 19, 40));

        assert_eq!(departure, Some(Departure { hour: 12, minute: 15, next_day: true }));
    }

    #[test]
    fn label_is_zero_padded() {
        let departure = Departure { hour: 8, minute: 5, next_day: false };

        assert_eq!(departure.label(), "08:05");
    }

    #[test]
    fn tables_are_ordered_and_in_range() {
        let all = [
            WEEKDAY_TO_CAMPUS,
            SATURDAY_TO_CAMPUS,
            HOLIDAY_TO_CAMPUS,
            WEEKDAY_FROM_CAMPUS,
            SATURDAY_FROM_CAMPUS,
            HOLIDAY_FROM_CAMPUS,
        ];

        for table in all {
            assert!(!table.is_empty());
            for window in table.windows(2) {
                assert!(window[0].0 < window[1].0, "hours must ascend");
            }
            for &(hour, minutes) in table {
                assert!(hour < 24);
                assert!(!minutes.is_empty());
                for window in minutes.windows(2) {
                    assert!(window[0] < window[1], "minutes must ascend in hour {hour}");
                }
                assert!(minutes.iter().all(|&m| m < 60));
            }
        }
    }
}
