//! Natural-language date resolution
//!
//! Resolves phrases such as "tomorrow", "next friday", "26th may" or
//! "2024-12-25" to a calendar date. Resolution is anchored to a caller
//! supplied `now` so results are deterministic under test.
//!
//! Strategies run in priority order and the first hit wins:
//! 1. `today`
//! 2. `tomorrow`
//! 3. `next <weekday>` for monday through friday
//! 4. day and month name in either order, with optional ordinal suffix
//! 5. ISO `YYYY-MM-DD` anywhere in the text

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Output format for resolved dates
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Weekdays accepted after "next", indexed from Monday = 0
const NEXT_WEEKDAYS: [(&str, i64); 5] = [
    ("next monday", 0),
    ("next tuesday", 1),
    ("next wednesday", 2),
    ("next thursday", 3),
    ("next friday", 4),
];

static MONTHS: Lazy<Vec<(&'static str, u32)>> = Lazy::new(|| {
    vec![
        ("january", 1),
        ("jan", 1),
        ("february", 2),
        ("feb", 2),
        ("march", 3),
        ("mar", 3),
        ("april", 4),
        ("apr", 4),
        ("may", 5),
        ("june", 6),
        ("jun", 6),
        ("july", 7),
        ("jul", 7),
        ("august", 8),
        ("aug", 8),
        ("september", 9),
        ("sep", 9),
        ("october", 10),
        ("oct", 10),
        ("november", 11),
        ("nov", 11),
        ("december", 12),
        ("dec", 12),
    ]
});

// "26th may"
static DAY_THEN_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})(?:st|nd|rd|th)?\s+(\w+)").unwrap());

// "may 26th"
static MONTH_THEN_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s+(\d{1,2})(?:st|nd|rd|th)?").unwrap());

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap());

/// Resolve free text to a calendar date relative to `now`
///
/// Returns `None` when no strategy matches; callers re-prompt.
pub fn resolve_date(text: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let text = text.trim().to_lowercase();
    let today = now.date();

    if text.contains("today") {
        return Some(today);
    }
    if text.contains("tomorrow") {
        return Some(today + Duration::days(1));
    }
    if let Some(date) = resolve_next_weekday(&text, today) {
        return Some(date);
    }
    if let Some(date) = resolve_day_and_month(&text, now) {
        return Some(date);
    }
    resolve_iso(&text)
}

/// Resolve free text and format the result as `YYYY-MM-DD`
pub fn resolve_date_iso(text: &str, now: NaiveDateTime) -> Option<String> {
    resolve_date(text, now).map(|date| date.format(ISO_DATE_FORMAT).to_string())
}

/// "next <weekday>" always lands strictly after today, so naming today's
/// weekday rolls forward a full week.
fn resolve_next_weekday(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (_, target) = NEXT_WEEKDAYS
        .iter()
        .find(|(phrase, _)| text.contains(phrase))?;

    let mut days_ahead = target - i64::from(today.weekday().num_days_from_monday());
    if days_ahead <= 0 {
        days_ahead += 7;
    }
    Some(today + Duration::days(days_ahead))
}

fn resolve_day_and_month(text: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let day_first = DAY_THEN_MONTH
        .captures_iter(text)
        .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())));
    let month_first = MONTH_THEN_DAY
        .captures_iter(text)
        .filter_map(|caps| Some((caps.get(2)?.as_str(), caps.get(1)?.as_str())));

    day_first
        .chain(month_first)
        .find_map(|(day, month)| day_month_date(day, month, now))
}

/// Build a date in the current year, rolling to next year when it is already behind `now`
fn day_month_date(day: &str, month: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let month = month_number(month)?;
    let day: u32 = day.parse().ok()?;

    let date = NaiveDate::from_ymd_opt(now.year(), month, day)?;
    if NaiveDateTime::new(date, NaiveTime::MIN) < now {
        return NaiveDate::from_ymd_opt(now.year() + 1, month, day);
    }
    Some(date)
}

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
}

fn resolve_iso(text: &str) -> Option<NaiveDate> {
    let candidate = ISO_DATE.captures(text)?.get(1)?.as_str();
    NaiveDate::parse_from_str(candidate, ISO_DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_today_and_tomorrow() {
        let now = at(2024, 12, 31, 10);
        assert_eq!(resolve_date("today", now), Some(date(2024, 12, 31)));
        assert_eq!(resolve_date("  Tomorrow please ", now), Some(date(2025, 1, 1)));
        assert_eq!(resolve_date("later TODAY", now), Some(date(2024, 12, 31)));
    }

    #[test]
    fn test_next_weekday_rolls_forward() {
        // 2024-06-12 is a Wednesday
        let now = at(2024, 6, 12, 9);
        assert_eq!(now.date().weekday(), Weekday::Wed);

        assert_eq!(resolve_date("next monday", now), Some(date(2024, 6, 17)));
        assert_eq!(resolve_date("next tuesday", now), Some(date(2024, 6, 18)));
        assert_eq!(resolve_date("next thursday", now), Some(date(2024, 6, 13)));
        assert_eq!(resolve_date("next friday", now), Some(date(2024, 6, 14)));
    }

    #[test]
    fn test_next_same_weekday_is_a_week_out() {
        // 2024-06-10 is a Monday
        let now = at(2024, 6, 10, 9);
        assert_eq!(now.date().weekday(), Weekday::Mon);
        assert_eq!(resolve_date("next monday", now), Some(date(2024, 6, 17)));
        assert_eq!(resolve_date("Next Wednesday", at(2024, 6, 12, 9)), Some(date(2024, 6, 19)));
    }

    #[test]
    fn test_weekend_not_recognised() {
        let now = at(2024, 6, 12, 9);
        assert_eq!(resolve_date("next saturday", now), None);
        assert_eq!(resolve_date("next sunday", now), None);
    }

    #[test]
    fn test_day_month_current_year() {
        let now = at(2024, 3, 1, 12);
        assert_eq!(resolve_date("26th may", now), Some(date(2024, 5, 26)));
        assert_eq!(resolve_date("may 26th", now), Some(date(2024, 5, 26)));
        assert_eq!(resolve_date("on 1st apr", now), Some(date(2024, 4, 1)));
        assert_eq!(resolve_date("December 3", now), Some(date(2024, 12, 3)));
    }

    #[test]
    fn test_day_month_rolls_to_next_year() {
        let now = at(2024, 6, 1, 12);
        assert_eq!(resolve_date("26th may", now), Some(date(2025, 5, 26)));
        assert_eq!(resolve_date("jan 5", now), Some(date(2025, 1, 5)));
    }

    #[test]
    fn test_day_month_same_day_after_midnight_rolls() {
        // Midnight of the named day is already behind now
        let now = at(2024, 5, 26, 8);
        assert_eq!(resolve_date("26 may", now), Some(date(2025, 5, 26)));

        let midnight = date(2024, 5, 26).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(resolve_date("26 may", midnight), Some(date(2024, 5, 26)));
    }

    #[test]
    fn test_invalid_day_month_falls_through() {
        let now = at(2024, 1, 10, 12);
        assert_eq!(resolve_date("31st april", now), None);
        assert_eq!(resolve_date("31 june or 2024-07-01", now), Some(date(2024, 7, 1)));
        assert_eq!(resolve_date("0 may", now), None);
    }

    #[test]
    fn test_later_match_is_used_when_first_is_not_a_month() {
        let now = at(2024, 1, 10, 12);
        assert_eq!(resolve_date("in 3 weeks, may 5th", now), Some(date(2024, 5, 5)));
    }

    #[test]
    fn test_iso_date_independent_of_now() {
        for now in [at(2020, 1, 1, 0), at(2024, 12, 26, 23), at(2030, 7, 4, 12)] {
            assert_eq!(resolve_date("2024-12-25", now), Some(date(2024, 12, 25)));
        }
        assert_eq!(
            resolve_date("book me for 2025-02-03 please", at(2024, 1, 1, 0)),
            Some(date(2025, 2, 3))
        );
    }

    #[test]
    fn test_invalid_iso_rejected() {
        let now = at(2024, 1, 10, 12);
        assert_eq!(resolve_date("2024-02-30", now), None);
        assert_eq!(resolve_date("2024-13-01", now), None);
    }

    #[test]
    fn test_resolved_iso_is_idempotent() {
        let now = at(2024, 3, 1, 12);
        for phrase in ["tomorrow", "next friday", "26th may", "2024-12-25"] {
            let first = resolve_date_iso(phrase, now).unwrap();
            assert_eq!(resolve_date_iso(&first, now), Some(first.clone()));
        }
    }

    #[test]
    fn test_unparseable_returns_none() {
        let now = at(2024, 3, 1, 12);
        assert_eq!(resolve_date("whenever suits you", now), None);
        assert_eq!(resolve_date("", now), None);
        assert_eq!(resolve_date("someday soon", now), None);
    }

    #[test]
    fn test_priority_order() {
        let now = at(2024, 3, 1, 12);
        // Keyword beats ISO
        assert_eq!(resolve_date("tomorrow, not 2024-12-25", now), Some(date(2024, 3, 2)));
        // Day and month beats ISO
        assert_eq!(resolve_date("5 may (2024-12-25)", now), Some(date(2024, 5, 5)));
    }
}
