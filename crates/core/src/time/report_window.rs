use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

// The daily report may only fire in the first 15 minutes after 08:00
// local time; outside that window it never fires, whatever else holds.
const REPORT_HOUR: u32 = 8;
const REPORT_WINDOW_MINUTES: u32 = 15;

/// Wall-clock fields of an instant in the report timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilMoment {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
}

impl CivilMoment {
    /// Civil date rendered the way the daily-report watermark stores it.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Converts `now_utc` to civil wall-clock fields using the offset rules
/// in force at that instant, not a fixed offset; the window is anchored
/// to local clock time and must not drift across DST transitions.
///
/// Instant-to-civil conversion is total, so DST transition days need no
/// special handling here. A spring-forward zone can skip the window
/// entirely for one day, and on fall-back the window covers whichever
/// instants the tz database maps to 08:00-08:14; both are accepted.
pub fn civil_moment(now_utc: DateTime<Utc>, tz: Tz) -> CivilMoment {
    let local = now_utc.with_timezone(&tz);
    CivilMoment {
        date: local.date_naive(),
        hour: local.hour(),
        minute: local.minute(),
    }
}

pub fn in_report_window(moment: &CivilMoment) -> bool {
    moment.hour == REPORT_HOUR && moment.minute < REPORT_WINDOW_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn moment_at(hour: u32, minute: u32) -> CivilMoment {
        CivilMoment {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            hour,
            minute,
        }
    }

    #[test]
    fn window_covers_first_fifteen_minutes_of_eight() {
        assert!(in_report_window(&moment_at(8, 0)));
        assert!(in_report_window(&moment_at(8, 14)));
    }

    #[test]
    fn window_closes_at_quarter_past() {
        assert!(!in_report_window(&moment_at(8, 15)));
        assert!(!in_report_window(&moment_at(8, 16)));
    }

    #[test]
    fn window_excludes_other_hours() {
        assert!(!in_report_window(&moment_at(7, 59)));
        assert!(!in_report_window(&moment_at(9, 0)));
        assert!(!in_report_window(&moment_at(14, 0)));
    }

    #[test]
    fn converts_with_winter_offset() {
        // 2024-01-02 13:10 UTC is 08:10 EST (UTC-5).
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 13, 10, 0).unwrap();
        let m = civil_moment(now, New_York);
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!((m.hour, m.minute), (8, 10));
        assert!(in_report_window(&m));
    }

    #[test]
    fn converts_with_summer_offset() {
        // 2024-07-02 12:10 UTC is 08:10 EDT (UTC-4); the same UTC clock
        // time as the winter case would land at 09:10 and miss the window.
        let now = Utc.with_ymd_and_hms(2024, 7, 2, 12, 10, 0).unwrap();
        let m = civil_moment(now, New_York);
        assert_eq!((m.hour, m.minute), (8, 10));
        assert!(in_report_window(&m));

        let fixed_offset_drift = Utc.with_ymd_and_hms(2024, 7, 2, 13, 10, 0).unwrap();
        let m = civil_moment(fixed_offset_drift, New_York);
        assert_eq!((m.hour, m.minute), (9, 10));
        assert!(!in_report_window(&m));
    }

    #[test]
    fn civil_date_rolls_over_at_local_midnight() {
        // 2024-01-03 03:00 UTC is still 2024-01-02 22:00 in New York.
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 3, 0, 0).unwrap();
        let m = civil_moment(now, New_York);
        assert_eq!(m.date_string(), "2024-01-02");
    }
}
