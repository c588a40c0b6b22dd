// service/trailing_window.rs
//
// Chart time scope. Deliberately separate from `date_range`: it is always
// relative to "now" and ends at "now", not at the end of the period.
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrailingWindow {
    #[default]
    All,
    ThisMonth,
    ThisYear,
}

impl TrailingWindow {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" | "all" => Some(TrailingWindow::All),
            "thisMonth" => Some(TrailingWindow::ThisMonth),
            "thisYear" => Some(TrailingWindow::ThisYear),
            _ => None,
        }
    }

    fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let day = match self {
            TrailingWindow::All => return None,
            TrailingWindow::ThisMonth => NaiveDate::from_ymd_opt(now.year(), now.month(), 1)?,
            TrailingWindow::ThisYear => NaiveDate::from_ymd_opt(now.year(), 1, 1)?,
        };
        day.and_hms_opt(0, 0, 0).map(|start| start.and_utc())
    }

    /// `All` admits everything, undated records included.
    pub fn admits(&self, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match self.start(now) {
            None => true,
            Some(start) => created_at.map_or(false, |at| at >= start && at <= now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn all_admits_undated() {
        assert!(TrailingWindow::All.admits(None, now()));
    }

    #[test]
    fn this_month_runs_from_first_to_now() {
        let window = TrailingWindow::ThisMonth;
        let first = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let late_feb = Utc.with_ymd_and_hms(2025, 2, 28, 23, 0, 0).unwrap();
        let later_today = Utc.with_ymd_and_hms(2025, 3, 14, 18, 0, 0).unwrap();

        assert!(window.admits(Some(first), now()));
        assert!(window.admits(Some(now()), now()));
        assert!(!window.admits(Some(late_feb), now()));
        assert!(!window.admits(Some(later_today), now()));
        assert!(!window.admits(None, now()));
    }

    #[test]
    fn this_year_starts_on_jan_first() {
        let window = TrailingWindow::ThisYear;
        let jan = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let dec = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();

        assert!(window.admits(Some(jan), now()));
        assert!(!window.admits(Some(dec), now()));
    }

    #[test]
    fn parse_rejects_unknown_windows() {
        assert_eq!(TrailingWindow::parse("thisYear"), Some(TrailingWindow::ThisYear));
        assert_eq!(TrailingWindow::parse(""), Some(TrailingWindow::All));
        assert_eq!(TrailingWindow::parse("lastWeek"), None);
    }
}
