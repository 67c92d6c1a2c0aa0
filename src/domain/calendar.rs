use chrono::{DateTime, Datelike, Month, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One (year, month) filtering interval. Months are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarWindow {
    pub year: i32,
    pub month: u32,
}

impl CalendarWindow {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Acquisition times are compared in UTC.
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        timestamp.year() == self.year && timestamp.month() == self.month
    }

    /// "<MonthName> <Year>", e.g. "March 2010".
    pub fn label(&self) -> String {
        let month = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown");
        format!("{} {}", month, self.year)
    }
}

impl fmt::Display for CalendarWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Year-major, month-minor enumeration of an inclusive year range.
/// Empty when `start_year > end_year`.
pub fn enumerate_windows(start_year: i32, end_year: i32) -> Vec<CalendarWindow> {
    (start_year..=end_year)
        .flat_map(|year| (1..=12).map(move |month| CalendarWindow { year, month }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_single_year_yields_twelve_windows() {
        let windows = enumerate_windows(2020, 2020);
        assert_eq!(windows.len(), 12);
        assert_eq!(windows[0].label(), "January 2020");
        assert_eq!(windows[11].label(), "December 2020");
    }

    #[test]
    fn test_windows_are_chronological() {
        let windows = enumerate_windows(2003, 2021);
        assert_eq!(windows.len(), 12 * 19);
        assert!(windows.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(windows[12], CalendarWindow { year: 2004, month: 1 });
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert!(enumerate_windows(2021, 2003).is_empty());
    }

    #[test]
    fn test_label_uses_full_month_name() {
        assert_eq!(CalendarWindow::new(2010, 3).unwrap().label(), "March 2010");
        assert_eq!(CalendarWindow::new(2010, 9).unwrap().label(), "September 2010");
        assert!(CalendarWindow::new(2010, 13).is_none());
        assert!(CalendarWindow::new(2010, 0).is_none());
    }

    #[test]
    fn test_contains_uses_utc_calendar() {
        let window = CalendarWindow::new(2015, 6).unwrap();
        let inside = Utc.with_ymd_and_hms(2015, 6, 30, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2015, 7, 1, 0, 0, 0).unwrap();
        let other_year = Utc.with_ymd_and_hms(2016, 6, 15, 0, 0, 0).unwrap();
        assert!(window.contains(&inside));
        assert!(!window.contains(&after));
        assert!(!window.contains(&other_year));
    }
}
