use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::entry::WorkEntry;

/// English month names, indexed by `month - 1`.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar month. Used both as the reporting target ("the month
/// immediately preceding the dispatch run") and as the history grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportMonth {
    year: i32,
    month: u32,
}

impl ReportMonth {
    /// `month` is 1-based (1 = January).
    pub fn new(year: i32, month: u32) -> Self {
        assert!((1..=12).contains(&month), "month out of range: {month}");
        Self { year, month }
    }

    /// The calendar month a date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The calendar month immediately preceding `today`.
    pub fn preceding(today: NaiveDate) -> Self {
        if today.month() == 1 {
            Self::new(today.year() - 1, 12)
        } else {
            Self::new(today.year(), today.month() - 1)
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month validated in new")
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|first_of_next| first_of_next.pred_opt())
            .expect("month validated in new")
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }
}

/// Formats as `"May 2024"`, the form used in report titles and subjects.
impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year)
    }
}

/// A month header plus the entries listed under it, both in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    pub month: ReportMonth,
    pub entries: Vec<WorkEntry>,
}

/// Group entries by calendar month, preserving the order in which months
/// first appear and the order of entries within each month. With the store
/// returning most-recent-date first, the most recent month comes out on top
/// and no re-sorting happens within a group.
pub fn group_by_month(entries: &[WorkEntry]) -> Vec<MonthGroup> {
    let mut groups: Vec<MonthGroup> = Vec::new();
    for entry in entries {
        let month = ReportMonth::of(entry.work_date);
        match groups.iter_mut().find(|group| group.month == month) {
            Some(group) => group.entries.push(entry.clone()),
            None => groups.push(MonthGroup {
                month,
                entries: vec![entry.clone()],
            }),
        }
    }
    groups
}
