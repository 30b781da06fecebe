use crate::core::error::ReconError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grouping key of a trade leg: the value of its `month` / `contract_period` column.
///
/// The key is kept as the raw string so that tables coming from a loader can
/// carry either calendar months (`"2025-04"`) or coarser labels (`"Q2-25"`).
/// Ordering is lexicographic, which for `YYYY-MM` keys is chronological.
///
/// # Examples
///
/// ```
/// use power_recon::core::period::PeriodKey;
///
/// let april = PeriodKey::new("2025-04");
/// let may = PeriodKey::new("2025-05");
/// assert!(april < may);
/// assert!(april.as_month().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodKey(String);

impl PeriodKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the key as a calendar month, if it is one.
    pub fn as_month(&self) -> Option<Month> {
        Month::parse(&self.0).ok()
    }

    /// Interpret the key as a quarter label, if it is one.
    pub fn as_quarter(&self) -> Option<Quarter> {
        Quarter::parse(&self.0).ok()
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PeriodKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Month> for PeriodKey {
    fn from(month: Month) -> Self {
        Self(month.to_string())
    }
}

/// A validated calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, ReconError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|date| Self::from_date(&date))
            .ok_or_else(|| ReconError::InvalidPeriod(format!("{year:04}-{month:02}")))
    }

    pub(crate) const fn from_parts(year: i32, month: u32) -> Self {
        assert!(month >= 1 && month <= 12);
        Self { year, month }
    }

    /// Parse a strict `YYYY-MM` key.
    pub fn parse(s: &str) -> Result<Self, ReconError> {
        let s = s.trim();
        if s.len() != 7 || s.as_bytes()[4] != b'-' {
            return Err(ReconError::InvalidPeriod(s.to_string()));
        }
        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map(|date| Self::from_date(&date))
            .map_err(|_| ReconError::InvalidPeriod(s.to_string()))
    }

    fn from_date(date: &NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar month immediately after this one.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn quarter(&self) -> Quarter {
        Quarter::from_parts(self.year, ((self.month - 1) / 3 + 1) as u8)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A calendar quarter (`Q1`..`Q4`) of a given year.
///
/// Accepts the label forms seen in trade books: `Q2-25`, `Q2-2025`,
/// `Q2 2025`, `Q2/25` and `2025-Q2`.
///
/// # Examples
///
/// ```
/// use power_recon::core::period::Quarter;
///
/// let q = Quarter::parse("Q2-25").unwrap();
/// let months: Vec<String> = q.months().iter().map(|m| m.to_string()).collect();
/// assert_eq!(months, ["2025-04", "2025-05", "2025-06"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quarter {
    year: i32,
    quarter: u8,
}

impl Quarter {
    pub fn new(year: i32, quarter: u8) -> Result<Self, ReconError> {
        if !(1..=4).contains(&quarter) {
            return Err(ReconError::InvalidPeriod(format!("Q{quarter}-{year}")));
        }
        Ok(Self { year, quarter })
    }

    pub(crate) const fn from_parts(year: i32, quarter: u8) -> Self {
        assert!(quarter >= 1 && quarter <= 4);
        Self { year, quarter }
    }

    pub fn parse(label: &str) -> Result<Self, ReconError> {
        let invalid = || ReconError::InvalidPeriod(label.to_string());
        let upper = label.trim().to_ascii_uppercase();
        let parts: Vec<&str> = upper
            .split(|c: char| c == '-' || c == ' ' || c == '/' || c == '_')
            .filter(|p| !p.is_empty())
            .collect();
        let [a, b] = parts.as_slice() else {
            return Err(invalid());
        };
        let (q_part, year_part) = if a.starts_with('Q') { (a, b) } else { (b, a) };

        let quarter: u8 = q_part
            .strip_prefix('Q')
            .and_then(|q| q.parse().ok())
            .ok_or_else(invalid)?;
        let year: i32 = match year_part.len() {
            2 => 2000 + year_part.parse::<i32>().map_err(|_| invalid())?,
            4 => year_part.parse().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        };
        Self::new(year, quarter).map_err(|_| invalid())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    /// The three constituent months, in calendar order.
    pub fn months(&self) -> [Month; 3] {
        let first = Month {
            year: self.year,
            month: u32::from(self.quarter - 1) * 3 + 1,
        };
        let second = first.next();
        [first, second, second.next()]
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}-{:04}", self.quarter, self.year)
    }
}
