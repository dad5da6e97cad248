use crate::scalar::parse_digits;
use std::fmt::{self, Display};
use std::str::FromStr;

/// A date error.
#[derive(Debug, PartialEq, Eq)]
pub struct DateError;

impl std::error::Error for DateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unable to decode date")
    }
}

/// A game date as written in CK2 saves: `year.month.day`.
///
/// Components are taken as written. There is no check that the month or day
/// exist on any calendar, so `12.3.45` is a date.
///
/// ```
/// use ck2json::Date;
///
/// let date = Date::parse("1066.9.15").unwrap();
/// assert_eq!((date.year(), date.month(), date.day()), (1066, 9, 15));
/// assert_eq!(date.to_string(), "1066.9.15");
/// assert_eq!(Date::parse("0769.01.01").unwrap().to_string(), "769.1.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: i32,
    month: u32,
    day: u32,
}

impl Date {
    /// Creates a date from its components
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        Date { year, month, day }
    }

    /// Parses `D+.D+.D+`. Returns `None` on any other shape or if a component
    /// does not fit its type.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('.');
        let year = parts.next().and_then(component)?;
        let month = parts.next().and_then(component)?;
        let day = parts.next().and_then(component)?;
        if parts.next().is_some() {
            return None;
        }

        Some(Date {
            year: i32::try_from(year).ok()?,
            month: u32::try_from(month).ok()?,
            day: u32::try_from(day).ok()?,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

fn component(s: &str) -> Option<u64> {
    parse_digits(s.as_bytes())
}

impl Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.year, self.month, self.day)
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s).ok_or(DateError)
    }
}
