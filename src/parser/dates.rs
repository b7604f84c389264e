use chrono::{Month, NaiveDate};

use crate::error::DateParseError;

/// Parse a "Mon DD" posting date. The listings omit the year, so the caller
/// supplies it.
pub fn parse_posting_date(text: &str, year: i32) -> Result<NaiveDate, DateParseError> {
    let text = text.trim();
    let (month_name, day) = text
        .split_once(char::is_whitespace)
        .ok_or_else(|| DateParseError::MissingDay(text.to_string()))?;
    let day = day.trim();

    let month: Month = month_name
        .parse()
        .map_err(|_| DateParseError::UnknownMonth(month_name.to_string()))?;
    let day: u32 = day
        .parse()
        .map_err(|_| DateParseError::BadDay(day.to_string()))?;

    NaiveDate::from_ymd_opt(year, month.number_from_month(), day).ok_or(
        DateParseError::OutOfRange {
            month: month_name.to_string(),
            day,
            year,
        },
    )
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn short_month_name() {
        assert_eq!(parse_posting_date("Mar 5", 2025), Ok(ymd(2025, 3, 5)));
        assert_eq!(parse_posting_date("Mar 05", 2025), Ok(ymd(2025, 3, 5)));
    }

    #[test]
    fn long_and_lowercase_names() {
        assert_eq!(parse_posting_date("September 30", 2024), Ok(ymd(2024, 9, 30)));
        assert_eq!(parse_posting_date("jan 2", 2026), Ok(ymd(2026, 1, 2)));
    }

    #[test]
    fn surrounding_whitespace() {
        assert_eq!(parse_posting_date("  Dec   31 ", 2025), Ok(ymd(2025, 12, 31)));
    }

    #[test]
    fn leap_day_depends_on_year() {
        assert_eq!(parse_posting_date("Feb 29", 2024), Ok(ymd(2024, 2, 29)));
        assert!(matches!(
            parse_posting_date("Feb 29", 2025),
            Err(DateParseError::OutOfRange { day: 29, year: 2025, .. })
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            parse_posting_date("Mar", 2025),
            Err(DateParseError::MissingDay("Mar".into()))
        );
        assert_eq!(
            parse_posting_date("Foo 3", 2025),
            Err(DateParseError::UnknownMonth("Foo".into()))
        );
        assert_eq!(
            parse_posting_date("Mar x", 2025),
            Err(DateParseError::BadDay("x".into()))
        );
        assert!(parse_posting_date("Apr 31", 2025).is_err());
        assert!(parse_posting_date("", 2025).is_err());
    }
}
