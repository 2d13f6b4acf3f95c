//! Cell text to typed value conversion.
//!
//! Every conversion reports why it produced nothing through [`Absent`];
//! none of them can fail the read session.

use crate::error::Absent;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use model::core::data_type::DataType;

#[derive(Debug, Clone)]
pub struct Conversions {
    trim: bool,
    date_formats: Vec<String>,
    timezone: Tz,
}

impl Default for Conversions {
    fn default() -> Self {
        Conversions::new(
            false,
            crate::settings::DEFAULT_DATE_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            Tz::UTC,
        )
    }
}

impl Conversions {
    pub fn new(trim: bool, date_formats: Vec<String>, timezone: Tz) -> Self {
        Conversions {
            trim,
            date_formats,
            timezone,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// String cells. Empty (after optional trimming) counts as absent.
    pub fn text<'a>(&self, cell: &'a str) -> Result<&'a str, Absent> {
        let text = if self.trim { cell.trim() } else { cell };
        if text.is_empty() {
            Err(Absent::Empty)
        } else {
            Ok(text)
        }
    }

    pub fn long(&self, cell: &str) -> Result<i64, Absent> {
        let text = non_empty(cell)?;
        text.parse::<i64>().map_err(|_| invalid(text, DataType::Long))
    }

    pub fn int(&self, cell: &str) -> Result<i32, Absent> {
        let text = non_empty(cell)?;
        text.parse::<i32>().map_err(|_| invalid(text, DataType::Int))
    }

    /// Milliseconds since the Unix epoch. Configured patterns are tried as
    /// datetimes first, then as dates at midnight, both in the configured
    /// zone; RFC 3339 text with its own offset is accepted last.
    pub fn date(&self, cell: &str) -> Result<i64, Absent> {
        let text = non_empty(cell)?;

        for format in &self.date_formats {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format)
                && let Some(ms) = self.local_millis(naive)
            {
                return Ok(ms);
            }
            if let Ok(date) = NaiveDate::parse_from_str(text, format)
                && let Some(ms) = self.local_millis(date.and_time(NaiveTime::MIN))
            {
                return Ok(ms);
            }
        }

        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.timestamp_millis())
            .map_err(|_| invalid(text, DataType::Date))
    }

    // Ambiguous local times (DST fold) resolve to the earlier instant;
    // nonexistent ones (DST gap) are not dates.
    fn local_millis(&self, naive: NaiveDateTime) -> Option<i64> {
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp_millis())
    }
}

fn non_empty(cell: &str) -> Result<&str, Absent> {
    let text = cell.trim();
    if text.is_empty() {
        Err(Absent::Empty)
    } else {
        Ok(text)
    }
}

fn invalid(text: &str, expected: DataType) -> Absent {
    Absent::Invalid {
        value: text.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        let conv = Conversions::default();
        assert_eq!(conv.long(" 42 "), Ok(42));
        assert_eq!(conv.long("-9000000000"), Ok(-9_000_000_000));
        assert_eq!(conv.int("+7"), Ok(7));
        assert_eq!(
            conv.int("9000000000"),
            Err(Absent::Invalid {
                value: "9000000000".into(),
                expected: DataType::Int
            })
        );
        assert!(matches!(conv.long("3.5"), Err(Absent::Invalid { .. })));
        assert_eq!(conv.long("   "), Err(Absent::Empty));
    }

    #[test]
    fn test_text_trim_policy() {
        let raw = Conversions::default();
        assert_eq!(raw.text("  Bob "), Ok("  Bob "));
        assert_eq!(raw.text(""), Err(Absent::Empty));

        let trimmed = Conversions::new(true, vec![], Tz::UTC);
        assert_eq!(trimmed.text("  Bob "), Ok("Bob"));
        assert_eq!(trimmed.text("   "), Err(Absent::Empty));
    }

    #[test]
    fn test_dates_in_utc() {
        let conv = Conversions::default();
        assert_eq!(conv.date("1970-01-02"), Ok(86_400_000));
        assert_eq!(conv.date("1970-01-01 00:00:01"), Ok(1_000));
        assert_eq!(conv.date("1970-01-01T00:00:00.250"), Ok(250));
        assert_eq!(conv.date("02/01/1970"), Ok(86_400_000));
        assert_eq!(conv.date("1970-01-01T01:00:00+01:00"), Ok(0));
    }

    #[test]
    fn test_dates_in_configured_zone() {
        let conv = Conversions::new(false, vec!["%Y-%m-%d".into()], Tz::Europe__Prague);
        // Prague is UTC+1 in winter.
        assert_eq!(conv.date("1970-01-02"), Ok(86_400_000 - 3_600_000));
    }

    #[test]
    fn test_invalid_dates() {
        let conv = Conversions::default();
        assert!(matches!(conv.date("x"), Err(Absent::Invalid { .. })));
        assert!(matches!(conv.date("1700000000"), Err(Absent::Invalid { .. })));
        assert!(matches!(conv.date("2024-13-40"), Err(Absent::Invalid { .. })));
        assert_eq!(conv.date(""), Err(Absent::Empty));
    }
}
