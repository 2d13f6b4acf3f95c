use crate::{convert::Conversions, error::ReaderError};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};

pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d",
    "%d/%m/%Y",
];

/// Reader configuration. Every field has a default, so a settings file only
/// needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    pub delimiter: char,
    pub quote: char,
    pub has_headers: bool,
    /// Strip surrounding whitespace before handing out string cells.
    pub trim: bool,
    /// chrono strftime patterns tried in order by date accessors.
    pub date_formats: Vec<String>,
    /// IANA zone used for dates that carry no offset.
    pub timezone: String,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        ReaderSettings {
            delimiter: ',',
            quote: '"',
            has_headers: true,
            trim: false,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            timezone: "UTC".to_string(),
        }
    }
}

impl ReaderSettings {
    pub fn new(delimiter: char, has_headers: bool) -> Self {
        ReaderSettings {
            delimiter,
            has_headers,
            ..Default::default()
        }
    }

    pub fn with_date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ReaderError::from_open(&path.display().to_string(), e))?;
        let settings: ReaderSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ReaderError> {
        self.delimiter_byte()?;
        self.quote_byte()?;
        if self.delimiter == self.quote {
            return Err(ReaderError::InvalidSettings(
                "delimiter and quote must differ".into(),
            ));
        }
        self.tz()?;
        Ok(())
    }

    pub fn delimiter_byte(&self) -> Result<u8, ReaderError> {
        ascii_byte("delimiter", self.delimiter)
    }

    pub fn quote_byte(&self) -> Result<u8, ReaderError> {
        ascii_byte("quote", self.quote)
    }

    pub fn tz(&self) -> Result<Tz, ReaderError> {
        Tz::from_str(&self.timezone).map_err(|_| {
            ReaderError::InvalidSettings(format!("unknown timezone: {}", self.timezone))
        })
    }

    pub fn conversions(&self) -> Result<Conversions, ReaderError> {
        Ok(Conversions::new(
            self.trim,
            self.date_formats.clone(),
            self.tz()?,
        ))
    }
}

fn ascii_byte(what: &str, c: char) -> Result<u8, ReaderError> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(ReaderError::InvalidSettings(format!(
            "{what} must be a single ASCII character, got '{c}'"
        )))
    }
}
