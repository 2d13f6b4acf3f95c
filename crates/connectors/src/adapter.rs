use crate::{
    error::AdapterError, file::csv::CsvReader, reader::TabularReader, settings::ReaderSettings,
};
use std::{fmt, path::Path, str::FromStr};
use tracing::debug;

/// File-backed reader kinds that can be built from a connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderKind {
    Csv,
    Tsv,
}

impl FromStr for ReaderKind {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ReaderKind::Csv),
            "tsv" | "tab" => Ok(ReaderKind::Tsv),
            other => Err(AdapterError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ReaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderKind::Csv => f.write_str("csv"),
            ReaderKind::Tsv => f.write_str("tsv"),
        }
    }
}

impl ReaderKind {
    /// Guesses the kind from the connection's file extension.
    pub fn infer(connection: &str) -> Result<Self, AdapterError> {
        Path::new(connection)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "csv" | "txt" => Some(ReaderKind::Csv),
                "tsv" | "tab" => Some(ReaderKind::Tsv),
                _ => None,
            })
            .ok_or_else(|| AdapterError::UnknownFormat(connection.to_string()))
    }

    /// Uses `format` when given, otherwise infers from `connection`.
    pub fn resolve(format: Option<&str>, connection: &str) -> Result<Self, AdapterError> {
        match format {
            Some(format) => format.parse(),
            None => Self::infer(connection),
        }
    }
}

/// Builds an unopened reader of the given kind.
pub fn open_reader(
    kind: ReaderKind,
    settings: ReaderSettings,
) -> Result<Box<dyn TabularReader + Send>, AdapterError> {
    debug!("Creating {} reader", kind);
    let settings = match kind {
        ReaderKind::Csv => settings,
        ReaderKind::Tsv => ReaderSettings {
            delimiter: '\t',
            ..settings
        },
    };
    Ok(Box::new(CsvReader::new(settings)?))
}
