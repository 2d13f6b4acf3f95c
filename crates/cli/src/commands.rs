use crate::error::CliError;
use clap::{Args, Subcommand};
use connectors::settings::ReaderSettings;
use model::core::data_type::DataType;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum Commands {
    /// Print rows of a source as JSON
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(
            long = "column",
            help = "Column to read as name[:long|int|date|string]; repeatable, defaults to all columns as strings"
        )]
        columns: Vec<ColumnSpec>,

        #[arg(long, value_parser = clap::value_parser!(u64).range(1..), help = "Stop after this many rows")]
        limit: Option<u64>,

        #[arg(
            long,
            help = "If specified, writes the JSON rows to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Print the number of rows in a source
    Count {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the column names of a source
    Columns {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(short, long, help = "Connection string (file path)")]
    pub conn_str: String,

    /// Data format: "csv" or "tsv"; inferred from the file extension if omitted
    #[arg(short, long)]
    pub format: Option<String>,

    #[arg(long, help = "Label used in logs; defaults to the connection string")]
    pub hint: Option<String>,

    #[arg(long, env = "TABREAD_SETTINGS", help = "JSON file with reader settings")]
    pub settings: Option<String>,

    #[arg(long, help = "Field delimiter, overrides the settings file")]
    pub delimiter: Option<char>,

    #[arg(long, help = "The source has no header row")]
    pub no_headers: bool,

    #[arg(long, help = "IANA timezone for dates without an offset")]
    pub timezone: Option<String>,

    #[arg(long = "date-format", help = "strftime pattern for dates; repeatable")]
    pub date_formats: Vec<String>,
}

impl SourceArgs {
    pub fn hint(&self) -> &str {
        self.hint.as_deref().unwrap_or(&self.conn_str)
    }

    /// Settings file (if any) with command-line overrides applied on top.
    pub fn reader_settings(&self) -> Result<ReaderSettings, CliError> {
        let mut settings = match &self.settings {
            Some(path) => ReaderSettings::from_json_file(path).map_err(CliError::Settings)?,
            None => ReaderSettings::default(),
        };

        if let Some(delimiter) = self.delimiter {
            settings.delimiter = delimiter;
        }
        if self.no_headers {
            settings.has_headers = false;
        }
        if let Some(timezone) = &self.timezone {
            settings.timezone = timezone.clone();
        }
        if !self.date_formats.is_empty() {
            settings.date_formats = self.date_formats.clone();
        }

        settings.validate().map_err(CliError::Settings)?;
        Ok(settings)
    }
}

/// A `--column` argument: a column name with the type to read it as.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: DataType,
}

impl FromStr for ColumnSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, data_type) = match s.rsplit_once(':') {
            Some((name, ty)) => (name, ty.parse::<DataType>().map_err(|e| e.to_string())?),
            None => (s, DataType::String),
        };
        if name.is_empty() {
            return Err(format!("Missing column name in '{s}'"));
        }
        Ok(ColumnSpec {
            name: name.to_string(),
            data_type,
        })
    }
}
