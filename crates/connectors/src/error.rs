use model::core::data_type::DataType;
use thiserror::Error;

/// Failures that end a reader session: the source could not be opened,
/// the stream broke mid-read, or the lifecycle was driven out of order.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid source format: {0}")]
    InvalidFormat(String),

    /// The connection string names nothing this reader knows about.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// `read` was called while another source is still bound.
    #[error("Reader is already open on '{0}'; close it first")]
    AlreadyOpen(String),

    #[error("Reader is not open")]
    NotOpen,

    #[error("Invalid reader settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to parse settings file: {0}")]
    SettingsFile(#[from] serde_json::Error),
}

impl ReaderError {
    /// Maps an open-time I/O failure onto the taxonomy, keeping the path.
    pub fn from_open(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ReaderError::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => ReaderError::PermissionDenied(path.to_string()),
            _ => ReaderError::Io(err),
        }
    }
}

/// Why a typed accessor produced no value. Never fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Absent {
    #[error("no current record")]
    NoCurrentRecord,

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("empty cell")]
    Empty,

    #[error("'{value}' is not a valid {expected}")]
    Invalid { value: String, expected: DataType },
}

/// Errors from picking or building a reader.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// No format given and none could be inferred from the connection.
    #[error("Cannot infer reader format for: {0}")]
    UnknownFormat(String),

    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),
}

/// Errors from driving a full read session.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    #[error("Row {row} rejected: {message}")]
    Visit { row: usize, message: String },
}
