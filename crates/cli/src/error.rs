use connectors::error::{AdapterError, ImportError, ReaderError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Invalid reader settings: {0}")]
    Settings(ReaderError),

    #[error("Failed to create reader: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Failed to read source: {0}")]
    Reader(#[from] ReaderError),

    #[error("Failed to read source: {0}")]
    Import(#[from] ImportError),
}
