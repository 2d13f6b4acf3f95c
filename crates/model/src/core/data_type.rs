use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The semantic type a caller asks a reader to convert a cell into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Long,
    Int,
    /// Milliseconds since the Unix epoch.
    Date,
    String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown data type: {0}")]
pub struct UnknownDataType(pub String);

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Long => "long",
            DataType::Int => "int",
            DataType::Date => "date",
            DataType::String => "string",
        }
    }
}

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "i64" | "bigint" => Ok(DataType::Long),
            "int" | "i32" | "integer" => Ok(DataType::Int),
            "date" | "timestamp" => Ok(DataType::Date),
            "string" | "str" | "text" | "varchar" => Ok(DataType::String),
            other => Err(UnknownDataType(other.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("LONG".parse::<DataType>().unwrap(), DataType::Long);
        assert_eq!("integer".parse::<DataType>().unwrap(), DataType::Int);
        assert_eq!(" timestamp ".parse::<DataType>().unwrap(), DataType::Date);
        assert_eq!("text".parse::<DataType>().unwrap(), DataType::String);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "decimal".parse::<DataType>().unwrap_err();
        assert_eq!(err, UnknownDataType("decimal".to_string()));
    }
}
