use crate::error::CliError;
use serde::Serialize;
use std::fs;

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(json)
}

pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &str) -> Result<(), CliError> {
    let json = to_json(value)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = to_json(value)?;
    println!("{json}");
    Ok(())
}

/// Writes to `path` when given, stdout otherwise.
pub fn emit<T: Serialize + ?Sized>(value: &T, path: Option<&str>) -> Result<(), CliError> {
    match path {
        Some(path) => write_json(value, path),
        None => print_json(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{
        core::{
            data_type::DataType,
            value::{FieldValue, Value},
        },
        records::row::RowData,
    };

    #[test]
    fn test_write_rows_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let rows = vec![RowData::new(
            "people",
            1,
            vec![FieldValue {
                name: "age".into(),
                value: Value::Int(30),
                data_type: DataType::Int,
            }],
        )];

        emit(&rows, Some(path.to_str().unwrap())).unwrap();

        let written: Vec<RowData> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, rows);
    }
}
