use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

/// Owned snapshot of one row, detached from the reader that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowData {
    /// Label of the source the row came from.
    pub source: String,
    /// One-based row number within the source.
    pub row: usize,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(source: &str, row: usize, field_values: Vec<FieldValue>) -> Self {
        RowData {
            source: source.to_string(),
            row,
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn null_count(&self) -> usize {
        self.field_values
            .iter()
            .filter(|f| f.value.is_null())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_type::DataType;

    fn sample() -> RowData {
        RowData::new(
            "people",
            1,
            vec![
                FieldValue {
                    name: "name".to_string(),
                    value: Value::String("Alice".to_string()),
                    data_type: DataType::String,
                },
                FieldValue {
                    name: "age".to_string(),
                    value: Value::Null,
                    data_type: DataType::Int,
                },
            ],
        )
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let row = sample();
        assert_eq!(row.get_value("NAME"), Value::String("Alice".into()));
        assert_eq!(row.get_value("missing"), Value::Null);
        assert_eq!(row.null_count(), 1);
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["source"], "people");
        assert_eq!(json["row"], 1);
        assert_eq!(json["field_values"][0]["value"]["String"], "Alice");
    }
}
