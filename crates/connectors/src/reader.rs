use crate::{
    convert::Conversions,
    cursor::ReaderState,
    error::{Absent, ReaderError},
};
use model::{
    core::{
        data_type::DataType,
        value::{FieldValue, Value},
    },
    records::row::RowData,
};

/// Sequential, named-column access to one tabular source.
///
/// A reader is driven as `initialize`, `read`, then `read_record` in a loop
/// interleaved with column reads, then `close`. It is owned by one caller at
/// a time: lifecycle methods take `&mut self`, and implementations are not
/// `Sync`. Borrowed results (`read_string`, `raw_record`) cannot outlive the
/// next advance.
///
/// Typed accessors never fail the session. An empty cell, an unknown column,
/// text that does not convert, or a call with no current record all come back
/// as an absent value; the `try_*` variants say which of these it was.
pub trait TabularReader {
    /// Prepares reusable state. Safe to call more than once; `read` calls it
    /// when the caller did not.
    fn initialize(&mut self);

    /// Opens the source named by `connection`. `hint` labels the source in
    /// logs and errors and is never used to resolve it.
    fn read(&mut self, connection: &str, hint: &str) -> Result<(), ReaderError>;

    /// Advances to the next row. `Ok(false)` once the source is exhausted,
    /// after which there is no current record.
    fn read_record(&mut self) -> Result<bool, ReaderError>;

    /// Releases everything acquired by `read`. Never fails and may be called
    /// at any point, any number of times.
    fn close(&mut self);

    fn state(&self) -> ReaderState;

    /// Label passed to the last `read`.
    fn hint(&self) -> Option<&str>;

    /// One-based index of the current row; 0 before the first advance.
    fn row(&self) -> usize;

    /// The current row as it appeared in the source.
    fn raw_record(&self) -> Option<&str>;

    /// Column names of the open source, in source order.
    fn columns(&self) -> &[String];

    /// Unconverted text of the named cell in the current row. A row shorter
    /// than the header yields `""` for the missing cells.
    fn cell(&self, column: &str) -> Result<&str, Absent>;

    fn conversions(&self) -> &Conversions;

    fn try_read_long(&self, column: &str) -> Result<i64, Absent> {
        self.conversions().long(self.cell(column)?)
    }

    fn try_read_int(&self, column: &str) -> Result<i32, Absent> {
        self.conversions().int(self.cell(column)?)
    }

    fn try_read_date(&self, column: &str) -> Result<i64, Absent> {
        self.conversions().date(self.cell(column)?)
    }

    fn try_read_string(&self, column: &str) -> Result<&str, Absent> {
        self.conversions().text(self.cell(column)?)
    }

    fn read_long(&self, column: &str) -> Option<i64> {
        self.try_read_long(column).ok()
    }

    fn read_int(&self, column: &str) -> Option<i32> {
        self.try_read_int(column).ok()
    }

    /// Milliseconds since the Unix epoch. Accepted formats come from the
    /// reader's settings.
    fn read_date(&self, column: &str) -> Option<i64> {
        self.try_read_date(column).ok()
    }

    fn read_string(&self, column: &str) -> Option<&str> {
        self.try_read_string(column).ok()
    }

    fn read_value(&self, column: &str, data_type: DataType) -> Value {
        match data_type {
            DataType::Long => self.read_long(column).into(),
            DataType::Int => self.read_int(column).into(),
            DataType::Date => self.read_date(column).map(Value::Date).unwrap_or(Value::Null),
            DataType::String => self.read_string(column).into(),
        }
    }

    /// Copies the requested columns of the current row out of the reader.
    fn snapshot(&self, columns: &[(String, DataType)]) -> RowData {
        let field_values = columns
            .iter()
            .map(|(name, data_type)| FieldValue {
                name: name.clone(),
                value: self.read_value(name, *data_type),
                data_type: *data_type,
            })
            .collect();

        RowData::new(self.hint().unwrap_or_default(), self.row(), field_values)
    }
}
