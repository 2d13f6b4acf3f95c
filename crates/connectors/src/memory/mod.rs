use crate::{
    columns::ColumnIndex,
    convert::Conversions,
    cursor::{ReaderState, RowCursor},
    error::{Absent, ReaderError},
    reader::TabularReader,
    settings::ReaderSettings,
};
use csv::{Terminator, WriterBuilder};
use std::collections::HashMap;
use tracing::{debug, info};

/// A table held in memory: a header row plus string rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl MemoryTable {
    pub fn new<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        MemoryTable {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }
}

/// Reads tables registered by name. The connection string is the table name.
pub struct MemoryReader {
    tables: HashMap<String, MemoryTable>,
    conversions: Conversions,
    delimiter: u8,
    quote: u8,

    /// Table taken out of `tables` while it is open.
    active: Option<(String, MemoryTable)>,
    columns: ColumnIndex,
    current: Option<usize>,
    raw: String,

    cursor: RowCursor,
}

impl MemoryReader {
    pub fn new(settings: &ReaderSettings) -> Result<Self, ReaderError> {
        settings.validate()?;
        Ok(MemoryReader {
            tables: HashMap::new(),
            conversions: settings.conversions()?,
            delimiter: settings.delimiter_byte()?,
            quote: settings.quote_byte()?,
            active: None,
            columns: ColumnIndex::default(),
            current: None,
            raw: String::new(),
            cursor: RowCursor::default(),
        })
    }

    pub fn with_table(mut self, name: &str, table: MemoryTable) -> Self {
        self.add_table(name, table);
        self
    }

    pub fn add_table(&mut self, name: &str, table: MemoryTable) {
        self.tables.insert(name.to_string(), table);
    }

    fn current_row(&self) -> Option<&[String]> {
        let (_, table) = self.active.as_ref()?;
        self.current
            .and_then(|i| table.rows.get(i))
            .map(Vec::as_slice)
    }

    fn release(&mut self) {
        if let Some((name, table)) = self.active.take() {
            self.tables.insert(name, table);
        }
        self.current = None;
        self.raw.clear();
    }
}

impl TabularReader for MemoryReader {
    fn initialize(&mut self) {}

    fn read(&mut self, connection: &str, hint: &str) -> Result<(), ReaderError> {
        self.cursor.check_can_open()?;

        let table = self
            .tables
            .remove(connection)
            .ok_or_else(|| ReaderError::UnknownSource(connection.to_string()))?;

        self.columns = ColumnIndex::named(&table.headers, hint);
        self.active = Some((connection.to_string(), table));
        self.current = None;
        self.raw.clear();
        self.cursor.open(hint);

        info!("Opened in-memory source '{}' ({})", hint, connection);
        Ok(())
    }

    fn read_record(&mut self) -> Result<bool, ReaderError> {
        if !self.cursor.can_advance()? {
            return Ok(false);
        }
        let (_, table) = self.active.as_ref().ok_or(ReaderError::NotOpen)?;

        let next = self.current.map_or(0, |i| i + 1);
        match table.rows.get(next) {
            Some(row) => {
                self.raw = encode_row(row, self.delimiter, self.quote)?;
                self.current = Some(next);
                self.cursor.advance();
                Ok(true)
            }
            None => {
                self.current = None;
                self.raw.clear();
                self.cursor.exhaust();
                debug!(
                    "In-memory source '{}' exhausted after {} rows",
                    self.cursor.hint().unwrap_or_default(),
                    self.cursor.row()
                );
                Ok(false)
            }
        }
    }

    fn close(&mut self) {
        self.release();
        if self.cursor.close() {
            info!(
                "Closed in-memory source '{}'",
                self.cursor.hint().unwrap_or_default()
            );
        }
    }

    fn state(&self) -> ReaderState {
        self.cursor.state()
    }

    fn hint(&self) -> Option<&str> {
        self.cursor.hint()
    }

    fn row(&self) -> usize {
        self.cursor.row()
    }

    fn raw_record(&self) -> Option<&str> {
        self.current_row().map(|_| self.raw.as_str())
    }

    fn columns(&self) -> &[String] {
        self.columns.names()
    }

    fn cell(&self, column: &str) -> Result<&str, Absent> {
        let row = self.current_row().ok_or(Absent::NoCurrentRecord)?;
        let position = self
            .columns
            .position(column)
            .ok_or_else(|| Absent::UnknownColumn(column.to_string()))?;
        Ok(row.get(position).map(String::as_str).unwrap_or(""))
    }

    fn conversions(&self) -> &Conversions {
        &self.conversions
    }
}

/// In-memory rows have no source text; their raw form is the row written
/// out with the reader's delimiter and quote.
fn encode_row(row: &[String], delimiter: u8, quote: u8) -> Result<String, ReaderError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote(quote)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(row)?;

    let mut bytes = writer
        .into_inner()
        .map_err(|e| ReaderError::Io(e.into_error()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::{data_type::DataType, value::Value};

    fn people() -> MemoryReader {
        MemoryReader::new(&ReaderSettings::default())
            .unwrap()
            .with_table(
                "people",
                MemoryTable::new(
                    ["name", "age", "joined"],
                    [
                        vec!["Alice", "30", "2020-02-29"],
                        vec!["Bob", "x", ""],
                    ],
                ),
            )
    }

    #[test]
    fn test_alice_and_bob() {
        let mut reader = people();
        reader.initialize();
        reader.read("people", "people table").unwrap();

        assert!(reader.read_record().unwrap());
        assert_eq!(reader.read_string("name"), Some("Alice"));
        assert_eq!(reader.read_int("age"), Some(30));
        assert_eq!(reader.read_date("joined"), Some(1_582_934_400_000));
        assert_eq!(reader.raw_record(), Some("Alice,30,2020-02-29"));

        assert!(reader.read_record().unwrap());
        assert_eq!(reader.read_string("name"), Some("Bob"));
        assert_eq!(reader.read_int("age"), None);
        assert_eq!(reader.try_read_date("joined"), Err(Absent::Empty));
        assert_eq!(reader.try_read_string("joined"), Err(Absent::Empty));

        assert!(!reader.read_record().unwrap());
        assert_eq!(reader.row(), 2);
        reader.close();
    }

    #[test]
    fn test_unknown_source() {
        let mut reader = people();
        let err = reader.read("pets", "pets").unwrap_err();
        assert!(matches!(err, ReaderError::UnknownSource(name) if name == "pets"));
        assert_eq!(reader.state(), ReaderState::Unopened);
    }

    #[test]
    fn test_close_returns_table_for_reopen() {
        let mut reader = people();
        reader.close();

        reader.read("people", "first").unwrap();
        assert!(reader.read_record().unwrap());
        reader.close();
        reader.close();

        reader.read("people", "second").unwrap();
        assert!(reader.read_record().unwrap());
        assert_eq!(reader.row(), 1);
        assert_eq!(reader.read_string("name"), Some("Alice"));
    }

    #[test]
    fn test_snapshot() {
        let mut reader = people();
        reader.read("people", "people table").unwrap();
        assert!(reader.read_record().unwrap());
        assert!(reader.read_record().unwrap());

        let row = reader.snapshot(&[
            ("name".to_string(), DataType::String),
            ("age".to_string(), DataType::Int),
            ("missing".to_string(), DataType::Long),
        ]);
        assert_eq!(row.source, "people table");
        assert_eq!(row.row, 2);
        assert_eq!(row.get_value("name"), Value::String("Bob".into()));
        assert_eq!(row.get_value("age"), Value::Null);
        assert_eq!(row.null_count(), 2);
    }

    #[test]
    fn test_raw_record_quotes_ambiguous_cells() {
        let mut reader = MemoryReader::new(&ReaderSettings::default())
            .unwrap()
            .with_table(
                "names",
                MemoryTable::new(["name", "note"], [vec!["Doe, Jane", "said \"hi\""]]),
            );
        reader.read("names", "names").unwrap();
        assert!(reader.read_record().unwrap());
        assert_eq!(reader.read_string("name"), Some("Doe, Jane"));
        assert_eq!(
            reader.raw_record(),
            Some("\"Doe, Jane\",\"said \"\"hi\"\"\"")
        );
    }

    #[test]
    fn test_send_but_owned() {
        fn assert_send<T: Send>() {}
        assert_send::<MemoryReader>();
    }
}
