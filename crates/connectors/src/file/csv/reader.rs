use crate::{
    columns::ColumnIndex,
    convert::Conversions,
    cursor::{ReaderState, RowCursor},
    error::{Absent, ReaderError},
    reader::TabularReader,
    settings::ReaderSettings,
};
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use std::{
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
};
use tracing::{debug, info};

/// Reads a delimited text file. The connection string is the file path.
pub struct CsvReader {
    settings: ReaderSettings,
    conversions: Conversions,
    delimiter: u8,
    quote: u8,

    inner: Option<csv::Reader<File>>,
    spans: Option<RawSpans>,
    columns: ColumnIndex,

    /// Reused across rows; only meaningful while `has_current` is set.
    bytes: ByteRecord,
    record: StringRecord,
    raw: String,
    has_current: bool,

    cursor: RowCursor,
    initialized: bool,
}

/// Second handle on the source file, used to copy out the exact bytes of
/// each record. Records are visited in file order, so reads mostly continue
/// where the previous one stopped.
struct RawSpans {
    file: BufReader<File>,
    offset: u64,
    buf: Vec<u8>,
}

impl RawSpans {
    fn new(file: File) -> Self {
        RawSpans {
            file: BufReader::new(file),
            offset: 0,
            buf: Vec::new(),
        }
    }

    /// Bytes in `start..end`, without the surrounding line terminators.
    fn read(&mut self, start: u64, end: u64) -> io::Result<&[u8]> {
        if start < self.offset {
            self.file.seek(SeekFrom::Start(start))?;
        } else if start > self.offset {
            io::copy(&mut (&mut self.file).take(start - self.offset), &mut io::sink())?;
        }

        let len = usize::try_from(end.saturating_sub(start))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.buf.resize(len, 0);
        self.file.read_exact(&mut self.buf)?;
        self.offset = end;

        let is_eol = |b: &u8| *b == b'\r' || *b == b'\n';
        let first = self.buf.iter().position(|b| !is_eol(b)).unwrap_or(len);
        let last = self.buf.iter().rposition(|b| !is_eol(b)).map_or(first, |i| i + 1);
        Ok(&self.buf[first..last])
    }
}

impl CsvReader {
    pub fn new(settings: ReaderSettings) -> Result<Self, ReaderError> {
        settings.validate()?;
        let conversions = settings.conversions()?;
        let delimiter = settings.delimiter_byte()?;
        let quote = settings.quote_byte()?;

        Ok(CsvReader {
            settings,
            conversions,
            delimiter,
            quote,
            inner: None,
            spans: None,
            columns: ColumnIndex::default(),
            bytes: ByteRecord::new(),
            record: StringRecord::new(),
            raw: String::new(),
            has_current: false,
            cursor: RowCursor::default(),
            initialized: false,
        })
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    fn builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(self.settings.has_headers)
            .flexible(true);
        builder
    }

    /// Decodes the byte record into `record`. Cells that are not UTF-8 are
    /// replaced lossily so the rest of the row stays readable.
    fn decode_current(&mut self) {
        self.record.clear();
        let mut lossy = 0;
        for field in self.bytes.iter() {
            match std::str::from_utf8(field) {
                Ok(text) => self.record.push_field(text),
                Err(_) => {
                    lossy += 1;
                    self.record.push_field(&String::from_utf8_lossy(field));
                }
            }
        }
        if lossy > 0 {
            debug!(
                "Row {} of '{}' has {} cells that are not valid UTF-8",
                self.cursor.row(),
                self.cursor.hint().unwrap_or_default(),
                lossy
            );
        }
    }

    fn clear_current(&mut self) {
        self.has_current = false;
        self.bytes.clear();
        self.record.clear();
        self.raw.clear();
    }
}

impl TabularReader for CsvReader {
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.bytes = ByteRecord::with_capacity(1024, 16);
        self.record = StringRecord::with_capacity(1024, 16);
        self.raw = String::with_capacity(1024);
        self.initialized = true;
    }

    fn read(&mut self, connection: &str, hint: &str) -> Result<(), ReaderError> {
        self.cursor.check_can_open()?;
        if !self.initialized {
            debug!("Reader for '{}' was not initialized; initializing", hint);
            self.initialize();
        }

        let file = File::open(connection).map_err(|e| ReaderError::from_open(connection, e))?;
        let spans = RawSpans::new(file.try_clone()?);
        let mut inner = self.builder().from_reader(file);

        self.columns = if self.settings.has_headers {
            let headers = inner.byte_headers()?;
            if headers.is_empty() {
                return Err(ReaderError::InvalidFormat(format!(
                    "{connection}: missing header row"
                )));
            }
            ColumnIndex::named(headers.iter().map(String::from_utf8_lossy), hint)
        } else {
            ColumnIndex::positional()
        };

        self.inner = Some(inner);
        self.spans = Some(spans);
        self.clear_current();
        self.cursor.open(hint);

        info!(
            "Opened CSV source '{}' ({}) with {} columns",
            hint,
            connection,
            self.columns.names().len()
        );
        Ok(())
    }

    fn read_record(&mut self) -> Result<bool, ReaderError> {
        if !self.cursor.can_advance()? {
            return Ok(false);
        }
        let inner = self.inner.as_mut().ok_or(ReaderError::NotOpen)?;
        let spans = self.spans.as_mut().ok_or(ReaderError::NotOpen)?;

        self.has_current = false;
        let start = inner.position().byte();
        if inner.read_byte_record(&mut self.bytes)? {
            let end = inner.position().byte();
            self.raw.clear();
            self.raw.push_str(&String::from_utf8_lossy(spans.read(start, end)?));

            self.cursor.advance();
            self.columns.ensure_width(self.bytes.len());
            self.decode_current();
            self.has_current = true;
            Ok(true)
        } else {
            self.clear_current();
            self.cursor.exhaust();
            debug!(
                "CSV source '{}' exhausted after {} rows",
                self.cursor.hint().unwrap_or_default(),
                self.cursor.row()
            );
            Ok(false)
        }
    }

    fn close(&mut self) {
        // Dropping both handles closes the file.
        self.inner = None;
        self.spans = None;
        self.clear_current();
        if self.cursor.close() {
            info!(
                "Closed CSV source '{}' after {} rows",
                self.cursor.hint().unwrap_or_default(),
                self.cursor.row()
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
        self.has_current.then_some(self.raw.as_str())
    }

    fn columns(&self) -> &[String] {
        self.columns.names()
    }

    fn cell(&self, column: &str) -> Result<&str, Absent> {
        if !self.has_current {
            return Err(Absent::NoCurrentRecord);
        }
        let position = self
            .columns
            .position(column)
            .ok_or_else(|| Absent::UnknownColumn(column.to_string()))?;
        Ok(self.record.get(position).unwrap_or(""))
    }

    fn conversions(&self) -> &Conversions {
        &self.conversions
    }
}
