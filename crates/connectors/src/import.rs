use crate::{error::ImportError, reader::TabularReader};
use serde::Serialize;
use std::{convert::Infallible, fmt, ops::ControlFlow, time::Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportSummary {
    pub hint: String,
    pub rows: usize,
    /// True when every row was visited; false when the visitor stopped early.
    pub reached_end: bool,
    pub took_ms: u128,
}

/// Runs one full read session: initialize, open, visit every row, close.
///
/// `visit` sees the reader positioned on each row in turn and may stop the
/// session early with `ControlFlow::Break`. The reader is closed on every
/// path, including open failures and visitor errors.
pub fn drive<R, F, E>(
    reader: &mut R,
    connection: &str,
    hint: &str,
    mut visit: F,
) -> Result<ImportSummary, ImportError>
where
    R: TabularReader + ?Sized,
    F: FnMut(&R) -> Result<ControlFlow<()>, E>,
    E: fmt::Display,
{
    let start = Instant::now();
    reader.initialize();

    let outcome = visit_all(reader, connection, hint, &mut visit);
    reader.close();

    let took_ms = start.elapsed().as_millis();
    match outcome {
        Ok((rows, reached_end)) => {
            info!("Read {} rows from '{}' in {} ms", rows, hint, took_ms);
            Ok(ImportSummary {
                hint: hint.to_string(),
                rows,
                reached_end,
                took_ms,
            })
        }
        Err(e) => {
            warn!("Reading '{}' failed after {} ms: {}", hint, took_ms, e);
            Err(e)
        }
    }
}

fn visit_all<R, F, E>(
    reader: &mut R,
    connection: &str,
    hint: &str,
    visit: &mut F,
) -> Result<(usize, bool), ImportError>
where
    R: TabularReader + ?Sized,
    F: FnMut(&R) -> Result<ControlFlow<()>, E>,
    E: fmt::Display,
{
    reader.read(connection, hint)?;

    let mut rows = 0;
    while reader.read_record()? {
        rows += 1;
        match visit(&*reader) {
            Ok(ControlFlow::Continue(())) => {}
            Ok(ControlFlow::Break(())) => return Ok((rows, false)),
            Err(e) => {
                return Err(ImportError::Visit {
                    row: reader.row(),
                    message: e.to_string(),
                });
            }
        }
    }
    Ok((rows, true))
}

/// Counts the rows of a source without converting any cell.
pub fn count_rows<R>(reader: &mut R, connection: &str, hint: &str) -> Result<usize, ImportError>
where
    R: TabularReader + ?Sized,
{
    let summary = drive(reader, connection, hint, |_| {
        Ok::<_, Infallible>(ControlFlow::Continue(()))
    })?;
    Ok(summary.rows)
}
