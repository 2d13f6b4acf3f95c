use crate::error::ReaderError;
use serde::Serialize;
use std::{cell::Cell, fmt, marker::PhantomData};

/// Session lifecycle: `Unopened -> Open -> Exhausted`, and `close` from any
/// state to `Closed`. A closed reader may be opened again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReaderState {
    Unopened,
    Open,
    Exhausted,
    Closed,
}

impl fmt::Display for ReaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReaderState::Unopened => "unopened",
            ReaderState::Open => "open",
            ReaderState::Exhausted => "exhausted",
            ReaderState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Row cursor shared by the concrete readers.
///
/// Rows are one-based: `row()` is 0 until the first successful advance and
/// N after the Nth. Holding one makes the owning reader `!Sync`.
#[derive(Debug)]
pub struct RowCursor {
    state: ReaderState,
    hint: Option<String>,
    row: usize,
    _single_owner: PhantomData<Cell<()>>,
}

impl Default for RowCursor {
    fn default() -> Self {
        RowCursor {
            state: ReaderState::Unopened,
            hint: None,
            row: 0,
            _single_owner: PhantomData,
        }
    }
}

impl RowCursor {
    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// Fails if a source is still bound.
    pub fn check_can_open(&self) -> Result<(), ReaderError> {
        match self.state {
            ReaderState::Open | ReaderState::Exhausted => Err(ReaderError::AlreadyOpen(
                self.hint.clone().unwrap_or_default(),
            )),
            ReaderState::Unopened | ReaderState::Closed => Ok(()),
        }
    }

    pub fn open(&mut self, hint: &str) {
        self.state = ReaderState::Open;
        self.hint = Some(hint.to_string());
        self.row = 0;
    }

    /// Whether the caller may pull another record. `Ok(false)` once
    /// exhausted; an error when nothing is open.
    pub fn can_advance(&self) -> Result<bool, ReaderError> {
        match self.state {
            ReaderState::Open => Ok(true),
            ReaderState::Exhausted => Ok(false),
            ReaderState::Unopened | ReaderState::Closed => Err(ReaderError::NotOpen),
        }
    }

    pub fn advance(&mut self) {
        self.row += 1;
    }

    pub fn exhaust(&mut self) {
        self.state = ReaderState::Exhausted;
    }

    /// Returns whether a source was bound before the call.
    pub fn close(&mut self) -> bool {
        let was_bound = matches!(self.state, ReaderState::Open | ReaderState::Exhausted);
        self.state = ReaderState::Closed;
        was_bound
    }
}
