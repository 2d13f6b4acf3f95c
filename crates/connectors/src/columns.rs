use std::collections::HashMap;
use tracing::warn;

const POSITIONAL_PREFIX: &str = "column_";

/// Resolves column names to cell positions.
///
/// Named sources match exactly first, then ignoring ASCII case; when a
/// header repeats, its first occurrence wins. Sources without a header row
/// expose `column_1`, `column_2`, ... in record order.
#[derive(Debug, Clone)]
pub enum ColumnIndex {
    Named {
        names: Vec<String>,
        exact: HashMap<String, usize>,
        folded: HashMap<String, usize>,
    },
    Positional {
        names: Vec<String>,
    },
}

impl Default for ColumnIndex {
    fn default() -> Self {
        ColumnIndex::Positional { names: Vec::new() }
    }
}

impl ColumnIndex {
    pub fn named<I, S>(headers: I, source: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        let mut exact = HashMap::new();
        let mut folded = HashMap::new();

        for (i, header) in headers.into_iter().enumerate() {
            let header = header.as_ref().to_string();
            if exact.contains_key(&header) {
                warn!(
                    "Duplicate column '{}' in {}; position {} is ignored",
                    header,
                    source,
                    i + 1
                );
            } else {
                exact.insert(header.clone(), i);
            }
            folded.entry(header.to_ascii_lowercase()).or_insert(i);
            names.push(header);
        }

        ColumnIndex::Named {
            names,
            exact,
            folded,
        }
    }

    pub fn positional() -> Self {
        ColumnIndex::Positional { names: Vec::new() }
    }

    /// Grows the synthetic names of a header-less source to `width`.
    pub fn ensure_width(&mut self, width: usize) {
        if let ColumnIndex::Positional { names } = self {
            while names.len() < width {
                names.push(format!("{POSITIONAL_PREFIX}{}", names.len() + 1));
            }
        }
    }

    pub fn names(&self) -> &[String] {
        match self {
            ColumnIndex::Named { names, .. } | ColumnIndex::Positional { names } => names,
        }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        match self {
            ColumnIndex::Named { exact, folded, .. } => exact
                .get(column)
                .or_else(|| folded.get(&column.to_ascii_lowercase()))
                .copied(),
            ColumnIndex::Positional { names } => column
                .get(..POSITIONAL_PREFIX.len())
                .filter(|prefix| prefix.eq_ignore_ascii_case(POSITIONAL_PREFIX))
                .map(|_| &column[POSITIONAL_PREFIX.len()..])
                .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|digits| digits.parse::<usize>().ok())
                .filter(|n| (1..=names.len()).contains(n))
                .map(|n| n - 1),
        }
    }
}
