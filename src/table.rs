//! Multiline step arguments: data tables and doc strings.
//!
//! Tables can be built from literal rows or parsed from pipe-delimited text.
//! Parsing reports errors against a file and line offset so a malformed table
//! embedded in step code points back at the source that produced it.

use std::{collections::HashMap, fmt, path::Path};

use thiserror::Error;

/// Errors raised while parsing or reshaping a [`DataTable`].
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TableError {
    /// A row did not start and end with a pipe.
    #[error("{location}: table row must start and end with '|'")]
    MissingPipe {
        /// `file:line` of the offending row.
        location: String,
    },
    /// A row had a different number of cells than the first row.
    #[error("{location}: inconsistent number of cells (expected {expected}, found {actual})")]
    InconsistentCells {
        /// `file:line` of the offending row.
        location: String,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// The table does not have the two columns `rows_hash` requires.
    #[error("rows_hash requires exactly 2 columns, table has {0}")]
    NotTwoColumns(usize),
}

/// Tabular step argument.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataTable {
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Build a table from literal rows.
    ///
    /// ```
    /// use lucid::DataTable;
    ///
    /// let table = DataTable::new(vec![vec!["study", "phase"], vec!["Test-01", "I"]]);
    /// assert_eq!(table.headers(), Some(&["study".to_owned(), "phase".to_owned()][..]));
    /// ```
    #[must_use]
    pub fn new<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Parse pipe-delimited text.
    ///
    /// Blank lines and `#` comment lines are skipped. Cells are trimmed and
    /// `\|`, `\\` and `\n` are unescaped. `line_offset` is the line number of
    /// the text's first line minus one, so errors report source lines.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingPipe`] for rows not enclosed in pipes and
    /// [`TableError::InconsistentCells`] when row widths differ.
    pub fn parse(text: &str, file: Option<&Path>, line_offset: usize) -> Result<Self, TableError> {
        let location = |index: usize| {
            let line = line_offset + index + 1;
            match file {
                Some(path) => format!("{}:{line}", path.display()),
                None => format!("line {line}"),
            }
        };

        let mut rows: Vec<Vec<String>> = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cells = parse_row(line).ok_or_else(|| TableError::MissingPipe {
                location: location(index),
            })?;
            if let Some(first) = rows.first()
                && first.len() != cells.len()
            {
                return Err(TableError::InconsistentCells {
                    location: location(index),
                    expected: first.len(),
                    actual: cells.len(),
                });
            }
            rows.push(cells);
        }
        Ok(Self { rows })
    }

    /// All rows, header included.
    #[must_use]
    pub fn raw(&self) -> &[Vec<String>] { &self.rows }

    /// The first row, if any.
    #[must_use]
    pub fn headers(&self) -> Option<&[String]> { self.rows.first().map(Vec::as_slice) }

    /// Rows after the header, keyed by header cell.
    #[must_use]
    pub fn hashes(&self) -> Vec<HashMap<String, String>> {
        let Some((header, body)) = self.rows.split_first() else {
            return Vec::new();
        };
        body.iter()
            .map(|row| header.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    /// Interpret a two-column table as key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NotTwoColumns`] unless every row has two cells.
    pub fn rows_hash(&self) -> Result<HashMap<String, String>, TableError> {
        if self.rows.is_empty() {
            return Err(TableError::NotTwoColumns(0));
        }
        self.rows
            .iter()
            .map(|row| match row.as_slice() {
                [key, value] => Ok((key.clone(), value.clone())),
                cells => Err(TableError::NotTwoColumns(cells.len())),
            })
            .collect()
    }

    /// Swap rows and columns.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let width = self.width();
        let rows = (0..width)
            .map(|col| {
                self.rows
                    .iter()
                    .map(|row| row.get(col).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Number of cells in the first row.
    #[must_use]
    pub fn width(&self) -> usize { self.rows.first().map_or(0, Vec::len) }

    /// Number of rows, header included.
    #[must_use]
    pub fn height(&self) -> usize { self.rows.len() }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

fn parse_row(line: &str) -> Option<Vec<String>> {
    let mut chars = line.strip_prefix('|')?.chars();
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut closed = false;
    while let Some(c) = chars.next() {
        closed = false;
        match c {
            '\\' => match chars.next() {
                Some('|') => cell.push('|'),
                Some('\\') => cell.push('\\'),
                Some('n') => cell.push('\n'),
                Some(other) => {
                    cell.push('\\');
                    cell.push(other);
                }
                None => cell.push('\\'),
            },
            '|' => {
                cells.push(cell.trim().to_owned());
                cell.clear();
                closed = true;
            }
            other => cell.push(other),
        }
    }
    closed.then_some(cells)
}

/// Multiline text argument with an optional content type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocString {
    content: String,
    content_type: String,
}

impl DocString {
    /// Create a doc string; an empty `content_type` means unspecified.
    #[must_use]
    pub fn new(content: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    /// The text without surrounding quotes.
    #[must_use]
    pub fn content(&self) -> &str { &self.content }

    /// The content type tag, empty when unspecified.
    #[must_use]
    pub fn content_type(&self) -> &str { &self.content_type }
}

impl fmt::Display for DocString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.content) }
}

/// Argument attached to a step below its text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MultilineArg {
    /// A data table.
    Table(DataTable),
    /// A doc string.
    DocString(DocString),
}

impl MultilineArg {
    /// The shape of this argument.
    #[must_use]
    pub fn kind(&self) -> MultilineKind {
        match self {
            MultilineArg::Table(_) => MultilineKind::Table,
            MultilineArg::DocString(_) => MultilineKind::DocString,
        }
    }
}

/// Shape of a multiline argument, used where only the kind matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultilineKind {
    /// A data table.
    Table,
    /// A doc string.
    DocString,
}
