//! Query handler over the relational metadata store.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Errors raised by a query handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Handler is closed")]
    Closed,
}

pub type HandlerResult<T> = Result<T, HandlerError>;

/// One value of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    fn from_value(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Blob(b.to_vec()),
        }
    }
}

/// Tabular result of one query: ordered column names and rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(|cells| RowRef {
            columns: &self.columns,
            cells,
        })
    }
}

/// Named access into one row. Lookups ignore ASCII case; missing columns and
/// NULLs read as empty values.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> RowRef<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|idx| self.cells.get(idx))
    }

    pub fn text(&self, column: &str) -> String {
        match self.get(column) {
            Some(Cell::Text(s)) => s.clone(),
            Some(Cell::Integer(i)) => i.to_string(),
            Some(Cell::Real(f)) => f.to_string(),
            _ => String::new(),
        }
    }

    /// Text value, or `None` for NULL and missing columns.
    pub fn opt_text(&self, column: &str) -> Option<String> {
        match self.get(column) {
            None | Some(Cell::Null) => None,
            Some(_) => Some(self.text(column)),
        }
    }

    pub fn int(&self, column: &str) -> i64 {
        match self.get(column) {
            Some(Cell::Integer(i)) => *i,
            Some(Cell::Real(f)) => *f as i64,
            Some(Cell::Text(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn float(&self, column: &str) -> f64 {
        match self.get(column) {
            Some(Cell::Integer(i)) => *i as f64,
            Some(Cell::Real(f)) => *f,
            Some(Cell::Text(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Boolean flag stored as an integer or `true`/`false` text.
    pub fn flag(&self, column: &str) -> bool {
        match self.get(column) {
            Some(Cell::Text(s)) => s.eq_ignore_ascii_case("true") || s.trim() == "1",
            _ => self.int(column) != 0,
        }
    }
}

/// Runs fixed query templates against an open metadata store.
pub trait QueryHandler {
    fn execute(&mut self, sql: &str) -> HandlerResult<ResultSet>;

    /// Release the store. Executing after close fails with [`HandlerError::Closed`].
    fn close(&mut self) -> HandlerResult<()>;
}

/// [`QueryHandler`] over a SQLite metadata store.
pub struct SqliteHandler {
    conn: Option<Connection>,
}

impl SqliteHandler {
    /// Open the store read-only.
    pub fn open(path: impl AsRef<Path>) -> HandlerResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already-open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn: Some(conn) }
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}

impl QueryHandler for SqliteHandler {
    fn execute(&mut self, sql: &str) -> HandlerResult<ResultSet> {
        let conn = self.conn.as_ref().ok_or(HandlerError::Closed)?;
        let mut stmt = conn.prepare(sql)?;
        let mut result = ResultSet::new(
            stmt.column_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        );
        let width = result.columns.len();

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(Cell::from_value(row.get_ref(idx)?));
            }
            result.rows.push(cells);
        }
        Ok(result)
    }

    fn close(&mut self) -> HandlerResult<()> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, e)| HandlerError::Sqlite(e)),
            None => Ok(()),
        }
    }
}
