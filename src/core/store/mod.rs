//! Piece store - the transactional table of physical stock rows
//!
//! Every mutation runs inside [`PieceStore::with_transaction`], which opens a
//! `BEGIN IMMEDIATE` transaction. SQLite takes its write lock at that point, so
//! any row read afterwards stays locked until commit or rollback. The row
//! helpers in this module take a `&Connection` so they can be called with the
//! transaction handle; helpers that decide a mutation from what they read must
//! only be called inside such a transaction.

mod schema;
mod serialize;


use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

use crate::core::error::{Result, StockError};
use crate::core::ids::{BoardId, PieceId, ProjectId};
use crate::entities::{Location, PieceDescriptor, PieceStatus, PieceType, StockPiece};

pub use schema::SCHEMA_VERSION;

/// Connection options for the piece store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How long a writer waits for another writer's lock before failing
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// Filter for piece queries
#[derive(Debug, Clone, Default)]
pub struct PieceFilter {
    pub board: Option<BoardId>,
    pub project: Option<ProjectId>,
    pub status: Option<PieceStatus>,
    pub piece_type: Option<PieceType>,
    pub location: Option<Location>,
    pub is_accounting: Option<bool>,
}

/// SQLite-backed store of board types and stock pieces
pub struct PieceStore {
    conn: Connection,
}

impl PieceStore {
    /// Open (or create) a store at the given path
    pub fn open(path: impl AsRef<Path>, options: &StoreOptions) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opening piece store");
        Self::prepare(conn, options)
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?, &StoreOptions::default())
    }

    fn prepare(mut conn: Connection, options: &StoreOptions) -> Result<Self> {
        conn.busy_timeout(options.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    /// Read-only access for queries outside a transaction
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a write transaction
    ///
    /// Commits when `f` returns `Ok`; any error rolls every change back.
    pub fn with_transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Fetch a piece by id
    pub fn piece(&self, id: PieceId) -> Result<StockPiece> {
        find_piece(&self.conn, id)?.ok_or(StockError::PieceNotFound(id))
    }

    /// List pieces matching the filter, oldest first
    pub fn pieces(&self, filter: &PieceFilter) -> Result<Vec<StockPiece>> {
        query_pieces(&self.conn, filter)
    }
}

// =========================================================================
// Row mapping
// =========================================================================

const PIECE_COLUMNS: &str = "id, board_id, project_id, is_accounting, piece_type, status, \
     width_mm, height_mm, qty, location, notes, created_at";

/// Timestamps are stored with fixed microsecond precision so text order is time order
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn piece_from_row(row: &Row<'_>) -> rusqlite::Result<StockPiece> {
    let created: String = row.get(11)?;
    let created_at = DateTime::parse_from_rfc3339(&created)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(StockPiece {
        id: row.get(0)?,
        board_id: row.get(1)?,
        project_id: row.get(2)?,
        is_accounting: row.get(3)?,
        piece_type: row.get(4)?,
        status: row.get(5)?,
        width_mm: row.get(6)?,
        height_mm: row.get(7)?,
        qty: row.get(8)?,
        location: row.get(9)?,
        notes: row.get(10)?,
        created_at,
    })
}

// =========================================================================
// Row helpers
// =========================================================================

/// Fetch a piece without any locking guarantee
pub fn find_piece(conn: &Connection, id: PieceId) -> Result<Option<StockPiece>> {
    let sql = format!("SELECT {} FROM stock_pieces WHERE id = ?1", PIECE_COLUMNS);
    Ok(conn.query_row(&sql, [id], piece_from_row).optional()?)
}

/// Re-read a piece under the caller's write lock
///
/// The value returned stays authoritative until the enclosing transaction ends.
pub fn lock_piece(conn: &Connection, id: PieceId) -> Result<StockPiece> {
    debug_assert!(!conn.is_autocommit(), "lock_piece called outside a transaction");
    find_piece(conn, id)?.ok_or(StockError::PieceNotFound(id))
}

/// Oldest AVAILABLE FULL piece of a board (created_at, then id)
pub fn oldest_available_full(conn: &Connection, board: BoardId) -> Result<Option<StockPiece>> {
    debug_assert!(!conn.is_autocommit(), "FIFO selection outside a transaction");
    let sql = format!(
        "SELECT {} FROM stock_pieces
         WHERE board_id = ?1 AND status = ?2 AND piece_type = ?3 AND qty > 0
         ORDER BY created_at ASC, id ASC
         LIMIT 1",
        PIECE_COLUMNS
    );
    Ok(conn
        .query_row(
            &sql,
            params![board, PieceStatus::Available, PieceType::Full],
            piece_from_row,
        )
        .optional()?)
}

/// Insert a new row; callers must have consulted the resolver first
pub fn insert_piece(
    conn: &Connection,
    descriptor: &PieceDescriptor,
    qty: u32,
    notes: &str,
    created_at: DateTime<Utc>,
) -> Result<PieceId> {
    if qty == 0 {
        return Err(StockError::InvalidQuantity);
    }
    conn.execute(
        "INSERT INTO stock_pieces
            (board_id, project_id, is_accounting, piece_type, status,
             width_mm, height_mm, qty, location, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            descriptor.board_id,
            descriptor.project_id,
            descriptor.is_accounting,
            descriptor.piece_type,
            descriptor.status,
            descriptor.width_mm,
            descriptor.height_mm,
            qty,
            descriptor.location,
            notes,
            format_timestamp(created_at),
        ],
    )?;
    Ok(PieceId(conn.last_insert_rowid()))
}

/// Add `by` to a row's quantity
pub fn increment_qty(conn: &Connection, id: PieceId, by: u32) -> Result<()> {
    let changed = conn.execute(
        "UPDATE stock_pieces SET qty = qty + ?2 WHERE id = ?1",
        params![id, by],
    )?;
    if changed == 0 {
        return Err(StockError::PieceNotFound(id));
    }
    Ok(())
}

/// Take `by` pieces out of a locked row, deleting it when nothing is left
///
/// Returns the remaining quantity (0 means the row is gone).
pub fn decrement_qty(conn: &Connection, piece: &StockPiece, by: u32) -> Result<u32> {
    if by > piece.qty {
        return Err(StockError::QuantityExceedsAvailable {
            piece: piece.id,
            requested: by,
            available: piece.qty,
        });
    }
    let remaining = piece.qty - by;
    if remaining == 0 {
        delete_row(conn, piece.id)?;
    } else {
        conn.execute(
            "UPDATE stock_pieces SET qty = ?2 WHERE id = ?1",
            params![piece.id, remaining],
        )?;
    }
    Ok(remaining)
}

/// Change status, location and project binding of a row in place
pub fn update_state(
    conn: &Connection,
    id: PieceId,
    status: PieceStatus,
    location: Location,
    project: Option<ProjectId>,
) -> Result<()> {
    let changed = conn.execute(
        "UPDATE stock_pieces SET status = ?2, location = ?3, project_id = ?4 WHERE id = ?1",
        params![id, status, location, project],
    )?;
    if changed == 0 {
        return Err(StockError::PieceNotFound(id));
    }
    Ok(())
}

/// Append a line to a row's notes (notes are never rewritten)
pub fn append_note(conn: &Connection, id: PieceId, note: &str) -> Result<()> {
    let note = note.trim();
    if note.is_empty() {
        return Ok(());
    }
    let changed = conn.execute(
        "UPDATE stock_pieces
         SET notes = CASE WHEN notes = '' THEN ?2 ELSE notes || char(10) || ?2 END
         WHERE id = ?1",
        params![id, note],
    )?;
    if changed == 0 {
        return Err(StockError::PieceNotFound(id));
    }
    Ok(())
}

/// Remove a row
pub fn delete_row(conn: &Connection, id: PieceId) -> Result<()> {
    conn.execute("DELETE FROM stock_pieces WHERE id = ?1", [id])?;
    Ok(())
}

/// Number of rows referencing a board
pub fn count_pieces_for_board(conn: &Connection, board: BoardId) -> Result<u32> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM stock_pieces WHERE board_id = ?1",
        [board],
        |row| row.get(0),
    )?)
}

/// List pieces matching a filter in FIFO order
pub fn query_pieces(conn: &Connection, filter: &PieceFilter) -> Result<Vec<StockPiece>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(board) = filter.board {
        clauses.push("board_id = ?");
        values.push(Value::Integer(board.get()));
    }
    if let Some(project) = filter.project {
        clauses.push("project_id = ?");
        values.push(Value::Integer(project.get()));
    }
    if let Some(status) = filter.status {
        clauses.push("status = ?");
        values.push(Value::Text(status.to_string()));
    }
    if let Some(piece_type) = filter.piece_type {
        clauses.push("piece_type = ?");
        values.push(Value::Text(piece_type.to_string()));
    }
    if let Some(location) = filter.location {
        clauses.push("location = ?");
        values.push(Value::Text(location.as_str().to_string()));
    }
    if let Some(is_accounting) = filter.is_accounting {
        clauses.push("is_accounting = ?");
        values.push(Value::Integer(i64::from(is_accounting)));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {} FROM stock_pieces{} ORDER BY created_at ASC, id ASC",
        PIECE_COLUMNS, where_sql
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(values), piece_from_row)?;
    let mut pieces = Vec::new();
    for row in rows {
        pieces.push(row?);
    }
    Ok(pieces)
}
