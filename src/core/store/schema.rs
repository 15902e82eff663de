//! Database schema and migrations
//!
//! The identity rule (no two rows agreeing on the eight descriptor fields) is NOT
//! a database constraint; it is maintained by routing inserts through the
//! resolver. Reservation rows are the one deliberate exception.

use rusqlite::{Connection, TransactionBehavior};

use crate::core::error::Result;

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS board_types (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    code            TEXT NOT NULL UNIQUE,
    brand           TEXT NOT NULL DEFAULT '',
    thickness_mm    REAL NOT NULL,
    std_width_mm    INTEGER NOT NULL CHECK (std_width_mm > 0),
    std_height_mm   INTEGER NOT NULL CHECK (std_height_mm > 0),
    sale_price      REAL
);

CREATE TABLE IF NOT EXISTS stock_pieces (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    board_id        INTEGER NOT NULL REFERENCES board_types(id) ON DELETE RESTRICT,
    project_id      INTEGER,
    is_accounting   INTEGER NOT NULL DEFAULT 1 CHECK (is_accounting IN (0, 1)),
    piece_type      TEXT NOT NULL CHECK (piece_type IN ('FULL', 'OFFCUT')),
    status          TEXT NOT NULL CHECK (status IN ('AVAILABLE', 'RESERVED', 'CONSUMED', 'SCRAP')),
    width_mm        INTEGER NOT NULL CHECK (width_mm > 0),
    height_mm       INTEGER NOT NULL CHECK (height_mm > 0),
    qty             INTEGER NOT NULL CHECK (qty >= 1),
    location        TEXT NOT NULL,
    notes           TEXT NOT NULL DEFAULT '',
    created_at      TEXT NOT NULL,
    area_per_piece_m2 REAL GENERATED ALWAYS AS (width_mm * height_mm / 1000000.0) VIRTUAL,
    area_total_m2     REAL GENERATED ALWAYS AS (width_mm * height_mm * qty / 1000000.0) VIRTUAL
);

CREATE INDEX IF NOT EXISTS idx_pieces_fifo
    ON stock_pieces(board_id, status, piece_type, created_at, id);
CREATE INDEX IF NOT EXISTS idx_pieces_project
    ON stock_pieces(project_id);
"#;

/// Bring the schema up to `SCHEMA_VERSION`
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    // Re-check under the write lock, another process may have migrated meanwhile
    let version: i32 = tx.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < 1 {
        tx.execute_batch(SCHEMA_V1)?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    tracing::debug!(version = SCHEMA_VERSION, "schema migrated");
    Ok(())
}
