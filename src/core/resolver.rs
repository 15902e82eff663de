//! Identity resolver - cumulate instead of duplicating identical rows
//!
//! Two rows are identical when they agree on every [`PieceDescriptor`] field:
//! board, project binding (unbound never equals bound), piece type, status,
//! exact width and height, location, and accounting flag. Every insertion path
//! goes through [`upsert`] so the store never grows a second identical row.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;

use crate::core::error::{Result, StockError};
use crate::core::events::{ActionType, Journal};
use crate::core::ids::PieceId;
use crate::core::store::{self, lock_piece};
use crate::entities::{PieceDescriptor, StockPiece};

/// Where an upsert put the quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: PieceId,
    /// Quantity was added to an existing row
    pub merged: bool,
}

fn identical_query(
    conn: &Connection,
    descriptor: &PieceDescriptor,
    exclude: Option<PieceId>,
) -> Result<Option<PieceId>> {
    let id = conn
        .query_row(
            "SELECT id FROM stock_pieces
             WHERE board_id = ?1
               AND project_id IS ?2
               AND piece_type = ?3
               AND status = ?4
               AND width_mm = ?5
               AND height_mm = ?6
               AND location = ?7
               AND is_accounting = ?8
               AND id IS NOT ?9
             ORDER BY created_at ASC, id ASC
             LIMIT 1",
            params![
                descriptor.board_id,
                descriptor.project_id,
                descriptor.piece_type,
                descriptor.status,
                descriptor.width_mm,
                descriptor.height_mm,
                descriptor.location,
                descriptor.is_accounting,
                exclude,
            ],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Find the oldest row identical to `descriptor`
pub fn find_identical(conn: &Connection, descriptor: &PieceDescriptor) -> Result<Option<PieceId>> {
    identical_query(conn, descriptor, None)
}

/// Add `qty` pieces matching `descriptor`, merging into an identical row if one exists
///
/// Must run inside the caller's write transaction.
pub fn upsert(
    conn: &Connection,
    descriptor: &PieceDescriptor,
    qty: u32,
    note: Option<&str>,
    journal: &mut Journal,
) -> Result<UpsertOutcome> {
    if qty == 0 {
        return Err(StockError::InvalidQuantity);
    }

    if let Some(id) = find_identical(conn, descriptor)? {
        let before = lock_piece(conn, id)?;
        store::increment_qty(conn, id, qty)?;
        if let Some(note) = note {
            store::append_note(conn, id, note)?;
        }
        let after = lock_piece(conn, id)?;
        tracing::debug!(piece = %id, added = qty, total = after.qty, "cumulated into identical row");
        journal.record(
            ActionType::Merged,
            id,
            Some(before),
            Some(after),
            json!({ "added_qty": qty }),
        );
        return Ok(UpsertOutcome { id, merged: true });
    }

    let notes = note.map(str::trim).unwrap_or_default();
    let id = store::insert_piece(conn, descriptor, qty, notes, Utc::now())?;
    let after = lock_piece(conn, id)?;
    tracing::debug!(piece = %id, qty, "created stock row");
    journal.record(
        ActionType::Created,
        id,
        None,
        Some(after),
        json!({ "qty": qty }),
    );
    Ok(UpsertOutcome { id, merged: false })
}

/// Fold every other row identical to `target` into it
///
/// Used after an in-place state change, which can make a row collide with an
/// existing one. The absorbed rows' notes are appended to the target.
pub fn absorb_identical(conn: &Connection, target: PieceId, journal: &mut Journal) -> Result<StockPiece> {
    let mut piece = lock_piece(conn, target)?;
    let descriptor = piece.descriptor();

    while let Some(other_id) = identical_query(conn, &descriptor, Some(target))? {
        let other = lock_piece(conn, other_id)?;
        let before = piece.clone();
        store::increment_qty(conn, target, other.qty)?;
        store::append_note(conn, target, &other.notes)?;
        store::delete_row(conn, other_id)?;
        piece = lock_piece(conn, target)?;

        tracing::debug!(piece = %target, absorbed = %other_id, qty = other.qty, "absorbed identical row");
        journal.record(
            ActionType::Deleted,
            other_id,
            Some(other.clone()),
            None,
            json!({ "absorbed_into": target }),
        );
        journal.record(
            ActionType::Merged,
            target,
            Some(before),
            Some(piece.clone()),
            json!({ "added_qty": other.qty, "absorbed": other_id }),
        );
    }
    Ok(piece)
}
