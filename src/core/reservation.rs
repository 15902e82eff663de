//! Reservation engine - FIFO allocation of full boards to a project
//!
//! Selection is strictly oldest-first among AVAILABLE FULL rows of a board
//! (`created_at`, then id). A row holding several boards is split: one board
//! leaves as a new RESERVED row of qty 1, the rest stays AVAILABLE. Successive
//! reservations for the same project each get their own row; they are not
//! merged through the resolver.

use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;

use crate::core::error::{Result, StockError};
use crate::core::events::{ActionType, Journal};
use crate::core::ids::{BoardId, PieceId, ProjectId};
use crate::core::store::{self, lock_piece, oldest_available_full};
use crate::entities::PieceStatus;

/// Reserve one full board of `board` for `project`
///
/// Must run inside the caller's write transaction. Fails with
/// `InsufficientStock` when no AVAILABLE FULL piece exists; the caller's
/// transaction is expected to roll back in that case.
pub fn reserve_one_full_board(
    conn: &Connection,
    board: BoardId,
    project: ProjectId,
    note: &str,
    journal: &mut Journal,
) -> Result<PieceId> {
    let source = oldest_available_full(conn, board)?
        .ok_or(StockError::InsufficientStock { board })?;

    tracing::debug!(
        piece = %source.id,
        qty = source.qty,
        board = %board,
        project = %project,
        "selected oldest available full board"
    );

    if source.qty > 1 {
        let remaining = store::decrement_qty(conn, &source, 1)?;
        let descriptor = source.descriptor().moved_to(
            PieceStatus::Reserved,
            source.location,
            Some(project),
        );
        let reserved_id = store::insert_piece(conn, &descriptor, 1, note.trim(), Utc::now())?;

        journal.record(
            ActionType::Split,
            source.id,
            Some(source.clone()),
            Some(lock_piece(conn, source.id)?),
            json!({ "taken_qty": 1, "remaining_qty": remaining, "dest": reserved_id }),
        );
        journal.record(
            ActionType::Reserved,
            reserved_id,
            None,
            Some(lock_piece(conn, reserved_id)?),
            json!({ "project": project, "split_from": source.id }),
        );
        return Ok(reserved_id);
    }

    store::update_state(
        conn,
        source.id,
        PieceStatus::Reserved,
        source.location,
        Some(project),
    )?;
    store::append_note(conn, source.id, note)?;
    journal.record(
        ActionType::Reserved,
        source.id,
        Some(source.clone()),
        Some(lock_piece(conn, source.id)?),
        json!({ "project": project }),
    );
    Ok(source.id)
}

/// Reserve `count` full boards, all or nothing
///
/// Runs `count` single reservations in the caller's transaction; the first
/// failure aborts the whole batch once the caller rolls back.
pub fn reserve_full_boards(
    conn: &Connection,
    board: BoardId,
    project: ProjectId,
    count: u32,
    note: &str,
    journal: &mut Journal,
) -> Result<Vec<PieceId>> {
    if count == 0 {
        return Err(StockError::InvalidQuantity);
    }
    let mut reserved = Vec::with_capacity(count as usize);
    for _ in 0..count {
        reserved.push(reserve_one_full_board(conn, board, project, note, journal)?);
    }
    Ok(reserved)
}
