//! Stock engine - the inbound surface used by controllers
//!
//! Every mutating operation follows the same shape: structural validation
//! without touching storage, then one write transaction through
//! [`PieceStore::with_transaction`], then event publication after commit.

use serde_json::json;

use crate::core::catalog;
use crate::core::classify::{self, Classification};
use crate::core::config::Workspace;
use crate::core::consumption::{self, ConsumptionMode};
use crate::core::error::{Result, StockError};
use crate::core::events::{self, ActionType, EventSink, Journal, JsonlEventSink, NullEventSink};
use crate::core::ids::{BoardId, PieceId, ProjectId};
use crate::core::movement::{self, MoveOutcome, MoveRequest};
use crate::core::reservation;
use crate::core::resolver;
use crate::core::store::{self, lock_piece, PieceFilter, PieceStore};
use crate::core::summary::{self, StockSummary};
use crate::entities::{BoardType, NewBoard, NewPiece, PieceDescriptor, PieceStatus, PieceType, StockPiece};

/// Result of an intake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub id: PieceId,
    pub piece_type: PieceType,
    pub status: PieceStatus,
    /// Requested type was overridden by the dimensions
    pub reclassified: bool,
    /// Quantity was cumulated into an existing identical row
    pub merged: bool,
}

/// Transactional stock engine over a [`PieceStore`]
pub struct StockEngine {
    store: PieceStore,
    sink: Box<dyn EventSink>,
}

impl StockEngine {
    pub fn new(store: PieceStore, sink: Box<dyn EventSink>) -> Self {
        Self { store, sink }
    }

    /// In-memory engine without event recording
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(PieceStore::open_in_memory()?, Box::new(NullEventSink)))
    }

    /// Open the workspace database, logging events to its event log if configured
    pub fn open(workspace: &Workspace) -> Result<Self> {
        let store = PieceStore::open(
            workspace.database_path(),
            &workspace.config().store_options(),
        )?;
        let sink: Box<dyn EventSink> = match workspace.event_log_path() {
            Some(path) => Box::new(JsonlEventSink::new(path)),
            None => Box::new(NullEventSink),
        };
        Ok(Self::new(store, sink))
    }

    pub fn store(&self) -> &PieceStore {
        &self.store
    }

    /// Run a mutation in one transaction and publish its events after commit
    fn commit<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>, &mut Journal) -> Result<T>,
    {
        let mut journal = Journal::new();
        let value = self.store.with_transaction(|tx| f(tx, &mut journal))?;
        events::publish(self.sink.as_ref(), journal);
        Ok(value)
    }

    // =====================================================================
    // Catalog
    // =====================================================================

    pub fn add_board(&mut self, board: NewBoard) -> Result<BoardType> {
        let added = self.store.with_transaction(|tx| catalog::insert_board(tx, &board))?;
        tracing::info!(board = %added.id, code = %added.code, "board added");
        Ok(added)
    }

    /// Look a board up by code or numeric id
    pub fn board(&self, key: &str) -> Result<BoardType> {
        catalog::resolve_board(self.store.connection(), key)
    }

    pub fn board_by_id(&self, id: BoardId) -> Result<BoardType> {
        catalog::get_board(self.store.connection(), id)
    }

    pub fn boards(&self) -> Result<Vec<BoardType>> {
        catalog::list_boards(self.store.connection())
    }

    pub fn delete_board(&mut self, id: BoardId) -> Result<BoardType> {
        let deleted = self.store.with_transaction(|tx| catalog::delete_board(tx, id))?;
        tracing::info!(board = %id, code = %deleted.code, "board deleted");
        Ok(deleted)
    }

    // =====================================================================
    // Pieces
    // =====================================================================

    /// Intake: classify, then cumulate into an identical row or create one
    ///
    /// Pieces land AVAILABLE, except in Producție where they are RESERVED for
    /// their project.
    pub fn upsert_piece(&mut self, piece: NewPiece) -> Result<IntakeOutcome> {
        if piece.qty == 0 {
            return Err(StockError::InvalidQuantity);
        }
        let board = self.board_by_id(piece.board_id)?;
        let Classification {
            piece_type,
            reclassified,
        } = classify::classify(&board, piece.width_mm, piece.height_mm, piece.requested_type)?;
        if reclassified {
            tracing::info!(
                board = %board.code,
                width = piece.width_mm,
                height = piece.height_mm,
                requested = %piece.requested_type,
                stored = %piece_type,
                "piece reclassified from its dimensions"
            );
        }

        let status = movement::settle_status(PieceStatus::Available, piece.location);
        if status == PieceStatus::Reserved && piece.project_id.is_none() {
            return Err(StockError::ProjectRequired);
        }

        let descriptor = PieceDescriptor {
            board_id: board.id,
            project_id: piece.project_id,
            piece_type,
            status,
            width_mm: piece.width_mm,
            height_mm: piece.height_mm,
            location: piece.location,
            is_accounting: piece.is_accounting,
        };
        let outcome = self.commit(|tx, journal| {
            resolver::upsert(tx, &descriptor, piece.qty, piece.note.as_deref(), journal)
        })?;

        tracing::info!(piece = %outcome.id, qty = piece.qty, merged = outcome.merged, "intake recorded");
        Ok(IntakeOutcome {
            id: outcome.id,
            piece_type,
            status,
            reclassified,
            merged: outcome.merged,
        })
    }

    pub fn reserve_one_full_board(
        &mut self,
        board: BoardId,
        project: ProjectId,
        note: &str,
    ) -> Result<PieceId> {
        self.board_by_id(board)?;
        let id = self.commit(|tx, journal| {
            reservation::reserve_one_full_board(tx, board, project, note, journal)
        })?;
        tracing::info!(piece = %id, board = %board, project = %project, "reserved full board");
        Ok(id)
    }

    /// Reserve `count` boards in one transaction; nothing is reserved on failure
    pub fn reserve_full_boards(
        &mut self,
        board: BoardId,
        project: ProjectId,
        count: u32,
        note: &str,
    ) -> Result<Vec<PieceId>> {
        if count == 0 {
            return Err(StockError::InvalidQuantity);
        }
        self.board_by_id(board)?;
        let ids = self.commit(|tx, journal| {
            reservation::reserve_full_boards(tx, board, project, count, note, journal)
        })?;
        tracing::info!(count, board = %board, project = %project, "reserved full boards");
        Ok(ids)
    }

    pub fn move_piece(&mut self, request: MoveRequest) -> Result<MoveOutcome> {
        let request = movement::prepare(request)?;
        self.commit(|tx, journal| movement::move_piece(tx, &request, journal))
    }

    pub fn consume(&mut self, piece: PieceId, qty: u32, note: Option<&str>) -> Result<MoveOutcome> {
        self.consume_with_mode(piece, qty, ConsumptionMode::Full, note)
    }

    pub fn consume_with_mode(
        &mut self,
        piece: PieceId,
        qty: u32,
        mode: ConsumptionMode,
        note: Option<&str>,
    ) -> Result<MoveOutcome> {
        let request = consumption::consume_request(piece, qty, mode, note)?;
        self.commit(|tx, journal| movement::move_piece(tx, &request, journal))
    }

    /// Release everything reserved for a project (e.g. when the project is deleted)
    pub fn release_project(&mut self, project: ProjectId, note: Option<&str>) -> Result<Vec<PieceId>> {
        let released = self.commit(|tx, journal| movement::release_project(tx, project, note, journal))?;
        tracing::info!(project = %project, rows = released.len(), "project reservations released");
        Ok(released)
    }

    pub fn append_note(&mut self, piece: PieceId, note: &str) -> Result<StockPiece> {
        if note.trim().is_empty() {
            return self.piece(piece);
        }
        self.commit(|tx, journal| {
            let before = lock_piece(tx, piece)?;
            store::append_note(tx, piece, note)?;
            let after = lock_piece(tx, piece)?;
            journal.record(
                ActionType::NoteAppended,
                piece,
                Some(before),
                Some(after.clone()),
                serde_json::Value::Null,
            );
            Ok(after)
        })
    }

    /// Delete an AVAILABLE row
    ///
    /// `expect_accounting` guards against deleting a stocked piece from an
    /// internal-pieces screen and vice versa.
    pub fn delete_piece(&mut self, piece: PieceId, expect_accounting: Option<bool>) -> Result<StockPiece> {
        let deleted = self.commit(|tx, journal| {
            let current = lock_piece(tx, piece)?;
            if current.status != PieceStatus::Available {
                return Err(StockError::PieceNotAvailable {
                    piece,
                    status: current.status,
                });
            }
            if let Some(expected) = expect_accounting {
                if expected != current.is_accounting {
                    return Err(StockError::AccountingMismatch {
                        piece,
                        expected,
                        actual: current.is_accounting,
                    });
                }
            }
            store::delete_row(tx, piece)?;
            journal.record(
                ActionType::Deleted,
                piece,
                Some(current.clone()),
                None,
                json!({ "qty": current.qty }),
            );
            Ok(current)
        })?;
        tracing::info!(piece = %piece, qty = deleted.qty, "piece deleted");
        Ok(deleted)
    }

    pub fn piece(&self, id: PieceId) -> Result<StockPiece> {
        self.store.piece(id)
    }

    pub fn list_pieces(&self, filter: &PieceFilter) -> Result<Vec<StockPiece>> {
        self.store.pieces(filter)
    }

    pub fn stock_summary(&self, board: BoardId) -> Result<StockSummary> {
        let board = self.board_by_id(board)?;
        summary::stock_summary(self.store.connection(), &board)
    }
}
