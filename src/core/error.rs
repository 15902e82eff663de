//! Error type for stock operations

use miette::Diagnostic;
use thiserror::Error;

use crate::core::ids::{BoardId, PieceId};
use crate::entities::PieceStatus;

/// Errors that can occur during stock operations
///
/// Validation variants are raised before any transaction is opened. Stock-dependent
/// variants (`InsufficientStock`, `QuantityExceedsAvailable`, ...) are raised inside
/// the transaction, which is then rolled back; retrying the same request is safe.
#[derive(Debug, Error, Diagnostic)]
pub enum StockError {
    #[error("Invalid dimensions: {width}x{height} mm (width and height must be positive)")]
    #[diagnostic(code(sheetstock::invalid_dimensions))]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid quantity: must be at least 1")]
    #[diagnostic(code(sheetstock::invalid_quantity))]
    InvalidQuantity,

    #[error("Insufficient stock: no available FULL piece of board {board}")]
    #[diagnostic(
        code(sheetstock::insufficient_stock),
        help("Not enough stock. Add full boards or release another reservation")
    )]
    InsufficientStock { board: BoardId },

    #[error("Invalid status transition for piece {piece}: {from} → {to}")]
    #[diagnostic(code(sheetstock::invalid_transition))]
    InvalidStatusTransition {
        piece: PieceId,
        from: PieceStatus,
        to: PieceStatus,
    },

    #[error("A note is required when moving pieces to SCRAP")]
    #[diagnostic(
        code(sheetstock::note_required),
        help("Pass --note with the reason the material was scrapped")
    )]
    MandatoryNoteMissing,

    #[error("Board not found: {0}")]
    #[diagnostic(code(sheetstock::board_not_found))]
    BoardNotFound(String),

    #[error("Piece not found: {0}")]
    #[diagnostic(code(sheetstock::piece_not_found))]
    PieceNotFound(PieceId),

    #[error("Piece {piece} holds {available} piece(s), cannot take {requested}")]
    #[diagnostic(code(sheetstock::quantity_exceeds_available))]
    QuantityExceedsAvailable {
        piece: PieceId,
        requested: u32,
        available: u32,
    },

    #[error("RESERVED pieces must be bound to a project")]
    #[diagnostic(
        code(sheetstock::project_required),
        help("Pass --project; pieces in Producție are always reserved for a project")
    )]
    ProjectRequired,

    #[error("Piece {piece} is {status}; only AVAILABLE pieces can be deleted")]
    #[diagnostic(code(sheetstock::piece_not_available))]
    PieceNotAvailable { piece: PieceId, status: PieceStatus },

    #[error("Piece {piece} accounting flag is {actual}, caller expected {expected}")]
    #[diagnostic(code(sheetstock::accounting_mismatch))]
    AccountingMismatch {
        piece: PieceId,
        expected: bool,
        actual: bool,
    },

    #[error("Board {board} is still referenced by {pieces} stock row(s)")]
    #[diagnostic(
        code(sheetstock::board_in_use),
        help("Delete or consume the pieces of this board first")
    )]
    BoardInUse { board: BoardId, pieces: u32 },

    #[error("Board code must not be empty")]
    #[diagnostic(code(sheetstock::empty_board_code))]
    EmptyBoardCode,

    #[error("A board with code '{0}' already exists")]
    #[diagnostic(code(sheetstock::duplicate_board_code))]
    DuplicateBoardCode(String),

    #[error("Configuration error: {message}")]
    #[diagnostic(code(sheetstock::config))]
    Config { message: String },

    #[error("Storage error: {0}")]
    #[diagnostic(code(sheetstock::storage))]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(sheetstock::io))]
    Io(#[from] std::io::Error),
}

impl StockError {
    /// True when the error came from the database being locked by another writer
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            StockError::Storage(rusqlite::Error::SqliteFailure(e, _))
                if matches!(e.code, rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
        )
    }
}

pub type Result<T> = std::result::Result<T, StockError>;
