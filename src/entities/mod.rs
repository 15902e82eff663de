//! Entity type definitions

pub mod board;
pub mod piece;

pub use board::{BoardType, NewBoard};
pub use piece::{Location, NewPiece, PieceDescriptor, PieceStatus, PieceType, StockPiece};
