//! Consumption - marking material as physically used
//!
//! Consumption is a move to CONSUMED that keeps the piece where it is. The HALF
//! mode does not cut the piece or create a remainder row: it only travels as a
//! costing coefficient in the event metadata.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::error::Result;
use crate::core::events::Journal;
use crate::core::ids::PieceId;
use crate::core::movement::{self, MoveOutcome, MoveRequest};
use crate::entities::PieceStatus;

/// How much of each consumed piece downstream costing should charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum ConsumptionMode {
    #[default]
    Full,
    Half,
}

impl ConsumptionMode {
    /// Costing coefficient applied per consumed piece
    pub fn coefficient(self) -> f64 {
        match self {
            ConsumptionMode::Full => 1.0,
            ConsumptionMode::Half => 0.5,
        }
    }
}

impl std::fmt::Display for ConsumptionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsumptionMode::Full => write!(f, "FULL"),
            ConsumptionMode::Half => write!(f, "HALF"),
        }
    }
}

/// Build the move request for a consumption
pub fn consume_request(
    piece: PieceId,
    qty: u32,
    mode: ConsumptionMode,
    note: Option<&str>,
) -> Result<MoveRequest> {
    let mut request = MoveRequest::new(piece, qty, PieceStatus::Consumed);
    request.note = note.map(str::to_string);
    request.metadata = json!({
        "mode": mode,
        "coefficient": mode.coefficient(),
    });
    movement::prepare(request)
}

/// Consume `qty` pieces of a row; must run inside the caller's write transaction
pub fn consume(
    conn: &Connection,
    piece: PieceId,
    qty: u32,
    mode: ConsumptionMode,
    note: Option<&str>,
    journal: &mut Journal,
) -> Result<MoveOutcome> {
    let request = consume_request(piece, qty, mode, note)?;
    movement::move_piece(conn, &request, journal)
}
