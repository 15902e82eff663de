//! Move engine - partial-quantity transfers between status/location states
//!
//! Status transitions:
//!
//! ```text
//! AVAILABLE ──► RESERVED ──► AVAILABLE
//! AVAILABLE | RESERVED ──► CONSUMED   (terminal)
//! AVAILABLE | RESERVED ──► SCRAP      (terminal, note mandatory)
//! ```
//!
//! Lateral moves (same status, new location) are allowed for non-terminal rows.
//! Moving the whole row mutates it in place; moving part of it splits the row
//! and routes the moved quantity through the identity resolver.

use serde::{Deserialize, Serialize};
use serde_json::json;

use rusqlite::Connection;

use crate::core::error::{Result, StockError};
use crate::core::events::{ActionType, Journal};
use crate::core::ids::{PieceId, ProjectId};
use crate::core::resolver;
use crate::core::store::{self, lock_piece};
use crate::entities::{Location, PieceStatus, StockPiece};

/// Check if a status transition is valid
pub fn is_valid_transition(from: PieceStatus, to: PieceStatus) -> bool {
    matches!(
        (from, to),
        // Lateral moves keep the status
        (PieceStatus::Available, PieceStatus::Available)
            | (PieceStatus::Reserved, PieceStatus::Reserved)
            // Reservation and release
            | (PieceStatus::Available, PieceStatus::Reserved)
            | (PieceStatus::Reserved, PieceStatus::Available)
            // Terminal
            | (PieceStatus::Available | PieceStatus::Reserved, PieceStatus::Consumed)
            | (PieceStatus::Available | PieceStatus::Reserved, PieceStatus::Scrap)
    )
}

/// Get allowed status changes from the current status
pub fn allowed_transitions(current: PieceStatus) -> Vec<PieceStatus> {
    match current {
        PieceStatus::Available => vec![
            PieceStatus::Reserved,
            PieceStatus::Consumed,
            PieceStatus::Scrap,
        ],
        PieceStatus::Reserved => vec![
            PieceStatus::Available,
            PieceStatus::Consumed,
            PieceStatus::Scrap,
        ],
        PieceStatus::Consumed | PieceStatus::Scrap => vec![],
    }
}

/// A request to move pieces of a row to another state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub piece: PieceId,
    /// Pieces to move; `None` takes whatever the row holds once it is locked
    #[serde(default)]
    pub qty: Option<u32>,
    pub status: PieceStatus,
    /// `None` keeps the source row's location
    #[serde(default)]
    pub location: Option<Location>,
    /// Project binding for the moved pieces; `None` keeps the source binding
    /// (releasing to AVAILABLE always unbinds)
    #[serde(default)]
    pub project: Option<ProjectId>,
    #[serde(default)]
    pub note: Option<String>,
    /// Extra event metadata (e.g. consumption mode)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl MoveRequest {
    pub fn new(piece: PieceId, qty: u32, status: PieceStatus) -> Self {
        Self {
            qty: Some(qty),
            ..Self::whole_row(piece, status)
        }
    }

    /// Move the entire row, sized under the lock
    pub fn whole_row(piece: PieceId, status: PieceStatus) -> Self {
        Self {
            piece,
            qty: None,
            status,
            location: None,
            project: None,
            note: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn to_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn for_project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    fn note(&self) -> Option<&str> {
        self.note.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Ids touched by a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Source row, when it kept part of its quantity
    pub source: Option<PieceId>,
    /// Row now holding the moved pieces
    pub dest: PieceId,
}

/// Validate a move before any lock is taken
///
/// Applies the production rule when the target location is named, and
/// checks quantity and the mandatory SCRAP note. [`move_piece`] applies the
/// rule again once the effective location is known.
pub fn prepare(mut request: MoveRequest) -> Result<MoveRequest> {
    if request.qty == Some(0) {
        return Err(StockError::InvalidQuantity);
    }
    if let Some(location) = request.location {
        if location.forces_reserved() && request.status != PieceStatus::Reserved {
            tracing::debug!(
                piece = %request.piece,
                requested = %request.status,
                "moving into production forces RESERVED"
            );
            request.status = PieceStatus::Reserved;
        }
    }
    if request.status == PieceStatus::Scrap && request.note().is_none() {
        return Err(StockError::MandatoryNoteMissing);
    }
    Ok(request)
}

/// Status the moved pieces land in at `location`
///
/// Producție never holds AVAILABLE pieces.
pub fn settle_status(requested: PieceStatus, location: Location) -> PieceStatus {
    if location.forces_reserved() && requested == PieceStatus::Available {
        PieceStatus::Reserved
    } else {
        requested
    }
}

fn action_for(from: PieceStatus, to: PieceStatus) -> ActionType {
    match (from, to) {
        (_, PieceStatus::Consumed) => ActionType::Consumed,
        (_, PieceStatus::Scrap) => ActionType::Scrapped,
        (PieceStatus::Available, PieceStatus::Reserved) => ActionType::Reserved,
        (PieceStatus::Reserved, PieceStatus::Available) => ActionType::Released,
        _ => ActionType::Moved,
    }
}

fn target_project(
    source: &StockPiece,
    status: PieceStatus,
    requested: Option<ProjectId>,
) -> Option<ProjectId> {
    if source.status == PieceStatus::Reserved && status == PieceStatus::Available {
        return None;
    }
    requested.or(source.project_id)
}

/// Move part or all of a row; must run inside the caller's write transaction
///
/// The request must already have gone through [`prepare`]. Quantity, location
/// and the production rule are resolved against the locked row.
pub fn move_piece(conn: &Connection, request: &MoveRequest, journal: &mut Journal) -> Result<MoveOutcome> {
    let source = lock_piece(conn, request.piece)?;

    let qty = request.qty.unwrap_or(source.qty);
    let location = request.location.unwrap_or(source.location);
    let status = settle_status(request.status, location);
    if status != request.status {
        tracing::debug!(
            piece = %source.id,
            requested = %request.status,
            "pieces stay in production, forcing RESERVED"
        );
    }

    if !is_valid_transition(source.status, status) {
        return Err(StockError::InvalidStatusTransition {
            piece: source.id,
            from: source.status,
            to: status,
        });
    }
    if qty > source.qty {
        return Err(StockError::QuantityExceedsAvailable {
            piece: source.id,
            requested: qty,
            available: source.qty,
        });
    }

    let project = target_project(&source, status, request.project);
    if status == PieceStatus::Reserved && project.is_none() {
        return Err(StockError::ProjectRequired);
    }

    let action = action_for(source.status, status);
    let mut metadata = request.metadata.clone();
    if metadata.is_null() {
        metadata = json!({});
    }
    if let Some(map) = metadata.as_object_mut() {
        map.insert("qty".to_string(), json!(qty));
        map.insert("from_status".to_string(), json!(source.status));
        map.insert("from_location".to_string(), json!(source.location));
        if status != request.status {
            map.insert("requested_status".to_string(), json!(request.status));
        }
    }

    if qty == source.qty {
        store::update_state(conn, source.id, status, location, project)?;
        if let Some(note) = request.note() {
            store::append_note(conn, source.id, note)?;
        }
        journal.record(
            action,
            source.id,
            Some(source.clone()),
            Some(lock_piece(conn, source.id)?),
            metadata,
        );
        let merged = resolver::absorb_identical(conn, source.id, journal)?;
        tracing::info!(
            piece = %source.id,
            qty = merged.qty,
            status = %status,
            location = %location,
            "moved whole row"
        );
        return Ok(MoveOutcome {
            source: None,
            dest: source.id,
        });
    }

    let remaining = store::decrement_qty(conn, &source, qty)?;
    let descriptor = source.descriptor().moved_to(status, location, project);
    let dest = resolver::upsert(conn, &descriptor, qty, request.note(), journal)?;

    journal.record(
        ActionType::Split,
        source.id,
        Some(source.clone()),
        Some(lock_piece(conn, source.id)?),
        json!({ "taken_qty": qty, "remaining_qty": remaining, "dest": dest.id }),
    );
    journal.record(action, dest.id, None, Some(lock_piece(conn, dest.id)?), metadata);

    tracing::info!(
        source = %source.id,
        dest = %dest.id,
        qty,
        status = %status,
        location = %location,
        merged = dest.merged,
        "moved part of row"
    );
    Ok(MoveOutcome {
        source: Some(source.id),
        dest: dest.id,
    })
}

/// Return every RESERVED row of a project to AVAILABLE, unbound
///
/// Rows held in Producție go back to Depozit. CONSUMED and SCRAP rows keep
/// their project binding as history.
pub fn release_project(
    conn: &Connection,
    project: ProjectId,
    note: Option<&str>,
    journal: &mut Journal,
) -> Result<Vec<PieceId>> {
    let reserved = store::query_pieces(
        conn,
        &store::PieceFilter {
            project: Some(project),
            status: Some(PieceStatus::Reserved),
            ..Default::default()
        },
    )?;

    let mut released = Vec::with_capacity(reserved.len());
    for piece in reserved {
        // An earlier release in this loop may have absorbed this row already
        let Some(current) = store::find_piece(conn, piece.id)? else {
            continue;
        };
        let mut request = MoveRequest::whole_row(current.id, PieceStatus::Available);
        if current.location.forces_reserved() {
            request = request.to_location(Location::Depozit);
        }
        request.note = note.map(str::to_string);
        request.metadata = json!({ "released_project": project });
        let outcome = move_piece(conn, &request, journal)?;
        if !released.contains(&outcome.dest) {
            released.push(outcome.dest);
        }
    }

    // Later releases can absorb rows released earlier in the loop
    let mut surviving = Vec::with_capacity(released.len());
    for id in released {
        if store::find_piece(conn, id)?.is_some() {
            surviving.push(id);
        }
    }
    Ok(surviving)
}
