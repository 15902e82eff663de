//! Stock engine integration tests

mod common;

use common::{add_full, memory_engine, new_piece, pal18};
use sheetstock::core::{
    ActionType, ConsumptionMode, EventError, EventSink, MoveRequest, PieceFilter, PieceStore,
    ProjectId, StockEngine, StockError, StockEvent,
};
use sheetstock::entities::{Location, PieceStatus, PieceType};

const PROJECT: ProjectId = ProjectId(7);

fn rows(engine: &StockEngine, status: PieceStatus) -> Vec<sheetstock::entities::StockPiece> {
    engine
        .list_pieces(&PieceFilter {
            status: Some(status),
            ..Default::default()
        })
        .unwrap()
}

// ============================================================================
// Intake and identity
// ============================================================================

#[test]
fn test_identical_intake_cumulates() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);

    let first = engine.upsert_piece(new_piece(board, 1000, 500, 2)).unwrap();
    let second = engine.upsert_piece(new_piece(board, 1000, 500, 3)).unwrap();

    assert!(!first.merged);
    assert!(second.merged);
    assert_eq!(first.id, second.id);
    assert_eq!(engine.piece(first.id).unwrap().qty, 5);
}

#[test]
fn test_cumulation_is_order_independent() {
    let (mut a, _) = memory_engine();
    let (mut b, _) = memory_engine();
    let board_a = pal18(&mut a);
    let board_b = pal18(&mut b);

    for qty in [1, 4, 2] {
        a.upsert_piece(new_piece(board_a, 800, 600, qty)).unwrap();
    }
    for qty in [2, 1, 4] {
        b.upsert_piece(new_piece(board_b, 800, 600, qty)).unwrap();
    }

    let rows_a = rows(&a, PieceStatus::Available);
    let rows_b = rows(&b, PieceStatus::Available);
    assert_eq!(rows_a.len(), 1);
    assert_eq!(rows_b.len(), 1);
    assert_eq!(rows_a[0].qty, 7);
    assert_eq!(rows_b[0].qty, 7);
}

#[test]
fn test_different_location_is_a_different_row() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);

    let depozit = engine.upsert_piece(new_piece(board, 1000, 500, 1)).unwrap();
    let mut magazin = new_piece(board, 1000, 500, 1);
    magazin.location = Location::Magazin;
    let magazin = engine.upsert_piece(magazin).unwrap();

    assert_ne!(depozit.id, magazin.id);
    assert!(!magazin.merged);
}

#[test]
fn test_intake_in_production_is_reserved() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);

    let mut piece = new_piece(board, 1200, 800, 2);
    piece.location = Location::Productie;
    let err = engine.upsert_piece(piece.clone()).unwrap_err();
    assert!(matches!(err, StockError::ProjectRequired));
    assert!(engine.list_pieces(&PieceFilter::default()).unwrap().is_empty());

    piece.project_id = Some(PROJECT);
    let outcome = engine.upsert_piece(piece).unwrap();
    assert_eq!(outcome.status, PieceStatus::Reserved);

    let stored = engine.piece(outcome.id).unwrap();
    assert_eq!(stored.status, PieceStatus::Reserved);
    assert_eq!(stored.location, Location::Productie);
    assert_eq!(stored.project_id, Some(PROJECT));
    assert!(rows(&engine, PieceStatus::Available).is_empty());
}

#[test]
fn test_non_standard_full_is_reclassified() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);

    let outcome = engine.upsert_piece(new_piece(board, 2800, 2069, 1)).unwrap();
    assert!(outcome.reclassified);
    assert_eq!(outcome.piece_type, PieceType::Offcut);
    assert_eq!(engine.piece(outcome.id).unwrap().piece_type, PieceType::Offcut);
}

#[test]
fn test_intake_rejects_bad_input() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);

    let err = engine.upsert_piece(new_piece(board, 0, 500, 1)).unwrap_err();
    assert!(matches!(err, StockError::InvalidDimensions { .. }));

    let err = engine.upsert_piece(new_piece(board, 100, 500, 0)).unwrap_err();
    assert!(matches!(err, StockError::InvalidQuantity));

    assert!(rows(&engine, PieceStatus::Available).is_empty());
}

// ============================================================================
// Reservation
// ============================================================================

#[test]
fn test_reserving_twice_splits_two_rows() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = add_full(&mut engine, board, 5);

    let first = engine.reserve_one_full_board(board, PROJECT, "").unwrap();
    let second = engine.reserve_one_full_board(board, PROJECT, "").unwrap();

    assert_ne!(first, second);
    assert_eq!(engine.piece(stock).unwrap().qty, 3);

    let reserved = rows(&engine, PieceStatus::Reserved);
    assert_eq!(reserved.len(), 2);
    for row in &reserved {
        assert_eq!(row.qty, 1);
        assert_eq!(row.project_id, Some(PROJECT));
        assert_eq!(row.piece_type, PieceType::Full);
    }
}

#[test]
fn test_reserving_last_board_changes_row_in_place() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = add_full(&mut engine, board, 1);

    let reserved = engine.reserve_one_full_board(board, PROJECT, "for kitchen").unwrap();
    assert_eq!(reserved, stock);

    let piece = engine.piece(stock).unwrap();
    assert_eq!(piece.status, PieceStatus::Reserved);
    assert!(piece.notes.contains("for kitchen"));
}

#[test]
fn test_reservation_takes_oldest_row_first() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);

    let older = add_full(&mut engine, board, 1);
    let mut newer = new_piece(board, 2800, 2070, 1);
    newer.location = Location::Magazin;
    let newer = engine.upsert_piece(newer).unwrap().id;

    assert_eq!(engine.reserve_one_full_board(board, PROJECT, "").unwrap(), older);
    assert_eq!(engine.reserve_one_full_board(board, PROJECT, "").unwrap(), newer);
}

#[test]
fn test_reservation_without_stock_fails() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    engine.upsert_piece(new_piece(board, 1200, 800, 4)).unwrap();

    let err = engine.reserve_one_full_board(board, PROJECT, "").unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { .. }));
}

#[test]
fn test_batch_reservation_is_all_or_nothing() {
    let (mut engine, sink) = memory_engine();
    let board = pal18(&mut engine);
    let stock = add_full(&mut engine, board, 2);
    let events_before = sink.events().len();

    let err = engine.reserve_full_boards(board, PROJECT, 3, "").unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { .. }));

    assert_eq!(engine.piece(stock).unwrap().qty, 2);
    assert!(rows(&engine, PieceStatus::Reserved).is_empty());
    assert_eq!(sink.events().len(), events_before);

    let ids = engine.reserve_full_boards(board, PROJECT, 2, "").unwrap();
    assert_eq!(ids.len(), 2);
    assert!(rows(&engine, PieceStatus::Available).is_empty());
}

#[test]
fn test_reservation_on_unknown_board_fails() {
    let (mut engine, _) = memory_engine();
    let err = engine
        .reserve_one_full_board(sheetstock::core::BoardId(99), PROJECT, "")
        .unwrap_err();
    assert!(matches!(err, StockError::BoardNotFound(_)));
}

// ============================================================================
// Moves
// ============================================================================

#[test]
fn test_partial_move_splits_then_merges() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = engine.upsert_piece(new_piece(board, 1200, 800, 4)).unwrap().id;

    let request = || {
        MoveRequest::new(stock, 1, PieceStatus::Available).to_location(Location::Magazin)
    };
    let first = engine.move_piece(request()).unwrap();
    let second = engine.move_piece(request()).unwrap();

    assert_eq!(first.source, Some(stock));
    assert_eq!(first.dest, second.dest);
    assert_eq!(engine.piece(stock).unwrap().qty, 2);

    let dest = engine.piece(first.dest).unwrap();
    assert_eq!(dest.qty, 2);
    assert_eq!(dest.location, Location::Magazin);
}

#[test]
fn test_whole_row_move_absorbs_identical_row() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);

    let depozit = engine.upsert_piece(new_piece(board, 1200, 800, 2)).unwrap().id;
    let mut magazin = new_piece(board, 1200, 800, 1);
    magazin.location = Location::Magazin;
    engine.upsert_piece(magazin).unwrap();

    let outcome = engine
        .move_piece(MoveRequest::new(depozit, 2, PieceStatus::Available).to_location(Location::Magazin))
        .unwrap();
    assert_eq!(outcome.source, None);

    let available = rows(&engine, PieceStatus::Available);
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, outcome.dest);
    assert_eq!(available[0].qty, 3);
    assert_eq!(available[0].location, Location::Magazin);
}

#[test]
fn test_move_into_production_forces_reserved() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = engine.upsert_piece(new_piece(board, 1200, 800, 3)).unwrap().id;

    let outcome = engine
        .move_piece(
            MoveRequest::new(stock, 1, PieceStatus::Available)
                .to_location(Location::Productie)
                .for_project(PROJECT),
        )
        .unwrap();

    let dest = engine.piece(outcome.dest).unwrap();
    assert_eq!(dest.status, PieceStatus::Reserved);
    assert_eq!(dest.location, Location::Productie);
    assert_eq!(dest.project_id, Some(PROJECT));
    assert_eq!(engine.piece(stock).unwrap().qty, 2);
}

#[test]
fn test_production_rows_stay_reserved_without_target_location() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = engine.upsert_piece(new_piece(board, 1200, 800, 3)).unwrap().id;
    engine
        .move_piece(
            MoveRequest::new(stock, 3, PieceStatus::Reserved)
                .to_location(Location::Productie)
                .for_project(PROJECT),
        )
        .unwrap();

    // No location given: the pieces stay in Producție, so they stay RESERVED
    let outcome = engine
        .move_piece(MoveRequest::new(stock, 1, PieceStatus::Available))
        .unwrap();
    let dest = engine.piece(outcome.dest).unwrap();
    assert_eq!(dest.status, PieceStatus::Reserved);
    assert_eq!(dest.location, Location::Productie);
    assert_eq!(dest.project_id, Some(PROJECT));
    assert!(rows(&engine, PieceStatus::Available).is_empty());

    let outcome = engine
        .move_piece(
            MoveRequest::whole_row(stock, PieceStatus::Available).to_location(Location::Depozit),
        )
        .unwrap();
    let back = engine.piece(outcome.dest).unwrap();
    assert_eq!(back.status, PieceStatus::Available);
    assert_eq!(back.location, Location::Depozit);
    assert_eq!(back.project_id, None);
    assert_eq!(back.qty, 3);
}

#[test]
fn test_reserving_requires_a_project() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = engine.upsert_piece(new_piece(board, 1200, 800, 2)).unwrap().id;
    let before = engine.piece(stock).unwrap();

    let err = engine
        .move_piece(MoveRequest::new(stock, 1, PieceStatus::Reserved))
        .unwrap_err();
    assert!(matches!(err, StockError::ProjectRequired));
    assert_eq!(engine.piece(stock).unwrap(), before);

    let err = engine
        .move_piece(
            MoveRequest::new(stock, 1, PieceStatus::Available).to_location(Location::Productie),
        )
        .unwrap_err();
    assert!(matches!(err, StockError::ProjectRequired));
    assert_eq!(engine.piece(stock).unwrap(), before);
    assert!(rows(&engine, PieceStatus::Reserved).is_empty());
}

#[test]
fn test_whole_row_move_takes_quantity_at_execution() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = engine.upsert_piece(new_piece(board, 1200, 800, 2)).unwrap().id;

    let request = MoveRequest::whole_row(stock, PieceStatus::Reserved).for_project(PROJECT);
    // The row grows after the request was built
    engine.upsert_piece(new_piece(board, 1200, 800, 3)).unwrap();

    let outcome = engine.move_piece(request).unwrap();
    assert_eq!(outcome.source, None);
    assert_eq!(outcome.dest, stock);

    let reserved = engine.piece(stock).unwrap();
    assert_eq!(reserved.status, PieceStatus::Reserved);
    assert_eq!(reserved.qty, 5);
    assert!(rows(&engine, PieceStatus::Available).is_empty());
}

#[test]
fn test_move_more_than_row_holds_fails() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = add_full(&mut engine, board, 2);

    let err = engine
        .move_piece(MoveRequest::new(stock, 3, PieceStatus::Reserved))
        .unwrap_err();
    assert!(matches!(
        err,
        StockError::QuantityExceedsAvailable {
            requested: 3,
            available: 2,
            ..
        }
    ));
    assert_eq!(engine.piece(stock).unwrap().qty, 2);
}

#[test]
fn test_terminal_rows_cannot_move() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = add_full(&mut engine, board, 2);

    engine.consume(stock, 2, None).unwrap();
    let consumed = engine.piece(stock).unwrap();
    assert_eq!(consumed.status, PieceStatus::Consumed);

    let err = engine
        .move_piece(MoveRequest::new(stock, 1, PieceStatus::Available))
        .unwrap_err();
    assert!(matches!(err, StockError::InvalidStatusTransition { .. }));
    assert_eq!(engine.piece(stock).unwrap(), consumed);

    let err = engine.consume(stock, 1, None).unwrap_err();
    assert!(matches!(
        err,
        StockError::InvalidStatusTransition {
            from: PieceStatus::Consumed,
            to: PieceStatus::Consumed,
            ..
        }
    ));
    assert_eq!(engine.piece(stock).unwrap(), consumed);
}

#[test]
fn test_scrap_rows_cannot_move_or_be_consumed() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = engine.upsert_piece(new_piece(board, 600, 400, 2)).unwrap().id;

    engine
        .move_piece(MoveRequest::new(stock, 2, PieceStatus::Scrap).with_note("water damage"))
        .unwrap();
    let scrap = engine.piece(stock).unwrap();
    assert_eq!(scrap.status, PieceStatus::Scrap);

    let err = engine
        .move_piece(MoveRequest::new(stock, 1, PieceStatus::Available))
        .unwrap_err();
    assert!(matches!(
        err,
        StockError::InvalidStatusTransition {
            from: PieceStatus::Scrap,
            to: PieceStatus::Available,
            ..
        }
    ));
    assert_eq!(engine.piece(stock).unwrap(), scrap);

    let err = engine.consume(stock, 1, None).unwrap_err();
    assert!(matches!(
        err,
        StockError::InvalidStatusTransition {
            from: PieceStatus::Scrap,
            to: PieceStatus::Consumed,
            ..
        }
    ));
    assert_eq!(engine.piece(stock).unwrap(), scrap);
}

#[test]
fn test_scrap_requires_a_note() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = engine.upsert_piece(new_piece(board, 600, 400, 2)).unwrap().id;

    let err = engine
        .move_piece(MoveRequest::new(stock, 1, PieceStatus::Scrap))
        .unwrap_err();
    assert!(matches!(err, StockError::MandatoryNoteMissing));

    let err = engine
        .move_piece(MoveRequest::new(stock, 1, PieceStatus::Scrap).with_note("   "))
        .unwrap_err();
    assert!(matches!(err, StockError::MandatoryNoteMissing));

    let outcome = engine
        .move_piece(MoveRequest::new(stock, 1, PieceStatus::Scrap).with_note("chipped edge"))
        .unwrap();
    let scrap = engine.piece(outcome.dest).unwrap();
    assert_eq!(scrap.status, PieceStatus::Scrap);
    assert!(scrap.notes.contains("chipped edge"));
}

// ============================================================================
// Consumption and release
// ============================================================================

#[test]
fn test_half_consumption_is_recorded_in_event_metadata() {
    let (mut engine, sink) = memory_engine();
    let board = pal18(&mut engine);
    let stock = add_full(&mut engine, board, 3);

    let outcome = engine
        .consume_with_mode(stock, 1, ConsumptionMode::Half, Some("lot 12"))
        .unwrap();

    let consumed = engine.piece(outcome.dest).unwrap();
    assert_eq!(consumed.status, PieceStatus::Consumed);
    assert_eq!(consumed.qty, 1);
    assert_eq!(consumed.location, Location::Depozit);

    let event = sink
        .events()
        .into_iter()
        .rev()
        .find(|e| e.action == ActionType::Consumed)
        .unwrap();
    assert_eq!(event.metadata["mode"], "HALF");
    assert_eq!(event.metadata["coefficient"], 0.5);
}

#[test]
fn test_release_project_returns_reserved_rows() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    add_full(&mut engine, board, 3);
    engine.reserve_full_boards(board, PROJECT, 2, "").unwrap();

    let released = engine.release_project(PROJECT, Some("project cancelled")).unwrap();
    assert!(!released.is_empty());

    assert!(rows(&engine, PieceStatus::Reserved).is_empty());
    let available = rows(&engine, PieceStatus::Available);
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].qty, 3);
    assert_eq!(available[0].project_id, None);
    assert!(released.contains(&available[0].id));
}

#[test]
fn test_release_keeps_consumed_history() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    add_full(&mut engine, board, 1);
    let reserved = engine.reserve_one_full_board(board, PROJECT, "").unwrap();
    engine.consume(reserved, 1, None).unwrap();

    assert!(engine.release_project(PROJECT, None).unwrap().is_empty());
    let consumed = engine.piece(reserved).unwrap();
    assert_eq!(consumed.status, PieceStatus::Consumed);
    assert_eq!(consumed.project_id, Some(PROJECT));
}

#[test]
fn test_release_moves_production_rows_to_depozit() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let project = ProjectId(9);
    add_full(&mut engine, board, 1);
    let reserved = engine.reserve_one_full_board(board, project, "").unwrap();
    engine
        .move_piece(
            MoveRequest::whole_row(reserved, PieceStatus::Reserved).to_location(Location::Productie),
        )
        .unwrap();
    assert_eq!(engine.piece(reserved).unwrap().project_id, Some(project));

    let released = engine.release_project(project, None).unwrap();
    assert_eq!(released, vec![reserved]);

    let piece = engine.piece(reserved).unwrap();
    assert_eq!(piece.status, PieceStatus::Available);
    assert_eq!(piece.location, Location::Depozit);
    assert_eq!(piece.project_id, None);
}

// ============================================================================
// Notes and deletion
// ============================================================================

#[test]
fn test_append_note_accumulates_lines() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    let stock = add_full(&mut engine, board, 1);

    engine.append_note(stock, "first").unwrap();
    let piece = engine.append_note(stock, "second").unwrap();
    assert_eq!(piece.notes, "first\nsecond");

    let unchanged = engine.append_note(stock, "  ").unwrap();
    assert_eq!(unchanged.notes, "first\nsecond");
}

#[test]
fn test_delete_rules() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);

    let mut internal = new_piece(board, 300, 300, 1);
    internal.is_accounting = false;
    let internal = engine.upsert_piece(internal).unwrap().id;

    let err = engine.delete_piece(internal, Some(true)).unwrap_err();
    assert!(matches!(err, StockError::AccountingMismatch { .. }));
    engine.delete_piece(internal, Some(false)).unwrap();
    assert!(matches!(
        engine.piece(internal).unwrap_err(),
        StockError::PieceNotFound(_)
    ));

    add_full(&mut engine, board, 1);
    let reserved = engine.reserve_one_full_board(board, PROJECT, "").unwrap();
    let err = engine.delete_piece(reserved, None).unwrap_err();
    assert!(matches!(err, StockError::PieceNotAvailable { .. }));
}

#[test]
fn test_board_in_use_cannot_be_deleted() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    add_full(&mut engine, board, 1);

    let err = engine.delete_board(board).unwrap_err();
    assert!(matches!(err, StockError::BoardInUse { pieces: 1, .. }));
}

// ============================================================================
// Summary
// ============================================================================

#[test]
fn test_stock_summary() {
    let (mut engine, _) = memory_engine();
    let board = pal18(&mut engine);
    add_full(&mut engine, board, 3);
    engine.upsert_piece(new_piece(board, 2000, 2000, 1)).unwrap();
    engine.upsert_piece(new_piece(board, 1500, 1500, 1)).unwrap();
    let mut internal = new_piece(board, 300, 300, 1);
    internal.is_accounting = false;
    engine.upsert_piece(internal).unwrap();
    engine.reserve_one_full_board(board, PROJECT, "").unwrap();

    let summary = engine.stock_summary(board).unwrap();
    let available = summary.totals_for(PieceStatus::Available).unwrap();
    assert_eq!(available.full_qty, 2);
    assert_eq!(available.offcut_qty, 2);
    assert_eq!(summary.totals_for(PieceStatus::Reserved).unwrap().full_qty, 1);

    assert_eq!(summary.offcut_buckets.gt_half, 1);
    assert_eq!(summary.offcut_buckets.half_to_quarter, 1);
    assert_eq!(summary.offcut_buckets.lt_quarter, 1);
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_events_follow_committed_changes() {
    let (mut engine, sink) = memory_engine();
    let board = pal18(&mut engine);
    let stock = add_full(&mut engine, board, 2);
    engine.reserve_one_full_board(board, PROJECT, "").unwrap();

    let actions: Vec<ActionType> = sink.events().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![ActionType::Created, ActionType::Split, ActionType::Reserved]
    );
    assert_eq!(sink.events()[1].entity_id, stock);
}

struct FailingSink;

impl EventSink for FailingSink {
    fn record_event(&self, _event: &StockEvent) -> Result<(), EventError> {
        Err(EventError::Unavailable("audit log offline".to_string()))
    }
}

#[test]
fn test_failing_sink_does_not_abort_operations() {
    let mut engine = StockEngine::new(PieceStore::open_in_memory().unwrap(), Box::new(FailingSink));
    let board = pal18(&mut engine);
    let stock = add_full(&mut engine, board, 2);

    engine.reserve_one_full_board(board, PROJECT, "").unwrap();
    assert_eq!(engine.piece(stock).unwrap().qty, 1);
}
