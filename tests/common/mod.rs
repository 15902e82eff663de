//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

use sheetstock::core::{BoardId, MemoryEventSink, PieceId, PieceStore, StockEngine};
use sheetstock::entities::{Location, NewBoard, NewPiece, PieceType};

/// Helper to get a sheetstock command
pub fn sheetstock() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("sheetstock"));
    cmd.env_remove("SHEETSTOCK_CONFIG").env_remove("SHEETSTOCK_LOG");
    cmd
}

/// Helper to create a test workspace in a temp directory
pub fn setup_test_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    sheetstock().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to register a board type through the CLI
pub fn add_board(tmp: &TempDir, code: &str, width: u32, height: u32) {
    sheetstock()
        .current_dir(tmp.path())
        .args([
            "board",
            "add",
            code,
            "--thickness",
            "18",
            "--width",
            &width.to_string(),
            "--height",
            &height.to_string(),
        ])
        .assert()
        .success();
}

/// Helper to add pieces through the CLI, returning the row id
pub fn add_pieces(tmp: &TempDir, board: &str, width: u32, height: u32, qty: u32) -> i64 {
    let output = sheetstock()
        .current_dir(tmp.path())
        .args([
            "-f",
            "id",
            "piece",
            "add",
            "--board",
            board,
            "--width",
            &width.to_string(),
            "--height",
            &height.to_string(),
            "--qty",
            &qty.to_string(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "piece add failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .unwrap()
}

/// In-memory engine whose events land in the returned sink
pub fn memory_engine() -> (StockEngine, MemoryEventSink) {
    let sink = MemoryEventSink::default();
    let engine = StockEngine::new(
        PieceStore::open_in_memory().unwrap(),
        Box::new(sink.clone()),
    );
    (engine, sink)
}

/// Register the 2800x2070 PAL-18 board used throughout the tests
pub fn pal18(engine: &mut StockEngine) -> BoardId {
    engine
        .add_board(NewBoard {
            code: "PAL-18".to_string(),
            brand: "Egger".to_string(),
            thickness_mm: 18.0,
            std_width_mm: 2800,
            std_height_mm: 2070,
            sale_price: Some(310.0),
        })
        .unwrap()
        .id
}

/// Intake request with defaults (Depozit, accounting, no project)
pub fn new_piece(board: BoardId, width: u32, height: u32, qty: u32) -> NewPiece {
    NewPiece {
        board_id: board,
        width_mm: width,
        height_mm: height,
        qty,
        requested_type: PieceType::Full,
        location: Location::Depozit,
        is_accounting: true,
        project_id: None,
        note: None,
    }
}

/// Add `qty` full boards and return the row id
pub fn add_full(engine: &mut StockEngine, board: BoardId, qty: u32) -> PieceId {
    engine
        .upsert_piece(new_piece(board, 2800, 2070, qty))
        .unwrap()
        .id
}
