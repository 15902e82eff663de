//! Board catalog - read-mostly registry of board types

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::core::classify::validate_dimensions;
use crate::core::error::{Result, StockError};
use crate::core::ids::BoardId;
use crate::core::store::count_pieces_for_board;
use crate::entities::{BoardType, NewBoard};

const BOARD_COLUMNS: &str =
    "id, code, brand, thickness_mm, std_width_mm, std_height_mm, sale_price";

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<BoardType> {
    Ok(BoardType {
        id: row.get(0)?,
        code: row.get(1)?,
        brand: row.get(2)?,
        thickness_mm: row.get(3)?,
        std_width_mm: row.get(4)?,
        std_height_mm: row.get(5)?,
        sale_price: row.get(6)?,
    })
}

/// Add a board type; codes are unique
pub fn insert_board(conn: &Connection, board: &NewBoard) -> Result<BoardType> {
    validate_dimensions(board.std_width_mm, board.std_height_mm)?;
    let code = board.code.trim();
    if code.is_empty() {
        return Err(StockError::EmptyBoardCode);
    }
    if find_board_by_code(conn, code)?.is_some() {
        return Err(StockError::DuplicateBoardCode(code.to_string()));
    }

    conn.execute(
        "INSERT INTO board_types (code, brand, thickness_mm, std_width_mm, std_height_mm, sale_price)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            code,
            board.brand,
            board.thickness_mm,
            board.std_width_mm,
            board.std_height_mm,
            board.sale_price,
        ],
    )?;
    get_board(conn, BoardId(conn.last_insert_rowid()))
}

/// Fetch a board by id
pub fn get_board(conn: &Connection, id: BoardId) -> Result<BoardType> {
    let sql = format!("SELECT {} FROM board_types WHERE id = ?1", BOARD_COLUMNS);
    conn.query_row(&sql, [id], board_from_row)
        .optional()?
        .ok_or_else(|| StockError::BoardNotFound(id.to_string()))
}

/// Fetch a board by its human code (exact match)
pub fn find_board_by_code(conn: &Connection, code: &str) -> Result<Option<BoardType>> {
    let sql = format!("SELECT {} FROM board_types WHERE code = ?1", BOARD_COLUMNS);
    Ok(conn.query_row(&sql, [code], board_from_row).optional()?)
}

/// Resolve a board from user input: a code first, then a numeric id
pub fn resolve_board(conn: &Connection, key: &str) -> Result<BoardType> {
    if let Some(board) = find_board_by_code(conn, key.trim())? {
        return Ok(board);
    }
    match key.parse::<BoardId>() {
        Ok(id) => get_board(conn, id),
        Err(_) => Err(StockError::BoardNotFound(key.to_string())),
    }
}

/// All boards ordered by code
pub fn list_boards(conn: &Connection) -> Result<Vec<BoardType>> {
    let sql = format!("SELECT {} FROM board_types ORDER BY code", BOARD_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], board_from_row)?;
    let mut boards = Vec::new();
    for row in rows {
        boards.push(row?);
    }
    Ok(boards)
}

/// Delete a board; blocked while any stock row references it
pub fn delete_board(conn: &Connection, id: BoardId) -> Result<BoardType> {
    let board = get_board(conn, id)?;
    let pieces = count_pieces_for_board(conn, id)?;
    if pieces > 0 {
        return Err(StockError::BoardInUse { board: id, pieces });
    }
    conn.execute("DELETE FROM board_types WHERE id = ?1", [id])?;
    Ok(board)
}
