//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::HashMap;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::{format_project, format_size, truncate_str};
use crate::cli::OutputFormat;
use crate::core::ids::BoardId;
use crate::entities::{BoardType, StockPiece};

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_list {
                OutputFormat::Table
            } else {
                OutputFormat::Yaml
            }
        }
        other => other,
    }
}

/// Print a value as JSON or YAML; returns false for other formats
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Print rows as a table or CSV
pub fn print_rows<R: Tabled + Serialize>(rows: &[R], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                writer.serialize(row).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        _ => {
            let mut table = Table::new(rows);
            table.with(Style::psql());
            println!("{}", table);
        }
    }
    Ok(())
}

/// One line of a piece listing
#[derive(Debug, Tabled, Serialize)]
pub struct PieceRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "BOARD")]
    pub board: String,
    #[tabled(rename = "TYPE")]
    pub piece_type: String,
    #[tabled(rename = "STATUS")]
    pub status: String,
    #[tabled(rename = "SIZE")]
    pub size: String,
    #[tabled(rename = "QTY")]
    pub qty: u32,
    #[tabled(rename = "LOCATION")]
    pub location: String,
    #[tabled(rename = "PROJECT")]
    pub project: String,
    #[tabled(rename = "ACCT")]
    pub accounting: String,
    #[tabled(rename = "AREA m²")]
    pub area_m2: String,
    #[tabled(rename = "NOTES")]
    pub notes: String,
}

impl PieceRow {
    pub fn new(piece: &StockPiece, board_codes: &HashMap<BoardId, String>) -> Self {
        Self {
            id: piece.id.get(),
            board: board_codes
                .get(&piece.board_id)
                .cloned()
                .unwrap_or_else(|| piece.board_id.to_string()),
            piece_type: piece.piece_type.to_string(),
            status: piece.status.to_string(),
            size: format_size(piece.width_mm, piece.height_mm),
            qty: piece.qty,
            location: piece.location.to_string(),
            project: format_project(piece.project_id),
            accounting: if piece.is_accounting { "yes" } else { "no" }.to_string(),
            area_m2: format!("{:.3}", piece.area_total_m2()),
            notes: truncate_str(piece.notes.lines().last().unwrap_or_default(), 30),
        }
    }
}

/// One line of a board listing
#[derive(Debug, Tabled, Serialize)]
pub struct BoardRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "CODE")]
    pub code: String,
    #[tabled(rename = "BRAND")]
    pub brand: String,
    #[tabled(rename = "THICKNESS")]
    pub thickness_mm: String,
    #[tabled(rename = "STANDARD")]
    pub standard: String,
    #[tabled(rename = "PRICE")]
    pub price: String,
}

impl From<&BoardType> for BoardRow {
    fn from(board: &BoardType) -> Self {
        Self {
            id: board.id.get(),
            code: board.code.clone(),
            brand: board.brand.clone(),
            thickness_mm: format!("{}", board.thickness_mm),
            standard: format_size(board.std_width_mm, board.std_height_mm),
            price: board
                .sale_price
                .map(|p| format!("{:.2}", p))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}
