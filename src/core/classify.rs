//! Piece classification
//!
//! Pure functions: deciding FULL vs OFFCUT from actual vs standard dimensions, and
//! bucketing offcuts by their share of the standard sheet area.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, StockError};
use crate::entities::{BoardType, PieceType};

/// Coarse size class of an offcut relative to its board's standard sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffcutBucket {
    /// More than half a sheet
    GtHalf,
    /// Between a quarter and half a sheet, both ends inclusive
    HalfToQuarter,
    /// Less than a quarter of a sheet, or unknown standard size
    LtQuarter,
}

impl OffcutBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            OffcutBucket::GtHalf => "gt_half",
            OffcutBucket::HalfToQuarter => "half_to_quarter",
            OffcutBucket::LtQuarter => "lt_quarter",
        }
    }
}

impl std::fmt::Display for OffcutBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying an intake request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Type the piece will be stored as
    pub piece_type: PieceType,
    /// The stored type differs from what the caller asked for
    pub reclassified: bool,
}

/// Reject non-positive dimensions
pub fn validate_dimensions(width_mm: u32, height_mm: u32) -> Result<()> {
    if width_mm == 0 || height_mm == 0 {
        return Err(StockError::InvalidDimensions {
            width: width_mm,
            height: height_mm,
        });
    }
    Ok(())
}

/// FULL only for the exact standard dimensions, OFFCUT otherwise
pub fn classify_type(board: &BoardType, width_mm: u32, height_mm: u32) -> PieceType {
    if board.is_standard(width_mm, height_mm) {
        PieceType::Full
    } else {
        PieceType::Offcut
    }
}

/// Classify a piece against the type the caller requested
///
/// A mismatch is not an error: the dimensions win and `reclassified` is set so
/// the caller can warn the operator.
pub fn classify(
    board: &BoardType,
    width_mm: u32,
    height_mm: u32,
    requested: PieceType,
) -> Result<Classification> {
    validate_dimensions(width_mm, height_mm)?;
    let piece_type = classify_type(board, width_mm, height_mm);
    Ok(Classification {
        piece_type,
        reclassified: piece_type != requested,
    })
}

/// Share of the standard sheet area covered by a piece
///
/// `None` when either standard dimension is 0.
pub fn area_ratio(
    piece_width: u32,
    piece_height: u32,
    std_width: u32,
    std_height: u32,
) -> Option<f64> {
    if std_width == 0 || std_height == 0 {
        return None;
    }
    let piece = u64::from(piece_width) * u64::from(piece_height);
    let standard = u64::from(std_width) * u64::from(std_height);
    Some(piece as f64 / standard as f64)
}

/// Bucket an offcut: `> 0.5` gt_half, `[0.25, 0.5]` half_to_quarter, `< 0.25` lt_quarter
///
/// An unknown ratio falls into `lt_quarter`.
pub fn classify_offcut_bucket(
    piece_width: u32,
    piece_height: u32,
    std_width: u32,
    std_height: u32,
) -> OffcutBucket {
    match area_ratio(piece_width, piece_height, std_width, std_height) {
        Some(ratio) if ratio > 0.5 => OffcutBucket::GtHalf,
        Some(ratio) if ratio >= 0.25 => OffcutBucket::HalfToQuarter,
        _ => OffcutBucket::LtQuarter,
    }
}
