//! Read-only stock totals for a board

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::core::classify::{classify_offcut_bucket, OffcutBucket};
use crate::core::error::Result;
use crate::core::store::{query_pieces, PieceFilter};
use crate::entities::{BoardType, PieceStatus, PieceType};

/// Totals for one status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub status: PieceStatus,
    pub full_qty: u32,
    pub offcut_qty: u32,
    pub area_m2: f64,
}

/// Quantity of AVAILABLE offcuts per size bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub gt_half: u32,
    pub half_to_quarter: u32,
    pub lt_quarter: u32,
}

impl BucketCounts {
    fn add(&mut self, bucket: OffcutBucket, qty: u32) {
        match bucket {
            OffcutBucket::GtHalf => self.gt_half += qty,
            OffcutBucket::HalfToQuarter => self.half_to_quarter += qty,
            OffcutBucket::LtQuarter => self.lt_quarter += qty,
        }
    }
}

/// Stock picture of one board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub board: BoardType,
    /// Accounting pieces only, one entry per status
    pub totals: Vec<StatusTotals>,
    /// All AVAILABLE offcuts, internal ones included
    pub offcut_buckets: BucketCounts,
}

impl StockSummary {
    pub fn totals_for(&self, status: PieceStatus) -> Option<&StatusTotals> {
        self.totals.iter().find(|t| t.status == status)
    }
}

/// Summarize the stock of a board
pub fn stock_summary(conn: &Connection, board: &BoardType) -> Result<StockSummary> {
    let pieces = query_pieces(
        conn,
        &PieceFilter {
            board: Some(board.id),
            ..Default::default()
        },
    )?;

    let mut totals: Vec<StatusTotals> = [
        PieceStatus::Available,
        PieceStatus::Reserved,
        PieceStatus::Consumed,
        PieceStatus::Scrap,
    ]
    .into_iter()
    .map(|status| StatusTotals {
        status,
        full_qty: 0,
        offcut_qty: 0,
        area_m2: 0.0,
    })
    .collect();
    let mut buckets = BucketCounts::default();

    for piece in &pieces {
        if piece.status == PieceStatus::Available && piece.piece_type == PieceType::Offcut {
            let bucket = classify_offcut_bucket(
                piece.width_mm,
                piece.height_mm,
                board.std_width_mm,
                board.std_height_mm,
            );
            buckets.add(bucket, piece.qty);
        }
        if !piece.is_accounting {
            continue;
        }
        if let Some(entry) = totals.iter_mut().find(|t| t.status == piece.status) {
            match piece.piece_type {
                PieceType::Full => entry.full_qty += piece.qty,
                PieceType::Offcut => entry.offcut_qty += piece.qty,
            }
            entry.area_m2 += piece.area_total_m2();
        }
    }

    Ok(StockSummary {
        board: board.clone(),
        totals,
        offcut_buckets: buckets,
    })
}
