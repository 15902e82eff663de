//! Board type - catalog entry for a sheet-material product

use serde::{Deserialize, Serialize};

use crate::core::ids::BoardId;

/// A board type from the catalog
///
/// Only `std_width_mm` x `std_height_mm` counts as a standard (FULL) sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardType {
    /// Catalog row id
    pub id: BoardId,

    /// Unique human key (e.g., "PAL-EGGER-W1000-18")
    pub code: String,

    /// Manufacturer / brand
    pub brand: String,

    /// Thickness in millimetres
    pub thickness_mm: f64,

    /// Standard sheet width in millimetres
    pub std_width_mm: u32,

    /// Standard sheet height in millimetres
    pub std_height_mm: u32,

    /// Sale price per standard sheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
}

impl BoardType {
    /// Check whether the given dimensions are exactly the standard sheet
    pub fn is_standard(&self, width_mm: u32, height_mm: u32) -> bool {
        width_mm == self.std_width_mm && height_mm == self.std_height_mm
    }

    /// Area of one standard sheet in square metres
    pub fn std_area_m2(&self) -> f64 {
        f64::from(self.std_width_mm) * f64::from(self.std_height_mm) / 1_000_000.0
    }
}

/// Input for adding a board type to the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBoard {
    pub code: String,
    pub brand: String,
    pub thickness_mm: f64,
    pub std_width_mm: u32,
    pub std_height_mm: u32,
    #[serde(default)]
    pub sale_price: Option<f64>,
}
