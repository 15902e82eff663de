//! Stock piece entity - one row of physically identical cut pieces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ids::{BoardId, PieceId, ProjectId};

/// Whether a piece is a standard sheet or a remnant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum PieceType {
    /// Dimensions equal the board's standard sheet
    #[default]
    Full,
    /// Any other size
    Offcut,
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PieceType::Full => write!(f, "FULL"),
            PieceType::Offcut => write!(f, "OFFCUT"),
        }
    }
}

impl std::str::FromStr for PieceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FULL" => Ok(PieceType::Full),
            "OFFCUT" => Ok(PieceType::Offcut),
            _ => Err(format!("Invalid piece type: {}. Use FULL or OFFCUT", s)),
        }
    }
}

/// Lifecycle status of a piece row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum PieceStatus {
    #[default]
    Available,
    Reserved,
    /// Physically used (terminal)
    Consumed,
    /// Damaged or discarded (terminal)
    Scrap,
}

impl PieceStatus {
    /// CONSUMED and SCRAP rows never change status again
    pub fn is_terminal(self) -> bool {
        matches!(self, PieceStatus::Consumed | PieceStatus::Scrap)
    }
}

impl std::fmt::Display for PieceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PieceStatus::Available => write!(f, "AVAILABLE"),
            PieceStatus::Reserved => write!(f, "RESERVED"),
            PieceStatus::Consumed => write!(f, "CONSUMED"),
            PieceStatus::Scrap => write!(f, "SCRAP"),
        }
    }
}

impl std::str::FromStr for PieceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AVAILABLE" => Ok(PieceStatus::Available),
            "RESERVED" => Ok(PieceStatus::Reserved),
            "CONSUMED" => Ok(PieceStatus::Consumed),
            "SCRAP" => Ok(PieceStatus::Scrap),
            _ => Err(format!(
                "Invalid piece status: {}. Use available, reserved, consumed, or scrap",
                s
            )),
        }
    }
}

/// Physical location of a piece (fixed vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum Location {
    #[default]
    #[serde(rename = "Depozit")]
    Depozit,
    #[serde(rename = "Producție")]
    Productie,
    #[serde(rename = "Magazin")]
    Magazin,
    #[serde(rename = "Atelier")]
    Atelier,
    #[serde(rename = "Depozit(Stricat)")]
    DepozitStricat,
}

impl Location {
    pub const ALL: [Location; 5] = [
        Location::Depozit,
        Location::Productie,
        Location::Magazin,
        Location::Atelier,
        Location::DepozitStricat,
    ];

    /// Stored form of the location
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Depozit => "Depozit",
            Location::Productie => "Producție",
            Location::Magazin => "Magazin",
            Location::Atelier => "Atelier",
            Location::DepozitStricat => "Depozit(Stricat)",
        }
    }

    /// Pieces moved into production are always reserved
    pub fn forces_reserved(self) -> bool {
        self == Location::Productie
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Location {
    type Err = String;

    /// Accepts the stored form exactly, plus ASCII lowercase aliases for shell use
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(loc) = Location::ALL.iter().find(|l| l.as_str() == s) {
            return Ok(*loc);
        }
        match s {
            "depozit" => Ok(Location::Depozit),
            "productie" => Ok(Location::Productie),
            "magazin" => Ok(Location::Magazin),
            "atelier" => Ok(Location::Atelier),
            "depozit-stricat" | "stricat" => Ok(Location::DepozitStricat),
            _ => Err(format!(
                "Invalid location: {}. Use Depozit, Producție, Magazin, Atelier, or Depozit(Stricat)",
                s
            )),
        }
    }
}

/// The fields that make two rows mergeable into one cumulative row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceDescriptor {
    pub board_id: BoardId,
    pub project_id: Option<ProjectId>,
    pub piece_type: PieceType,
    pub status: PieceStatus,
    pub width_mm: u32,
    pub height_mm: u32,
    pub location: Location,
    pub is_accounting: bool,
}

impl PieceDescriptor {
    /// Same piece at another status / location / project binding
    pub fn moved_to(
        self,
        status: PieceStatus,
        location: Location,
        project_id: Option<ProjectId>,
    ) -> Self {
        Self {
            status,
            location,
            project_id,
            ..self
        }
    }
}

/// A stock row: `qty` physically identical pieces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPiece {
    pub id: PieceId,
    pub board_id: BoardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    pub is_accounting: bool,
    pub piece_type: PieceType,
    pub status: PieceStatus,
    pub width_mm: u32,
    pub height_mm: u32,
    pub qty: u32,
    pub location: Location,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl StockPiece {
    /// Identity key of this row
    pub fn descriptor(&self) -> PieceDescriptor {
        PieceDescriptor {
            board_id: self.board_id,
            project_id: self.project_id,
            piece_type: self.piece_type,
            status: self.status,
            width_mm: self.width_mm,
            height_mm: self.height_mm,
            location: self.location,
            is_accounting: self.is_accounting,
        }
    }

    pub fn area_per_piece_m2(&self) -> f64 {
        f64::from(self.width_mm) * f64::from(self.height_mm) / 1_000_000.0
    }

    pub fn area_total_m2(&self) -> f64 {
        self.area_per_piece_m2() * f64::from(self.qty)
    }
}

/// Intake request for a piece (manual entry, internal piece, or split byproduct)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPiece {
    pub board_id: BoardId,
    pub width_mm: u32,
    pub height_mm: u32,
    pub qty: u32,
    /// Type the operator asked for; the classifier has the final word
    #[serde(default)]
    pub requested_type: PieceType,
    #[serde(default)]
    pub location: Location,
    /// `false` for internal / non-stocked offcuts
    #[serde(default = "default_accounting")]
    pub is_accounting: bool,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_accounting() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_round_trips_through_display() {
        for loc in Location::ALL {
            assert_eq!(loc.to_string().parse::<Location>().unwrap(), loc);
        }
    }

    #[test]
    fn test_location_is_case_sensitive_for_stored_form() {
        assert_eq!("Producție".parse::<Location>().unwrap(), Location::Productie);
        assert_eq!("productie".parse::<Location>().unwrap(), Location::Productie);
        assert!("PRODUCȚIE".parse::<Location>().is_err());
        assert!("DEPOZIT".parse::<Location>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!PieceStatus::Available.is_terminal());
        assert!(!PieceStatus::Reserved.is_terminal());
        assert!(PieceStatus::Consumed.is_terminal());
        assert!(PieceStatus::Scrap.is_terminal());
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("scrap".parse::<PieceStatus>().unwrap(), PieceStatus::Scrap);
        assert_eq!("Reserved".parse::<PieceStatus>().unwrap(), PieceStatus::Reserved);
        assert!("lost".parse::<PieceStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_stored_location_names() {
        let json = serde_json::to_string(&Location::DepozitStricat).unwrap();
        assert_eq!(json, "\"Depozit(Stricat)\"");
    }

    #[test]
    fn test_area_is_derived_from_dimensions_and_qty() {
        let piece = StockPiece {
            id: PieceId(1),
            board_id: BoardId(1),
            project_id: None,
            is_accounting: true,
            piece_type: PieceType::Full,
            status: PieceStatus::Available,
            width_mm: 2800,
            height_mm: 1300,
            qty: 5,
            location: Location::Depozit,
            notes: String::new(),
            created_at: Utc::now(),
        };
        assert!((piece.area_per_piece_m2() - 3.64).abs() < 1e-9);
        assert!((piece.area_total_m2() - 18.2).abs() < 1e-9);
    }
}
