//! Filter enums for list commands

use clap::ValueEnum;

use crate::entities::{PieceStatus, PieceType};

/// Status filter for piece listings
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// AVAILABLE only
    Available,
    /// RESERVED only
    Reserved,
    /// CONSUMED only
    Consumed,
    /// SCRAP only
    Scrap,
    /// AVAILABLE and RESERVED (physically in stock) - default
    #[default]
    Active,
    /// Every status
    All,
}

impl StatusFilter {
    /// Check if a status matches this filter
    pub fn matches(&self, status: PieceStatus) -> bool {
        match self {
            StatusFilter::Available => status == PieceStatus::Available,
            StatusFilter::Reserved => status == PieceStatus::Reserved,
            StatusFilter::Consumed => status == PieceStatus::Consumed,
            StatusFilter::Scrap => status == PieceStatus::Scrap,
            StatusFilter::Active => !status.is_terminal(),
            StatusFilter::All => true,
        }
    }

    /// Exact status to push down to the store, when the filter names one
    pub fn exact(&self) -> Option<PieceStatus> {
        match self {
            StatusFilter::Available => Some(PieceStatus::Available),
            StatusFilter::Reserved => Some(PieceStatus::Reserved),
            StatusFilter::Consumed => Some(PieceStatus::Consumed),
            StatusFilter::Scrap => Some(PieceStatus::Scrap),
            StatusFilter::Active | StatusFilter::All => None,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::Available => write!(f, "available"),
            StatusFilter::Reserved => write!(f, "reserved"),
            StatusFilter::Consumed => write!(f, "consumed"),
            StatusFilter::Scrap => write!(f, "scrap"),
            StatusFilter::Active => write!(f, "active"),
            StatusFilter::All => write!(f, "all"),
        }
    }
}

/// Piece type filter for listings
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum TypeFilter {
    Full,
    Offcut,
    #[default]
    All,
}

impl TypeFilter {
    pub fn exact(&self) -> Option<PieceType> {
        match self {
            TypeFilter::Full => Some(PieceType::Full),
            TypeFilter::Offcut => Some(PieceType::Offcut),
            TypeFilter::All => None,
        }
    }
}
