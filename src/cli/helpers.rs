//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::Result;
use std::collections::HashMap;

use crate::cli::GlobalOpts;
use crate::core::ids::{BoardId, ProjectId};
use crate::core::{StockEngine, Workspace};

/// Open the workspace engine for a command
pub fn open_engine(global: &GlobalOpts) -> Result<(Workspace, StockEngine)> {
    let workspace = Workspace::load(global.config.as_deref())?;
    let engine = StockEngine::open(&workspace)?;
    Ok((workspace, engine))
}

/// Map of board id to board code for listings
pub fn board_codes(engine: &StockEngine) -> Result<HashMap<BoardId, String>> {
    Ok(engine
        .boards()?
        .into_iter()
        .map(|b| (b.id, b.code))
        .collect())
}

/// Format dimensions as `WIDTHxHEIGHT`
pub fn format_size(width_mm: u32, height_mm: u32) -> String {
    format!("{}x{}", width_mm, height_mm)
}

/// Format an optional project binding
pub fn format_project(project: Option<ProjectId>) -> String {
    project
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Counts characters rather than bytes so Romanian diacritics never split.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
