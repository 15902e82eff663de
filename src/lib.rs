//! Sheetstock: board stock allocation engine
//!
//! Tracks discrete pieces of sheet material through intake, reservation,
//! splitting, merging, reclassification, consumption and scrapping, on top of
//! an embedded SQLite store.

pub mod cli;
pub mod core;
pub mod entities;
