//! CLI command implementations

pub mod board;
pub mod bucket;
pub mod completions;
pub mod init;
pub mod piece;
pub mod reserve;
pub mod summary;
