//! Core module - stock engine, store and supporting types

pub mod catalog;
pub mod classify;
pub mod config;
pub mod consumption;
pub mod engine;
pub mod error;
pub mod events;
pub mod ids;
pub mod movement;
pub mod reservation;
pub mod resolver;
pub mod store;
pub mod summary;

pub use classify::{classify_offcut_bucket, Classification, OffcutBucket};
pub use config::{Config, Workspace};
pub use consumption::ConsumptionMode;
pub use engine::{IntakeOutcome, StockEngine};
pub use error::{Result, StockError};
pub use events::{
    ActionType, EventError, EventSink, JsonlEventSink, MemoryEventSink, NullEventSink, StockEvent,
};
pub use ids::{BoardId, PieceId, ProjectId};
pub use movement::{MoveOutcome, MoveRequest};
pub use store::{PieceFilter, PieceStore, StoreOptions};
pub use summary::{BucketCounts, StatusTotals, StockSummary};
