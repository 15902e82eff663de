//! Audit events for stock mutations
//!
//! Mutations record events into a [`Journal`] while their transaction is open.
//! The engine hands the journal to an [`EventSink`] only after the commit
//! succeeded. Sinks are best effort: a failing sink is logged and ignored, it
//! never rolls back or retries stock changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use ulid::Ulid;

use crate::core::ids::PieceId;
use crate::entities::StockPiece;

/// Entity type reported for every stock event
pub const ENTITY_TYPE: &str = "stock_piece";

/// Kind of mutation an event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Created,
    Merged,
    Split,
    Reserved,
    Moved,
    Consumed,
    Scrapped,
    Released,
    Deleted,
    NoteAppended,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActionType::Created => "created",
            ActionType::Merged => "merged",
            ActionType::Split => "split",
            ActionType::Reserved => "reserved",
            ActionType::Moved => "moved",
            ActionType::Consumed => "consumed",
            ActionType::Scrapped => "scrapped",
            ActionType::Released => "released",
            ActionType::Deleted => "deleted",
            ActionType::NoteAppended => "note_appended",
        };
        f.write_str(s)
    }
}

/// One audit record: before/after snapshots of a piece row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEvent {
    pub id: Ulid,
    pub recorded_at: DateTime<Utc>,
    pub action: ActionType,
    pub entity_type: String,
    pub entity_id: PieceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<StockPiece>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<StockPiece>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

/// Events collected inside one transaction
#[derive(Debug, Default)]
pub struct Journal {
    events: Vec<StockEvent>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mutation of `entity_id`
    pub fn record(
        &mut self,
        action: ActionType,
        entity_id: PieceId,
        before: Option<StockPiece>,
        after: Option<StockPiece>,
        metadata: serde_json::Value,
    ) {
        self.events.push(StockEvent {
            id: Ulid::new(),
            recorded_at: Utc::now(),
            action,
            entity_type: ENTITY_TYPE.to_string(),
            entity_id,
            before,
            after,
            metadata,
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<StockEvent> {
        self.events
    }
}

/// Errors from event sinks (never escalated past the engine)
#[derive(Debug, Error)]
pub enum EventError {
    #[error("IO error writing event: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Event sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for audit events
pub trait EventSink {
    fn record_event(&self, event: &StockEvent) -> Result<(), EventError>;
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn record_event(&self, _event: &StockEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// Appends events as JSON lines to a file
#[derive(Debug, Clone)]
pub struct JsonlEventSink {
    path: PathBuf,
}

impl JsonlEventSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlEventSink {
    fn record_event(&self, event: &StockEvent) -> Result<(), EventError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Keeps events in memory; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct MemoryEventSink {
    events: Arc<Mutex<Vec<StockEvent>>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    pub fn events(&self) -> Vec<StockEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemoryEventSink {
    fn record_event(&self, event: &StockEvent) -> Result<(), EventError> {
        self.events
            .lock()
            .map_err(|e| EventError::Unavailable(e.to_string()))?
            .push(event.clone());
        Ok(())
    }
}

/// Deliver journal events to a sink, swallowing failures
pub fn publish(sink: &dyn EventSink, journal: Journal) {
    for event in journal.into_events() {
        if let Err(err) = sink.record_event(&event) {
            tracing::warn!(
                action = %event.action,
                piece = %event.entity_id,
                error = %err,
                "failed to record stock event"
            );
        }
    }
}
