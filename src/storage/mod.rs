//! Persistent store for memories and aggregate stats
//!
//! The scheduler talks to storage through [`MemoryStore`], an async
//! per-record get/put contract. Per-record writes avoid the
//! read-everything/write-everything cycle that lets two concurrent sessions
//! silently overwrite each other's results wholesale; concurrent writes to
//! the *same* record are still last-write-wins and are not guarded here.

pub mod file_storage;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

use crate::memory::{AggregateStats, MemoryRecord};

pub use file_storage::FileStore;
pub use models::ExportData;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Memory not found: {0}")]
    NotFound(String),

    #[error("Could not determine data directory")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Document store holding the memory collection and the aggregate counters.
///
/// All operations are async I/O and may fail with [`StoreError`]. A `put`
/// must be atomic per record: a reader never observes a partially written
/// document, and a failed write leaves the previously stored state intact.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Fetch one record by id
    async fn get(&self, id: &str) -> Result<MemoryRecord>;

    /// Fetch the full collection
    async fn get_all(&self) -> Result<Vec<MemoryRecord>>;

    /// Write one record (insert or overwrite)
    async fn put(&self, record: &MemoryRecord) -> Result<()>;

    /// Replace the entire collection with `records`
    async fn put_all(&self, records: &[MemoryRecord]) -> Result<()>;

    /// Remove one record by id
    async fn delete(&self, id: &str) -> Result<()>;

    /// Load the aggregate counters (defaults if never written)
    async fn load_stats(&self) -> Result<AggregateStats>;

    /// Write the aggregate counters
    async fn save_stats(&self, stats: &AggregateStats) -> Result<()>;
}
