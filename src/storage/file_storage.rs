//! File-backed memory store
//!
//! Directory layout under the base path:
//! ```text
//! mnema/
//! ├── memories/
//! │   └── {memory-id}.json   # One document per record
//! └── stats.json             # Aggregate counters
//! ```
//!
//! Writes go through a temp file plus rename, so a record document is always
//! either the old version or the new one, never a torn write.

use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

use super::{MemoryStore, Result, StoreError};
use crate::memory::{AggregateStats, MemoryRecord};

pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Default per-user data directory (e.g. ~/.local/share/mnema)
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("mnema"))
            .ok_or(StoreError::DataDirNotFound)
    }

    /// Create the storage directories if missing
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(self.memories_dir()).await?;
        debug!("Initialized memory store at {}", self.base_path.display());
        Ok(())
    }

    fn memories_dir(&self) -> PathBuf {
        self.base_path.join("memories")
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.memories_dir().join(format!("{}.json", id))
    }

    fn stats_path(&self) -> PathBuf {
        self.base_path.join("stats.json")
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write via temp file + rename so readers never see a partial document
    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(value)?).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MemoryStore for FileStore {
    async fn get(&self, id: &str) -> Result<MemoryRecord> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Self::read_json(&path).await
    }

    async fn get_all(&self) -> Result<Vec<MemoryRecord>> {
        let dir = self.memories_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                records.push(Self::read_json::<MemoryRecord>(&path).await?);
            }
        }

        Ok(records)
    }

    async fn put(&self, record: &MemoryRecord) -> Result<()> {
        self.init().await?;
        Self::write_json(&self.record_path(&record.id), record).await
    }

    async fn put_all(&self, records: &[MemoryRecord]) -> Result<()> {
        // Replace semantics: drop whatever exists, then write the new set
        let dir = self.memories_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir).await?;
        }
        self.init().await?;

        for record in records {
            Self::write_json(&self.record_path(&record.id), record).await?;
        }
        debug!("Replaced memory collection ({} records)", records.len());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::remove_file(&path).await?;
        Ok(())
    }

    async fn load_stats(&self) -> Result<AggregateStats> {
        let path = self.stats_path();
        if !path.exists() {
            return Ok(AggregateStats::default());
        }
        Self::read_json(&path).await
    }

    async fn save_stats(&self, stats: &AggregateStats) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        Self::write_json(&self.stats_path(), stats).await
    }
}
