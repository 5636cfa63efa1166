//! Interchange models for bulk export and import

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::memory::{AggregateStats, MemoryRecord};

/// Full persisted state as a single JSON document.
///
/// Export and import are pass-through bulk copies: importing replaces the
/// whole collection and counters with the document's contents, and an
/// export-then-import round trip reproduces every record field exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    #[serde(default)]
    pub memories: Vec<MemoryRecord>,
    /// Union of all record tags, kept for interchange with other tools
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stats: AggregateStats,
}

impl ExportData {
    /// Assemble an export document; tags are derived from the records
    pub fn assemble(memories: Vec<MemoryRecord>, stats: AggregateStats) -> Self {
        let tags: BTreeSet<String> = memories
            .iter()
            .flat_map(|m| m.tags.iter().cloned())
            .collect();

        Self {
            memories,
            tags: tags.into_iter().collect(),
            stats,
        }
    }
}
