//! Capture data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance metadata attached to a captured memory.
///
/// Everything here is pass-through: the scheduler stores it verbatim and only
/// ever reads `surrounding_text` (as the default back text). Unknown fields
/// from other producers are preserved across a round trip via `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureContext {
    /// URL of the page the text was captured from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Title of the source page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// When the capture happened at the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Text of the block element surrounding the selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surrounding_text: Option<String>,
    /// Raw HTML snippet around the selection (truncated by the producer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_context: Option<String>,
    /// Image associated with the capture, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Any producer-specific fields we don't model
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Request to create a new memory from captured text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    /// Question side; must be non-empty after trimming
    pub front: String,
    /// Answer side; defaults to the context's surrounding text, then to `front`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub context: CaptureContext,
}

impl CaptureRequest {
    pub fn new(front: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: None,
            tags: Vec::new(),
            context: CaptureContext::default(),
        }
    }

    pub fn with_back(mut self, back: impl Into<String>) -> Self {
        self.back = Some(back.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_context(mut self, context: CaptureContext) -> Self {
        self.context = context;
        self
    }
}
