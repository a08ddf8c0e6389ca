//! Data model for the compliance backend API.
//!
//! All types are read-shaped: the client consumes these from JSON responses
//! and never constructs them for the backend (uploads go as multipart, not
//! as serialized documents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A compliance framework (e.g. a control catalog version).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Framework {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Framework {
    /// Label shown in the framework selector, e.g. "Essential Eight v2".
    pub fn display_label(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

/// A single requirement/check within a framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub code: String,
    pub title: String,
    pub description: String,
    pub requirements_count: u32,
    pub linked_documents_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Control {
    pub fn has_evidence(&self) -> bool {
        self.linked_documents_count > 0
    }

    /// Badge text for the linked-document count, e.g. "3 docs" / "1 doc".
    pub fn evidence_badge(&self) -> String {
        if self.linked_documents_count == 0 {
            "No docs".to_string()
        } else if self.linked_documents_count == 1 {
            "1 doc".to_string()
        } else {
            format!("{} docs", self.linked_documents_count)
        }
    }
}

/// An uploaded evidentiary document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub mime_type: String,
    pub file_size: u64,
    pub created_at: DateTime<Utc>,
    pub download_url: String,
}

/// A backend-computed association between a document and a control.
///
/// Carries the document's own fields plus the link metadata. Read-only:
/// the client never creates or mutates these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceLink {
    pub id: String,
    pub filename: String,
    pub mime_type: String,
    pub file_size: u64,
    pub created_at: DateTime<Utc>,
    pub download_url: String,
    pub confidence: f64,
    pub reasoning: String,
    pub link_created_at: DateTime<Utc>,
}

impl EvidenceLink {
    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_confidence(self.confidence)
    }
}

/// Display bucket for a continuous confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Tier boundaries are inclusive on the lower bound:
    /// `c >= 0.8` is high, `0.6 <= c < 0.8` is medium, `c < 0.6` is low.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceTier::High
        } else if confidence >= 0.6 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

// Response envelopes. The backend wraps every collection in an object
// keyed by the collection name.

#[derive(Debug, Deserialize)]
pub struct FrameworkList {
    pub frameworks: Vec<Framework>,
}

#[derive(Debug, Deserialize)]
pub struct ControlList {
    pub controls: Vec<Control>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentList {
    pub documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
pub struct EvidenceList {
    pub documents: Vec<EvidenceLink>,
}

/// Successful upload response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    pub filename: String,
}
