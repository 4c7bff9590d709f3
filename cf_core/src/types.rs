use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::document::{Document, fields};
use errors::StorageError;

/// Opaque identifier of a timeline document, assigned by the persistence
/// gateway on creation.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, JsonSchema, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct TimelineId(String);

impl TimelineId {
    pub fn new(id: String) -> Option<Self> {
        if id.is_empty() || id.len() > 128 {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TimelineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TimelineId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string()).ok_or_else(|| anyhow::anyhow!("Invalid timeline ID"))
    }
}

/// Opaque identifier of a note document.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, JsonSchema, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: String) -> Option<Self> {
        if id.is_empty() || id.len() > 128 {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NoteId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string()).ok_or_else(|| anyhow::anyhow!("Invalid note ID"))
    }
}

/// Publication state of a note. A note moves `Draft -> Published` at most
/// once and never back.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoteStatus {
    Draft,
    #[default]
    Published,
}

impl NoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }
}

/// A timeline (lane) as stored by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub id: TimelineId,
    pub number: i64,
    pub created_at: DateTime<Utc>,
}

impl Timeline {
    /// Decodes a timeline from its stored document. A missing timestamp
    /// hydrates to the current instant, matching what the board loader has
    /// always done for documents whose server timestamp has not resolved yet.
    pub fn from_document(doc: &Document) -> Result<Self, StorageError> {
        let id = TimelineId::new(doc.id().to_string()).ok_or_else(|| StorageError::Decode {
            collection: "timelines".to_string(),
            reason: "empty document id".to_string(),
        })?;
        let number = doc.int(fields::NUMBER).ok_or_else(|| StorageError::Decode {
            collection: "timelines".to_string(),
            reason: format!("document {} has no number", doc.id()),
        })?;
        Ok(Self {
            id,
            number,
            created_at: doc.time(fields::CREATED_AT).unwrap_or_else(Utc::now),
        })
    }

    pub fn hydrate(&self) -> TimelineView {
        TimelineView {
            id: self.id.as_str().to_string(),
            number: self.number,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

/// A note as stored by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub line_id: TimelineId,
    pub title: String,
    pub content: String,
    pub status: NoteStatus,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Decodes a note from its stored document. Documents written before the
    /// draft feature existed carry no status field and hydrate as published.
    pub fn from_document(doc: &Document) -> Result<Self, StorageError> {
        let id = NoteId::new(doc.id().to_string()).ok_or_else(|| StorageError::Decode {
            collection: "notes".to_string(),
            reason: "empty document id".to_string(),
        })?;
        let line_id = doc
            .str(fields::LINE_ID)
            .and_then(|s| TimelineId::new(s.to_string()))
            .ok_or_else(|| StorageError::Decode {
                collection: "notes".to_string(),
                reason: format!("document {} has no lineId", doc.id()),
            })?;
        let status = doc
            .str(fields::STATUS)
            .and_then(|s| s.parse().ok())
            .unwrap_or(NoteStatus::Published);
        Ok(Self {
            id,
            line_id,
            title: doc.str(fields::TITLE).unwrap_or_default().to_string(),
            content: doc.str(fields::CONTENT).unwrap_or_default().to_string(),
            status,
            created_at: doc.time(fields::CREATED_AT).unwrap_or_else(Utc::now),
        })
    }

    pub fn hydrate(&self) -> NoteView {
        NoteView {
            id: self.id.as_str().to_string(),
            line_id: self.line_id.as_str().to_string(),
            title: self.title.clone(),
            content: self.content.clone(),
            status: self.status,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

/// Client-facing timeline representation: the timestamp is carried as an
/// ISO-8601 string so the view is serializable without a gateway timestamp
/// type on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineView {
    pub id: String,
    pub number: i64,
    pub created_at: String,
}

/// Client-facing note representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: String,
    pub line_id: String,
    pub title: String,
    pub content: String,
    pub status: NoteStatus,
    pub created_at: String,
}

/// The authoritative board state served to the client on a full load:
/// timelines in lane order, published notes in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub timelines: Vec<TimelineView>,
    pub notes: Vec<NoteView>,
}

/// Result of a draft save. Drafts are not rendered in the published board,
/// so no full hydration is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftSaved {
    pub draft_id: String,
}
