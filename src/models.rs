//! Core data models used throughout docchat.
//!
//! These types represent the indexed documents, their chunks, and the
//! ephemeral query hits that flow through the retrieval pipeline.

use serde::{Deserialize, Serialize};

/// An indexed document persisted by the index store.
///
/// Created once on successful indexing and immutable afterwards, except
/// for whole-document deletion. The index store owns the only copy of a
/// document's chunk text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identity (UUID v4). Re-indexing a file with the same display
    /// name reuses the existing id so the record is replaced, not duplicated.
    pub id: String,
    /// Display name, taken from the original filename.
    pub name: String,
    /// Full original text.
    pub body: String,
    /// Ordered sentence-aligned chunks of `body`.
    pub chunks: Vec<String>,
    /// Unix timestamp of when the document was indexed.
    pub uploaded_at: i64,
    /// Byte size of the original content.
    pub size: i64,
    /// Opaque storage-location token returned by the file-storage service,
    /// or `None` when the service was unreachable and the document is
    /// indexed locally only.
    pub storage_ref: Option<String>,
}

/// A scored chunk returned from the relevance scorer.
///
/// Exists only for the duration of one retrieval call; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryHit {
    /// The chunk text.
    pub chunk: String,
    /// Display name of the document the chunk came from.
    pub document_name: String,
    /// Lexical relevance score (occurrence count × token length, summed
    /// over query tokens).
    pub score: u64,
}
