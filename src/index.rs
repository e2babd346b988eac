//! Document index store.
//!
//! The [`IndexStore`] is the single source of truth for indexed documents
//! and their chunks. It persists the entire collection as one JSON array
//! under the well-known key `indexed-files` in an injected [`KvStore`]
//! backend, and rewrites the full snapshot on every mutation.
//!
//! The full-rewrite pattern is safe only because all mutations come from
//! discrete, sequential user actions on a single logical writer; a
//! multi-writer deployment would need a different scheme.
//!
//! Malformed persisted data is never fatal: a parse failure yields an
//! empty collection plus a diagnostic on stderr, so a corrupt index can
//! always be rebuilt by re-indexing.

use anyhow::Result;

use crate::config::Config;
use crate::kv::{KvStore, SqliteKv};
use crate::models::Document;

/// Key under which the serialized document collection lives.
pub const INDEX_KEY: &str = "indexed-files";

pub struct IndexStore {
    kv: Box<dyn KvStore>,
}

impl IndexStore {
    /// Wrap an injected key-value backend.
    pub fn new(kv: Box<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Open the SQLite-backed store configured in `[db]`.
    pub async fn open(config: &Config) -> Result<Self> {
        let kv = SqliteKv::connect(&config.db.path).await?;
        Ok(Self::new(Box::new(kv)))
    }

    /// Load the persisted collection. Absent key means no documents yet;
    /// malformed JSON is recovered as an empty collection with a
    /// diagnostic rather than an error.
    async fn load(&self) -> Result<Vec<Document>> {
        let raw = match self.kv.get(INDEX_KEY).await? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        match serde_json::from_str::<Vec<Document>>(&raw) {
            Ok(docs) => Ok(docs),
            Err(e) => {
                eprintln!("warning: persisted index is unreadable ({}); starting with an empty index", e);
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, docs: &[Document]) -> Result<()> {
        let raw = serde_json::to_string(docs)?;
        self.kv.set(INDEX_KEY, &raw).await
    }

    /// Insert or replace a document, keyed by its id.
    pub async fn put(&self, doc: Document) -> Result<()> {
        let mut docs = self.load().await?;
        docs.retain(|d| d.id != doc.id);
        docs.push(doc);
        self.save(&docs).await
    }

    /// Every stored document, in stable (insertion) order.
    pub async fn get_all(&self) -> Result<Vec<Document>> {
        self.load().await
    }

    /// Fetch a single document by id.
    pub async fn get(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.load().await?.into_iter().find(|d| d.id == id))
    }

    /// Id of the document with the given display name, if one exists.
    /// Used by ingestion so re-indexing a file replaces its record.
    pub async fn find_id_by_name(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|d| d.name == name)
            .map(|d| d.id))
    }

    /// Delete a document and its chunks. Absent ids are a no-op.
    /// Returns whether a document was actually removed.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut docs = self.load().await?;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        let removed = docs.len() != before;
        if removed {
            self.save(&docs).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    fn doc(id: &str, name: &str, body: &str) -> Document {
        Document {
            id: id.to_string(),
            name: name.to_string(),
            body: body.to_string(),
            chunks: vec![body.to_string()],
            uploaded_at: 0,
            size: body.len() as i64,
            storage_ref: None,
        }
    }

    fn store() -> IndexStore {
        IndexStore::new(Box::new(MemoryKv::new()))
    }

    #[tokio::test]
    async fn test_empty_store_has_no_documents() {
        let store = store();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_then_get_all() {
        let store = store();
        store.put(doc("d1", "a.txt", "alpha")).await.unwrap();
        store.put(doc("d2", "b.txt", "beta")).await.unwrap();

        let docs = store.get_all().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name, "a.txt");
        assert_eq!(docs[1].name, "b.txt");
    }

    #[tokio::test]
    async fn test_put_same_id_replaces() {
        let store = store();
        store.put(doc("d1", "a.txt", "first")).await.unwrap();
        store.put(doc("d1", "a.txt", "second")).await.unwrap();

        let docs = store.get_all().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].body, "second");
    }

    #[tokio::test]
    async fn test_remove_round_trip() {
        let store = store();
        store.put(doc("d1", "a.txt", "alpha")).await.unwrap();
        store.put(doc("d2", "b.txt", "beta")).await.unwrap();

        assert!(store.remove("d1").await.unwrap());
        let docs = store.get_all().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "d2");
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let store = store();
        assert!(!store.remove("nope").await.unwrap());
        store.put(doc("d1", "a.txt", "alpha")).await.unwrap();
        assert!(!store.remove("nope").await.unwrap());
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_id_by_name() {
        let store = store();
        store.put(doc("d1", "a.txt", "alpha")).await.unwrap();
        assert_eq!(
            store.find_id_by_name("a.txt").await.unwrap(),
            Some("d1".to_string())
        );
        assert_eq!(store.find_id_by_name("b.txt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_index_recovered_as_empty() {
        let kv = MemoryKv::new();
        kv.set(INDEX_KEY, "{not json").await.unwrap();
        let store = IndexStore::new(Box::new(kv));

        let docs = store.get_all().await.unwrap();
        assert!(docs.is_empty());

        // The store is still usable after recovery.
        store.put(doc("d1", "a.txt", "alpha")).await.unwrap();
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persisted_format_is_typed_json_array() {
        let kv = MemoryKv::new();
        let store = IndexStore::new(Box::new(kv));
        store.put(doc("d1", "a.txt", "alpha")).await.unwrap();

        let docs = store.get_all().await.unwrap();
        let parsed: Vec<Document> =
            serde_json::from_str(&serde_json::to_string(&docs).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "d1");
    }
}
