//! Document indexing pipeline.
//!
//! Coordinates the full flow for `docchat index`: read the file, check its
//! type, chunk it, upload it to the storage service on a best-effort basis,
//! and write the document record into the index store. Upload failure is
//! inspected explicitly and downgrades the document to index-only (no
//! storage reference) instead of aborting; unsupported file types and
//! unreadable files are skipped per file so the rest of the batch proceeds.

use anyhow::Result;
use std::path::Path;
use uuid::Uuid;

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::index::IndexStore;
use crate::models::Document;
use crate::storage::{HttpStorageClient, StorageClient};

/// Only plain-text files are indexable.
fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

/// Index one document body: chunk it, attempt the remote upload, and write
/// the document record. Returns the stored document.
pub async fn index_text(
    store: &IndexStore,
    storage: &dyn StorageClient,
    name: &str,
    body: String,
    max_chunk_size: usize,
) -> Result<Document> {
    let chunks = chunk_text(&body, max_chunk_size);

    // Best-effort upload; the index never depends on remote storage.
    let storage_ref = match storage.upload(name, body.as_bytes()).await {
        Ok(stored) => Some(stored.file_path),
        Err(e) => {
            eprintln!(
                "warning: file storage unavailable for {} ({}); indexing locally only",
                name, e
            );
            None
        }
    };

    // Reuse the existing id when re-indexing the same file name, so the
    // record is replaced rather than duplicated.
    let id = store
        .find_id_by_name(name)
        .await?
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let doc = Document {
        id,
        name: name.to_string(),
        size: body.len() as i64,
        uploaded_at: chrono::Utc::now().timestamp(),
        body,
        chunks,
        storage_ref,
    };

    store.put(doc.clone()).await?;
    Ok(doc)
}

/// CLI entry point for `docchat index <FILES>...`.
pub async fn run_index(config: &Config, paths: &[std::path::PathBuf]) -> Result<()> {
    let store = IndexStore::open(config).await?;
    let storage = HttpStorageClient::new(&config.storage);

    let mut indexed = 0usize;
    let mut skipped = 0usize;
    let mut chunks_written = 0usize;

    for path in paths {
        if !is_text_file(path) {
            eprintln!(
                "skipping {}: only .txt files are supported",
                path.display()
            );
            skipped += 1;
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => {
                eprintln!("skipping {}: invalid file name", path.display());
                skipped += 1;
                continue;
            }
        };

        // A file that cannot be read (missing, permissions, non-UTF-8)
        // is skipped like an unsupported type; the batch continues.
        let body = match std::fs::read_to_string(path) {
            Ok(body) => body,
            Err(e) => {
                eprintln!("skipping {}: {}", path.display(), e);
                skipped += 1;
                continue;
            }
        };

        let doc = index_text(&store, &storage, name, body, config.chunking.max_chunk_size).await?;
        chunks_written += doc.chunks.len();
        indexed += 1;
    }

    println!("index");
    println!("  files indexed: {}", indexed);
    println!("  files skipped: {}", skipped);
    println!("  chunks written: {}", chunks_written);
    println!("ok");

    Ok(())
}

/// CLI entry point for `docchat list`.
pub async fn run_list(config: &Config) -> Result<()> {
    let store = IndexStore::open(config).await?;
    let docs = store.get_all().await?;

    if docs.is_empty() {
        println!("No documents indexed.");
        return Ok(());
    }

    println!(
        "{:<38} {:<24} {:>6} {:>8}  UPLOADED",
        "ID", "NAME", "CHUNKS", "SIZE"
    );
    for doc in &docs {
        println!(
            "{:<38} {:<24} {:>6} {:>8}  {}",
            doc.id,
            doc.name,
            doc.chunks.len(),
            doc.size,
            format_ts_iso(doc.uploaded_at)
        );
    }

    Ok(())
}

/// CLI entry point for `docchat remove <id>`.
///
/// Remote deletion is attempted first and its failure only logged; the
/// index-level removal always proceeds.
pub async fn run_remove(config: &Config, id: &str) -> Result<()> {
    let store = IndexStore::open(config).await?;

    if let Some(doc) = store.get(id).await? {
        if let Some(ref storage_ref) = doc.storage_ref {
            if let Some(file_name) = crate::storage::file_name_from_ref(storage_ref) {
                let storage = HttpStorageClient::new(&config.storage);
                if let Err(e) = storage.delete(file_name).await {
                    eprintln!("warning: could not delete {} from storage: {}", file_name, e);
                }
            }
        }
    }

    if store.remove(id).await? {
        println!("removed {}", id);
    } else {
        println!("no document with id {}, nothing to do", id);
    }

    Ok(())
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::storage::StoredFile;
    use async_trait::async_trait;

    struct FakeStorage {
        fail: bool,
    }

    #[async_trait]
    impl StorageClient for FakeStorage {
        async fn upload(&self, original_name: &str, content: &[u8]) -> Result<StoredFile> {
            if self.fail {
                anyhow::bail!("connection refused");
            }
            Ok(StoredFile {
                original_name: original_name.to_string(),
                file_name: format!("123_{}", original_name),
                file_path: format!(".uploaded_files/123_{}", original_name),
                size: content.len() as u64,
            })
        }

        async fn delete(&self, _file_name: &str) -> Result<()> {
            Ok(())
        }
    }

    fn store() -> IndexStore {
        IndexStore::new(Box::new(MemoryKv::new()))
    }

    #[test]
    fn test_is_text_file() {
        assert!(is_text_file(Path::new("a.txt")));
        assert!(is_text_file(Path::new("a.TXT")));
        assert!(!is_text_file(Path::new("a.pdf")));
        assert!(!is_text_file(Path::new("noext")));
    }

    #[tokio::test]
    async fn test_index_text_records_storage_ref() {
        let store = store();
        let storage = FakeStorage { fail: false };

        let doc = index_text(
            &store,
            &storage,
            "notes.txt",
            "Cats are mammals. Dogs are mammals too.".to_string(),
            1000,
        )
        .await
        .unwrap();

        assert_eq!(doc.name, "notes.txt");
        assert_eq!(doc.storage_ref.as_deref(), Some(".uploaded_files/123_notes.txt"));
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_failure_falls_back_to_index_only() {
        let store = store();
        let storage = FakeStorage { fail: true };

        let doc = index_text(
            &store,
            &storage,
            "notes.txt",
            "Cats are mammals.".to_string(),
            1000,
        )
        .await
        .unwrap();

        // Indexing succeeded without a storage reference.
        assert_eq!(doc.storage_ref, None);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reindexing_same_name_replaces() {
        let store = store();
        let storage = FakeStorage { fail: false };

        let first = index_text(&store, &storage, "notes.txt", "First body.".to_string(), 1000)
            .await
            .unwrap();
        let second = index_text(&store, &storage, "notes.txt", "Second body.".to_string(), 1000)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let docs = store.get_all().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].body, "Second body.");
    }
}
