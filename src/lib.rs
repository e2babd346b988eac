//! docchat: a local-first document chat tool.
//!
//! Plain-text files are chunked at sentence boundaries, stored in a
//! SQLite-backed key-value index, and retrieved by a deterministic lexical
//! scorer. Chat turns attach the top-ranked chunks as context to an
//! OpenRouter chat-completions call. A small axum side-service keeps the
//! raw uploaded files on disk.
//!
//! ```text
//!   index: file -> chunk -> [storage upload] -> index store (kv/sqlite)
//!   chat:  query -> search -> prompt -> openrouter -> reply
//!   serve: axum file-storage service (upload / list / delete)
//! ```
//!
//! | module       | role                                          |
//! |--------------|-----------------------------------------------|
//! | `chunk`      | sentence-boundary text chunker                |
//! | `index`      | KV-persisted document index store             |
//! | `search`     | lexical relevance scoring and ranking         |
//! | `prompt`     | system-message composition                    |
//! | `chat`       | retrieval-augmented chat orchestration        |
//! | `openrouter` | outbound model-call client                    |
//! | `storage`    | client for the file-storage service           |
//! | `server`     | the file-storage service itself               |
//! | `ingest`     | indexing pipeline and index CLI commands      |
//! | `settings`   | API key and custom instructions               |
//! | `kv`         | key-value store trait, SQLite and in-memory   |

pub mod chat;
pub mod chunk;
pub mod config;
pub mod index;
pub mod ingest;
pub mod kv;
pub mod migrate;
pub mod models;
pub mod openrouter;
pub mod prompt;
pub mod search;
pub mod server;
pub mod settings;
pub mod storage;
