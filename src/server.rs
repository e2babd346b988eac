//! File-storage HTTP service (`docchat serve`).
//!
//! A small axum app that keeps uploaded plain-text files on local disk so
//! the indexing pipeline can reference and later delete them. Stored names
//! are `<millis>_<sanitized>` where sanitization replaces everything
//! outside `[A-Za-z0-9.-]` with `_`, which also makes traversal sequences
//! inert.

use anyhow::{Context, Result};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;

// ============ Errors ============

/// API error with an HTTP status, a stable machine code, and a message.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "code": self.code,
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::internal(e.to_string())
    }
}

// ============ State and payloads ============

#[derive(Clone)]
pub struct ServerState {
    uploads_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct StoredFileBody {
    #[serde(rename = "originalName")]
    original_name: String,
    #[serde(rename = "fileName")]
    file_name: String,
    #[serde(rename = "filePath")]
    file_path: String,
    size: u64,
}

#[derive(Debug, Serialize)]
struct UploadBody {
    success: bool,
    files: Vec<StoredFileBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rejected: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ListedFileBody {
    #[serde(rename = "fileName")]
    file_name: String,
    #[serde(rename = "filePath")]
    file_path: String,
    size: u64,
    /// Last-modified time, unix millis.
    modified: i64,
}

// ============ Handlers ============

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn is_text_upload(file_name: &str, content_type: Option<&str>) -> bool {
    let name_ok = file_name.to_ascii_lowercase().ends_with(".txt");
    let type_ok = content_type.map(|t| t.starts_with("text/plain")).unwrap_or(true);
    name_ok && type_ok
}

async fn upload(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadBody>, AppError> {
    let mut stored = Vec::new();
    let mut rejected = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request("bad_multipart", e.to_string()))?
    {
        if field.name() != Some("files") {
            continue;
        }

        let original_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                rejected.push("(unnamed part)".to_string());
                continue;
            }
        };
        let content_type = field.content_type().map(|t| t.to_string());

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request("bad_multipart", e.to_string()))?;

        if !is_text_upload(&original_name, content_type.as_deref()) {
            eprintln!("rejecting {}: only .txt files are accepted", original_name);
            rejected.push(original_name);
            continue;
        }

        let file_name = format!(
            "{}_{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_file_name(&original_name)
        );
        let path = state.uploads_dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::internal(format!("failed to store {}: {}", file_name, e)))?;

        stored.push(StoredFileBody {
            original_name,
            file_path: path.to_string_lossy().into_owned(),
            size: bytes.len() as u64,
            file_name,
        });
    }

    if stored.is_empty() && rejected.is_empty() {
        return Err(AppError::bad_request(
            "no_files",
            "no file parts named 'files' in request",
        ));
    }

    Ok(Json(UploadBody {
        success: !stored.is_empty(),
        files: stored,
        rejected,
    }))
}

async fn delete_file(
    State(state): State<Arc<ServerState>>,
    Path(file_name): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    // The deletion token is a single stored name, never a path.
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
        return Err(AppError::bad_request("bad_name", "invalid file name"));
    }

    let path = state.uploads_dir.join(&file_name);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(Json(serde_json::json!({ "success": true }))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::not_found(format!("no such file: {}", file_name)))
        }
        Err(e) => Err(AppError::internal(format!(
            "failed to delete {}: {}",
            file_name, e
        ))),
    }
}

async fn list_files(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<ListedFileBody>>, AppError> {
    let mut entries = tokio::fs::read_dir(&state.uploads_dir)
        .await
        .map_err(|e| AppError::internal(format!("failed to read uploads dir: {}", e)))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::internal(e.to_string()))?
    {
        let meta = entry
            .metadata()
            .await
            .map_err(|e| AppError::internal(e.to_string()))?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        files.push(ListedFileBody {
            file_name: entry.file_name().to_string_lossy().into_owned(),
            file_path: entry.path().to_string_lossy().into_owned(),
            size: meta.len(),
            modified,
        });
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(Json(files))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ============ Wiring ============

pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/upload", post(upload))
        .route("/api/files/{file_name}", delete(delete_file))
        .route("/api/files", get(list_files))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// CLI entry point for `docchat serve`.
pub async fn run_server(config: &Config) -> Result<()> {
    let uploads_dir = PathBuf::from(&config.server.uploads_dir);
    std::fs::create_dir_all(&uploads_dir)
        .with_context(|| format!("failed to create uploads dir {}", uploads_dir.display()))?;

    let state = Arc::new(ServerState { uploads_dir });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    println!("file storage listening on {}", config.server.bind);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
