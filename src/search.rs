//! Lexical relevance scoring over indexed chunks.
//!
//! Ranking is deterministic keyword scoring, not semantic similarity:
//! each query token scores `occurrences × token length` per chunk, so
//! longer query words weigh more. Matching is literal substring
//! containment, not word-boundary matching, so a token also counts
//! inside longer words ("cat" matches "category").

use anyhow::Result;

use crate::config::Config;
use crate::index::IndexStore;
use crate::models::{Document, QueryHit};

/// Lowercased query tokens, whitespace-split, with tokens of one or two
/// characters discarded.
fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Score every chunk of every document against `query` and return the
/// `top_k` best hits, sorted by score descending. Zero-score chunks are
/// dropped; ties keep discovery order (document order, then chunk order),
/// so output is deterministic for identical input.
pub fn score_chunks(query: &str, documents: &[Document], top_k: usize) -> Vec<QueryHit> {
    let tokens = tokenize(query);
    if tokens.is_empty() || documents.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for document in documents {
        for chunk in &document.chunks {
            let chunk_lower = chunk.to_lowercase();
            let score: u64 = tokens
                .iter()
                .map(|token| {
                    let occurrences = chunk_lower.matches(token.as_str()).count() as u64;
                    occurrences * token.chars().count() as u64
                })
                .sum();

            if score > 0 {
                hits.push(QueryHit {
                    chunk: chunk.clone(),
                    document_name: document.name.clone(),
                    score,
                });
            }
        }
    }

    // sort_by is stable, so equal scores keep discovery order.
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(top_k);
    hits
}

/// Format a hit the way it is injected into the prompt.
pub fn format_hit(hit: &QueryHit) -> String {
    format!("[From {}]: {}", hit.document_name, hit.chunk)
}

/// Retrieve the `top_k` formatted context strings for `query` from the
/// index store.
pub async fn search(store: &IndexStore, query: &str, top_k: usize) -> Result<Vec<String>> {
    let documents = store.get_all().await?;
    Ok(score_chunks(query, &documents, top_k)
        .iter()
        .map(format_hit)
        .collect())
}

/// CLI entry point for `docchat search`; prints ranked results with scores.
pub async fn run_search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    let store = IndexStore::open(config).await?;
    let top_k = limit.unwrap_or(config.retrieval.top_k);

    let documents = store.get_all().await?;
    let hits = score_chunks(query, &documents, top_k);

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, hit.score, format_hit(hit));
    }

    Ok(())
}
