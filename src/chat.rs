//! Chat orchestration: retrieval, prompt composition, and the model call.
//!
//! One user turn flows through here. Retrieval runs against the document
//! index; retrieval errors are logged and treated as "no context" so the
//! chat never hard-fails on a broken index. The missing API key and any
//! model-call failure are surfaced as assistant-channel messages rather
//! than process errors: the conversation keeps going.

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::config::Config;
use crate::index::IndexStore;
use crate::kv::SqliteKv;
use crate::openrouter::{ModelClient, OpenRouterClient};
use crate::prompt::compose_system_message;
use crate::search;
use crate::settings;

const MISSING_KEY_MESSAGE: &str =
    "Error: OpenRouter API key not configured. Set it with `docchat key set <key>` or the OPENROUTER_API_KEY environment variable.";

/// Outcome of a single chat turn, ready for display.
pub struct ChatTurn {
    /// Formatted retrieval results that were attached as context.
    pub context: Vec<String>,
    /// Assistant reply text (which may itself be an error notice).
    pub reply: String,
}

/// Run one chat turn: retrieve context, compose the system message, and
/// call the model. Never returns `Err` for model-side failures; those
/// become the reply text.
pub async fn send_message(
    store: &IndexStore,
    client: &dyn ModelClient,
    model: &str,
    custom_instructions: Option<&str>,
    message: &str,
    top_k: usize,
) -> Result<ChatTurn> {
    let context = match search::search(store, message, top_k).await {
        Ok(results) => results,
        Err(e) => {
            eprintln!("warning: retrieval failed ({}); answering without context", e);
            Vec::new()
        }
    };

    let system = compose_system_message(custom_instructions, &context);

    let reply = match client.chat(model, system.as_deref(), message).await {
        Ok(text) => text,
        Err(e) => format!("Error: {}", e),
    };

    Ok(ChatTurn { context, reply })
}

fn print_turn(turn: &ChatTurn) {
    if !turn.context.is_empty() {
        println!("Context from files ({} sources)", turn.context.len());
        for entry in &turn.context {
            println!("  {}", truncate_preview(entry, 200));
        }
        println!();
    }
    println!("{}", turn.reply);
}

/// Shorten a context entry for display without splitting a UTF-8 boundary.
fn truncate_preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// CLI entry point for `docchat chat [MESSAGE]`.
///
/// With a message argument this answers once and exits; without one it
/// reads turns from stdin until EOF or an empty line.
pub async fn run_chat(
    config: &Config,
    message: Option<String>,
    model_override: Option<String>,
) -> Result<()> {
    let kv = SqliteKv::connect(&config.db.path).await?;
    let store = IndexStore::new(Box::new(kv.clone()));

    let api_key = match settings::resolve_api_key(&kv).await? {
        Some(key) => key,
        None => {
            println!("{}", MISSING_KEY_MESSAGE);
            return Ok(());
        }
    };

    let model = model_override.unwrap_or_else(|| config.model.default_model.clone());
    let client = OpenRouterClient::new(&config.model, api_key)?;
    let instructions = settings::custom_instructions(&kv).await?;

    if let Some(message) = message {
        let turn = send_message(
            &store,
            &client,
            &model,
            instructions.as_deref(),
            &message,
            config.retrieval.top_k,
        )
        .await?;
        print_turn(&turn);
        return Ok(());
    }

    // Interactive loop. Each turn is independent; no conversation history
    // is sent to the model.
    println!("docchat interactive chat (model: {})", model);
    println!("Enter a message, or an empty line to quit.");
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let message = line.trim();
        if message.is_empty() {
            break;
        }
        let turn = send_message(
            &store,
            &client,
            &model,
            instructions.as_deref(),
            message,
            config.retrieval.top_k,
        )
        .await?;
        print_turn(&turn);
    }

    Ok(())
}
