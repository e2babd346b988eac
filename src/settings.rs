//! User settings persisted in the key-value store.
//!
//! Two settings exist: the OpenRouter API key and the custom instructions
//! prepended to every chat prompt. Both live under well-known keys in the
//! same durable store as the document index.

use anyhow::Result;

use crate::config::Config;
use crate::kv::{KvStore, SqliteKv};

pub const API_KEY_KEY: &str = "openrouter-api-key";
pub const CUSTOM_INSTRUCTIONS_KEY: &str = "custom-instructions";

/// Resolve the API key: the `OPENROUTER_API_KEY` environment variable
/// wins over the stored setting.
pub async fn resolve_api_key(kv: &dyn KvStore) -> Result<Option<String>> {
    if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(Some(key));
        }
    }
    kv.get(API_KEY_KEY).await
}

pub async fn custom_instructions(kv: &dyn KvStore) -> Result<Option<String>> {
    kv.get(CUSTOM_INSTRUCTIONS_KEY).await
}

async fn open_kv(config: &Config) -> Result<SqliteKv> {
    SqliteKv::connect(&config.db.path).await
}

// ============ CLI entry points ============

pub async fn run_key_set(config: &Config, key: &str) -> Result<()> {
    let kv = open_kv(config).await?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    if !key.starts_with("sk-or-") {
        eprintln!("warning: OpenRouter API keys usually start with 'sk-or-'");
    }
    kv.set(API_KEY_KEY, key).await?;
    println!("API key saved.");
    Ok(())
}

pub async fn run_key_clear(config: &Config) -> Result<()> {
    let kv = open_kv(config).await?;
    kv.remove(API_KEY_KEY).await?;
    println!("API key cleared.");
    Ok(())
}

pub async fn run_key_status(config: &Config) -> Result<()> {
    let kv = open_kv(config).await?;
    let stored = kv.get(API_KEY_KEY).await?.is_some();
    let env = std::env::var("OPENROUTER_API_KEY")
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);

    println!("stored key: {}", if stored { "set" } else { "not set" });
    println!(
        "OPENROUTER_API_KEY: {}",
        if env { "set (takes precedence)" } else { "not set" }
    );
    Ok(())
}

pub async fn run_rules_show(config: &Config) -> Result<()> {
    let kv = open_kv(config).await?;
    match kv.get(CUSTOM_INSTRUCTIONS_KEY).await? {
        Some(instructions) => println!("{}", instructions),
        None => println!("No custom instructions set."),
    }
    Ok(())
}

pub async fn run_rules_set(config: &Config, text: &str) -> Result<()> {
    let kv = open_kv(config).await?;
    kv.set(CUSTOM_INSTRUCTIONS_KEY, text).await?;
    println!("Custom instructions saved.");
    Ok(())
}

pub async fn run_rules_clear(config: &Config) -> Result<()> {
    let kv = open_kv(config).await?;
    kv.remove(CUSTOM_INSTRUCTIONS_KEY).await?;
    println!("Custom instructions cleared.");
    Ok(())
}
