use anyhow::Result;

use crate::config::Config;
use crate::kv::SqliteKv;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let kv = SqliteKv::connect(&config.db.path).await?;
    kv.ensure_schema().await?;
    Ok(())
}
