#![cfg(test)]
use std::sync::Arc;

use configs::DatabaseConfig;
use models::db::connect_with_config;

use crate::promotion::{PromotionRepository, SeaOrmPromotionRepository};

/// Fresh in-memory store with the schema already created.
pub async fn memory_repo() -> Result<Arc<SeaOrmPromotionRepository>, anyhow::Error> {
    let db = connect_with_config(&DatabaseConfig::sqlite_memory()).await?;
    let repo = SeaOrmPromotionRepository::new(db);
    repo.init().await?;
    Ok(Arc::new(repo))
}

/// Store whose table was never created, so every query fails.
pub async fn broken_repo() -> Result<Arc<SeaOrmPromotionRepository>, anyhow::Error> {
    let db = connect_with_config(&DatabaseConfig::sqlite_memory()).await?;
    Ok(Arc::new(SeaOrmPromotionRepository::new(db)))
}
