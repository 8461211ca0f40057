use anyhow::{Context as AnyhowContext, Result};

use crate::context::Context;
use crate::storage::SqliteStorage;

pub fn init_data_dir(ctx: &Context) -> Result<()> {
    std::fs::create_dir_all(&ctx.config.data_dir)
        .with_context(|| format!("creating data dir {}", ctx.config.data_dir))?;
    Ok(())
}

pub fn init_storage(ctx: &Context) -> Result<SqliteStorage> {
    let storage = SqliteStorage::new(ctx.db_path());
    if ctx.config.reset {
        log::warn!("♻️  Resetting persisted state at {}", storage.path);
        storage.reset_all().context("resetting storage")?;
    }
    storage.init().context("initializing storage")?;
    Ok(storage)
}
