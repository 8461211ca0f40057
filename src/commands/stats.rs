use anyhow::Result;

use crate::context::Context;
use crate::ranking;
use crate::storage::{SqliteStorage, StorageRead};

pub fn print_leaderboard(ctx: &Context, limit: usize) -> Result<()> {
    let storage = SqliteStorage::new(ctx.db_path());
    storage.init()?;

    let ranked = ranking::rank(storage.tally_items()?);
    if ranked.is_empty() {
        println!("catalog is empty");
        return Ok(());
    }

    println!("rank\tid\tfavs\tlikes\treference");
    for (position, tally) in ranking::top_n(&ranked, limit).iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            position + 1,
            tally.item_id,
            tally.favorite_count,
            tally.like_count,
            tally.reference
        );
    }
    Ok(())
}
