use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::traits::{
    Item, ItemTally, Storage, StorageRead, StorageTx, StorageWrite, VoteRecord, VoterTally,
};

const DB_SCHEMA_VERSION: i64 = 1;

#[derive(Clone)]
pub struct SqliteStorage {
    pub path: String,
}

pub struct SqliteTx {
    conn: Connection,
}

impl StorageTx for SqliteTx {
    fn commit(self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }
}

fn map_item_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        reference: row.get(1)?,
    })
}

fn map_vote_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VoteRecord> {
    let liked: i64 = row.get(2)?;
    let is_favorite: i64 = row.get(3)?;
    Ok(VoteRecord {
        voter_key: row.get(0)?,
        item_id: row.get(1)?,
        liked: liked != 0,
        is_favorite: is_favorite != 0,
    })
}

fn db_load_item(conn: &Connection, item_id: i64) -> rusqlite::Result<Option<Item>> {
    conn.query_row(
        "SELECT id, reference FROM items WHERE id = ?1",
        params![item_id],
        map_item_row,
    )
    .optional()
}

fn db_list_items(conn: &Connection) -> rusqlite::Result<Vec<Item>> {
    let mut stmt = conn.prepare("SELECT id, reference FROM items ORDER BY id")?;
    let mapped = stmt
        .query_map([], map_item_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(mapped)
}

fn db_load_vote(
    conn: &Connection,
    voter_key: &str,
    item_id: i64,
) -> rusqlite::Result<Option<VoteRecord>> {
    conn.query_row(
        "SELECT voter_key, item_id, liked, is_favorite FROM votes
         WHERE voter_key = ?1 AND item_id = ?2",
        params![voter_key, item_id],
        map_vote_row,
    )
    .optional()
}

fn db_load_favorite(conn: &Connection, voter_key: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT item_id FROM votes
         WHERE voter_key = ?1 AND is_favorite = 1
         ORDER BY item_id LIMIT 1",
        params![voter_key],
        |row| row.get(0),
    )
    .optional()
}

fn db_list_votes(conn: &Connection) -> rusqlite::Result<Vec<VoteRecord>> {
    let mut stmt = conn.prepare(
        "SELECT voter_key, item_id, liked, is_favorite FROM votes
         WHERE liked = 1 OR is_favorite = 1
         ORDER BY voter_key, item_id",
    )?;
    let mapped = stmt
        .query_map([], map_vote_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(mapped)
}

fn db_tally_items(conn: &Connection) -> rusqlite::Result<Vec<ItemTally>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.reference,
                COALESCE(SUM(v.is_favorite), 0) AS favs,
                COALESCE(SUM(v.liked), 0) AS likes
         FROM items i
         LEFT JOIN votes v ON i.id = v.item_id
         GROUP BY i.id
         ORDER BY i.id",
    )?;
    let mapped = stmt
        .query_map([], |row| {
            let favs: i64 = row.get(2)?;
            let likes: i64 = row.get(3)?;
            Ok(ItemTally {
                item_id: row.get(0)?,
                reference: row.get(1)?,
                favorite_count: favs as u64,
                like_count: likes as u64,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(mapped)
}

fn db_tally_voters(conn: &Connection) -> rusqlite::Result<Vec<VoterTally>> {
    let mut stmt = conn.prepare(
        "SELECT voter_key, SUM(liked) AS likes, SUM(is_favorite) AS favs
         FROM votes
         GROUP BY voter_key
         HAVING SUM(liked) > 0 OR SUM(is_favorite) > 0
         ORDER BY voter_key",
    )?;
    let mapped = stmt
        .query_map([], |row| {
            let likes: i64 = row.get(1)?;
            let favs: i64 = row.get(2)?;
            Ok(VoterTally {
                voter_key: row.get(0)?,
                liked_count: likes as u64,
                favorite_count: favs as u64,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(mapped)
}

fn db_insert_item(conn: &Connection, reference: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO items (reference) VALUES (?1)",
        params![reference],
    )?;
    Ok(conn.last_insert_rowid())
}

fn db_delete_item(conn: &Connection, item_id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM items WHERE id = ?1", params![item_id])?;
    Ok(rows > 0)
}

fn db_delete_all_items(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM items", [])
}

fn db_upsert_liked(
    conn: &Connection,
    voter_key: &str,
    item_id: i64,
    liked: bool,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO votes (voter_key, item_id, liked) VALUES (?1, ?2, ?3)
         ON CONFLICT(voter_key, item_id) DO UPDATE SET liked = excluded.liked",
        params![voter_key, item_id, liked as i64],
    )?;
    Ok(())
}

fn db_upsert_favorite(conn: &Connection, voter_key: &str, item_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO votes (voter_key, item_id, is_favorite) VALUES (?1, ?2, 1)
         ON CONFLICT(voter_key, item_id) DO UPDATE SET is_favorite = 1",
        params![voter_key, item_id],
    )?;
    Ok(())
}

fn db_clear_favorite(conn: &Connection, voter_key: &str, item_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE votes SET is_favorite = 0 WHERE voter_key = ?1 AND item_id = ?2",
        params![voter_key, item_id],
    )
}

fn db_delete_votes_for_item(conn: &Connection, item_id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM votes WHERE item_id = ?1", params![item_id])
}

fn db_delete_votes_for_voter(conn: &Connection, voter_key: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM votes WHERE voter_key = ?1", params![voter_key])
}

fn db_clear_votes(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM votes", [])?;
    Ok(())
}

impl StorageRead for SqliteTx {
    fn load_item(&self, item_id: i64) -> Result<Option<Item>> {
        Ok(db_load_item(&self.conn, item_id)?)
    }

    fn list_items(&self) -> Result<Vec<Item>> {
        Ok(db_list_items(&self.conn)?)
    }

    fn load_vote(&self, voter_key: &str, item_id: i64) -> Result<Option<VoteRecord>> {
        Ok(db_load_vote(&self.conn, voter_key, item_id)?)
    }

    fn load_favorite(&self, voter_key: &str) -> Result<Option<i64>> {
        Ok(db_load_favorite(&self.conn, voter_key)?)
    }

    fn list_votes(&self) -> Result<Vec<VoteRecord>> {
        Ok(db_list_votes(&self.conn)?)
    }

    fn tally_items(&self) -> Result<Vec<ItemTally>> {
        Ok(db_tally_items(&self.conn)?)
    }

    fn tally_voters(&self) -> Result<Vec<VoterTally>> {
        Ok(db_tally_voters(&self.conn)?)
    }
}

impl StorageWrite for SqliteTx {
    fn insert_item(&self, reference: &str) -> Result<i64> {
        Ok(db_insert_item(&self.conn, reference)?)
    }

    fn delete_item(&self, item_id: i64) -> Result<bool> {
        Ok(db_delete_item(&self.conn, item_id)?)
    }

    fn delete_all_items(&self) -> Result<usize> {
        Ok(db_delete_all_items(&self.conn)?)
    }

    fn upsert_liked(&self, voter_key: &str, item_id: i64, liked: bool) -> Result<()> {
        Ok(db_upsert_liked(&self.conn, voter_key, item_id, liked)?)
    }

    fn upsert_favorite(&self, voter_key: &str, item_id: i64) -> Result<()> {
        Ok(db_upsert_favorite(&self.conn, voter_key, item_id)?)
    }

    fn clear_favorite(&self, voter_key: &str, item_id: i64) -> Result<usize> {
        Ok(db_clear_favorite(&self.conn, voter_key, item_id)?)
    }

    fn delete_votes_for_item(&self, item_id: i64) -> Result<usize> {
        Ok(db_delete_votes_for_item(&self.conn, item_id)?)
    }

    fn delete_votes_for_voter(&self, voter_key: &str) -> Result<usize> {
        Ok(db_delete_votes_for_voter(&self.conn, voter_key)?)
    }

    fn clear_votes(&self) -> Result<()> {
        Ok(db_clear_votes(&self.conn)?)
    }
}

impl Storage for SqliteStorage {
    type Tx = SqliteTx;

    fn begin_tx(&self) -> Result<Self::Tx> {
        let conn = self.open_conn()?;

        // Single-writer serialization point for read-modify-write sequences.
        conn.execute("BEGIN IMMEDIATE", [])?;

        Ok(SqliteTx { conn })
    }
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn reset_all(&self) -> Result<()> {
        if !std::path::Path::new(&self.path).exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.path)?;
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        self.with_conn(|_conn| Ok(()))?;
        Ok(())
    }

    fn open_conn(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;
        Ok(conn)
    }

    fn with_conn<F, T>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.open_conn()?;
        Self::migrate(&conn)?;
        f(&conn)
    }

    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        log::info!(
            "SQLite schema migration: {} -> {}",
            version,
            DB_SCHEMA_VERSION
        );

        if version == 0 {
            conn.execute_batch(
                r#"
            CREATE TABLE items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                reference TEXT NOT NULL CHECK (length(reference) > 0)
            );
            CREATE TABLE votes (
                voter_key TEXT NOT NULL CHECK (length(voter_key) > 0),
                item_id INTEGER NOT NULL,
                liked INTEGER NOT NULL DEFAULT 0,
                is_favorite INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (voter_key, item_id)
            );
            CREATE INDEX votes_item_idx ON votes(item_id);
            CREATE INDEX votes_favorite_idx
                ON votes(voter_key)
                WHERE is_favorite = 1;
        "#,
            )?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::ErrorCode::SchemaChanged as i32),
            Some("database schema version mismatch; please run with --reset option".to_string()),
        ))
    }
}

impl StorageRead for SqliteStorage {
    fn load_item(&self, item_id: i64) -> Result<Option<Item>> {
        let row = self.with_conn(|conn| db_load_item(conn, item_id))?;
        Ok(row)
    }

    fn list_items(&self) -> Result<Vec<Item>> {
        let rows = self.with_conn(db_list_items)?;
        Ok(rows)
    }

    fn load_vote(&self, voter_key: &str, item_id: i64) -> Result<Option<VoteRecord>> {
        let row = self.with_conn(|conn| db_load_vote(conn, voter_key, item_id))?;
        Ok(row)
    }

    fn load_favorite(&self, voter_key: &str) -> Result<Option<i64>> {
        let row = self.with_conn(|conn| db_load_favorite(conn, voter_key))?;
        Ok(row)
    }

    fn list_votes(&self) -> Result<Vec<VoteRecord>> {
        let rows = self.with_conn(db_list_votes)?;
        Ok(rows)
    }

    fn tally_items(&self) -> Result<Vec<ItemTally>> {
        let rows = self.with_conn(db_tally_items)?;
        Ok(rows)
    }

    fn tally_voters(&self) -> Result<Vec<VoterTally>> {
        let rows = self.with_conn(db_tally_voters)?;
        Ok(rows)
    }
}
