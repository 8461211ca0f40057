use anyhow::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub reference: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteRecord {
    pub voter_key: String,
    pub item_id: i64,
    pub liked: bool,
    pub is_favorite: bool,
}

/// Per-item aggregate, one row per catalog item (zero-vote items included).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemTally {
    pub item_id: i64,
    pub reference: String,
    pub favorite_count: u64,
    pub like_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoterTally {
    pub voter_key: String,
    pub liked_count: u64,
    pub favorite_count: u64,
}

pub trait StorageTx {
    fn commit(self) -> Result<()>;
}

pub trait StorageRead {
    fn load_item(&self, item_id: i64) -> Result<Option<Item>>;
    fn list_items(&self) -> Result<Vec<Item>>;
    fn load_vote(&self, voter_key: &str, item_id: i64) -> Result<Option<VoteRecord>>;
    fn load_favorite(&self, voter_key: &str) -> Result<Option<i64>>;
    fn list_votes(&self) -> Result<Vec<VoteRecord>>;
    fn tally_items(&self) -> Result<Vec<ItemTally>>;
    fn tally_voters(&self) -> Result<Vec<VoterTally>>;
}

pub trait StorageWrite {
    fn insert_item(&self, reference: &str) -> Result<i64>;
    fn delete_item(&self, item_id: i64) -> Result<bool>;
    fn delete_all_items(&self) -> Result<usize>;
    fn upsert_liked(&self, voter_key: &str, item_id: i64, liked: bool) -> Result<()>;
    fn upsert_favorite(&self, voter_key: &str, item_id: i64) -> Result<()>;
    fn clear_favorite(&self, voter_key: &str, item_id: i64) -> Result<usize>;
    fn delete_votes_for_item(&self, item_id: i64) -> Result<usize>;
    fn delete_votes_for_voter(&self, voter_key: &str) -> Result<usize>;
    fn clear_votes(&self) -> Result<()>;
}

pub trait Storage: StorageRead {
    type Tx: StorageTx + StorageRead + StorageWrite;

    fn begin_tx(&self) -> Result<Self::Tx>;
}
