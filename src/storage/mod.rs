pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Item, ItemTally, Storage, StorageRead, StorageTx, StorageWrite, VoteRecord, VoterTally};
