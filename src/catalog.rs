use url::Url;

use crate::storage::{Item, Storage, StorageRead, StorageTx, StorageWrite};
use crate::types::LedgerError;

/// Catalog of votable items. Deletions cascade to the vote rows inside the
/// same transaction so the ledger never holds votes for a missing item.
#[derive(Clone)]
pub struct Catalog<S: Storage> {
    storage: S,
}

fn validate_reference(reference: &str) -> Result<(), LedgerError> {
    if reference.is_empty() {
        return Err(LedgerError::EmptyReference);
    }
    // Bare filenames pass through untouched; anything URL-shaped must parse.
    if reference.contains("://") {
        let parsed = Url::parse(reference)
            .map_err(|_| LedgerError::InvalidReference(reference.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LedgerError::InvalidReference(reference.to_string()));
        }
    }
    Ok(())
}

impl<S: Storage> Catalog<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Bulk insert. Validates every reference before writing anything,
    /// then inserts all of them in one transaction and returns the
    /// assigned ids in input order.
    pub fn add_references(&self, references: &[String]) -> Result<Vec<i64>, LedgerError> {
        for reference in references {
            validate_reference(reference)?;
        }
        let tx = self.storage.begin_tx()?;
        let mut ids = Vec::with_capacity(references.len());
        for reference in references {
            ids.push(tx.insert_item(reference)?);
        }
        tx.commit()?;
        Ok(ids)
    }

    /// Delete one item and all votes referencing it. Returns false when
    /// the id was not in the catalog.
    pub fn remove_item(&self, item_id: i64) -> Result<bool, LedgerError> {
        let tx = self.storage.begin_tx()?;
        let deleted = tx.delete_item(item_id)?;
        if deleted {
            tx.delete_votes_for_item(item_id)?;
        }
        tx.commit()?;
        Ok(deleted)
    }

    /// Delete every item and every vote.
    pub fn wipe(&self) -> Result<(), LedgerError> {
        let tx = self.storage.begin_tx()?;
        tx.delete_all_items()?;
        tx.clear_votes()?;
        tx.commit()?;
        Ok(())
    }

    pub fn list_items(&self) -> Result<Vec<Item>, LedgerError> {
        Ok(self.storage.list_items()?)
    }
}
