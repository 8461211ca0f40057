use crate::storage::{Storage, StorageRead, StorageTx, StorageWrite};
use crate::types::{FavoriteOutcome, LedgerError};

/// Per-voter vote state over the item catalog.
///
/// Every mutation runs inside one storage transaction, and the favorite
/// policy re-reads the voter's current favorite inside that transaction,
/// so two concurrent favorite operations for the same voter cannot both
/// observe "no current favorite". Dropping a transaction without commit
/// rolls it back.
#[derive(Clone)]
pub struct VoteLedger<S: Storage> {
    storage: S,
}

impl<S: Storage> VoteLedger<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    fn check_voter_key(voter_key: &str) -> Result<(), LedgerError> {
        if voter_key.is_empty() {
            return Err(LedgerError::EmptyVoterKey);
        }
        Ok(())
    }

    fn require_item(tx: &S::Tx, item_id: i64) -> Result<(), LedgerError> {
        match tx.load_item(item_id)? {
            Some(_) => Ok(()),
            None => Err(LedgerError::NotFound(item_id)),
        }
    }

    /// Flip the liked flag for (voter, item) and return the new state.
    /// Creates the record with `liked = true` when absent. Never touches
    /// the favorite flag.
    pub fn toggle_like(&self, voter_key: &str, item_id: i64) -> Result<bool, LedgerError> {
        Self::check_voter_key(voter_key)?;
        let tx = self.storage.begin_tx()?;
        Self::require_item(&tx, item_id)?;
        let current = tx
            .load_vote(voter_key, item_id)?
            .map(|v| v.liked)
            .unwrap_or(false);
        let next = !current;
        tx.upsert_liked(voter_key, item_id, next)?;
        tx.commit()?;
        Ok(next)
    }

    pub fn get_favorite(&self, voter_key: &str) -> Result<Option<i64>, LedgerError> {
        Self::check_voter_key(voter_key)?;
        Ok(self.storage.load_favorite(voter_key)?)
    }

    /// Three-way favorite policy on the voter's current favorite:
    /// same item clears it, no favorite sets it, a different item is left
    /// untouched and reported back for explicit confirmation.
    pub fn set_favorite(
        &self,
        voter_key: &str,
        item_id: i64,
    ) -> Result<FavoriteOutcome, LedgerError> {
        Self::check_voter_key(voter_key)?;
        let tx = self.storage.begin_tx()?;
        Self::require_item(&tx, item_id)?;
        let outcome = match tx.load_favorite(voter_key)? {
            Some(current) if current == item_id => {
                tx.clear_favorite(voter_key, item_id)?;
                FavoriteOutcome::Unfavorited
            }
            Some(current) => FavoriteOutcome::NeedsConfirmation { current },
            None => {
                tx.upsert_favorite(voter_key, item_id)?;
                FavoriteOutcome::Favorited
            }
        };
        tx.commit()?;
        Ok(outcome)
    }

    /// Clear the favorite flag on `old_item_id` and set it on `new_item_id`
    /// as one atomic unit. Fails with `Conflict` when the voter's favorite
    /// is no longer `old_item_id` at execution time; the confirmation is
    /// stale and the caller must re-fetch state instead of retrying.
    pub fn confirm_switch_favorite(
        &self,
        voter_key: &str,
        new_item_id: i64,
        old_item_id: i64,
    ) -> Result<(), LedgerError> {
        Self::check_voter_key(voter_key)?;
        let tx = self.storage.begin_tx()?;
        Self::require_item(&tx, new_item_id)?;
        let current = tx.load_favorite(voter_key)?;
        if current != Some(old_item_id) {
            return Err(LedgerError::Conflict { current });
        }
        tx.clear_favorite(voter_key, old_item_id)?;
        tx.upsert_favorite(voter_key, new_item_id)?;
        tx.commit()?;
        Ok(())
    }

    /// Delete every vote row for an item. The catalog collaborator calls
    /// this in the same logical transaction as the item row removal.
    pub fn remove_item(&self, item_id: i64) -> Result<usize, LedgerError> {
        let tx = self.storage.begin_tx()?;
        let removed = tx.delete_votes_for_item(item_id)?;
        tx.commit()?;
        Ok(removed)
    }

    pub fn remove_voter(&self, voter_key: &str) -> Result<usize, LedgerError> {
        Self::check_voter_key(voter_key)?;
        let tx = self.storage.begin_tx()?;
        let removed = tx.delete_votes_for_voter(voter_key)?;
        tx.commit()?;
        Ok(removed)
    }

    pub fn clear_all(&self) -> Result<(), LedgerError> {
        let tx = self.storage.begin_tx()?;
        tx.clear_votes()?;
        tx.commit()?;
        Ok(())
    }
}
