mod error;
mod favorite;

pub use error::LedgerError;
pub use favorite::FavoriteOutcome;
