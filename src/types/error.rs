use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("stale favorite switch: current favorite is {current:?}")]
    Conflict { current: Option<i64> },
    #[error("unknown item: {0}")]
    NotFound(i64),
    #[error("voter key must be non-empty")]
    EmptyVoterKey,
    #[error("item reference must be non-empty")]
    EmptyReference,
    #[error("invalid item reference: {0}")]
    InvalidReference(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for LedgerError {
    fn from(err: anyhow::Error) -> Self {
        LedgerError::Storage(format!("{err:#}"))
    }
}
