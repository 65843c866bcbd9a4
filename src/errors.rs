use thiserror::Error;

/// Errors surfaced by the core. Most of these are carried as data inside a
/// [`crate::types::Decision`] rather than returned as `Err`; only session-level
/// faults (schema mismatch, a database that is locked or becomes unwritable)
/// abort the session and propagate as `Err`.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Store(#[from] sled::Error),

    #[error("storage transaction error: {0}")]
    Transaction(String),

    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("metadata probe failed: {0}")]
    Stat(std::io::Error),

    #[error("content read failed: {0}")]
    Read(std::io::Error),

    #[error("destination is on a different filesystem than the source")]
    CrossDevice,

    #[error("destination path already exists: {0}")]
    DestinationExists(std::path::PathBuf),

    #[error("database schema version mismatch: found {found}, expected {expected}")]
    SchemaMismatch { found: u32, expected: u32 },

    #[error("database is locked by another session: {0}")]
    DatabaseLocked(std::path::PathBuf),

    #[error("database became unavailable: {0}")]
    DatabaseUnavailable(String),
}

impl<T> From<sled::transaction::TransactionError<T>> for GateError
where
    T: std::fmt::Display,
{
    fn from(e: sled::transaction::TransactionError<T>) -> Self {
        match e {
            sled::transaction::TransactionError::Abort(inner) => {
                GateError::Transaction(inner.to_string())
            }
            sled::transaction::TransactionError::Storage(e) => GateError::Store(e),
        }
    }
}
