use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlugboardError {
    #[error("No declared type: {0}")]
    NoType(String),
    #[error("Wrong type: expected {expected}, got {found}")]
    WrongType { expected: String, found: String },
    #[error("Invalid value: {0}")]
    Invalid(String),
    #[error("Not ready: {0}")]
    NotReady(String),
    #[error("Submodule not ready: {0}")]
    SubmoduleNotReady(String),
    #[error("Locked: {0}")]
    Locked(String),
    #[error("No implementation bound: {0}")]
    NoModule(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, PlugboardError>;

// Helper conversions
impl From<rusqlite::Error> for PlugboardError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PlugboardError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Lock(e.to_string())
    }
}
