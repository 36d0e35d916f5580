use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not replace state file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("state lock poisoned")]
    Poisoned,
}
