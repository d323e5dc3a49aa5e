#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub(crate) fn comment_not_found(id: &str) -> Self {
        Self::NotFound {
            entity: "Comment",
            id: id.to_string(),
        }
    }
}
