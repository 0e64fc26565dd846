use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum TrashError {
    #[error("Page not found: {0}")]
    NotFound(Uuid),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Inconsistent page tree at {page_id}: {reason}")]
    InconsistentTree { page_id: Uuid, reason: String },
}

impl TrashError {
    pub fn inconsistent(page_id: Uuid, reason: impl Into<String>) -> Self {
        Self::InconsistentTree {
            page_id,
            reason: reason.into(),
        }
    }

    /// Whether retrying the whole operation can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

pub type TrashResult<T> = Result<T, TrashError>;
