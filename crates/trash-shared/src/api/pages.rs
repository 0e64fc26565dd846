use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePageRequest {
    pub page_id: Uuid,
    /// Purge instead of moving the subtree to the trash.
    #[serde(default)]
    pub force_delete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeleteResult {
    /// Root first when the root itself was live.
    pub affected_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResult {
    /// The page was restored as a space root because its parent is still
    /// in the trash (or gone).
    pub detached: bool,
    pub restored_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeResult {
    pub removed_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Trashed(SoftDeleteResult),
    Purged(PurgeResult),
}

impl DeleteOutcome {
    pub fn page_ids(&self) -> &[Uuid] {
        match self {
            Self::Trashed(result) => &result.affected_ids,
            Self::Purged(result) => &result.removed_ids,
        }
    }
}
