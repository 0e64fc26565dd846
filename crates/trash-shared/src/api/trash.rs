use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::PaginationOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashListParams {
    pub space_id: Uuid,
    #[serde(flatten)]
    pub pagination: PaginationOptions,
}
