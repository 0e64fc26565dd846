use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Page {
    pub id: Uuid,
    pub slug_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_page_id: Option<Uuid>,
    pub space_id: Uuid,
    pub workspace_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by_id: Option<Uuid>,
}

impl Page {
    /// A live page with a fresh id, `slug_id` derived from it.
    pub fn new(space_id: Uuid, workspace_id: Uuid, parent_page_id: Option<Uuid>) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Self {
            id,
            slug_id: id.simple().to_string()[..10].to_string(),
            title: None,
            icon: None,
            position: None,
            parent_page_id,
            space_id,
            workspace_id,
            creator_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            deleted_by_id: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}
