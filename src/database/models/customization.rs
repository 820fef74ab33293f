use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One customization group per category, keyed by `category_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomizationGroup {
    pub id: Uuid,
    pub category_id: Uuid,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomizationSection {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomizationItem {
    pub id: Uuid,
    pub section_id: Uuid,
    pub name: String,
    pub price: Option<String>,
    pub position: i32,
}
