use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::customization::store::CustomizationStore;
use crate::database::manager::DatabaseError;
use crate::database::models::customization::{
    CustomizationGroup, CustomizationItem, CustomizationSection,
};

/// `CustomizationStore` over a live Postgres transaction.
pub struct PgCustomizationStore<'a, 'tx> {
    tx: &'a mut Transaction<'tx, Postgres>,
}

impl<'a, 'tx> PgCustomizationStore<'a, 'tx> {
    pub fn new(tx: &'a mut Transaction<'tx, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl CustomizationStore for PgCustomizationStore<'_, '_> {
    async fn category_exists(&mut self, category_id: Uuid) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
        )
        .bind(category_id)
        .fetch_one(&mut **self.tx)
        .await?;
        Ok(exists)
    }

    async fn upsert_group(
        &mut self,
        category_id: Uuid,
        enabled: bool,
    ) -> Result<Uuid, DatabaseError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO customization_groups (category_id, enabled) VALUES ($1, $2) \
             ON CONFLICT (category_id) DO UPDATE \
             SET enabled = EXCLUDED.enabled, updated_at = now() \
             RETURNING id",
        )
        .bind(category_id)
        .bind(enabled)
        .fetch_one(&mut **self.tx)
        .await?;
        Ok(id)
    }

    async fn clear_sections(&mut self, group_id: Uuid) -> Result<(), DatabaseError> {
        // ON DELETE CASCADE takes the items with each section
        sqlx::query("DELETE FROM customization_sections WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut **self.tx)
            .await?;
        Ok(())
    }

    async fn insert_section(
        &mut self,
        group_id: Uuid,
        title: &str,
        position: i32,
    ) -> Result<Uuid, DatabaseError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO customization_sections (group_id, title, position) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(group_id)
        .bind(title)
        .bind(position)
        .fetch_one(&mut **self.tx)
        .await?;
        Ok(id)
    }

    async fn insert_item(
        &mut self,
        section_id: Uuid,
        name: &str,
        price: Option<&str>,
        position: i32,
    ) -> Result<Uuid, DatabaseError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO customization_items (section_id, name, price, position) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(section_id)
        .bind(name)
        .bind(price)
        .bind(position)
        .fetch_one(&mut **self.tx)
        .await?;
        Ok(id)
    }

    async fn delete_group(&mut self, category_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM customization_groups WHERE category_id = $1")
            .bind(category_id)
            .execute(&mut **self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_groups(&mut self) -> Result<Vec<CustomizationGroup>, DatabaseError> {
        let groups = sqlx::query_as::<_, CustomizationGroup>(
            "SELECT id, category_id, enabled, created_at, updated_at FROM customization_groups",
        )
        .fetch_all(&mut **self.tx)
        .await?;
        Ok(groups)
    }

    async fn load_sections(&mut self) -> Result<Vec<CustomizationSection>, DatabaseError> {
        let sections = sqlx::query_as::<_, CustomizationSection>(
            "SELECT id, group_id, title, position FROM customization_sections ORDER BY position",
        )
        .fetch_all(&mut **self.tx)
        .await?;
        Ok(sections)
    }

    async fn load_items(&mut self) -> Result<Vec<CustomizationItem>, DatabaseError> {
        let items = sqlx::query_as::<_, CustomizationItem>(
            "SELECT id, section_id, name, price, position FROM customization_items ORDER BY position",
        )
        .fetch_all(&mut **self.tx)
        .await?;
        Ok(items)
    }
}
