use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::ordering::store::{OrderingStore, Scope};

/// `OrderingStore` over a live Postgres transaction. The transaction is
/// borrowed, not owned: commit/rollback stays with the handler.
pub struct PgOrderingStore<'a, 'tx> {
    tx: &'a mut Transaction<'tx, Postgres>,
}

impl<'a, 'tx> PgOrderingStore<'a, 'tx> {
    pub fn new(tx: &'a mut Transaction<'tx, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl OrderingStore for PgOrderingStore<'_, '_> {
    async fn scope_exists(&mut self, scope: &Scope) -> Result<bool, DatabaseError> {
        match scope {
            Scope::Categories => Ok(true),
            Scope::CategoryItems(category_id) => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
                )
                .bind(category_id)
                .fetch_one(&mut **self.tx)
                .await?;
                Ok(exists)
            }
        }
    }

    async fn sibling_ids(&mut self, scope: &Scope) -> Result<Vec<Uuid>, DatabaseError> {
        let ids = match scope {
            Scope::Categories => {
                sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories ORDER BY position")
                    .fetch_all(&mut **self.tx)
                    .await?
            }
            Scope::CategoryItems(category_id) => {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT id FROM items WHERE category_id = $1 ORDER BY position",
                )
                .bind(category_id)
                .fetch_all(&mut **self.tx)
                .await?
            }
        };
        Ok(ids)
    }

    async fn max_position(&mut self, scope: &Scope) -> Result<i32, DatabaseError> {
        let max = match scope {
            Scope::Categories => {
                sqlx::query_scalar::<_, i32>("SELECT COALESCE(MAX(position), -1) FROM categories")
                    .fetch_one(&mut **self.tx)
                    .await?
            }
            Scope::CategoryItems(category_id) => {
                sqlx::query_scalar::<_, i32>(
                    "SELECT COALESCE(MAX(position), -1) FROM items WHERE category_id = $1",
                )
                .bind(category_id)
                .fetch_one(&mut **self.tx)
                .await?
            }
        };
        Ok(max)
    }

    async fn write_positions(
        &mut self,
        scope: &Scope,
        assignments: &[(Uuid, i32)],
    ) -> Result<(), DatabaseError> {
        if assignments.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = assignments.iter().map(|(id, _)| *id).collect();
        let positions: Vec<i32> = assignments.iter().map(|(_, position)| *position).collect();

        // One batched UPDATE keyed by id, driven by parallel unnested arrays
        match scope {
            Scope::Categories => {
                sqlx::query(
                    "UPDATE categories SET position = v.position, updated_at = now() \
                     FROM (SELECT * FROM UNNEST($1::uuid[], $2::int[])) AS v(id, position) \
                     WHERE categories.id = v.id",
                )
                .bind(&ids)
                .bind(&positions)
                .execute(&mut **self.tx)
                .await?;
            }
            Scope::CategoryItems(category_id) => {
                sqlx::query(
                    "UPDATE items SET position = v.position, updated_at = now() \
                     FROM (SELECT * FROM UNNEST($1::uuid[], $2::int[])) AS v(id, position) \
                     WHERE items.id = v.id AND items.category_id = $3",
                )
                .bind(&ids)
                .bind(&positions)
                .bind(category_id)
                .execute(&mut **self.tx)
                .await?;
            }
        }
        Ok(())
    }
}
