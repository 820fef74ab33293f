use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::item::MenuItem;
use crate::error::ApiError;
use crate::ordering::{self, pg::PgOrderingStore, store::Scope};

use super::ordering_error_response;

async fn ensure_category(pool: &PgPool, category_id: Uuid) -> Result<(), ApiError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(category_id)
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::from)?;
    if exists {
        Ok(())
    } else {
        Err(ApiError::not_found("Category not found"))
    }
}

/// GET /categories/:categoryId/items - a category's items in display order
pub async fn list(Path(category_id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    ensure_category(pool, category_id).await?;

    let items = sqlx::query_as::<_, MenuItem>(
        "SELECT id, category_id, name, description, price, position, created_at, updated_at \
         FROM items WHERE category_id = $1 ORDER BY position",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
pub struct CreateItemBody {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<String>,
}

/// POST /categories/:categoryId/items - append an item to the category
pub async fn create(
    Path(category_id): Path<Uuid>,
    Json(body): Json<CreateItemBody>,
) -> Result<impl IntoResponse, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let pool = DatabaseManager::pool().await?;
    ensure_category(pool, category_id).await?;

    let item = sqlx::query_as::<_, MenuItem>(
        "INSERT INTO items (category_id, name, description, price, position) \
         VALUES ($1, $2, $3, $4, \
                 (SELECT COALESCE(MAX(position), -1) + 1 FROM items WHERE category_id = $1)) \
         RETURNING id, category_id, name, description, price, position, created_at, updated_at",
    )
    .bind(category_id)
    .bind(name)
    .bind(body.description.as_deref())
    .bind(body.price.as_deref())
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
}

/// PUT /items/:id - update an item's fields; position only moves via reorder
pub async fn update(
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateItemBody>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("name must not be blank"));
        }
    }

    let pool = DatabaseManager::pool().await?;

    let item = sqlx::query_as::<_, MenuItem>(
        "UPDATE items SET \
         name = COALESCE($2, name), \
         description = COALESCE($3, description), \
         price = COALESCE($4, price), \
         updated_at = now() \
         WHERE id = $1 \
         RETURNING id, category_id, name, description, price, position, created_at, updated_at",
    )
    .bind(id)
    .bind(body.name.as_deref().map(str::trim))
    .bind(body.description.as_deref())
    .bind(body.price.as_deref())
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::from)?
    .ok_or_else(|| ApiError::not_found("Item not found"))?;

    Ok(Json(item))
}

/// DELETE /items/:id - siblings are deliberately not renumbered; position
/// gaps are fine and ORDER BY still yields the intended display order
pub async fn delete(Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Item not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderItemsBody {
    #[serde(default)]
    pub item_ids: Option<Vec<Uuid>>,
}

/// PUT /categories/:categoryId/items/reorder - commit a drag-and-drop
/// ordering of one category's items
pub async fn reorder(
    Path(category_id): Path<Uuid>,
    Json(body): Json<ReorderItemsBody>,
) -> Result<impl IntoResponse, ApiError> {
    let ids = body.item_ids.unwrap_or_default();

    // Category existence is checked by the engine inside the transaction,
    // so a concurrent delete yields 404 rather than an id-mismatch 400
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;

    let result = {
        let mut store = PgOrderingStore::new(&mut tx);
        ordering::reorder(&mut store, &Scope::CategoryItems(category_id), &ids).await
    };

    match result {
        Ok(()) => {
            tx.commit().await.map_err(DatabaseError::from)?;
            Ok(Json(json!({ "ok": true })))
        }
        Err(err) => {
            let _ = tx.rollback().await;
            Err(ordering_error_response(
                err,
                "itemIds must be a non-empty array",
                "One or more itemIds do not exist or do not belong to this category",
            ))
        }
    }
}
