use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::category::Category;
use crate::error::ApiError;
use crate::ordering::{self, pg::PgOrderingStore, store::Scope};

use super::ordering_error_response;

/// GET /categories - all categories in display order
pub async fn list() -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, position, created_at, updated_at \
         FROM categories ORDER BY position",
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(Json(categories))
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryBody {
    pub name: String,
    pub description: Option<String>,
}

/// POST /categories - create a category at the end of the list
pub async fn create(Json(body): Json<CreateCategoryBody>) -> Result<impl IntoResponse, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let pool = DatabaseManager::pool().await?;

    // New rows always append: position = current max + 1 within the scope
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, description, position) \
         VALUES ($1, $2, (SELECT COALESCE(MAX(position), -1) + 1 FROM categories)) \
         RETURNING id, name, description, position, created_at, updated_at",
    )
    .bind(name)
    .bind(body.description.as_deref())
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryBody {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// PUT /categories/:id - update name/description; position is only ever
/// changed through the reorder endpoint
pub async fn update(
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategoryBody>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("name must not be blank"));
        }
    }

    let pool = DatabaseManager::pool().await?;

    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET \
         name = COALESCE($2, name), \
         description = COALESCE($3, description), \
         updated_at = now() \
         WHERE id = $1 \
         RETURNING id, name, description, position, created_at, updated_at",
    )
    .bind(id)
    .bind(body.name.as_deref().map(str::trim))
    .bind(body.description.as_deref())
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::from)?
    .ok_or_else(|| ApiError::not_found("Category not found"))?;

    Ok(Json(category))
}

/// DELETE /categories/:id - remove a category; items and any customization
/// tree go with it via cascade. Remaining siblings keep their positions,
/// gaps included.
pub async fn delete(Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(DatabaseError::from)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Category not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderCategoriesBody {
    #[serde(default)]
    pub category_ids: Option<Vec<Uuid>>,
}

/// PUT /categories/reorder - commit a drag-and-drop ordering of the whole
/// category list
pub async fn reorder(
    Json(body): Json<ReorderCategoriesBody>,
) -> Result<impl IntoResponse, ApiError> {
    let ids = body.category_ids.unwrap_or_default();

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;

    let result = {
        let mut store = PgOrderingStore::new(&mut tx);
        ordering::reorder(&mut store, &Scope::Categories, &ids).await
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
                "categoryIds must be a non-empty array",
                "One or more categoryIds do not exist",
            ))
        }
    }
}
