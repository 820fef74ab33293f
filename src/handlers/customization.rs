use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config;
use crate::customization::{self, pg::PgCustomizationStore, store::SectionInput, CustomizationError};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::error::ApiError;

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SaveCustomizationBody {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub sections: Vec<SectionInput>,
}

/// PUT /categories/:id/customization - replace the category's whole
/// customization tree in one transaction
pub async fn save(
    Path(category_id): Path<Uuid>,
    Json(body): Json<SaveCustomizationBody>,
) -> Result<impl IntoResponse, ApiError> {
    let max_sections = config::config().menu.max_customization_sections;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;

    let result = {
        let mut store = PgCustomizationStore::new(&mut tx);
        customization::replace_tree(&mut store, category_id, body.enabled, &body.sections, max_sections)
            .await
    };

    match result {
        Ok(tree) => {
            tx.commit().await.map_err(DatabaseError::from)?;
            Ok(Json(json!({ "ok": true, "customization": tree })))
        }
        Err(err) => {
            let _ = tx.rollback().await;
            Err(match err {
                CustomizationError::TooManySections { .. } => {
                    ApiError::bad_request(err.to_string())
                }
                CustomizationError::CategoryNotFound(_) => {
                    ApiError::not_found("Category not found")
                }
                CustomizationError::Store(db_err) => db_err.into(),
            })
        }
    }
}

/// DELETE /categories/:id/customization - drop the tree; idempotent, so a
/// category without one still yields 204
pub async fn delete(Path(category_id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;

    let result = {
        let mut store = PgCustomizationStore::new(&mut tx);
        customization::delete_tree(&mut store, category_id).await
    };

    match result {
        Ok(()) => {
            tx.commit().await.map_err(DatabaseError::from)?;
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) => {
            let _ = tx.rollback().await;
            Err(match err {
                CustomizationError::Store(db_err) => db_err.into(),
                other => ApiError::bad_request(other.to_string()),
            })
        }
    }
}

/// GET /customizations - every category's tree, keyed by category id
pub async fn list() -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let trees = customization::fetch_all(pool).await?;
    Ok(Json(trees))
}
