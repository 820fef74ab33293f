use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// A sibling set sharing one position ordering: either the top-level
/// category list, or the items belonging to a single category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Categories,
    CategoryItems(Uuid),
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Categories => write!(f, "categories"),
            Scope::CategoryItems(category_id) => write!(f, "items of category {}", category_id),
        }
    }
}

/// Transactional access to one scope's rows for the reorder engine.
///
/// Implemented over a live `sqlx` transaction in production and by an
/// in-memory store in tests. All three calls must run inside the same
/// transaction; the engine never commits or rolls back itself.
#[async_trait]
pub trait OrderingStore: Send {
    /// Whether the parent scope itself exists. The category list always
    /// does; an item scope dies with its category, and checking here keeps
    /// the answer consistent with the sibling reads that follow.
    async fn scope_exists(&mut self, scope: &Scope) -> Result<bool, DatabaseError>;

    /// Ids currently stored under the scope, in position order.
    async fn sibling_ids(&mut self, scope: &Scope) -> Result<Vec<Uuid>, DatabaseError>;

    /// Highest position currently held in the scope, or -1 when empty.
    async fn max_position(&mut self, scope: &Scope) -> Result<i32, DatabaseError>;

    /// Apply a batch of `(id, position)` assignments in one statement.
    async fn write_positions(
        &mut self,
        scope: &Scope,
        assignments: &[(Uuid, i32)],
    ) -> Result<(), DatabaseError>;
}
