//! Ordered-collection reorder engine.
//!
//! Admin drag-and-drop sends a full permutation of a scope's ids; this module
//! commits it as contiguous positions `0..n` without ever leaving two sibling
//! rows on the same position, even transiently. Positions are first moved to a
//! collision-free temporary range above everything currently held in the
//! scope, then rewritten to their final values; the enclosing transaction
//! makes the pair of writes all-or-nothing.

pub mod pg;
pub mod position;
pub mod store;

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use self::position::{assign_contiguous, compute_temp_base};
use self::store::{OrderingStore, Scope};

#[derive(Debug, Error)]
pub enum OrderingError {
    #[error("the parent scope does not exist")]
    ScopeNotFound,

    #[error("ordering must be a non-empty list of ids")]
    Empty,

    #[error("ordering names {got} ids but the scope holds {expected}")]
    WrongCount { expected: usize, got: usize },

    #[error("id {0} is unknown in this scope or listed twice")]
    UnknownId(Uuid),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Commit `ordered_ids` as the new display order of `scope`.
///
/// The supplied ids must be exactly the ids stored under the scope; any
/// mismatch is rejected before a single write. Validation reads run inside
/// the caller's transaction so they see the same snapshot the writes will.
///
/// On `Err` the caller must roll the transaction back; no partial ordering
/// is ever left behind.
pub async fn reorder<S: OrderingStore + ?Sized>(
    store: &mut S,
    scope: &Scope,
    ordered_ids: &[Uuid],
) -> Result<(), OrderingError> {
    // Scope check runs in the same transaction as everything else, so a
    // category deleted concurrently reads as missing, not as an id mismatch.
    if !store.scope_exists(scope).await? {
        return Err(OrderingError::ScopeNotFound);
    }

    if ordered_ids.is_empty() {
        return Err(OrderingError::Empty);
    }

    let current = store.sibling_ids(scope).await?;
    if current.len() != ordered_ids.len() {
        return Err(OrderingError::WrongCount {
            expected: current.len(),
            got: ordered_ids.len(),
        });
    }

    let stored: HashSet<Uuid> = current.into_iter().collect();
    let mut seen = HashSet::with_capacity(ordered_ids.len());
    for id in ordered_ids {
        // A duplicate with matching cardinality also means some stored id
        // went unnamed, so both cases reject the same way.
        if !stored.contains(id) || !seen.insert(*id) {
            return Err(OrderingError::UnknownId(*id));
        }
    }

    let current_max = store.max_position(scope).await?;
    let base = compute_temp_base(current_max, ordered_ids.len());
    debug!(%scope, count = ordered_ids.len(), base, "reordering");

    let finals = assign_contiguous(ordered_ids);

    // Phase 1: park every row in the temporary range, clear of all old
    // positions and of each other.
    let temps: Vec<(Uuid, i32)> = finals
        .iter()
        .map(|(id, position)| (*id, base + position))
        .collect();
    store.write_positions(scope, &temps).await?;

    // Phase 2: true final positions 0..n.
    store.write_positions(scope, &finals).await?;

    Ok(())
}
