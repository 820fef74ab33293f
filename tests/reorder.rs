//! Reorder engine properties, driven against an in-memory store that stages
//! writes like a transaction and records every batched position write.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use menu_api::database::manager::DatabaseError;
use menu_api::ordering::store::{OrderingStore, Scope};
use menu_api::ordering::{reorder, OrderingError};

/// Stand-in for a Postgres transaction: writes land in `staged` and only
/// reach `committed` on an explicit commit, so rollback behavior is
/// observable. `write_log` captures each batch for collision checks.
#[derive(Default)]
struct MockStore {
    committed: HashMap<Uuid, i32>,
    staged: HashMap<Uuid, i32>,
    write_log: Vec<Vec<(Uuid, i32)>>,
    fail_on_write: Option<usize>,
    /// Simulates the owning category having been deleted concurrently
    scope_missing: bool,
}

impl MockStore {
    fn with_rows(rows: &[(Uuid, i32)]) -> Self {
        let map: HashMap<Uuid, i32> = rows.iter().copied().collect();
        Self {
            committed: map.clone(),
            staged: map,
            ..Default::default()
        }
    }

    fn commit(&mut self) {
        self.committed = self.staged.clone();
    }

    fn rollback(&mut self) {
        self.staged = self.committed.clone();
    }
}

#[async_trait]
impl OrderingStore for MockStore {
    async fn scope_exists(&mut self, _scope: &Scope) -> Result<bool, DatabaseError> {
        Ok(!self.scope_missing)
    }

    async fn sibling_ids(&mut self, _scope: &Scope) -> Result<Vec<Uuid>, DatabaseError> {
        let mut rows: Vec<(Uuid, i32)> = self.staged.iter().map(|(id, p)| (*id, *p)).collect();
        rows.sort_by_key(|(_, position)| *position);
        Ok(rows.into_iter().map(|(id, _)| id).collect())
    }

    async fn max_position(&mut self, _scope: &Scope) -> Result<i32, DatabaseError> {
        Ok(self.staged.values().copied().max().unwrap_or(-1))
    }

    async fn write_positions(
        &mut self,
        _scope: &Scope,
        assignments: &[(Uuid, i32)],
    ) -> Result<(), DatabaseError> {
        if self.fail_on_write == Some(self.write_log.len()) {
            return Err(DatabaseError::QueryError("forced write failure".to_string()));
        }
        self.write_log.push(assignments.to_vec());
        for (id, position) in assignments {
            self.staged.insert(*id, *position);
        }
        Ok(())
    }
}

fn seed(n: usize) -> (Vec<Uuid>, MockStore) {
    let ids: Vec<Uuid> = (0..n).map(|_| Uuid::new_v4()).collect();
    let rows: Vec<(Uuid, i32)> = ids
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i32))
        .collect();
    let store = MockStore::with_rows(&rows);
    (ids, store)
}

/// Replay the write log one row at a time over the starting positions and
/// assert no two rows ever share a position.
fn assert_no_transient_collision(start: &HashMap<Uuid, i32>, log: &[Vec<(Uuid, i32)>]) {
    let mut positions = start.clone();
    for batch in log {
        for (id, position) in batch {
            positions.insert(*id, *position);
            let distinct: HashSet<i32> = positions.values().copied().collect();
            assert_eq!(
                distinct.len(),
                positions.len(),
                "two rows held the same position mid-operation"
            );
        }
    }
}

#[tokio::test]
async fn drag_scenario_assigns_requested_order() -> Result<()> {
    // Category holds [A pos0, B pos1, C pos2]; admin drags C to the front.
    let (ids, mut store) = seed(3);
    let (a, b, c) = (ids[0], ids[1], ids[2]);
    let start = store.committed.clone();

    reorder(&mut store, &Scope::Categories, &[c, a, b]).await?;
    store.commit();

    assert_eq!(store.committed[&c], 0);
    assert_eq!(store.committed[&a], 1);
    assert_eq!(store.committed[&b], 2);

    assert_no_transient_collision(&start, &store.write_log);
    Ok(())
}

#[tokio::test]
async fn no_transient_collision_with_position_gaps() -> Result<()> {
    // Gaps from earlier deletes: positions 0, 5, 9
    let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let rows = [(ids[0], 0), (ids[1], 5), (ids[2], 9)];
    let mut store = MockStore::with_rows(&rows);
    let start = store.committed.clone();

    reorder(&mut store, &Scope::Categories, &[ids[2], ids[0], ids[1]]).await?;
    store.commit();

    // Final positions are contiguous regardless of prior gaps
    assert_eq!(store.committed[&ids[2]], 0);
    assert_eq!(store.committed[&ids[0]], 1);
    assert_eq!(store.committed[&ids[1]], 2);
    assert_no_transient_collision(&start, &store.write_log);

    // Phase 1 parked everything above the old maximum
    for (_, position) in &store.write_log[0] {
        assert!(*position > 9);
    }
    Ok(())
}

#[tokio::test]
async fn reorder_only_touches_positions_and_keeps_id_set() -> Result<()> {
    let (ids, mut store) = seed(5);
    let before: HashSet<Uuid> = store.committed.keys().copied().collect();

    let mut reversed = ids.clone();
    reversed.reverse();
    reorder(&mut store, &Scope::Categories, &reversed).await?;
    store.commit();

    let after: HashSet<Uuid> = store.committed.keys().copied().collect();
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn reorder_is_idempotent() -> Result<()> {
    let (ids, mut store) = seed(4);
    let order = vec![ids[3], ids[1], ids[0], ids[2]];

    reorder(&mut store, &Scope::Categories, &order).await?;
    store.commit();
    let first = store.committed.clone();

    reorder(&mut store, &Scope::Categories, &order).await?;
    store.commit();

    assert_eq!(first, store.committed);
    Ok(())
}

#[tokio::test]
async fn empty_ordering_is_rejected_without_writes() {
    let (_, mut store) = seed(3);

    let err = reorder(&mut store, &Scope::Categories, &[]).await.unwrap_err();
    assert!(matches!(err, OrderingError::Empty));
    assert!(store.write_log.is_empty());
}

#[tokio::test]
async fn partial_ordering_is_rejected_without_writes() {
    let (ids, mut store) = seed(3);

    let err = reorder(&mut store, &Scope::Categories, &ids[..2])
        .await
        .unwrap_err();
    assert!(matches!(err, OrderingError::WrongCount { expected: 3, got: 2 }));
    assert!(store.write_log.is_empty());
}

#[tokio::test]
async fn foreign_id_is_rejected_without_writes() {
    let (ids, mut store) = seed(3);
    let foreign = Uuid::new_v4();

    let err = reorder(&mut store, &Scope::Categories, &[ids[0], ids[1], foreign])
        .await
        .unwrap_err();
    assert!(matches!(err, OrderingError::UnknownId(id) if id == foreign));
    assert!(store.write_log.is_empty());
}

#[tokio::test]
async fn duplicate_id_is_rejected_without_writes() {
    let (ids, mut store) = seed(3);

    let err = reorder(&mut store, &Scope::Categories, &[ids[0], ids[1], ids[1]])
        .await
        .unwrap_err();
    assert!(matches!(err, OrderingError::UnknownId(id) if id == ids[1]));
    assert!(store.write_log.is_empty());
}

#[tokio::test]
async fn vanished_scope_is_reported_as_missing_not_as_mismatch() {
    // The ids are a perfectly valid permutation; only the category is gone.
    let (ids, mut store) = seed(3);
    store.scope_missing = true;

    let err = reorder(&mut store, &Scope::CategoryItems(Uuid::new_v4()), &ids)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderingError::ScopeNotFound));
    assert!(store.write_log.is_empty());
}

#[tokio::test]
async fn failed_second_phase_rolls_back_to_original_positions() {
    let (ids, mut store) = seed(3);
    let original = store.committed.clone();

    // Phase 1 (write 0) succeeds, phase 2 (write 1) fails
    store.fail_on_write = Some(1);

    let order = vec![ids[2], ids[0], ids[1]];
    let err = reorder(&mut store, &Scope::Categories, &order).await.unwrap_err();
    assert!(matches!(err, OrderingError::Store(_)));

    // The handler rolls the transaction back; no temporary position survives
    store.rollback();
    assert_eq!(store.committed, original);
    assert_eq!(store.staged, original);
}

#[tokio::test]
async fn single_element_reorder_is_a_clean_noop() -> Result<()> {
    let (ids, mut store) = seed(1);
    reorder(&mut store, &Scope::Categories, &ids).await?;
    store.commit();
    assert_eq!(store.committed[&ids[0]], 0);
    Ok(())
}
