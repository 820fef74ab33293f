//! Pure position arithmetic shared by the reorder engine and its tests.

use uuid::Uuid;

/// Compute a base offset for temporary positions.
///
/// The returned base is strictly greater than `current_max`, and the whole
/// temporary range `base..base + count` sits above every position currently
/// held in the scope, so phase-1 writes can collide with nothing - neither
/// with rows not yet moved nor with the final values `0..count`.
pub fn compute_temp_base(current_max: i32, count: usize) -> i32 {
    current_max + count as i32 + 1
}

/// Map each id to its index in the requested ordering - the final,
/// contiguous `0..n` positions.
pub fn assign_contiguous(ids: &[Uuid]) -> Vec<(Uuid, i32)> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_base_clears_current_and_final_ranges() {
        for count in 1..=32usize {
            // Distinct non-negative positions imply current_max >= count - 1
            for current_max in (count as i32 - 1)..(count as i32 + 40) {
                let base = compute_temp_base(current_max, count);
                assert!(base > current_max, "base must clear held positions");
                // temp range never intersects the final range 0..count
                assert!(base >= count as i32);
                // highest temp value stays within i32 for sane inputs
                assert!(base + count as i32 - 1 > current_max);
            }
        }
    }

    #[test]
    fn contiguous_assignment_follows_input_order() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let assigned = assign_contiguous(&ids);
        assert_eq!(assigned.len(), 4);
        for (index, (id, position)) in assigned.iter().enumerate() {
            assert_eq!(*id, ids[index]);
            assert_eq!(*position, index as i32);
        }
    }

    #[test]
    fn contiguous_assignment_of_empty_list_is_empty() {
        assert!(assign_contiguous(&[]).is_empty());
    }
}
