//! Splitting the padded pool across fighting areas.

use super::models::Slot;

/// Split `pool` into `area_count` contiguous chunks
///
/// Chunk sizes differ by at most one; the first `len % area_count` chunks
/// take the extra slot. Order is preserved across chunk boundaries.
///
/// # Panics
///
/// Panics if `area_count` is zero.
pub fn partition_areas(pool: Vec<Slot>, area_count: usize) -> Vec<Vec<Slot>> {
    assert!(area_count > 0, "area count must be positive");

    let base = pool.len() / area_count;
    let extra = pool.len() % area_count;
    let mut slots = pool.into_iter();

    (0..area_count)
        .map(|area| {
            let size = base + usize::from(area < extra);
            slots.by_ref().take(size).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::models::Participant;

    fn pool(n: usize) -> Vec<Slot> {
        (0..n as i64)
            .map(|i| Slot::Fighter(Participant::competitor(i, format!("F{i}"))))
            .collect()
    }

    fn sizes(areas: &[Vec<Slot>]) -> Vec<usize> {
        areas.iter().map(Vec::len).collect()
    }

    #[test]
    fn test_even_split() {
        let areas = partition_areas(pool(16), 4);
        assert_eq!(sizes(&areas), vec![4, 4, 4, 4]);
    }

    #[test]
    fn test_uneven_split_is_balanced() {
        let areas = partition_areas(pool(20), 8);
        assert_eq!(sizes(&areas), vec![3, 3, 3, 3, 2, 2, 2, 2]);
    }

    #[test]
    fn test_order_preserved() {
        let areas = partition_areas(pool(5), 2);
        let ids: Vec<Vec<i64>> = areas
            .iter()
            .map(|a| a.iter().filter_map(Slot::participant).map(|p| p.id).collect())
            .collect();
        assert_eq!(ids, vec![vec![0, 1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_single_area_takes_everything() {
        let areas = partition_areas(pool(7), 1);
        assert_eq!(sizes(&areas), vec![7]);
    }
}
