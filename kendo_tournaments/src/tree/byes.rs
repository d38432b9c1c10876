//! Bracket sizing and bye placement.

use super::models::{Participant, Slot};

/// Bracket sizes, in groups, a tree may grow to
pub const TREE_SIZE_STEPS: [usize; 7] = [1, 2, 4, 8, 16, 32, 64];

/// Smallest bracket size holding `fighter_count` fighters
///
/// Candidates are `group_size * TREE_SIZE_STEPS`. Pools larger than the last
/// candidate are capped at it rather than rejected.
///
/// # Panics
///
/// Panics if `group_size` is zero.
pub fn tree_size(fighter_count: usize, group_size: usize) -> usize {
    assert!(group_size > 0, "group size must be positive");

    let max_step = TREE_SIZE_STEPS[TREE_SIZE_STEPS.len() - 1];
    TREE_SIZE_STEPS
        .iter()
        .map(|step| step * group_size)
        .find(|&limit| fighter_count <= limit)
        .unwrap_or(max_step * group_size)
}

/// Number of byes needed to fill the bracket, 0 past the cap
pub fn bye_count(fighter_count: usize, group_size: usize) -> usize {
    tree_size(fighter_count, group_size).saturating_sub(fighter_count)
}

/// A group of `count` bye placeholders
pub fn bye_group(count: usize) -> Vec<Slot> {
    vec![Slot::Bye; count]
}

/// Insert byes in a homogeneous way
///
/// With `frequency = fighters / byes`, a bye goes before every fighter whose
/// index is a multiple of `frequency` until the byes run out. When there are
/// more byes than fighters every fighter gets a bye before it and the rest
/// are appended.
pub fn insert_byes(fighters: Vec<Participant>, byes: Vec<Slot>) -> Vec<Slot> {
    let size_fighters = fighters.len();
    let size_byes = byes.len();

    if size_byes == 0 {
        return fighters.into_iter().map(Slot::Fighter).collect();
    }

    let frequency = size_fighters / size_byes;
    let mut byes = byes.into_iter();
    let mut pool = Vec::with_capacity(size_fighters + size_byes);

    for (i, fighter) in fighters.into_iter().enumerate() {
        if frequency == 0 || i % frequency == 0 {
            if let Some(bye) = byes.next() {
                pool.push(bye);
            }
        }
        pool.push(Slot::Fighter(fighter));
    }
    pool.extend(byes);

    pool
}
