//! Entity grouping and redistribution.
//!
//! Fighters of the same entity (federation, association, club) should not
//! meet in the first rounds. They are grouped by entity, then the groups are
//! read column by column so that neighbours come from different entities.

use super::models::{EntityGroup, EntityKey, Participant};
use std::collections::HashMap;

/// Group fighters by entity key, keeping first-seen group order
///
/// Fighters without a key share one group.
pub fn group_by_entity<F>(fighters: Vec<Participant>, key_of: F) -> Vec<EntityGroup>
where
    F: Fn(&Participant) -> Option<EntityKey>,
{
    let mut index: HashMap<Option<EntityKey>, usize> = HashMap::new();
    let mut groups: Vec<EntityGroup> = Vec::new();

    for fighter in fighters {
        let key = key_of(&fighter);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(fighter);
    }

    groups
}

/// One group per fighter, used when no entity level is configured
pub fn singleton_groups(fighters: Vec<Participant>) -> Vec<EntityGroup> {
    fighters.into_iter().map(|f| vec![f]).collect()
}

/// Size of the biggest group
pub fn max_group_len(groups: &[EntityGroup]) -> usize {
    groups.iter().map(Vec::len).max().unwrap_or(0)
}

/// Interleave groups column-major: the i-th fighter of every group, then the next column
pub fn repart(groups: Vec<EntityGroup>, max_len: usize) -> Vec<Participant> {
    let total = groups.iter().map(Vec::len).sum();
    let mut columns: Vec<_> = groups.into_iter().map(Vec::into_iter).collect();
    let mut fighters = Vec::with_capacity(total);

    for _ in 0..max_len {
        for column in columns.iter_mut() {
            if let Some(fighter) = column.next() {
                fighters.push(fighter);
            }
        }
    }

    fighters
}
