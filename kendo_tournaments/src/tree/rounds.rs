//! First-stage round planning per fighting area.

use super::models::{ELIMINATION_GROUP_SIZE, RoundPlan, Slot, TournamentSettings, TreeType};
use rand::Rng;
use rand::seq::SliceRandom;

/// Split an area into first-stage groups according to the tree format
///
/// - preliminary stage: groups of `preliminary_group_size`, match order shuffled
/// - direct elimination: pairs, match order shuffled
/// - round robin: the whole area is one group
///
/// Seats inside every group are shuffled as well. Orders start at 1.
pub fn plan_area_rounds<R: Rng + ?Sized>(
    area: u32,
    slots: Vec<Slot>,
    settings: &TournamentSettings,
    rng: &mut R,
) -> Vec<RoundPlan> {
    let groups = if settings.has_preliminary {
        chunk_shuffled(&slots, settings.preliminary_group_size, rng)
    } else if settings.tree_type == TreeType::DirectElimination {
        chunk_shuffled(&slots, ELIMINATION_GROUP_SIZE, rng)
    } else if slots.is_empty() {
        Vec::new()
    } else {
        vec![slots]
    };

    let mut rounds = Vec::with_capacity(groups.len());
    for (index, mut members) in groups.into_iter().enumerate() {
        members.shuffle(rng);
        rounds.push(RoundPlan {
            area,
            order: index as u32 + 1,
            slots: members,
        });
    }

    rounds
}

/// Plan the rounds of every area; areas are numbered from 1
pub fn plan_rounds<R: Rng + ?Sized>(
    areas: &[Vec<Slot>],
    settings: &TournamentSettings,
    rng: &mut R,
) -> Vec<RoundPlan> {
    let mut rounds = Vec::new();
    for (index, slots) in areas.iter().enumerate() {
        let area = index as u32 + 1;
        rounds.extend(plan_area_rounds(area, slots.clone(), settings, rng));
    }
    rounds
}

fn chunk_shuffled<R: Rng + ?Sized>(slots: &[Slot], size: usize, rng: &mut R) -> Vec<Vec<Slot>> {
    let mut groups: Vec<Vec<Slot>> = slots.chunks(size).map(<[Slot]>::to_vec).collect();
    groups.shuffle(rng);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::models::Participant;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn area(fighters: usize, byes: usize) -> Vec<Slot> {
        let mut slots: Vec<Slot> = (0..fighters as i64)
            .map(|i| Slot::Fighter(Participant::competitor(i, format!("F{i}"))))
            .collect();
        slots.extend(std::iter::repeat_n(Slot::Bye, byes));
        slots
    }

    fn settings(has_preliminary: bool, group_size: usize, tree_type: TreeType) -> TournamentSettings {
        TournamentSettings {
            has_preliminary,
            preliminary_group_size: group_size,
            tree_type,
            fighting_areas: 1,
        }
    }

    #[test]
    fn test_direct_elimination_makes_pairs() {
        let mut rng = StdRng::seed_from_u64(7);
        let rounds = plan_area_rounds(
            1,
            area(10, 6),
            &settings(false, 3, TreeType::DirectElimination),
            &mut rng,
        );

        assert_eq!(rounds.len(), 8);
        assert!(rounds.iter().all(|r| r.slots.len() == 2));
        let orders: Vec<u32> = rounds.iter().map(|r| r.order).collect();
        assert_eq!(orders, (1..=8).collect::<Vec<_>>());
        let members: usize = rounds.iter().map(|r| r.member_ids().len()).sum();
        assert_eq!(members, 10);
    }

    #[test]
    fn test_preliminary_groups() {
        let mut rng = StdRng::seed_from_u64(11);
        let rounds = plan_area_rounds(
            2,
            area(12, 4),
            &settings(true, 4, TreeType::DirectElimination),
            &mut rng,
        );

        assert_eq!(rounds.len(), 4);
        assert!(rounds.iter().all(|r| r.slots.len() == 4 && r.area == 2));
    }

    #[test]
    fn test_round_robin_is_one_group() {
        let mut rng = StdRng::seed_from_u64(3);
        let rounds = plan_area_rounds(
            1,
            area(7, 1),
            &settings(false, 3, TreeType::RoundRobin),
            &mut rng,
        );

        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].order, 1);
        assert_eq!(rounds[0].slots.len(), 8);
        assert_eq!(rounds[0].bye_count(), 1);
    }

    #[test]
    fn test_round_robin_empty_area() {
        let mut rng = StdRng::seed_from_u64(3);
        let rounds = plan_area_rounds(1, Vec::new(), &settings(false, 3, TreeType::RoundRobin), &mut rng);
        assert!(rounds.is_empty());
    }

    #[test]
    fn test_plan_rounds_numbers_areas_and_restarts_order() {
        let mut rng = StdRng::seed_from_u64(5);
        let areas = vec![area(4, 0), area(4, 0)];
        let rounds = plan_rounds(&areas, &settings(false, 3, TreeType::DirectElimination), &mut rng);

        assert_eq!(rounds.len(), 4);
        let keys: Vec<(u32, u32)> = rounds.iter().map(|r| (r.area, r.order)).collect();
        assert_eq!(keys, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
    }

    #[test]
    fn test_match_order_is_randomized() {
        let slots = area(32, 0);
        let elimination = settings(false, 3, TreeType::DirectElimination);
        let mut rng = StdRng::seed_from_u64(99);

        let first_pairs: Vec<Vec<i64>> = (0..10)
            .map(|_| {
                let mut ids = plan_area_rounds(1, slots.clone(), &elimination, &mut rng)[0].member_ids();
                ids.sort();
                ids
            })
            .collect();

        // Ten draws over sixteen pairs should not all open with the same match
        assert!(first_pairs.iter().any(|p| p != &first_pairs[0]));
    }
}
