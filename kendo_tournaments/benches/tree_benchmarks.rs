use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use kendo_tournaments::{
    db::MemoryTreeRepository,
    tree::{
        Affiliation, Championship, EntityLevel, Participant, ParticipantKind, TournamentSettings,
        TreeGenerator, TreeType, byes::insert_byes, byes::bye_group, grouping::group_by_entity,
        grouping::max_group_len, grouping::repart, plan_tree,
    },
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

/// Fighters spread over `clubs` clubs
fn fighters(n: usize, clubs: i64) -> Vec<Participant> {
    (0..n as i64)
        .map(|i| {
            Participant::competitor(i, format!("Fighter {i}")).with_affiliation(Affiliation {
                club_id: Some(i % clubs),
                ..Affiliation::default()
            })
        })
        .collect()
}

fn preliminary(areas: usize) -> TournamentSettings {
    TournamentSettings {
        has_preliminary: true,
        preliminary_group_size: 3,
        tree_type: TreeType::DirectElimination,
        fighting_areas: areas,
    }
}

/// Benchmark redistribution of club groups
fn bench_repart(c: &mut Criterion) {
    let mut group = c.benchmark_group("repart");

    for n in [16, 64, 128].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{n}_fighters")), n, |b, &n| {
            b.iter_batched(
                || group_by_entity(fighters(n, 7), |p| EntityLevel::Club.key_of(p)),
                |groups| {
                    let max = max_group_len(&groups);
                    repart(groups, max)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark bye insertion in a half-empty bracket
fn bench_insert_byes(c: &mut Criterion) {
    c.bench_function("insert_byes_65_in_128", |b| {
        b.iter_batched(
            || (fighters(65, 1), bye_group(63)),
            |(fighters, byes)| insert_byes(fighters, byes),
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark the whole in-memory pipeline with different pool sizes
fn bench_plan_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_tree");

    for n in [10, 50, 120].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{n}_fighters")), n, |b, &n| {
            let mut rng = StdRng::seed_from_u64(42);
            let settings = preliminary(2);
            b.iter_batched(
                || fighters(n, 5),
                |pool| plan_tree(pool, &settings, Some(EntityLevel::Club), &mut rng),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark generation including the in-memory round store
fn bench_generate_bracket(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to build runtime");
    let repository = Arc::new(MemoryTreeRepository::new());
    runtime.block_on(repository.add_championship(
        Championship {
            id: 1,
            kind: ParticipantKind::Competitor,
            settings: preliminary(4),
        },
        fighters(100, 9),
    ));
    let generator =
        TreeGenerator::from_repository(repository).with_group_by(Some(EntityLevel::Club));

    c.bench_function("generate_bracket_100_fighters", |b| {
        b.iter(|| runtime.block_on(generator.generate_bracket(1)));
    });
}

criterion_group!(seeding, bench_repart, bench_insert_byes);

criterion_group!(generation, bench_plan_tree, bench_generate_bracket);

criterion_main!(seeding, generation);
