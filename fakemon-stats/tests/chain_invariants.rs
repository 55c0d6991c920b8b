use fakemon_stats::sampler::align_ranges;
use fakemon_stats::{
    GeneratorConfig, RangeChange, StageEngine, StageRangeTable, StageStatTable, Stat, StatMap,
    StatRangeMap, resolve,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeMap;

const SEEDS: u64 = 64;

fn resolved_ranges(changes: &[RangeChange]) -> BTreeMap<u8, StatRangeMap> {
    changes
        .iter()
        .filter_map(|change| match *change {
            RangeChange::Stage { stage, ranges } => Some((stage, ranges)),
            RangeChange::Stat { .. } => None,
        })
        .collect()
}

fn assert_chain(generated: &StageStatTable, ranges: &BTreeMap<u8, StatRangeMap>, increment: u32) {
    for (&stage, stats) in generated {
        assert!(stats.is_consistent(), "stage {stage} sum drifted: {stats:?}");
        let effective = align_ranges(&ranges[&stage], increment);
        for (stat, value) in stats.iter() {
            assert_eq!(value % increment, 0, "stage {stage} {stat}={value} off grid");
            assert!(
                effective.get(stat).contains(value),
                "stage {stage} {stat}={value} outside {}",
                effective.get(stat)
            );
        }
        if let Some(before) = generated.get(&(stage - 1)) {
            for stat in Stat::ALL {
                assert!(
                    stats.get(stat) >= before.get(stat),
                    "stage {stage} {stat} regressed"
                );
            }
        }
    }
}

#[test]
fn default_chain_holds_invariants_across_seeds() {
    for seed in 0..SEEDS {
        let config = GeneratorConfig {
            num_stages: 5,
            seed: Some(seed),
            ..GeneratorConfig::default()
        };
        let mut engine = StageEngine::new(&config, StageRangeTable::default_table()).unwrap();
        let delta = engine.load().unwrap();
        let generated = delta.stats.expect("full regeneration reports stats");
        assert_eq!(generated.len(), 5);
        assert_chain(&generated, &resolved_ranges(&delta.range_changes), 5);
    }
}

#[test]
fn every_increment_keeps_the_grid() {
    for increment in 1..=20 {
        let mut engine = StageEngine::with_rng(
            ChaCha20Rng::seed_from_u64(u64::from(increment)),
            4,
            increment,
            StageRangeTable::default_table(),
        );
        let delta = engine.load().unwrap();
        let ranges = resolved_ranges(&delta.range_changes);
        for (&stage, stats) in engine.generated() {
            for (stat, value) in stats.iter() {
                assert_eq!(value % increment, 0, "increment {increment} stage {stage} {stat}");
            }
            if let Some(before) = engine.stats(stage.saturating_sub(1)) {
                for stat in Stat::BASE {
                    assert!(stats.get(stat) >= before.get(stat));
                }
            }
            let effective = align_ranges(&ranges[&stage], increment);
            assert!(effective.get(Stat::Total).contains(stats.get(Stat::Total)));
        }
    }
}

#[test]
fn regeneration_preserves_growth_downstream() {
    let mut engine = StageEngine::with_rng(
        ChaCha20Rng::seed_from_u64(0xBEEF),
        5,
        5,
        StageRangeTable::default_table(),
    );
    engine.load().unwrap();
    for stage in [3, 1, 5, 2] {
        let delta = engine.regenerate_stage(stage).unwrap();
        let generated = delta.stats.unwrap();
        for (&s, stats) in generated.range(2..) {
            let before = &generated[&(s - 1)];
            for stat in Stat::ALL {
                assert!(stats.get(stat) >= before.get(stat), "stage {s} {stat}");
            }
        }
    }
}

#[test]
fn resolve_is_idempotent() {
    let table = StageRangeTable::default_table();
    let mut previous = StatMap::zero();
    for stat in Stat::BASE {
        previous.set(stat, 70);
    }
    previous.set(Stat::Total, 420);
    for stage in 1..=5 {
        assert_eq!(
            resolve(stage, &previous, &table),
            resolve(stage, &previous, &table)
        );
    }
}
