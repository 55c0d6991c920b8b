use fakemon_stats::{
    EditOutcome, RangeChange, RejectReason, StageEngine, StageRangeTable, Stat, StatMap,
    StatRange, StatRangeMap, resolve,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn starter_table() -> StageRangeTable {
    let mut ranges = StatRangeMap::default();
    for stat in Stat::BASE {
        ranges.set(stat, StatRange::new(0, 50));
    }
    ranges.set(Stat::Total, StatRange::new(250, 300));
    std::iter::once((1, ranges)).collect()
}

fn engine(num_stages: u8, table: StageRangeTable, seed: u64) -> StageEngine<ChaCha20Rng> {
    StageEngine::with_rng(ChaCha20Rng::seed_from_u64(seed), num_stages, 5, table)
}

#[test]
fn root_stage_rolls_inside_configured_bounds() {
    for seed in 0..100 {
        let mut engine = engine(1, starter_table(), seed);
        engine.load().unwrap();
        let stats = engine.stats(1).unwrap();
        for stat in Stat::BASE {
            let value = stats.get(stat);
            assert_eq!(value % 5, 0);
            assert!(value <= 50, "{stat}={value}");
        }
        let total = stats.get(Stat::Total);
        assert!((250..=300).contains(&total));
        assert_eq!(stats.base_sum(), u64::from(total));
    }
}

#[test]
fn unconfigured_stage_grows_total_by_fifty() {
    let mut previous = StatMap::zero();
    for (stat, value) in Stat::BASE.into_iter().zip([50, 45, 45, 50, 45, 45]) {
        previous.set(stat, value);
    }
    previous.set(Stat::Total, 280);
    let resolved = resolve(2, &previous, &starter_table());
    assert_eq!(resolved.get(Stat::Total), StatRange::new(330, 330));
    for stat in Stat::BASE {
        assert_eq!(resolved.get(stat).min, previous.get(stat));
        assert_eq!(resolved.get(stat).max, 70);
    }

    let mut engine = engine(2, starter_table(), 7);
    let delta = engine.load().unwrap();
    let stage_one = *engine.stats(1).unwrap();
    let Some(RangeChange::Stage { stage: 2, ranges }) = delta.range_changes.get(1).copied() else {
        panic!("stage 2 range proposal missing");
    };
    let total = stage_one.get(Stat::Total) + 50;
    assert_eq!(ranges.get(Stat::Total), StatRange::fixed(total));
    assert_eq!(engine.stats(2).unwrap().get(Stat::Total), total);
    for stat in Stat::BASE {
        assert_eq!(ranges.get(stat).min, stage_one.get(stat));
    }
}

#[test]
fn root_edits_pass_and_undercutting_edits_are_ignored() {
    let mut engine = engine(2, StageRangeTable::default_table(), 11);
    engine.load().unwrap();

    let outcome = engine.edit_range(1, Stat::Attack, 20, 60).unwrap();
    let EditOutcome::Accepted(delta) = outcome else {
        panic!("root stage edit was rejected");
    };
    assert_eq!(
        delta.range_changes[0],
        RangeChange::Stat {
            stage: 1,
            stat: Stat::Attack,
            range: StatRange::new(20, 60),
        }
    );

    let attack = engine.stats(1).unwrap().get(Stat::Attack);
    let outcome = engine.edit_range(2, Stat::Attack, attack - 5, 90).unwrap();
    assert_eq!(
        outcome,
        EditOutcome::Rejected(RejectReason::BelowPreviousStage { floor: attack })
    );
}

#[test]
fn growing_from_two_to_four_stages_extends_the_chain() {
    let mut engine = engine(2, StageRangeTable::default_table(), 21);
    engine.load().unwrap();
    let before = engine.generated().clone();

    let delta = engine.set_num_stages(4).unwrap();
    let generated = delta.stats.unwrap();
    assert_eq!(generated.len(), 4);
    assert_eq!(generated[&1], before[&1]);
    assert_eq!(generated[&2], before[&2]);
    for stage in 3..=4u8 {
        let current = &generated[&stage];
        let previous = &generated[&(stage - 1)];
        for stat in Stat::ALL {
            assert!(current.get(stat) >= previous.get(stat), "stage {stage} {stat}");
        }
    }
}
