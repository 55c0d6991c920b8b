//! Effective range resolution for a stage.
//!
//! Configured bounds are reconciled against what the previous stage actually
//! rolled. Every stat's floor ends up at or above the previous value, which is
//! what keeps a chain from regressing.
use crate::ranges::StageRangeTable;
use crate::stat::{Stat, StatMap, StatRange, StatRangeMap};

/// Headroom added above a ceiling the previous stage already reached.
pub const CEILING_MARGIN: u32 = 20;
/// Total growth applied to a stage without its own configured bounds.
pub const TOTAL_STEP: u32 = 50;

/// Compute the bounds `stage` samples from.
///
/// Pure: identical inputs always give identical output.
#[must_use]
pub fn resolve(stage: u8, previous: &StatMap, configured: &StageRangeTable) -> StatRangeMap {
    let ranges = match configured.configured(stage) {
        Some(ranges) => reconcile(ranges, previous),
        None => extrapolate(previous, configured.configured(stage.saturating_sub(1))),
    };
    enforce_floor(ranges, previous)
}

fn reconcile(configured: &StatRangeMap, previous: &StatMap) -> StatRangeMap {
    let mut effective = *configured;
    for stat in Stat::BASE {
        let range = configured.get(stat);
        let reached = previous.get(stat);
        let adjusted = if reached < range.min {
            StatRange::new(reached, range.max)
        } else if reached >= range.max {
            StatRange::new(range.min, reached.saturating_add(CEILING_MARGIN))
        } else {
            range
        };
        effective.set(stat, adjusted);
    }
    effective
}

fn extrapolate(previous: &StatMap, previous_ranges: Option<&StatRangeMap>) -> StatRangeMap {
    let mut effective = StatRangeMap::default();
    effective.set(
        Stat::Total,
        StatRange::fixed(previous.get(Stat::Total).saturating_add(TOTAL_STEP)),
    );
    for stat in Stat::BASE {
        let reached = previous.get(stat);
        let ceiling = previous_ranges.map_or(reached, |ranges| ranges.get(stat).max);
        effective.set(
            stat,
            StatRange::new(reached, ceiling.saturating_add(CEILING_MARGIN)),
        );
    }
    effective
}

fn enforce_floor(mut ranges: StatRangeMap, previous: &StatMap) -> StatRangeMap {
    for stat in Stat::ALL {
        ranges.set(stat, ranges.get(stat).with_floor(previous.get(stat)));
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_ranges(base: StatRange, total: StatRange) -> StatRangeMap {
        let mut ranges = StatRangeMap::default();
        for stat in Stat::BASE {
            ranges.set(stat, base);
        }
        ranges.with(Stat::Total, total)
    }

    fn flat_stats(base: u32) -> StatMap {
        let mut stats = StatMap::zero();
        for stat in Stat::BASE {
            stats.set(stat, base);
        }
        stats.set(Stat::Total, base * 6);
        stats
    }

    #[test]
    fn configured_range_is_kept_when_previous_sits_inside() {
        let mut table = StageRangeTable::new();
        let ranges = flat_ranges(StatRange::new(40, 80), StatRange::new(300, 400));
        table.insert(2, ranges);
        let resolved = resolve(2, &flat_stats(30), &table);
        assert_eq!(resolved.get(Stat::Hp), StatRange::new(40, 80));
        assert_eq!(resolved.get(Stat::Total), StatRange::new(300, 400));
    }

    #[test]
    fn ceiling_extends_when_previous_reached_it() {
        let mut table = StageRangeTable::new();
        table.insert(
            2,
            flat_ranges(StatRange::new(40, 80), StatRange::new(500, 600)),
        );
        let mut previous = flat_stats(50);
        previous.set(Stat::Speed, 80);
        let resolved = resolve(2, &previous, &table);
        assert_eq!(resolved.get(Stat::Speed), StatRange::new(80, 100));
        assert_eq!(resolved.get(Stat::Hp), StatRange::new(50, 80));
    }

    #[test]
    fn missing_stage_extrapolates_from_previous() {
        let mut table = StageRangeTable::new();
        table.insert(
            1,
            flat_ranges(StatRange::new(0, 50), StatRange::new(250, 300)),
        );
        let mut previous = flat_stats(45);
        previous.set(Stat::Total, 280);
        let resolved = resolve(2, &previous, &table);
        assert_eq!(resolved.get(Stat::Total), StatRange::fixed(330));
        assert_eq!(resolved.get(Stat::Attack), StatRange::new(45, 70));
    }

    #[test]
    fn root_stage_without_config_grows_from_zero() {
        let resolved = resolve(1, &StatMap::zero(), &StageRangeTable::new());
        assert_eq!(resolved.get(Stat::Total), StatRange::fixed(TOTAL_STEP));
        assert_eq!(resolved.get(Stat::Hp), StatRange::new(0, CEILING_MARGIN));
    }

    #[test]
    fn total_floor_follows_previous_total() {
        let mut table = StageRangeTable::new();
        table.insert(
            2,
            flat_ranges(StatRange::new(10, 90), StatRange::new(200, 250)),
        );
        let resolved = resolve(2, &flat_stats(50), &table);
        assert_eq!(resolved.get(Stat::Total), StatRange::fixed(300));
    }

    #[test]
    fn resolve_is_pure() {
        let table = StageRangeTable::default_table();
        let previous = flat_stats(55);
        assert_eq!(resolve(2, &previous, &table), resolve(2, &previous, &table));
    }
}
