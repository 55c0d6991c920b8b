//! Stat spread sampling against a resolved range.
use log::{trace, warn};
use rand::Rng;
use smallvec::SmallVec;

use crate::error::StatError;
use crate::rng::{aligned_sample, has_aligned_value};
use crate::stat::{Stat, StatMap, StatRange, StatRangeMap};

/// Cap on single-increment nudges while reconciling the base stats with Total.
pub const MAX_ADJUST_ATTEMPTS: u32 = 1000;

type Candidates = SmallVec<[Stat; 6]>;

/// Widen `range` one increment at a time until a multiple of `increment` fits.
#[must_use]
pub fn align_range(range: StatRange, increment: u32) -> StatRange {
    let mut aligned = range;
    while increment > 0 && !has_aligned_value(aligned.min, aligned.max, increment) {
        let Some(max) = aligned.max.checked_add(increment) else {
            break;
        };
        aligned.max = max;
    }
    aligned
}

/// Apply [`align_range`] to every stat.
#[must_use]
pub fn align_ranges(ranges: &StatRangeMap, increment: u32) -> StatRangeMap {
    let mut aligned = *ranges;
    for stat in Stat::ALL {
        aligned.set(stat, align_range(ranges.get(stat), increment));
    }
    aligned
}

/// Roll a full stat spread whose base stats sum to the sampled Total.
///
/// The sum holds whenever the adjustment loop converges. When it runs out of
/// attempts or of stats with room to move, the declared Total is kept and the
/// map carries a non-zero [`StatMap::residual`].
///
/// # Errors
///
/// Returns [`StatError::ZeroIncrement`] for a zero increment, or
/// [`StatError::EmptyUnitRange`] if a range cannot be widened to fit.
pub fn sample<R: Rng + ?Sized>(
    rng: &mut R,
    ranges: &StatRangeMap,
    increment: u32,
) -> Result<StatMap, StatError> {
    if increment == 0 {
        return Err(StatError::ZeroIncrement);
    }
    let ranges = align_ranges(ranges, increment);
    let total_range = ranges.get(Stat::Total);
    let goal = aligned_sample(rng, total_range.min, total_range.max, increment)?;

    let mut stats = StatMap::zero();
    for stat in Stat::BASE {
        let range = ranges.get(stat);
        stats.set(stat, aligned_sample(rng, range.min, range.max, increment)?);
    }

    let step = i64::from(increment);
    let base_sum = i64::try_from(stats.base_sum()).unwrap_or(i64::MAX);
    let mut difference = i64::from(goal) - base_sum;
    let mut attempts = 0;
    while difference != 0 && attempts < MAX_ADJUST_ATTEMPTS {
        let raising = difference > 0;
        let candidates = modifiable(&stats, &ranges, increment, raising);
        if candidates.is_empty() {
            break;
        }
        let stat = candidates[rng.gen_range(0..candidates.len())];
        let value = stats.get(stat);
        if raising {
            stats.set(stat, value + increment);
            difference -= step;
        } else {
            stats.set(stat, value - increment);
            difference += step;
        }
        trace!("nudged {stat} to {}, {difference} left", stats.get(stat));
        attempts += 1;
    }
    if difference != 0 {
        warn!("stat spread settled {difference} away from Total {goal} after {attempts} nudges");
    }

    stats.set(Stat::Total, goal);
    Ok(stats)
}

fn modifiable(stats: &StatMap, ranges: &StatRangeMap, increment: u32, raising: bool) -> Candidates {
    Stat::BASE
        .iter()
        .copied()
        .filter(|&stat| {
            let value = stats.get(stat);
            let range = ranges.get(stat);
            if raising {
                value
                    .checked_add(increment)
                    .is_some_and(|next| next <= range.max)
            } else {
                value
                    .checked_sub(increment)
                    .is_some_and(|next| next >= range.min)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn flat_ranges(base: StatRange, total: StatRange) -> StatRangeMap {
        let mut ranges = StatRangeMap::default();
        for stat in Stat::BASE {
            ranges.set(stat, base);
        }
        ranges.with(Stat::Total, total)
    }

    #[test]
    fn spread_sums_to_total_on_increment_grid() {
        let ranges = flat_ranges(StatRange::new(0, 50), StatRange::new(250, 300));
        for seed in 0..200 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let stats = sample(&mut rng, &ranges, 5).unwrap();
            assert!(stats.is_consistent(), "seed {seed}: {stats:?}");
            for (stat, value) in stats.iter() {
                assert_eq!(value % 5, 0, "{stat} off grid");
                assert!(ranges.get(stat).contains(value), "{stat}={value}");
            }
        }
    }

    #[test]
    fn unreachable_total_keeps_declared_goal() {
        let ranges = flat_ranges(StatRange::new(0, 10), StatRange::new(200, 200));
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let stats = sample(&mut rng, &ranges, 5).unwrap();
        assert_eq!(stats.get(Stat::Total), 200);
        assert_eq!(stats.base_sum(), 60);
        assert_eq!(stats.residual(), 140);
    }

    #[test]
    fn adjustment_stops_at_attempt_cap() {
        let ranges = flat_ranges(StatRange::new(0, 10_000), StatRange::fixed(0));
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let stats = sample(&mut rng, &ranges, 1).unwrap();

        // Same draws as `sample`, minus the nudges.
        let mut replay = ChaCha20Rng::seed_from_u64(3);
        let goal = aligned_sample(&mut replay, 0, 0, 1).unwrap();
        let mut initial = 0u64;
        for _ in Stat::BASE {
            initial += u64::from(aligned_sample(&mut replay, 0, 10_000, 1).unwrap());
        }
        assert_eq!(goal, 0);
        assert!(initial > u64::from(MAX_ADJUST_ATTEMPTS));

        assert_eq!(stats.get(Stat::Total), 0);
        assert_eq!(stats.base_sum(), initial - u64::from(MAX_ADJUST_ATTEMPTS));
        let gap = i64::try_from(initial).unwrap();
        assert!(stats.residual() < 0);
        assert!(stats.residual().abs() < gap);
    }

    #[test]
    fn align_range_widens_narrow_pairs() {
        assert_eq!(align_range(StatRange::new(45, 47), 5), StatRange::new(45, 52));
        assert_eq!(align_range(StatRange::fixed(330), 7), StatRange::new(330, 337));
        assert_eq!(align_range(StatRange::fixed(330), 5), StatRange::fixed(330));
        assert_eq!(align_range(StatRange::new(0, 50), 5), StatRange::new(0, 50));
    }

    #[test]
    fn widened_ranges_still_sample() {
        let ranges = flat_ranges(StatRange::new(45, 47), StatRange::fixed(331));
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let stats = sample(&mut rng, &ranges, 5).unwrap();
        assert_eq!(stats.get(Stat::Hp), 50);
        assert_eq!(stats.get(Stat::Total), 335);
    }

    #[test]
    fn zero_increment_fails_fast() {
        let ranges = flat_ranges(StatRange::new(0, 50), StatRange::new(250, 300));
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert_eq!(sample(&mut rng, &ranges, 0), Err(StatError::ZeroIncrement));
    }
}
