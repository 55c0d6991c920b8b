//! Seeded random streams and the integer sampling primitives built on them.
use hmac::{Hmac, Mac};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

use crate::error::StatError;

/// Uniform integer in `[low, high)`.
///
/// Callers must pass a non-empty domain; an empty one yields `low`.
pub fn uniform_int<R: Rng + ?Sized>(rng: &mut R, low: u64, high: u64) -> u64 {
    if high <= low {
        return low;
    }
    rng.gen_range(low..high)
}

/// Inclusive unit bounds `aligned_sample` draws from.
///
/// A non-degenerate range skips its floor unit, and the ceiling unit never
/// overshoots `max`.
///
/// # Errors
///
/// Returns [`StatError::ZeroIncrement`] when `increment` is zero.
pub fn unit_bounds(min: u32, max: u32, increment: u32) -> Result<(u64, u64), StatError> {
    if increment == 0 {
        return Err(StatError::ZeroIncrement);
    }
    let (min, max, step) = (u64::from(min), u64::from(max), u64::from(increment));
    let mut low = min / step;
    if min != max {
        low += 1;
    }
    let mut high = max.div_ceil(step);
    if high * step > max {
        high = max / step;
    }
    Ok((low, high))
}

/// True when `aligned_sample` has at least one multiple of `increment` inside `[min, max]` to draw.
#[must_use]
pub fn has_aligned_value(min: u32, max: u32, increment: u32) -> bool {
    match unit_bounds(min, max, increment) {
        Ok((low, high)) => low <= high && low * u64::from(increment) >= u64::from(min),
        Err(_) => false,
    }
}

/// Draw a multiple of `increment` from `[min, max]`.
///
/// # Errors
///
/// Returns [`StatError::ZeroIncrement`] for a zero increment and
/// [`StatError::EmptyUnitRange`] when no multiple of `increment` can be drawn.
pub fn aligned_sample<R: Rng + ?Sized>(
    rng: &mut R,
    min: u32,
    max: u32,
    increment: u32,
) -> Result<u32, StatError> {
    if !has_aligned_value(min, max, increment) {
        unit_bounds(min, max, increment)?;
        return Err(StatError::EmptyUnitRange {
            min,
            max,
            increment,
        });
    }
    let (low, high) = unit_bounds(min, max, increment)?;
    let unit = uniform_int(rng, low, high + 1);
    u32::try_from(unit * u64::from(increment)).map_err(|_| StatError::EmptyUnitRange {
        min,
        max,
        increment,
    })
}

/// Deterministic bundle of RNG streams segregated by generation domain.
#[derive(Debug, Clone)]
pub struct RngBundle {
    stats: CountingRng<ChaCha20Rng>,
    profile: CountingRng<ChaCha20Rng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            stats: CountingRng::new(derive_stream_seed(seed, b"stats")),
            profile: CountingRng::new(derive_stream_seed(seed, b"profile")),
        }
    }

    /// Access the stat sampling stream.
    pub fn stats(&mut self) -> &mut CountingRng<ChaCha20Rng> {
        &mut self.stats
    }

    /// Access the creature profile stream.
    pub fn profile(&mut self) -> &mut CountingRng<ChaCha20Rng> {
        &mut self.profile
    }

    /// Split into `(stats, profile)` streams.
    #[must_use]
    pub fn into_streams(self) -> (CountingRng<ChaCha20Rng>, CountingRng<ChaCha20Rng>) {
        (self.stats, self.profile)
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
