//! Share codes for reproducible evolution lines.
//!
//! A code reads `S<STAGES>-<WORD>-<SEED>`, e.g. `S3-CAVERN-1A`. `SEED` is the full
//! 64-bit seed in Crockford base32, so every seed round-trips. `WORD` is a check
//! word derived from the stage count and seed; a mistyped code fails to decode
//! instead of silently rolling a different line.

use crate::stat::MAX_STAGES;

/// Check words, indexed by the low six bits of the code checksum.
pub const WORD_LIST: [&str; 64] = [
    "EMBER", "PEBBLE", "SPROUT", "RIPPLE", "SPARK", "FROST", "GUST", "THORN", "CINDER", "MOSS",
    "TIDE", "QUARTZ", "FANG", "CLAW", "WING", "SCALE", "FEATHER", "SHELL", "HORN", "TAIL", "DUNE",
    "GROVE", "RIDGE", "DELTA", "MEADOW", "CANYON", "GLACIER", "REEF", "MARSH", "CAVERN", "SUMMIT",
    "HOLLOW", "BLAZE", "STORM", "VOLT", "VENOM", "SHADE", "GLIMMER", "BOULDER", "TORRENT",
    "BRAMBLE", "ZEPHYR", "MAGMA", "DRIFT", "PRISM", "HAUNT", "RUNE", "IRON", "PETAL", "NECTAR",
    "BURROW", "TALON", "PLUME", "SNOUT", "HOOF", "WHISKER", "ANTLER", "FLIPPER", "SPINE",
    "STINGER", "MANE", "SPORE", "LARVA", "HATCH",
];

const BASE32: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// SplitMix64 finalizer.
const fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn check_word(num_stages: u8, seed: u64) -> &'static str {
    let index = mix(seed.rotate_left(8) ^ u64::from(num_stages)) % WORD_LIST.len() as u64;
    WORD_LIST[usize::try_from(index).unwrap_or_default()]
}

fn to_base32(mut value: u64) -> String {
    let mut digits = Vec::with_capacity(13);
    loop {
        digits.push(BASE32[usize::try_from(value % 32).unwrap_or_default()]);
        value /= 32;
        if value == 0 {
            break;
        }
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

fn base32_digit(c: char) -> Option<u64> {
    let c = match c.to_ascii_uppercase() {
        'O' => '0',
        'I' | 'L' => '1',
        other => other,
    };
    let position = BASE32.iter().position(|&b| char::from(b) == c)?;
    u64::try_from(position).ok()
}

fn from_base32(text: &str) -> Option<u64> {
    if text.is_empty() || text.len() > 13 {
        return None;
    }
    text.chars().try_fold(0u64, |acc, c| {
        acc.checked_mul(32)?.checked_add(base32_digit(c)?)
    })
}

/// Encode `seed` for a chain of `num_stages` stages (clamped to `1..=MAX_STAGES`).
#[must_use]
pub fn encode_share_code(num_stages: u8, seed: u64) -> String {
    let stages = num_stages.clamp(1, MAX_STAGES);
    format!("S{stages}-{}-{}", check_word(stages, seed), to_base32(seed))
}

/// Decode a share code into `(num_stages, seed)`.
///
/// Case and surrounding whitespace are ignored. Returns `None` for a malformed
/// code or one whose check word does not match.
#[must_use]
pub fn decode_share_code(code: &str) -> Option<(u8, u64)> {
    let mut parts = code.trim().split('-');
    let stages: u8 = parts
        .next()?
        .strip_prefix(['S', 's'])?
        .parse()
        .ok()
        .filter(|n| (1..=MAX_STAGES).contains(n))?;
    let word = parts.next()?;
    let seed = from_base32(parts.next()?)?;
    if parts.next().is_some() || !word.eq_ignore_ascii_case(check_word(stages, seed)) {
        return None;
    }
    Some((stages, seed))
}

/// Fresh share code from arbitrary entropy such as a clock reading.
#[must_use]
pub fn fresh_share_code(num_stages: u8, entropy: u64) -> String {
    encode_share_code(num_stages, mix(entropy))
}
