use anyhow::{Result, bail};
use fakemon_stats::{decode_share_code, encode_share_code, fresh_share_code};

/// Seed metadata carried into the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
    pub source_stages: Option<u8>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            code: None,
            source_stages: None,
        }
    }

    #[must_use]
    pub const fn from_share_code(seed: u64, stages: u8, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
            source_stages: Some(stages),
        }
    }
}

/// Resolve a `--seed` argument: a literal integer or a share code.
pub fn resolve_seed_input(token: &str) -> Result<SeedInfo> {
    let token = token.trim();
    if let Ok(value) = token.parse::<u64>() {
        return Ok(SeedInfo::from_numeric(value));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(SeedInfo::from_numeric(value.unsigned_abs()));
    }
    if let Some((stages, seed)) = decode_share_code(token) {
        let code = encode_share_code(stages, seed);
        return Ok(SeedInfo::from_share_code(seed, stages, code));
    }
    bail!("Unrecognized seed token: {token}");
}

/// Pick a fresh share code from `entropy` so every run can be replayed.
pub fn fresh_seed(num_stages: u8, entropy: u64) -> Result<SeedInfo> {
    let code = fresh_share_code(num_stages, entropy);
    resolve_seed_input(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numeric_and_share_code() {
        assert_eq!(resolve_seed_input("42").unwrap(), SeedInfo::from_numeric(42));
        assert_eq!(resolve_seed_input("-7").unwrap().seed, 7);
        let info = resolve_seed_input("s4-frost-1a").unwrap();
        assert_eq!(info.code.as_deref(), Some("S4-FROST-1A"));
        assert_eq!(info.source_stages, Some(4));
        assert_eq!(info.seed, 42);
        let lenient = resolve_seed_input("S4-FROST-LA").unwrap();
        assert_eq!(lenient.code.as_deref(), Some("S4-FROST-1A"));
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!(resolve_seed_input("banana").is_err());
        assert!(resolve_seed_input("S4-CAVERN-1A").is_err());
    }

    #[test]
    fn fresh_seeds_carry_codes() {
        let info = fresh_seed(2, 0xDEAD_BEEF).unwrap();
        assert_eq!(info.source_stages, Some(2));
        assert!(info.code.unwrap().starts_with("S2-"));
    }
}
