//! Stat schema shared by every stage: six base stats plus the derived Total.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Largest stage index a chain may reach.
pub const MAX_STAGES: u8 = 5;

/// One of the six base attributes or the derived Total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    #[serde(rename = "Sp. Atk.")]
    SpecialAttack,
    #[serde(rename = "Sp. Def.")]
    SpecialDefense,
    Speed,
    Total,
}

impl Stat {
    /// Every key in display order, Total last.
    pub const ALL: [Self; 7] = [
        Self::Hp,
        Self::Attack,
        Self::Defense,
        Self::SpecialAttack,
        Self::SpecialDefense,
        Self::Speed,
        Self::Total,
    ];

    /// The six sampled stats; Total is excluded.
    pub const BASE: [Self; 6] = [
        Self::Hp,
        Self::Attack,
        Self::Defense,
        Self::SpecialAttack,
        Self::SpecialDefense,
        Self::Speed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hp => "Hp",
            Self::Attack => "Attack",
            Self::Defense => "Defense",
            Self::SpecialAttack => "Sp. Atk.",
            Self::SpecialDefense => "Sp. Def.",
            Self::Speed => "Speed",
            Self::Total => "Total",
        }
    }

    #[must_use]
    pub const fn is_total(self) -> bool {
        matches!(self, Self::Total)
    }

    const fn index(self) -> usize {
        match self {
            Self::Hp => 0,
            Self::Attack => 1,
            Self::Defense => 2,
            Self::SpecialAttack => 3,
            Self::SpecialDefense => 4,
            Self::Speed => 5,
            Self::Total => 6,
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stat {
    type Err = ();

    /// Accepts display labels and the short forms used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "hp" => Ok(Self::Hp),
            "attack" | "atk" => Ok(Self::Attack),
            "defense" | "def" => Ok(Self::Defense),
            "spatk" | "specialattack" => Ok(Self::SpecialAttack),
            "spdef" | "specialdefense" => Ok(Self::SpecialDefense),
            "speed" | "spe" => Ok(Self::Speed),
            "total" => Ok(Self::Total),
            _ => Err(()),
        }
    }
}

/// Generated values for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Stat, u32>", into = "BTreeMap<Stat, u32>")]
pub struct StatMap {
    values: [u32; 7],
}

impl StatMap {
    /// All-zero map, used as the seed for the root stage.
    #[must_use]
    pub const fn zero() -> Self {
        Self { values: [0; 7] }
    }

    #[must_use]
    pub const fn get(&self, stat: Stat) -> u32 {
        self.values[stat.index()]
    }

    pub const fn set(&mut self, stat: Stat, value: u32) {
        self.values[stat.index()] = value;
    }

    /// Sum of the six base stats.
    #[must_use]
    pub fn base_sum(&self) -> u64 {
        Stat::BASE.iter().map(|&s| u64::from(self.get(s))).sum()
    }

    /// Declared Total minus the base-stat sum; zero when the map is consistent.
    #[must_use]
    pub fn residual(&self) -> i64 {
        i64::from(self.get(Stat::Total)) - i64::try_from(self.base_sum()).unwrap_or(i64::MAX)
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.residual() == 0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|&v| v == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, u32)> + '_ {
        Stat::ALL.iter().map(|&s| (s, self.get(s)))
    }
}

impl From<BTreeMap<Stat, u32>> for StatMap {
    fn from(map: BTreeMap<Stat, u32>) -> Self {
        let mut stats = Self::zero();
        for (stat, value) in map {
            stats.set(stat, value);
        }
        stats
    }
}

impl From<StatMap> for BTreeMap<Stat, u32> {
    fn from(stats: StatMap) -> Self {
        stats.iter().collect()
    }
}

/// Inclusive `[min, max]` bound pair; serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct StatRange {
    pub min: u32,
    pub max: u32,
}

impl StatRange {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Single-point range.
    #[must_use]
    pub const fn fixed(value: u32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    #[must_use]
    pub const fn is_inverted(self) -> bool {
        self.min > self.max
    }

    #[must_use]
    pub const fn contains(self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Raise the floor to `floor`, dragging the ceiling along if needed.
    #[must_use]
    pub fn with_floor(self, floor: u32) -> Self {
        let min = self.min.max(floor);
        Self {
            min,
            max: self.max.max(min),
        }
    }
}

impl From<[u32; 2]> for StatRange {
    fn from([min, max]: [u32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<StatRange> for [u32; 2] {
    fn from(range: StatRange) -> Self {
        [range.min, range.max]
    }
}

impl fmt::Display for StatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Bounds for every stat of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Stat, StatRange>", into = "BTreeMap<Stat, StatRange>")]
pub struct StatRangeMap {
    ranges: [StatRange; 7],
}

impl StatRangeMap {
    #[must_use]
    pub const fn get(&self, stat: Stat) -> StatRange {
        self.ranges[stat.index()]
    }

    pub const fn set(&mut self, stat: Stat, range: StatRange) {
        self.ranges[stat.index()] = range;
    }

    #[must_use]
    pub fn with(mut self, stat: Stat, range: StatRange) -> Self {
        self.set(stat, range);
        self
    }

    /// True when every pair is `[0, 0]`, the placeholder shape of an unset stage.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.ranges.iter().all(|r| r.min == 0 && r.max == 0)
    }

    /// Collapse to a stat map holding each lower bound.
    #[must_use]
    pub fn lower_bounds(&self) -> StatMap {
        let mut stats = StatMap::zero();
        for stat in Stat::ALL {
            stats.set(stat, self.get(stat).min);
        }
        stats
    }

    /// First stat whose pair is inverted, if any.
    #[must_use]
    pub fn first_inverted(&self) -> Option<(Stat, StatRange)> {
        Stat::ALL
            .iter()
            .map(|&s| (s, self.get(s)))
            .find(|(_, r)| r.is_inverted())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, StatRange)> + '_ {
        Stat::ALL.iter().map(|&s| (s, self.get(s)))
    }
}

impl From<BTreeMap<Stat, StatRange>> for StatRangeMap {
    fn from(map: BTreeMap<Stat, StatRange>) -> Self {
        let mut ranges = Self::default();
        for (stat, range) in map {
            ranges.set(stat, range);
        }
        ranges
    }
}

impl From<StatRangeMap> for BTreeMap<Stat, StatRange> {
    fn from(ranges: StatRangeMap) -> Self {
        ranges.iter().collect()
    }
}

/// Generated stats keyed by 1-based stage index.
pub type StageStatTable = BTreeMap<u8, StatMap>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_labels_parse_back() {
        for stat in Stat::ALL {
            assert_eq!(stat.as_str().parse::<Stat>(), Ok(stat));
        }
        assert_eq!("spatk".parse::<Stat>(), Ok(Stat::SpecialAttack));
        assert_eq!("SP-DEF".parse::<Stat>(), Ok(Stat::SpecialDefense));
        assert!("luck".parse::<Stat>().is_err());
    }

    #[test]
    fn residual_tracks_declared_total() {
        let mut stats = StatMap::zero();
        for stat in Stat::BASE {
            stats.set(stat, 10);
        }
        stats.set(Stat::Total, 60);
        assert!(stats.is_consistent());
        stats.set(Stat::Total, 65);
        assert_eq!(stats.residual(), 5);
    }

    #[test]
    fn range_map_uses_labelled_json() {
        let json = r#"{"Hp":[10,20],"Sp. Atk.":[5,15],"Total":[100,120]}"#;
        let ranges: StatRangeMap = serde_json::from_str(json).unwrap();
        assert_eq!(ranges.get(Stat::Hp), StatRange::new(10, 20));
        assert_eq!(ranges.get(Stat::SpecialAttack), StatRange::new(5, 15));
        assert_eq!(ranges.get(Stat::Speed), StatRange::default());
        assert!(!ranges.is_trivial());
        assert!(StatRangeMap::default().is_trivial());

        let out = serde_json::to_string(&ranges).unwrap();
        assert!(out.contains("\"Sp. Atk.\":[5,15]"));
    }

    #[test]
    fn with_floor_never_inverts() {
        let range = StatRange::new(10, 20).with_floor(25);
        assert_eq!(range, StatRange::new(25, 25));
        assert_eq!(StatRange::new(10, 20).with_floor(5), StatRange::new(10, 20));
    }
}
