use fakemon_stats::Stat;
use regex::Regex;
use std::str::FromStr;
use thiserror::Error;

const EDIT_PATTERN: &str = r"^\s*(\d+)\s*:\s*([A-Za-z][A-Za-z. ]*?)\s*=\s*(\d+)\s*(?:\.\.|-)\s*(\d+)\s*$";

/// A `--edit STAGE:STAT=MIN..MAX` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSpec {
    pub stage: u8,
    pub stat: Stat,
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditParseError {
    #[error("expected STAGE:STAT=MIN..MAX, got `{0}`")]
    Shape(String),
    #[error("unknown stat `{0}`")]
    UnknownStat(String),
    #[error("number out of range in `{0}`")]
    Number(String),
}

impl FromStr for EditSpec {
    type Err = EditParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let pattern = Regex::new(EDIT_PATTERN).map_err(|_| EditParseError::Shape(raw.to_string()))?;
        let caps = pattern
            .captures(raw)
            .ok_or_else(|| EditParseError::Shape(raw.to_string()))?;
        let number = |idx: usize| -> Result<u32, EditParseError> {
            caps[idx]
                .parse()
                .map_err(|_| EditParseError::Number(raw.to_string()))
        };
        let stage = u8::try_from(number(1)?).map_err(|_| EditParseError::Number(raw.to_string()))?;
        let stat: Stat = caps[2]
            .parse()
            .map_err(|()| EditParseError::UnknownStat(caps[2].to_string()))?;
        Ok(Self {
            stage,
            stat,
            min: number(3)?,
            max: number(4)?,
        })
    }
}
