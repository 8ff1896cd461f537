//! Verdict rows written per (puzzle, model) pair. Flags serialize as 0/1.

use serde::{Deserialize, Serialize};

/// Full-puzzle verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleVerdict {
    #[serde(with = "flag")]
    pub is_solved: bool,
    /// No answer could be extracted.
    #[serde(with = "flag")]
    pub error: bool,
    /// First move's notation length differs from the solution's, or the
    /// replay ended with the solving side mated.
    #[serde(rename = "CAV", with = "flag")]
    pub cav: bool,
    /// Move-number markers 1..=4 present in only one of answer and solution.
    #[serde(rename = "NCV", with = "flag")]
    pub ncv: bool,
    /// A move failed to resolve during replay.
    #[serde(rename = "PMV", with = "flag")]
    pub pmv: bool,
}

impl PuzzleVerdict {
    pub fn extraction_error() -> Self {
        Self {
            error: true,
            ..Self::default()
        }
    }
}

/// Legal-move-only verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalVerdict {
    #[serde(with = "flag")]
    pub error: bool,
    #[serde(with = "flag")]
    pub legal: bool,
}

impl LegalVerdict {
    pub fn extraction_error() -> Self {
        Self {
            error: true,
            legal: false,
        }
    }
}

/// A full-puzzle verdict joined with the puzzle's required mate depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleResultRow {
    #[serde(flatten)]
    pub verdict: PuzzleVerdict,
    #[serde(rename = "N")]
    pub mate_in_n: u32,
}

mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(serde::de::Error::custom(format!("expected 0 or 1, got {other}"))),
        }
    }
}
