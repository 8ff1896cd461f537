//! On-disk layout of puzzle sets, raw responses and result files.

use std::fs;
use std::path::{Path, PathBuf};

use chess_core::puzzle::Puzzle;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SensorError;
use crate::extraction::AnswerKind;

/// File written next to the raw responses by the parse step.
pub const PARSED_FILE: &str = "parsed_output.json";

/// Which test a directory of responses belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestMode {
    /// Mate-in-N puzzle solving
    Puzzle,
    /// Single legal move
    Legal,
}

impl TestMode {
    pub fn dir_name(self) -> &'static str {
        match self {
            TestMode::Puzzle => "puzzle_test",
            TestMode::Legal => "legal_moves",
        }
    }

    pub fn answer_kind(self) -> AnswerKind {
        match self {
            TestMode::Puzzle => AnswerKind::MoveSequence,
            TestMode::Legal => AnswerKind::SingleMove,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "puzzle" => Some(TestMode::Puzzle),
            "legal" => Some(TestMode::Legal),
            _ => None,
        }
    }
}

/// Paths for one (prompt variant, test mode, model) combination.
#[derive(Debug, Clone)]
pub struct ModelLayout {
    pub model: String,
    pub mode: TestMode,
    /// `{prompt_dir}/{mode_dir}`
    pub mode_dir: PathBuf,
}

impl ModelLayout {
    pub fn new(prompt_dir: &Path, mode: TestMode, model: &str) -> Self {
        Self {
            model: model.to_string(),
            mode,
            mode_dir: prompt_dir.join(mode.dir_name()),
        }
    }

    /// Directory holding the raw `output_NN.txt` responses.
    pub fn responses_dir(&self) -> PathBuf {
        self.mode_dir.join(&self.model)
    }

    pub fn parsed_path(&self) -> PathBuf {
        self.responses_dir().join(PARSED_FILE)
    }

    pub fn results_path(&self) -> PathBuf {
        self.mode_dir.join(format!("results_{}.json", self.model))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.mode_dir.join(format!("summary_{}.json", self.model))
    }
}

pub fn load_puzzles(path: &Path) -> Result<Vec<Puzzle>, SensorError> {
    read_json(path)
}

/// Raw response files of a model directory, in lexical order.
pub fn response_files(dir: &Path) -> Result<Vec<PathBuf>, SensorError> {
    let pattern = format!(
        "{}/output_*.txt",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let mut files = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
    files.sort();
    Ok(files)
}

pub fn read_text(path: &Path) -> Result<String, SensorError> {
    fs::read_to_string(path).map_err(|e| SensorError::io(path, e))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SensorError> {
    let text = read_text(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SensorError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| SensorError::io(path, e))
}
