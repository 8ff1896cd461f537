//! Sensor configuration from environment variables

use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::error::SensorError;

const DEFAULT_PROMPT_DIRS: &str = "../Prompt_A,../Prompt_B";
const DEFAULT_MODELS: &str = "Deepseek-Alpha,Gemini_2.5_Pro,GPT-4o,Grok-3,Llama-4-Maverick";

#[derive(Clone, Debug)]
pub struct SensorConfig {
    /// JSON puzzle set (`FEN`, `Mate in N`, `Solution PGN`)
    pub puzzles_path: PathBuf,

    /// Prompt variant roots, each holding `puzzle_test/` and `legal_moves/`
    pub prompt_dirs: Vec<PathBuf>,

    /// Model directory names under each mode directory
    pub models: Vec<String>,

    /// Concurrent model jobs
    pub workers: usize,
}

impl SensorConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, SensorError> {
        let puzzles_path: PathBuf = env::var("PUZZLES_PATH")
            .unwrap_or_else(|_| "puzzles_PGN.json".to_string())
            .into();

        let prompt_dirs: Vec<PathBuf> = split_list(
            &env::var("PROMPT_DIRS").unwrap_or_else(|_| DEFAULT_PROMPT_DIRS.to_string()),
        )
        .into_iter()
        .map(PathBuf::from)
        .collect();
        if prompt_dirs.is_empty() {
            return Err(SensorError::Config("PROMPT_DIRS is empty"));
        }

        let models = split_list(&env::var("MODELS").unwrap_or_else(|_| DEFAULT_MODELS.to_string()));
        if models.is_empty() {
            return Err(SensorError::Config("MODELS is empty"));
        }

        let workers = env::var("WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or_else(num_cpus::get);

        info!(
            puzzles = %puzzles_path.display(),
            prompt_dirs = prompt_dirs.len(),
            models = models.len(),
            workers,
            "Sensor config loaded"
        );

        Ok(Self {
            puzzles_path,
            prompt_dirs,
            models,
            workers,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
