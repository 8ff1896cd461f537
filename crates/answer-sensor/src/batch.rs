//! Parse and grade drivers over prompt/model directories.
//!
//! Every model directory is an independent job. Jobs run on the blocking
//! pool, bounded by a semaphore; one failing job never stops the others.

use std::path::PathBuf;
use std::sync::Arc;

use chess_core::puzzle::{ParsedLegalAnswer, ParsedPuzzleAnswer, Puzzle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::classifier::{classify_legal, classify_puzzle};
use crate::config::SensorConfig;
use crate::dataset::{self, ModelLayout, TestMode};
use crate::error::SensorError;
use crate::extraction::{extract_answer, ExtractedAnswer};
use crate::verdict::{LegalVerdict, PuzzleResultRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Extract answers from raw responses.
    Parse,
    /// Classify previously extracted answers.
    Grade,
    /// Parse, then grade.
    Run,
}

impl Command {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "parse" => Some(Command::Parse),
            "grade" => Some(Command::Grade),
            "run" => Some(Command::Run),
            _ => None,
        }
    }
}

/// Aggregate counts for one graded model directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub model: String,
    pub mode: TestMode,
    pub rows: usize,
    pub errors: usize,
    #[serde(flatten)]
    pub counts: SummaryCounts,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryCounts {
    Puzzle {
        solved: usize,
        cav: usize,
        ncv: usize,
        pmv: usize,
    },
    Legal {
        legal: usize,
    },
}

impl Summary {
    pub fn from_puzzle_rows(model: &str, rows: &[PuzzleResultRow]) -> Self {
        let count = |f: fn(&PuzzleResultRow) -> bool| rows.iter().filter(|r| f(*r)).count();
        Self {
            model: model.to_string(),
            mode: TestMode::Puzzle,
            rows: rows.len(),
            errors: count(|r| r.verdict.error),
            counts: SummaryCounts::Puzzle {
                solved: count(|r| r.verdict.is_solved),
                cav: count(|r| r.verdict.cav),
                ncv: count(|r| r.verdict.ncv),
                pmv: count(|r| r.verdict.pmv),
            },
            generated_at: Utc::now(),
        }
    }

    pub fn from_legal_rows(model: &str, rows: &[LegalVerdict]) -> Self {
        Self {
            model: model.to_string(),
            mode: TestMode::Legal,
            rows: rows.len(),
            errors: rows.iter().filter(|r| r.error).count(),
            counts: SummaryCounts::Legal {
                legal: rows.iter().filter(|r| r.legal).count(),
            },
            generated_at: Utc::now(),
        }
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub summaries: Vec<Summary>,
}

/// Extract the answer of every response in a model directory and write
/// `parsed_output.json`. Returns the number of rows written.
pub fn parse_model(puzzles: &[Puzzle], layout: &ModelLayout) -> Result<usize, SensorError> {
    let dir = layout.responses_dir();
    let files = dataset::response_files(&dir)?;
    if files.len() < puzzles.len() {
        return Err(SensorError::MissingResponse {
            dir,
            index: files.len(),
        });
    }
    if files.len() > puzzles.len() {
        warn!(
            dir = %dir.display(),
            extra = files.len() - puzzles.len(),
            "More responses than puzzles, ignoring the rest"
        );
    }

    let kind = layout.mode.answer_kind();
    let mut answers = Vec::with_capacity(puzzles.len());
    for (puzzle, path) in puzzles.iter().zip(&files) {
        let raw = dataset::read_text(path)?;
        let answer = extract_answer(&raw, kind);
        if answer == ExtractedAnswer::Missing {
            info!(file = %path.display(), "No usable answer");
        }
        answers.push((puzzle, answer.to_serialized()));
    }

    let path = layout.parsed_path();
    match layout.mode {
        TestMode::Puzzle => {
            let rows: Vec<ParsedPuzzleAnswer> = answers
                .into_iter()
                .map(|(puzzle, output)| ParsedPuzzleAnswer::new(puzzle, output))
                .collect();
            dataset::write_json(&path, &rows)?;
            Ok(rows.len())
        }
        TestMode::Legal => {
            let rows: Vec<ParsedLegalAnswer> = answers
                .into_iter()
                .map(|(puzzle, output)| ParsedLegalAnswer::new(puzzle, output))
                .collect();
            dataset::write_json(&path, &rows)?;
            Ok(rows.len())
        }
    }
}

/// Classify `parsed_output.json` of a model directory and write the results
/// and summary files.
pub fn grade_model(layout: &ModelLayout) -> Result<Summary, SensorError> {
    let parsed = layout.parsed_path();

    let summary = match layout.mode {
        TestMode::Puzzle => {
            let answers: Vec<ParsedPuzzleAnswer> = dataset::read_json(&parsed)?;
            let rows: Vec<PuzzleResultRow> = answers
                .iter()
                .map(|a| PuzzleResultRow {
                    verdict: classify_puzzle(
                        &ExtractedAnswer::from_serialized(&a.llm_output),
                        &a.fen,
                        a.mate_in_n,
                        &a.correct_pgn,
                    ),
                    mate_in_n: a.mate_in_n,
                })
                .collect();
            dataset::write_json(&layout.results_path(), &rows)?;
            Summary::from_puzzle_rows(&layout.model, &rows)
        }
        TestMode::Legal => {
            let answers: Vec<ParsedLegalAnswer> = dataset::read_json(&parsed)?;
            let rows: Vec<LegalVerdict> = answers
                .iter()
                .map(|a| classify_legal(&ExtractedAnswer::from_serialized(&a.llm_output), &a.fen))
                .collect();
            dataset::write_json(&layout.results_path(), &rows)?;
            Summary::from_legal_rows(&layout.model, &rows)
        }
    };

    dataset::write_json(&layout.summary_path(), &summary)?;
    Ok(summary)
}

fn run_model(
    command: Command,
    puzzles: &[Puzzle],
    layout: &ModelLayout,
) -> Result<Option<Summary>, SensorError> {
    info!(model = %layout.model, dir = %layout.mode_dir.display(), ?command, "Model job started");

    if matches!(command, Command::Parse | Command::Run) {
        let rows = parse_model(puzzles, layout)?;
        info!(model = %layout.model, rows, "Parsed responses");
    }
    if matches!(command, Command::Grade | Command::Run) {
        let summary = grade_model(layout)?;
        info!(
            model = %summary.model,
            rows = summary.rows,
            errors = summary.errors,
            counts = ?summary.counts,
            "Graded responses"
        );
        return Ok(Some(summary));
    }
    Ok(None)
}

/// Run `command` for every (prompt dir, model) pair of `config`.
pub async fn run_batch(
    config: &SensorConfig,
    command: Command,
    mode: TestMode,
) -> Result<BatchReport, SensorError> {
    let puzzles: Arc<Vec<Puzzle>> = if command == Command::Grade {
        Arc::new(Vec::new())
    } else {
        let puzzles = dataset::load_puzzles(&config.puzzles_path)?;
        info!(count = puzzles.len(), "Puzzle set loaded");
        Arc::new(puzzles)
    };

    let layouts: Vec<ModelLayout> = config
        .prompt_dirs
        .iter()
        .flat_map(|dir: &PathBuf| {
            config
                .models
                .iter()
                .map(move |model| ModelLayout::new(dir, mode, model))
        })
        .collect();

    let semaphore = Arc::new(Semaphore::new(config.workers));
    let mut handles = Vec::with_capacity(layouts.len());

    for layout in layouts {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| SensorError::Task(e.to_string()))?;
        let puzzles = puzzles.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit; // Hold until done
            let result = run_model(command, &puzzles, &layout);
            (layout, result)
        });
        handles.push(handle);
    }

    let mut report = BatchReport::default();
    for handle in handles {
        let (layout, result) = handle
            .await
            .map_err(|e| SensorError::Task(e.to_string()))?;
        match result {
            Ok(summary) => {
                report.succeeded += 1;
                report.summaries.extend(summary);
            }
            Err(e) => {
                error!(
                    model = %layout.model,
                    dir = %layout.mode_dir.display(),
                    error = %e,
                    "Model job failed"
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
