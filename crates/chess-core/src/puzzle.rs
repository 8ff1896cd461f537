use serde::{Deserialize, Serialize};

/// A mate-in-N puzzle as stored in the puzzle set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    #[serde(rename = "FEN")]
    pub fen: String,
    #[serde(rename = "Mate in N")]
    pub mate_in_n: u32,
    #[serde(rename = "Solution PGN")]
    pub solution_pgn: String,
}

/// One extracted answer for the full-puzzle test, joined with its puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPuzzleAnswer {
    #[serde(rename = "N")]
    pub mate_in_n: u32,
    pub fen: String,
    pub llm_output: String, // answer text or "ERROR"
    pub correct_pgn: String,
}

/// One extracted answer for the legal-move test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLegalAnswer {
    pub fen: String,
    pub llm_output: String,
}

impl ParsedPuzzleAnswer {
    pub fn new(puzzle: &Puzzle, llm_output: String) -> Self {
        Self {
            mate_in_n: puzzle.mate_in_n,
            fen: puzzle.fen.clone(),
            llm_output,
            correct_pgn: puzzle.solution_pgn.clone(),
        }
    }
}

impl ParsedLegalAnswer {
    pub fn new(puzzle: &Puzzle, llm_output: String) -> Self {
        Self {
            fen: puzzle.fen.clone(),
            llm_output,
        }
    }
}
