//! Constraint classification of extracted answers.
//!
//! Full-puzzle mode replays every token against the puzzle position and
//! decides the verdict in fixed stages:
//!
//! 1. setup (position + tokens); a bad position yields the all-zero verdict
//! 2. CAV: first-move span length of answer vs. solution
//! 3. NCV: move-number markers 1..=4, only when CAV is clear
//! 4. replay; the first unresolvable token sets PMV and returns at once
//! 5. mate outcome, which overrides CAV in either direction
//!
//! Legal-move mode only resolves the first token.

use chess_core::board::{ReplayBoard, RulesOracle};
use chess_core::pgn::{contains_move_number, first_move_span_len, san_tokens};
use shakmaty::Color;
use tracing::{debug, warn};

use crate::extraction::ExtractedAnswer;
use crate::verdict::{LegalVerdict, PuzzleVerdict};

/// Move numbers compared by the NCV check.
const NCV_MOVE_NUMBERS: std::ops::RangeInclusive<u32> = 1..=4;

/// Grade an extracted answer for the full-puzzle test.
///
/// `mate_in_n` is accepted but not checked against the replayed length.
pub fn classify_puzzle(
    answer: &ExtractedAnswer,
    fen: &str,
    mate_in_n: u32,
    correct_pgn: &str,
) -> PuzzleVerdict {
    match answer {
        ExtractedAnswer::Found { text, .. } => {
            classify_puzzle_with::<ReplayBoard>(text, fen, mate_in_n, correct_pgn)
        }
        ExtractedAnswer::Missing => PuzzleVerdict::extraction_error(),
    }
}

/// Grade an extracted answer for the legal-move test.
pub fn classify_legal(answer: &ExtractedAnswer, fen: &str) -> LegalVerdict {
    match answer {
        ExtractedAnswer::Found { text, .. } => classify_legal_with::<ReplayBoard>(text, fen),
        ExtractedAnswer::Missing => LegalVerdict::extraction_error(),
    }
}

/// Full-puzzle classification of answer text against any rules oracle.
pub fn classify_puzzle_with<O: RulesOracle>(
    raw: &str,
    fen: &str,
    _mate_in_n: u32,
    correct_pgn: &str,
) -> PuzzleVerdict {
    let mut verdict = PuzzleVerdict::default();

    let mut board = match O::from_fen(fen) {
        Ok(board) => board,
        Err(e) => {
            warn!(error = %e, "Unusable puzzle position, skipping classification");
            return verdict;
        }
    };
    let initial_side: Color = board.turn();
    let moves = san_tokens(raw);

    if first_move_span_len(raw) != first_move_span_len(correct_pgn) {
        verdict.cav = true;
    } else {
        verdict.ncv = move_numbers_diverge(raw, correct_pgn);
    }

    if let Err(ply) = replay(&mut board, &moves) {
        debug!(ply, token = %moves[ply], "Unresolvable move, stopping replay");
        verdict.pmv = true;
        return verdict;
    }

    if board.is_checkmate() {
        if board.turn() != initial_side {
            verdict.cav = false;
            verdict.is_solved = true;
        } else {
            verdict.cav = true;
            verdict.is_solved = false;
        }
    }

    verdict
}

/// Legal-move classification of answer text against any rules oracle.
pub fn classify_legal_with<O: RulesOracle>(raw: &str, fen: &str) -> LegalVerdict {
    let board = match O::from_fen(fen) {
        Ok(board) => board,
        Err(e) => {
            warn!(error = %e, "Unusable position, skipping legality check");
            return LegalVerdict::default();
        }
    };

    let legal = san_tokens(raw)
        .first()
        .is_some_and(|san| board.resolve(san).is_ok());

    LegalVerdict {
        error: false,
        legal,
    }
}

/// Whether any of the move numbers 1..=4 appears in exactly one of the two
/// texts. Stops at the first number missing from both.
fn move_numbers_diverge(raw: &str, correct_pgn: &str) -> bool {
    let mut diverged = false;
    for n in NCV_MOVE_NUMBERS {
        match (contains_move_number(raw, n), contains_move_number(correct_pgn, n)) {
            (true, true) => continue,
            (false, false) => break,
            _ => diverged = true,
        }
    }
    diverged
}

/// Resolve and play each token in order. On failure returns the index of the
/// offending token; the board then holds exactly the moves before it.
pub fn replay<O: RulesOracle>(board: &mut O, moves: &[String]) -> Result<(), usize> {
    moves.iter().enumerate().try_for_each(|(ply, san)| {
        let mv = board.resolve(san).map_err(|_| ply)?;
        board.apply(&mv);
        Ok(())
    })
}
