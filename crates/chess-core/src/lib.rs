//! Chess building blocks for grading model answers: move-text tokenizing,
//! a replayable rules oracle, and the persisted puzzle records.

pub mod board;
pub mod pgn;
pub mod puzzle;
