//! Grading of model answers to mate-in-N chess puzzles.
//!
//! Answers are pulled out of free-text responses, split into moves, replayed
//! against the puzzle position and classified into a verdict.

pub mod batch;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extraction;
pub mod verdict;
