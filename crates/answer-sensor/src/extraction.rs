//! Final-answer extraction from free-text model responses.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Serialized form of a response with no usable answer.
pub const ERROR_SENTINEL: &str = "ERROR";

static PRIMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[FINAL PGN\](.*)").expect("primary marker pattern"));

static LEGACY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)--- FINAL PGN ---(.*)").expect("legacy marker pattern"));

/// Answer markers, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMarker {
    /// `[FINAL PGN]`
    Primary,
    /// `--- FINAL PGN ---`
    Legacy,
}

impl AnswerMarker {
    pub const ALL: [AnswerMarker; 2] = [AnswerMarker::Primary, AnswerMarker::Legacy];

    pub fn tag(self) -> &'static str {
        match self {
            AnswerMarker::Primary => "[FINAL PGN]",
            AnswerMarker::Legacy => "--- FINAL PGN ---",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            AnswerMarker::Primary => &*PRIMARY_RE,
            AnswerMarker::Legacy => &*LEGACY_RE,
        }
    }
}

/// What the answer is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    /// A numbered move sequence; anything before the first `"1."` is dropped.
    MoveSequence,
    /// A single move.
    SingleMove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedAnswer {
    Found { marker: AnswerMarker, text: String },
    Missing,
}

impl ExtractedAnswer {
    /// The answer text, or `ERROR` when nothing usable was found.
    pub fn to_serialized(&self) -> String {
        match self {
            ExtractedAnswer::Found { text, .. } => text.clone(),
            ExtractedAnswer::Missing => ERROR_SENTINEL.to_string(),
        }
    }

    /// Inverse of [`to_serialized`](Self::to_serialized). Marker provenance is
    /// not persisted, so found answers come back as `Primary`.
    pub fn from_serialized(raw: &str) -> Self {
        if raw.trim() == ERROR_SENTINEL {
            ExtractedAnswer::Missing
        } else {
            ExtractedAnswer::Found {
                marker: AnswerMarker::Primary,
                text: raw.to_string(),
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ExtractedAnswer::Found { text, .. } => Some(text),
            ExtractedAnswer::Missing => None,
        }
    }
}

/// Pull the final answer out of a raw response.
///
/// The first marker that occurs wins and everything after it is kept. Repeated
/// tags are removed, the text is trimmed and line breaks become single spaces.
pub fn extract_answer(raw: &str, kind: AnswerKind) -> ExtractedAnswer {
    let Some((marker, captured)) = AnswerMarker::ALL.iter().find_map(|&marker| {
        marker
            .pattern()
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| (marker, m.as_str()))
    }) else {
        debug!("no answer marker found");
        return ExtractedAnswer::Missing;
    };

    let mut text = captured.trim().replace(marker.tag(), "").trim().to_string();

    if kind == AnswerKind::MoveSequence {
        if let Some(start) = text.find("1.") {
            text.replace_range(..start, "");
        }
    }

    let text = text.replace("\r\n", " ").replace(['\r', '\n'], " ");

    if text.trim().is_empty() {
        debug!(?marker, "answer marker found but answer is empty");
        return ExtractedAnswer::Missing;
    }

    debug!(?marker, answer = %text, "extracted answer");
    ExtractedAnswer::Found { marker, text }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(marker: AnswerMarker, text: &str) -> ExtractedAnswer {
        ExtractedAnswer::Found {
            marker,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_primary_marker() {
        let raw = "Let me think...\nQh5+ looks strong.\n[FINAL PGN]\n1. Qh5+ Kf8\n2. Qf7#\n";
        assert_eq!(
            extract_answer(raw, AnswerKind::MoveSequence),
            found(AnswerMarker::Primary, "1. Qh5+ Kf8 2. Qf7#")
        );
    }

    #[test]
    fn test_legacy_marker_fallback() {
        let raw = "Reasoning\r\n--- FINAL PGN ---\r\n1. Rd8#\r\n";
        assert_eq!(
            extract_answer(raw, AnswerKind::MoveSequence),
            found(AnswerMarker::Legacy, "1. Rd8#")
        );
    }

    #[test]
    fn test_primary_wins_over_legacy() {
        let raw = "--- FINAL PGN --- 1. e4\n[FINAL PGN] 1. d4";
        assert_eq!(
            extract_answer(raw, AnswerKind::SingleMove),
            found(AnswerMarker::Primary, "1. d4")
        );
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        assert_eq!(
            extract_answer("[final pgn] 1. e4", AnswerKind::SingleMove),
            ExtractedAnswer::Missing
        );
    }

    #[test]
    fn test_duplicated_tag_is_stripped() {
        let raw = "[FINAL PGN]\n[FINAL PGN]\n1. Qxf7#";
        assert_eq!(
            extract_answer(raw, AnswerKind::MoveSequence),
            found(AnswerMarker::Primary, "1. Qxf7#")
        );
    }

    #[test]
    fn test_move_sequence_drops_preamble() {
        let raw = "[FINAL PGN] The answer is 1. Qh5+ Kf8 2. Qf7#";
        assert_eq!(
            extract_answer(raw, AnswerKind::MoveSequence),
            found(AnswerMarker::Primary, "1. Qh5+ Kf8 2. Qf7#")
        );
        assert_eq!(
            extract_answer(raw, AnswerKind::SingleMove),
            found(AnswerMarker::Primary, "The answer is 1. Qh5+ Kf8 2. Qf7#")
        );
    }

    #[test]
    fn test_missing_and_empty() {
        assert_eq!(
            extract_answer("I could not find a mate.", AnswerKind::MoveSequence),
            ExtractedAnswer::Missing
        );
        assert_eq!(
            extract_answer("Thinking...\n[FINAL PGN]\n   \n", AnswerKind::MoveSequence),
            ExtractedAnswer::Missing
        );
    }

    #[test]
    fn test_serialized_sentinel() {
        assert_eq!(ExtractedAnswer::Missing.to_serialized(), "ERROR");
        assert_eq!(ExtractedAnswer::from_serialized(" ERROR "), ExtractedAnswer::Missing);
        assert_eq!(
            ExtractedAnswer::from_serialized("1. e4").text(),
            Some("1. e4")
        );
    }
}
