//! Move-text utilities: a lightweight regex-based tokenizer for model answers.

use std::sync::LazyLock;

use regex::Regex;

static COMMENTARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").expect("commentary pattern"));

static RESULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(1-0|0-1|1/2-1/2)").expect("result pattern"));

// One or two periods after the number: "12." for White, "12.." / "12..." for Black.
static MOVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d+\s*(\.|\.\.)\s*").expect("move number pattern"));

/// Split answer text into SAN-like tokens in play order.
///
/// Strips parenthesised commentary, game results, move numbers and stray
/// periods. Never fails; degenerate input yields an empty list.
pub fn san_tokens(text: &str) -> Vec<String> {
    let text = text.trim();
    let text = COMMENTARY_RE.replace_all(text, "");
    let text = RESULT_RE.replace_all(text.trim(), "");
    let text = MOVE_NUMBER_RE.replace_all(&text, " ");
    let text = text.trim().replace('.', "");

    text.split_whitespace().map(str::to_string).collect()
}

/// Whether the literal move-number marker `"{n}."` appears anywhere in `text`.
pub fn contains_move_number(text: &str, n: u32) -> bool {
    text.contains(&format!("{n}."))
}

/// Length, in characters, of the slice running from the first `"1."` to the
/// first space of the whole string.
///
/// Mirrors slice semantics where a missing marker counts as index -1 (the
/// last character) and an inverted range is empty. The space is searched
/// from the start of the string, not from the marker.
pub fn first_move_span_len(text: &str) -> usize {
    let len = text.chars().count() as isize;
    let start = char_find(text, "1.");
    let end = char_find(text, " ");

    let clamp = |idx: isize| -> isize {
        if idx < 0 {
            (idx + len).max(0)
        } else {
            idx.min(len)
        }
    };

    (clamp(end) - clamp(start)).max(0) as usize
}

/// Character index of the first occurrence of `needle`, or -1.
fn char_find(haystack: &str, needle: &str) -> isize {
    haystack
        .find(needle)
        .map(|byte| haystack[..byte].chars().count() as isize)
        .unwrap_or(-1)
}
