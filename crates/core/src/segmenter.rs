use std::sync::LazyLock;

use regex::Regex;

use crate::types::Segment;

/// Fragments at or below this many characters are dropped.
pub const MIN_SEGMENT_CHARS: usize = 30;
/// Single-segment documents longer than this are re-split on sentences.
pub const SENTENCE_FALLBACK_CHARS: usize = 2000;
pub const SENTENCE_CHUNKS: usize = 3;

// Paragraph breaks, "12. " style numbering, and section symbols.
static STRUCTURAL_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n|\d+\.\s+|§+\s*").expect("structural break pattern"));

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+\s+").expect("sentence break pattern"));

/// Split trimmed document text into ordered, non-trivial segments.
///
/// Never returns an empty list: when nothing survives filtering the whole
/// text comes back as segment 0.
pub fn split_into_segments(text: &str) -> Vec<Segment> {
    let mut pieces = structural_split(text);

    if pieces.len() == 1 && text.chars().count() > SENTENCE_FALLBACK_CHARS {
        let chunks = sentence_chunks(text);
        if chunks.len() > 1 {
            pieces = chunks;
        }
    }

    if pieces.is_empty() {
        pieces.push(text.trim().to_string());
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Segment { index, text })
        .collect()
}

fn is_substantial(fragment: &str) -> bool {
    fragment.chars().count() > MIN_SEGMENT_CHARS
}

fn structural_split(text: &str) -> Vec<String> {
    STRUCTURAL_BREAK
        .split(text)
        .map(str::trim)
        .filter(|fragment| is_substantial(fragment))
        .map(str::to_string)
        .collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BREAK.find_iter(text) {
        let terminators = boundary.as_str().trim_end().len();
        let sentence = text[start..boundary.start() + terminators].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = boundary.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

/// Spread sentences evenly over `SENTENCE_CHUNKS` groups. The first
/// `n % k` groups take one extra sentence.
fn sentence_chunks(text: &str) -> Vec<String> {
    let sentences = split_sentences(text);
    if sentences.len() < 2 {
        return Vec::new();
    }

    let groups = SENTENCE_CHUNKS.min(sentences.len());
    let base = sentences.len() / groups;
    let extra = sentences.len() % groups;

    let mut chunks = Vec::with_capacity(groups);
    let mut start = 0;
    for group in 0..groups {
        let end = start + base + usize::from(group < extra);
        chunks.push(sentences[start..end].join(" "));
        start = end;
    }

    merge_short_chunks(chunks)
}

/// Fold chunks that are too short into a neighbour so no sentence is lost.
fn merge_short_chunks(chunks: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(chunks.len());
    let mut carry: Option<String> = None;

    for chunk in chunks {
        let chunk = match carry.take() {
            Some(short) => format!("{short} {chunk}"),
            None => chunk,
        };

        if is_substantial(&chunk) {
            merged.push(chunk);
        } else if let Some(previous) = merged.last_mut() {
            previous.push(' ');
            previous.push_str(&chunk);
        } else {
            carry = Some(chunk);
        }
    }

    merged.extend(carry);
    merged
}
