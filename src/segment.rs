//! Segment computer: splits text into matched / unmatched runs
//!
//! Matching is case-insensitive exact substring search. Matches are
//! leftmost-first and never overlap: the scan resumes after the end of the
//! previous match. An empty comparison string matches nothing.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use wasm_bindgen::prelude::*;

// =============================================================================
// Types
// =============================================================================

/// A maximal run of source text tagged as matched or unmatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

impl Segment {
    pub fn matched(text: impl Into<String>) -> Self {
        Self { text: text.into(), matched: true }
    }

    pub fn unmatched(text: impl Into<String>) -> Self {
        Self { text: text.into(), matched: false }
    }
}

/// Case-folded form of one char: its `to_lowercase` expansion, padded
type FoldKey = [char; 3];

fn fold_key(c: char) -> FoldKey {
    let mut key = ['\0'; 3];
    for (slot, lower) in key.iter_mut().zip(c.to_lowercase()) {
        *slot = lower;
    }
    key
}

// =============================================================================
// Matcher
// =============================================================================

/// Comparison-string matcher with a cached folded needle.
///
/// Two chars are equal when their `to_lowercase` expansions are equal, so a
/// match always covers exactly as many chars as the comparison string. The
/// scan is Knuth-Morris-Pratt over folded chars: linear in text plus
/// comparison length, with no limit on comparison length.
#[derive(Debug, Default)]
pub struct Matcher {
    comparison: String,
    needle: Vec<FoldKey>,
    /// KMP failure table for `needle`
    fallback: Vec<usize>,
    needs_rebuild: bool,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comparison(&self) -> &str {
        &self.comparison
    }

    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// Replace the comparison string. Returns false when it is unchanged.
    pub fn set_comparison(&mut self, comparison: &str) -> bool {
        if self.comparison == comparison {
            return false;
        }
        self.comparison = comparison.to_string();
        self.needs_rebuild = true;
        true
    }

    /// Fold the comparison string and build its failure table
    pub fn build(&mut self) {
        self.needs_rebuild = false;
        self.needle = self.comparison.chars().map(fold_key).collect();

        self.fallback = vec![0; self.needle.len()];
        let mut len = 0;
        for i in 1..self.needle.len() {
            while len > 0 && self.needle[i] != self.needle[len] {
                len = self.fallback[len - 1];
            }
            if self.needle[i] == self.needle[len] {
                len += 1;
            }
            self.fallback[i] = len;
        }
    }

    /// Byte ranges of every non-overlapping match, left to right
    pub fn find_matches(&self, text: &str) -> Vec<Range<usize>> {
        let mut matches = Vec::new();
        if self.needle.is_empty() {
            return matches;
        }

        let starts: Vec<usize> = text.char_indices().map(|(byte, _)| byte).collect();
        let mut matched = 0;

        for (index, c) in text.chars().enumerate() {
            let key = fold_key(c);
            while matched > 0 && self.needle[matched] != key {
                matched = self.fallback[matched - 1];
            }
            if self.needle[matched] == key {
                matched += 1;
            }
            if matched == self.needle.len() {
                let first = index + 1 - matched;
                matches.push(starts[first]..starts[index] + c.len_utf8());
                // Resume after the match: no overlaps
                matched = 0;
            }
        }

        matches
    }

    /// Split `text` into ordered segments
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        if text.is_empty() {
            return vec![Segment::unmatched("")];
        }

        let mut segments = Vec::new();
        let mut cursor = 0;

        for range in self.find_matches(text) {
            if range.start > cursor {
                segments.push(Segment::unmatched(&text[cursor..range.start]));
            }
            segments.push(Segment::matched(&text[range.clone()]));
            cursor = range.end;
        }

        if cursor < text.len() {
            segments.push(Segment::unmatched(&text[cursor..]));
        }

        segments
    }
}

/// One-shot segmentation
pub fn compute_segments(text: &str, comparison: &str) -> Vec<Segment> {
    let mut matcher = Matcher::new();
    matcher.set_comparison(comparison);
    matcher.build();
    matcher.segments(text)
}

/// Segment text for JS callers: returns `[{ text, matched }, ...]`
#[wasm_bindgen(js_name = computeSegments)]
pub fn js_compute_segments(text: &str, comparison: &str) -> JsValue {
    let segments = compute_segments(text, comparison);
    serde_wasm_bindgen::to_value(&segments).unwrap_or(JsValue::NULL)
}

// =============================================================================
// Tests
// =============================================================================
