//! Word-level diff between an original text and its rewrite.
//!
//! Both texts are split into alternating runs of whitespace and
//! non-whitespace, a longest common subsequence is taken over those tokens
//! in linear space, and adjacent tokens with the same tag are merged.
//! Joining every segment except the removed ones gives back the new text;
//! joining every segment except the added ones gives back the old text.

use crate::types::{DiffKind, DiffSegment};

/// Diff `old` against `new` word by word.
pub fn diff_words(old: &str, new: &str) -> Vec<DiffSegment> {
    let a = tokenize(old);
    let b = tokenize(new);

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mut out = SegmentBuilder::default();
    for token in &a[..prefix] {
        out.push(DiffKind::Unchanged, token);
    }
    diff_middle(&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix], &mut out);
    for token in &a[a.len() - suffix..] {
        out.push(DiffKind::Unchanged, token);
    }
    out.finish()
}

/// Above this many `old x new` token pairs the middle is reported as one
/// removed run followed by one added run.
const MAX_DIFF_CELLS: usize = 16_000_000;

fn diff_middle(a: &[&str], b: &[&str], out: &mut SegmentBuilder) {
    if a.len().saturating_mul(b.len()) > MAX_DIFF_CELLS {
        tracing::debug!(old = a.len(), new = b.len(), "diff too large, emitting coarse segments");
        push_all(DiffKind::Removed, a, out);
        push_all(DiffKind::Added, b, out);
        return;
    }
    hirschberg(a, b, out);
}

/// Linear-space LCS alignment: split `a` in half, find where the optimal
/// path crosses that row, recurse on both quadrants.
fn hirschberg(a: &[&str], b: &[&str], out: &mut SegmentBuilder) {
    if a.is_empty() {
        push_all(DiffKind::Added, b, out);
        return;
    }
    if b.is_empty() {
        push_all(DiffKind::Removed, a, out);
        return;
    }
    if a.len() == 1 {
        match b.iter().position(|token| *token == a[0]) {
            Some(j) => {
                push_all(DiffKind::Added, &b[..j], out);
                out.push(DiffKind::Unchanged, a[0]);
                push_all(DiffKind::Added, &b[j + 1..], out);
            }
            None => {
                out.push(DiffKind::Removed, a[0]);
                push_all(DiffKind::Added, b, out);
            }
        }
        return;
    }

    let mid = a.len() / 2;
    let forward = lcs_row(&a[..mid], b, false);
    let backward = lcs_row(&a[mid..], b, true);
    let m = b.len();
    // first k with the best total keeps removals ahead of additions
    let mut split = 0;
    let mut best = 0;
    for k in 0..=m {
        let total = forward[k] + backward[m - k];
        if total > best || k == 0 {
            best = total;
            split = k;
        }
    }

    hirschberg(&a[..mid], &b[..split], out);
    hirschberg(&a[mid..], &b[split..], out);
}

/// Last row of the LCS length table of `a` against every prefix of `b`
/// (every suffix when `reverse`). Two rows of memory.
fn lcs_row(a: &[&str], b: &[&str], reverse: bool) -> Vec<u32> {
    let (n, m) = (a.len(), b.len());
    let mut prev = vec![0u32; m + 1];
    let mut cur = vec![0u32; m + 1];
    for i in 0..n {
        let x = if reverse { a[n - 1 - i] } else { a[i] };
        for j in 1..=m {
            let y = if reverse { b[m - j] } else { b[j - 1] };
            cur[j] = if x == y {
                prev[j - 1] + 1
            } else {
                prev[j].max(cur[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev
}

fn push_all(kind: DiffKind, tokens: &[&str], out: &mut SegmentBuilder) {
    for token in tokens {
        out.push(kind, token);
    }
}

/// Split into maximal runs of whitespace and non-whitespace.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (idx, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<DiffSegment>,
}

impl SegmentBuilder {
    fn push(&mut self, kind: DiffKind, token: &str) {
        match self.segments.last_mut() {
            Some(last) if last.kind == kind => last.value.push_str(token),
            _ => self.segments.push(DiffSegment::new(kind, token)),
        }
    }

    fn finish(self) -> Vec<DiffSegment> {
        self.segments
    }
}
