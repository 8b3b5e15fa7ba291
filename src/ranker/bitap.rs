//! Bitap approximate string matching
//!
//! Wu-Manber shift-and with up to `k` errors (substitution, insertion,
//! deletion), where `k = floor(threshold * pattern_len)`. The score of a
//! match is `errors / pattern_len`, floored at [`MIN_PARTIAL_SCORE`]. Only a
//! text equal to the whole pattern scores 0.0. The match location is ignored.
//!
//! Matching is case-insensitive. Folding maps every char to exactly one char
//! so that match indices stay valid offsets into the original text.
//!
//! Patterns longer than the 64-bit state word are split into chunks. Chunk
//! scores are averaged (a chunk that does not match counts as 1.0) and their
//! match masks are merged.

use std::collections::HashMap;

/// Longest pattern handled by a single state word
pub const MAX_PATTERN_LEN: usize = 64;

/// Best score a match short of the whole text can get
pub const MIN_PARTIAL_SCORE: f64 = 0.001;

/// Score and highlight ranges for one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldScore {
    pub score: f64,
    /// Inclusive char ranges, sorted and non-overlapping
    pub indices: Vec<(usize, usize)>,
}

/// A query compiled for bitap search
#[derive(Debug, Clone)]
pub struct Bitap {
    pattern: Vec<char>,
    chunks: Vec<Chunk>,
    threshold: f64,
    min_match_char_length: usize,
}

#[derive(Debug, Clone)]
struct Chunk {
    chars: Vec<char>,
    alphabet: HashMap<char, u64>,
}

#[inline]
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

impl Bitap {
    pub fn new(pattern: &str, threshold: f64, min_match_char_length: usize) -> Self {
        let folded: Vec<char> = pattern.chars().map(fold).collect();
        let chunks = folded.chunks(MAX_PATTERN_LEN).map(Chunk::new).collect();

        Self {
            pattern: folded,
            chunks,
            threshold,
            min_match_char_length,
        }
    }

    /// Search `text` for the pattern
    ///
    /// Returns `None` when no chunk matches within the error budget, or when
    /// every matched run is shorter than the minimum match length.
    pub fn search(&self, text: &str) -> Option<FieldScore> {
        if self.chunks.is_empty() {
            return None;
        }

        let text: Vec<char> = text.chars().map(fold).collect();
        if text == self.pattern {
            return Some(FieldScore {
                score: 0.0,
                indices: vec![(0, text.len() - 1)],
            });
        }

        let mut mask = vec![false; text.len()];
        let mut total = 0.0;
        let mut matched = false;

        for chunk in &self.chunks {
            match chunk.search(&text, self.threshold, &mut mask) {
                Some(score) => {
                    total += score;
                    matched = true;
                }
                None => total += 1.0,
            }
        }

        if !matched {
            return None;
        }

        let indices = mask_to_indices(&mask, self.min_match_char_length);
        if indices.is_empty() {
            return None;
        }

        Some(FieldScore {
            score: total / self.chunks.len() as f64,
            indices,
        })
    }
}

impl Chunk {
    fn new(chars: &[char]) -> Self {
        let mut alphabet: HashMap<char, u64> = HashMap::new();
        for (i, &c) in chars.iter().enumerate() {
            *alphabet.entry(c).or_insert(0) |= 1u64 << i;
        }

        Self {
            chars: chars.to_vec(),
            alphabet,
        }
    }

    fn max_errors(&self, threshold: f64) -> usize {
        let m = self.chars.len();
        let budget = (threshold.max(0.0) * m as f64 + 1e-9).floor() as usize;
        budget.min(m.saturating_sub(1))
    }

    /// Returns the chunk score and marks matched characters in `mask`
    fn search(&self, text: &[char], threshold: f64, mask: &mut [bool]) -> Option<f64> {
        let m = self.chars.len();
        if m == 0 || text.is_empty() {
            return None;
        }

        if self.mark_exact(text, mask) {
            return Some(MIN_PARTIAL_SCORE);
        }

        let k = self.max_errors(threshold);
        if k == 0 {
            return None;
        }

        let (errors, end) = self.best_end(text, k)?;
        self.mark_alignment(text, end, errors, mask);
        Some((errors as f64 / m as f64).max(MIN_PARTIAL_SCORE))
    }

    /// Marks every non-overlapping exact occurrence
    fn mark_exact(&self, text: &[char], mask: &mut [bool]) -> bool {
        let m = self.chars.len();
        if m > text.len() {
            return false;
        }

        let mut found = false;
        let mut i = 0;
        while i + m <= text.len() {
            if text[i..i + m] == self.chars[..] {
                mask[i..i + m].iter_mut().for_each(|b| *b = true);
                found = true;
                i += m;
            } else {
                i += 1;
            }
        }
        found
    }

    /// Fewest errors with which the chunk ends anywhere in `text`, and the
    /// first end position achieving it
    fn best_end(&self, text: &[char], k: usize) -> Option<(usize, usize)> {
        let hit = 1u64 << (self.chars.len() - 1);
        // r[d] bit i: chunk[..=i] matches a suffix of the text read so far
        // with at most d errors
        let mut r: Vec<u64> = (0..=k).map(|d| (1u64 << d) - 1).collect();
        let mut best: Option<(usize, usize)> = None;

        for (j, c) in text.iter().enumerate() {
            let b = self.alphabet.get(c).copied().unwrap_or(0);

            let mut prev_old = r[0];
            r[0] = ((r[0] << 1) | 1) & b;
            for d in 1..=k {
                let old = r[d];
                r[d] = (((old << 1) | 1) & b)
                    | ((prev_old << 1) | 1)
                    | prev_old
                    | ((r[d - 1] << 1) | 1);
                prev_old = old;
            }

            let limit = best.map_or(k + 1, |(errors, _)| errors);
            if let Some(d) = (0..limit).find(|&d| r[d] & hit != 0) {
                best = Some((d, j));
                if d == 0 {
                    break;
                }
            }
        }

        best
    }

    /// Recovers which text chars the best alignment ending at `end` matched
    fn mark_alignment(&self, text: &[char], end: usize, errors: usize, mask: &mut [bool]) {
        let m = self.chars.len();
        let span = (m + errors).min(end + 1);
        let lo = end + 1 - span;
        let window = &text[lo..=end];
        let w = window.len();

        // d[i][t]: edits aligning chunk[..i] to a suffix of window[..t]
        let mut d = vec![vec![0usize; w + 1]; m + 1];
        for (i, row) in d.iter_mut().enumerate() {
            row[0] = i;
        }
        for i in 1..=m {
            for t in 1..=w {
                let cost = usize::from(self.chars[i - 1] != window[t - 1]);
                d[i][t] = (d[i - 1][t - 1] + cost)
                    .min(d[i - 1][t] + 1)
                    .min(d[i][t - 1] + 1);
            }
        }

        let (mut i, mut t) = (m, w);
        while i > 0 {
            if t > 0 {
                let cost = usize::from(self.chars[i - 1] != window[t - 1]);
                if d[i][t] == d[i - 1][t - 1] + cost {
                    if cost == 0 {
                        mask[lo + t - 1] = true;
                    }
                    i -= 1;
                    t -= 1;
                    continue;
                }
                if d[i][t] == d[i][t - 1] + 1 {
                    t -= 1;
                    continue;
                }
            }
            i -= 1;
        }
    }
}

/// Contiguous runs of marked chars, dropping runs shorter than `min_len`
pub fn mask_to_indices(mask: &[bool], min_len: usize) -> Vec<(usize, usize)> {
    let min_len = min_len.max(1);
    let mut indices = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &marked) in mask.iter().chain(std::iter::once(&false)).enumerate() {
        match (marked, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_len {
                    indices.push((s, i - 1));
                }
                start = None;
            }
            _ => {}
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn search(pattern: &str, text: &str) -> Option<FieldScore> {
        Bitap::new(pattern, 0.4, 2).search(text)
    }

    #[test]
    fn test_exact_substring_scores_floor() {
        let m = search("bitcoin", "Bitcoin Outlook 2024").unwrap();
        assert_eq!(m.score, MIN_PARTIAL_SCORE);
        assert_eq!(m.indices, vec![(0, 6)]);
    }

    #[test]
    fn test_full_text_scores_zero() {
        let m = search("Archive", "archive").unwrap();
        assert_eq!(m.score, 0.0);
        assert_eq!(m.indices, vec![(0, 6)]);
    }

    #[test]
    fn test_every_occurrence_is_marked() {
        let m = search("etf", "ETF vs ETF").unwrap();
        assert_eq!(m.indices, vec![(0, 2), (7, 9)]);
    }

    #[test]
    fn test_missing_chunk_counts_as_one() {
        let head = "a".repeat(MAX_PATTERN_LEN);
        let tail = "z".repeat(MAX_PATTERN_LEN);
        let text = head.clone() + " bonds";
        let m = search(&(head + &tail), &text).unwrap();
        assert!((m.score - (MIN_PARTIAL_SCORE + 1.0) / 2.0).abs() < 1e-12);
        assert_eq!(m.indices, vec![(0, MAX_PATTERN_LEN - 1)]);
    }

    #[test]
    fn test_match_position_is_not_penalized() {
        let early = search("dividend", "dividend stocks for a long and quiet retirement").unwrap();
        let late = search("dividend", "a long and quiet retirement with dividend").unwrap();
        assert_eq!(early.score, late.score);
    }

    #[test]
    fn test_typo_costs_one_error() {
        // one substitution in a 7 char pattern
        let m = search("bitcoim", "Bitcoin Outlook").unwrap();
        assert!((m.score - 1.0 / 7.0).abs() < 1e-12);
        assert_eq!(m.indices, vec![(0, 5)]);
    }

    #[test]
    fn test_missing_letter() {
        // one deletion: "invstire" vs "investire"
        let m = search("invstire", "Investire Bene").unwrap();
        assert!((m.score - 1.0 / 8.0).abs() < 1e-12);
        assert_eq!(m.indices, vec![(0, 2), (4, 8)]);
    }

    #[test]
    fn test_unrelated_text_is_rejected() {
        assert!(search("zzzzz", "Archive").is_none());
        assert!(search("zzzzz", "Bitcoin Outlook 2024").is_none());
    }

    #[test]
    fn test_two_char_pattern_needs_exact_hit() {
        assert!(search("xo", "Bitcoin").is_none());
        assert!(search("co", "Bitcoin").is_some());
    }

    #[test]
    fn test_indices_are_char_offsets() {
        let m = search("più", "Investire è più facile").unwrap();
        assert_eq!(m.indices, vec![(12, 14)]);
    }

    #[test]
    fn test_long_patterns_are_chunked() {
        let text = "a".repeat(40) + &"b".repeat(40);
        let m = search(&text, &text).unwrap();
        assert_eq!(m.score, 0.0);
        assert_eq!(m.indices, vec![(0, 79)]);
    }

    #[test]
    fn test_mask_to_indices_drops_short_runs() {
        let mask = [true, false, true, true, false, true, true, true];
        assert_eq!(mask_to_indices(&mask, 2), vec![(2, 3), (5, 7)]);
        assert_eq!(mask_to_indices(&mask, 1), vec![(0, 0), (2, 3), (5, 7)]);
    }

    proptest! {
        #[test]
        fn prop_substring_of_text_scores_at_most_floor(
            text in "[a-z ]{2,40}",
            start in 0usize..40,
            len in 2usize..10,
        ) {
            let chars: Vec<char> = text.chars().collect();
            prop_assume!(start + len <= chars.len());
            let pattern: String = chars[start..start + len].iter().collect();
            let m = search(&pattern, &text).unwrap();
            prop_assert!(m.score <= MIN_PARTIAL_SCORE);
        }

        #[test]
        fn prop_score_within_threshold(pattern in "[a-z]{2,12}", text in "[a-z ]{0,40}") {
            if let Some(m) = search(&pattern, &text) {
                prop_assert!((0.0..=0.4).contains(&m.score));
                for w in m.indices.windows(2) {
                    prop_assert!(w[0].1 < w[1].0);
                }
                for &(s, e) in &m.indices {
                    prop_assert!(s <= e && e < text.chars().count());
                }
            }
        }

        #[test]
        fn prop_more_edits_never_score_better(word in "[a-z]{8,12}") {
            let chars: Vec<char> = word.chars().collect();
            let one: String = std::iter::once('#').chain(chars[1..].iter().copied()).collect();
            let two: String = ['#', '#'].into_iter().chain(chars[2..].iter().copied()).collect();
            let s1 = search(&one, &word).map_or(1.0, |m| m.score);
            let s2 = search(&two, &word).map_or(1.0, |m| m.score);
            prop_assert!(s1 <= s2);
        }
    }
}
