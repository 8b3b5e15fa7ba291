//! Weighted fuzzy ranking over the search index
//!
//! Every document is scored field by field with bitap, fields scoring worse
//! than the threshold are dropped, and the remaining field scores are
//! combined with the configured weights:
//!
//!   score = Π max(field_score, ε) ^ (weight / Σ weights * norm)
//!
//! where `norm = 1 / sqrt(tokens in the field)`. Lower is better. A perfect
//! match on a heavier field yields a smaller product than a perfect match on
//! a lighter one, and matching more fields only ever improves a document's
//! score. Partial hits bottom out at [`MIN_PARTIAL_SCORE`], so only a query
//! equal to a whole field gets anywhere near zero.

mod bitap;

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::indexer::SearchDocument;

pub use bitap::{Bitap, FieldScore, MIN_PARTIAL_SCORE};

/// Document fields the ranker looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "searchKeywords")]
    SearchKeywords,
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "content_snippet")]
    ContentSnippet,
}

impl FieldKey {
    pub const ALL: [FieldKey; 4] = [
        FieldKey::Title,
        FieldKey::SearchKeywords,
        FieldKey::Category,
        FieldKey::ContentSnippet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FieldKey::Title => "title",
            FieldKey::SearchKeywords => "searchKeywords",
            FieldKey::Category => "category",
            FieldKey::ContentSnippet => "content_snippet",
        }
    }

    /// The field's text on a document, if present and non-empty
    pub fn value<'a>(&self, doc: &'a SearchDocument) -> Option<&'a str> {
        let value = match self {
            FieldKey::Title => Some(doc.title.as_str()),
            FieldKey::SearchKeywords => doc.search_keywords.as_deref(),
            FieldKey::Category => doc.category.as_deref(),
            FieldKey::ContentSnippet => doc.content_snippet.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Per-field weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub title: f64,
    pub search_keywords: f64,
    pub category: f64,
    pub content_snippet: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            title: 0.7,
            search_keywords: 0.7,
            category: 0.5,
            content_snippet: 0.2,
        }
    }
}

impl Weights {
    pub fn get(&self, key: FieldKey) -> f64 {
        match key {
            FieldKey::Title => self.title,
            FieldKey::SearchKeywords => self.search_keywords,
            FieldKey::Category => self.category,
            FieldKey::ContentSnippet => self.content_snippet,
        }
    }

    fn total(&self) -> f64 {
        FieldKey::ALL
            .iter()
            .map(|&k| self.get(k))
            .filter(|w| *w > 0.0)
            .sum()
    }
}

/// Configuration for fuzzy ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    pub weights: Weights,
    /// Worst accepted field score (0 = exact, 1 = unrelated)
    pub threshold: f64,
    /// Shortest matched run worth highlighting
    pub min_match_char_length: usize,
    /// Maximum number of results returned
    pub limit: usize,
    /// Queries shorter than this never reach the scorer
    pub min_query_len: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            threshold: 0.4,
            min_match_char_length: 2,
            limit: 5,
            min_query_len: 2,
        }
    }
}

/// One matched field of a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMatch {
    pub key: FieldKey,
    pub score: f64,
    pub indices: Vec<(usize, usize)>,
}

/// A ranked document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub item: SearchDocument,
    /// Position of the document in the index
    pub ref_index: usize,
    pub score: f64,
    pub matches: Vec<FieldMatch>,
}

impl MatchResult {
    pub fn field(&self, key: FieldKey) -> Option<&FieldMatch> {
        self.matches.iter().find(|m| m.key == key)
    }
}

/// Length norm of a field: `1 / sqrt(tokens)`, rounded to three decimals
///
/// A hit in a long snippet says less about the document than the same hit
/// in a two-word title.
pub fn field_norm(text: &str) -> f64 {
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count().max(1);
    (1000.0 / (tokens as f64).sqrt()).round() / 1000.0
}

/// Scores a compiled query against one field's text
pub trait FieldScorer {
    type Pattern;

    fn compile(&self, query: &str, config: &RankerConfig) -> Self::Pattern;

    fn score(&self, pattern: &Self::Pattern, text: &str) -> Option<FieldScore>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BitapScorer;

impl FieldScorer for BitapScorer {
    type Pattern = Bitap;

    fn compile(&self, query: &str, config: &RankerConfig) -> Bitap {
        Bitap::new(query, config.threshold, config.min_match_char_length)
    }

    fn score(&self, pattern: &Bitap, text: &str) -> Option<FieldScore> {
        pattern.search(text)
    }
}

/// Ranks index documents against a live query
#[derive(Debug, Clone)]
pub struct FuzzyRanker<S = BitapScorer> {
    config: RankerConfig,
    scorer: S,
}

impl FuzzyRanker<BitapScorer> {
    pub fn new(config: RankerConfig) -> Self {
        Self::with_scorer(config, BitapScorer)
    }
}

impl Default for FuzzyRanker<BitapScorer> {
    fn default() -> Self {
        Self::new(RankerConfig::default())
    }
}

impl<S: FieldScorer> FuzzyRanker<S> {
    pub fn with_scorer(config: RankerConfig, scorer: S) -> Self {
        Self { config, scorer }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Best matches for `query`, best first
    pub fn search(&self, query: &str, index: &[SearchDocument]) -> Vec<MatchResult> {
        if query.chars().count() < self.config.min_query_len {
            return Vec::new();
        }

        let start = Instant::now();
        let pattern = self.scorer.compile(query, &self.config);
        let total_weight = self.config.weights.total();

        let mut results: Vec<MatchResult> = index
            .iter()
            .enumerate()
            .filter_map(|(ref_index, doc)| {
                self.score_document(&pattern, doc, total_weight)
                    .map(|(score, matches)| MatchResult {
                        item: doc.clone(),
                        ref_index,
                        score,
                        matches,
                    })
            })
            .collect();

        let matched = results.len();
        // Stable: ties keep index order
        results.sort_by(|a, b| a.score.total_cmp(&b.score));
        results.truncate(self.config.limit);

        tracing::debug!(
            "Query {:?}: {} of {} documents matched in {:?}",
            query,
            matched,
            index.len(),
            start.elapsed()
        );

        results
    }

    fn score_document(
        &self,
        pattern: &S::Pattern,
        doc: &SearchDocument,
        total_weight: f64,
    ) -> Option<(f64, Vec<FieldMatch>)> {
        let mut combined = 1.0;
        let mut matches = Vec::new();

        for key in FieldKey::ALL {
            let weight = self.config.weights.get(key);
            if weight <= 0.0 {
                continue;
            }
            let Some(text) = key.value(doc) else {
                continue;
            };
            let Some(field) = self.scorer.score(pattern, text) else {
                continue;
            };
            if field.score > self.config.threshold {
                continue;
            }

            let exponent = weight / total_weight * field_norm(text);
            combined *= field.score.max(f64::EPSILON).powf(exponent);
            matches.push(FieldMatch {
                key,
                score: field.score,
                indices: field.indices,
            });
        }

        if matches.is_empty() {
            None
        } else {
            Some((combined, matches))
        }
    }
}
