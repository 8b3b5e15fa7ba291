//! Turning ranked results into navigation decisions and highlighted text
//!
//! Submitting a query resolves, in order, to:
//! 1. the direct-link path for an exact (trimmed, lowercased) keyword
//! 2. the top result's path when its score is below the confident cutoff
//! 3. the full-text search page for the original query

mod widget;

use serde::Serialize;

use crate::indexer::DirectLinks;
use crate::ranker::{FieldKey, FieldMatch, MatchResult};

pub use widget::{SearchWidget, WidgetEvent, WidgetState, WidgetView};

/// Top results scoring below this are opened directly on submit
pub const CONFIDENT_CUTOFF: f64 = 0.1;

/// Where a resolved query takes the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Navigation {
    DirectLink(String),
    Document(String),
    SearchPage(String),
}

impl Navigation {
    pub fn path(&self) -> &str {
        match self {
            Navigation::DirectLink(p) | Navigation::Document(p) | Navigation::SearchPage(p) => p,
        }
    }
}

/// Route of the full-text search page for `query`
pub fn search_page_path(query: &str) -> String {
    format!("/search?q={}", urlencoding::encode(query))
}

/// Resolve a submitted query into a navigation target
///
/// Returns `None` for blank input.
pub fn resolve_query(
    raw: &str,
    direct_links: &DirectLinks,
    results: &[MatchResult],
    confident_cutoff: f64,
) -> Option<Navigation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed.to_lowercase();
    if let Some(path) = direct_links.get(&normalized) {
        return Some(Navigation::DirectLink(path.to_string()));
    }

    if let Some(top) = results.first() {
        if top.score < confident_cutoff {
            return Some(Navigation::Document(top.item.path.clone()));
        }
    }

    Some(Navigation::SearchPage(search_page_path(trimmed)))
}

/// A run of text, emphasized when it was part of the match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub emphasized: bool,
}

impl Segment {
    fn new(text: String, emphasized: bool) -> Self {
        Self { text, emphasized }
    }
}

/// Split `text` into plain and emphasized segments
///
/// `indices` are inclusive char ranges. Ranges reaching past the end of the
/// text are clamped; ranges overlapping an earlier one are trimmed.
pub fn highlight(text: &str, indices: &[(usize, usize)]) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut cursor = 0;

    for &(start, end) in indices {
        if start > end || start >= chars.len() {
            continue;
        }
        let start = start.max(cursor);
        let end = end.min(chars.len() - 1);
        if start > end {
            continue;
        }

        if start > cursor {
            segments.push(Segment::new(chars[cursor..start].iter().collect(), false));
        }
        segments.push(Segment::new(chars[start..=end].iter().collect(), true));
        cursor = end + 1;
    }

    if cursor < chars.len() || segments.is_empty() {
        segments.push(Segment::new(chars[cursor..].iter().collect(), false));
    }

    segments
}

/// Highlight `text` using the ranges recorded for `key`, if any
pub fn highlight_field(text: &str, matches: &[FieldMatch], key: FieldKey) -> Vec<Segment> {
    match matches.iter().find(|m| m.key == key) {
        Some(m) if !m.indices.is_empty() => highlight(text, &m.indices),
        _ => vec![Segment::new(text.to_string(), false)],
    }
}

/// A fixed destination offered when there is nothing to suggest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickLink {
    pub name: &'static str,
    pub path: &'static str,
}

pub static QUICK_LINKS: [QuickLink; 5] = [
    QuickLink { name: "Home", path: "/" },
    QuickLink { name: "Archive", path: "/archive" },
    QuickLink { name: "About me", path: "/about-us" },
    QuickLink { name: "Contacts", path: "/contact" },
    QuickLink { name: "Drop a tip", path: "/donate" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::{Article, SearchDocument};
    use crate::ranker::FuzzyRanker;
    use proptest::prelude::*;

    fn result(path: &str, score: f64) -> MatchResult {
        MatchResult {
            item: SearchDocument::from(Article::new("Some title", path)),
            ref_index: 0,
            score,
            matches: Vec::new(),
        }
    }

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_direct_link_wins_over_results() {
        let links: DirectLinks = [("archivio", "/archive")].into_iter().collect();
        let results = vec![result("/article/archivio-storico", 0.0)];

        let nav = resolve_query("  ARCHIVIO ", &links, &results, CONFIDENT_CUTOFF);

        assert_eq!(nav, Some(Navigation::DirectLink("/archive".to_string())));
    }

    #[test]
    fn test_confident_result_is_opened() {
        let results = vec![result("/article/btc-2024", 0.05), result("/article/eth", 0.01)];

        let nav = resolve_query("bitcoin", &DirectLinks::default(), &results, CONFIDENT_CUTOFF);

        assert_eq!(nav, Some(Navigation::Document("/article/btc-2024".to_string())));
    }

    #[test]
    fn test_weak_result_falls_back_to_search_page() {
        let results = vec![result("/article/btc-2024", 0.1)];

        let nav = resolve_query(
            " Bitcon Prices ",
            &DirectLinks::default(),
            &results,
            CONFIDENT_CUTOFF,
        );

        assert_eq!(
            nav,
            Some(Navigation::SearchPage("/search?q=Bitcon%20Prices".to_string()))
        );
    }

    fn ranked_index() -> Vec<SearchDocument> {
        vec![
            Article::new("Bitcoin Outlook 2024", "/article/btc-2024")
                .with_category("Crypto")
                .with_snippet("Halving math and what it means for miners"),
            Article::new("Ethereum staking guide", "/article/eth-staking").with_category("Crypto"),
            Article::new("Weekly wrap", "/article/wrap")
                .with_category("Markets")
                .with_snippet("A recap of the week for stocks and bonds"),
        ]
        .into_iter()
        .map(SearchDocument::from)
        .collect()
    }

    fn submit(query: &str) -> Option<Navigation> {
        let results = FuzzyRanker::default().search(query, &ranked_index());
        assert!(!results.is_empty(), "{query} should match something");
        resolve_query(query, &DirectLinks::default(), &results, CONFIDENT_CUTOFF)
    }

    #[test]
    fn test_partial_hits_go_to_search_page() {
        for query in ["in", "crypt", "recap", "miners"] {
            assert_eq!(
                submit(query),
                Some(Navigation::SearchPage(search_page_path(query))),
                "{query}"
            );
        }
    }

    #[test]
    fn test_whole_title_is_opened() {
        assert_eq!(
            submit("Ethereum Staking Guide"),
            Some(Navigation::Document("/article/eth-staking".to_string()))
        );
    }

    #[test]
    fn test_blank_query_goes_nowhere() {
        assert_eq!(resolve_query("   ", &DirectLinks::default(), &[], CONFIDENT_CUTOFF), None);
    }

    #[test]
    fn test_highlight_two_ranges() {
        let segments = highlight("Investire Bene", &[(0, 2), (5, 7)]);

        assert_eq!(
            segments,
            vec![
                Segment::new("Inv".to_string(), true),
                Segment::new("es".to_string(), false),
                Segment::new("tir".to_string(), true),
                Segment::new("e Bene".to_string(), false),
            ]
        );
        assert_eq!(joined(&segments), "Investire Bene");
    }

    #[test]
    fn test_highlight_without_ranges_is_plain() {
        assert_eq!(
            highlight("Archive", &[]),
            vec![Segment::new("Archive".to_string(), false)]
        );
        assert_eq!(highlight("", &[]), vec![Segment::new(String::new(), false)]);
    }

    #[test]
    fn test_highlight_clamps_bad_ranges() {
        let segments = highlight("Gold", &[(2, 1), (0, 1), (1, 2), (3, 99), (10, 12)]);
        assert_eq!(joined(&segments), "Gold");
        assert!(segments.iter().all(|s| s.emphasized));
    }

    #[test]
    fn test_highlight_field_missing_key() {
        let matches = vec![FieldMatch {
            key: FieldKey::Category,
            score: 0.0,
            indices: vec![(0, 5)],
        }];

        let segments = highlight_field("Bitcoin Outlook", &matches, FieldKey::Title);

        assert_eq!(segments, vec![Segment::new("Bitcoin Outlook".to_string(), false)]);
    }

    proptest! {
        #[test]
        fn prop_highlight_reproduces_text(
            text in "\\PC{0,30}",
            ranges in prop::collection::vec((0usize..40, 0usize..40), 0..6),
        ) {
            let segments = highlight(&text, &ranges);
            prop_assert_eq!(joined(&segments), text);
        }
    }
}
